pub mod form;
pub mod reference;
pub mod state;
