pub mod actions;
pub mod controller;
pub mod idle;
pub mod lease;
pub mod validation;

pub use controller::{FormWizardController, Notice, SubmitOrigin, SubmitOutcome, Transition};
