// Wizard state (in-memory)
//
// NOTE: This is NOT persisted. It lives for as long as the wizard runs and is reset after every
// successful save.

use super::reference::ReferenceData;
use crate::wizard::idle::IdleTimer;

#[derive(Debug)]
pub struct WizardState {
    pub current_step: u32,
    /// Previously shown steps, most recent last.
    pub step_history: Vec<u32>,
    pub reference_data: Option<ReferenceData>,
    pub idle_timer: IdleTimer,
}

impl WizardState {
    pub fn new(idle_timer: IdleTimer) -> Self {
        Self {
            current_step: 1,
            step_history: Vec::new(),
            reference_data: None,
            idle_timer,
        }
    }

    /// Forward transition: remember where we were and move on.
    pub fn advance(&mut self) -> (u32, u32) {
        let from = self.current_step;
        self.step_history.push(from);
        self.current_step = from + 1;
        (from, self.current_step)
    }

    /// Back transition. `None` when there is nowhere to go back to.
    pub fn retreat(&mut self) -> Option<u32> {
        let prev = self.step_history.pop()?;
        self.current_step = prev;
        Some(prev)
    }

    /// Back to step 1 with no history. Reference data and the idle timer are kept.
    pub fn reset(&mut self) {
        self.current_step = 1;
        self.step_history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn state() -> WizardState {
        WizardState::new(IdleTimer::new(Duration::from_secs(900)))
    }

    #[test]
    fn starts_on_step_one_with_empty_history() {
        let s = state();
        assert_eq!(s.current_step, 1);
        assert!(s.step_history.is_empty());
        assert!(s.reference_data.is_none());
    }

    #[test]
    fn advance_then_retreat_restores_previous_step() {
        let mut s = state();
        assert_eq!(s.advance(), (1, 2));
        assert_eq!(s.advance(), (2, 3));
        assert_eq!(s.step_history, vec![1, 2]);

        assert_eq!(s.retreat(), Some(2));
        assert_eq!(s.current_step, 2);
        assert_eq!(s.step_history, vec![1]);
    }

    #[test]
    fn retreat_on_empty_history_is_a_no_op() {
        let mut s = state();
        assert_eq!(s.retreat(), None);
        assert_eq!(s.current_step, 1);
    }

    #[test]
    fn reset_keeps_reference_data() {
        let mut s = state();
        s.reference_data = Some(ReferenceData::default());
        s.advance();
        s.reset();
        assert_eq!(s.current_step, 1);
        assert!(s.step_history.is_empty());
        assert!(s.reference_data.is_some());
    }
}
