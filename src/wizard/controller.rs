// Form wizard controller
//
// Owns the wizard state and reacts to UI-level events (next / back / back-to-start / field
// change / submit / activity / tick). It never touches the screen directly: the presentation
// layer reads `current_panel()`, `is_section_visible()`, `mark()`, `lease()`, `notice()` and
// `overlay_visible()` after every event.

use log::{error, info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use super::actions::{Choice, FieldAction};
use super::idle::{Clock, IdleTimer};
use super::lease::LeaseRemainder;
use super::validation::{self, FieldMark, StepValidation};
use crate::models::form::{controls, FormDefinition, FormRecord, FormValues, Section, StepPanel};
use crate::models::reference::ReferenceData;
use crate::models::state::WizardState;
use crate::service::{save_with_retry, DataService, ServiceError};
use crate::utils::logging::summarize_record;

/// Something the user should be told about. Shown until the UI clears it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Saved,
    SaveFailed(String),
    OtherPaymentsPlaceholder,
    ReferenceDataUnavailable(String),
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Notice::Saved => "Saved",
            Notice::SaveFailed(_) => "Save failed",
            Notice::OtherPaymentsPlaceholder => "Other payments",
            Notice::ReferenceDataUnavailable(_) => "Lookup lists unavailable",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Notice::Saved => "Entry saved successfully!".to_string(),
            Notice::SaveFailed(reason) => {
                format!("The entry was not saved. {} Your answers are kept.", reason)
            }
            Notice::OtherPaymentsPlaceholder => {
                "You selected 'Yes' for other payments. Additional payment entries are not \
                 captured by this form yet; note them under Payment notes."
                    .to_string()
            }
            Notice::ReferenceDataUnavailable(reason) => format!(
                "Site and equipment lists could not be loaded. {} You can still type a site.",
                reason
            ),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Notice::SaveFailed(_) | Notice::ReferenceDataUnavailable(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Advanced { from: u32, to: u32 },
    /// Validation failed; the listed controls are marked.
    Blocked { invalid: Vec<String> },
    AtLastStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOrigin {
    /// Final-step submit.
    Submit,
    /// "Back to start" on the final step: save what we have, then start over.
    BackToStart,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Saved,
    Failed(ServiceError),
    AlreadyPending,
}

pub struct FormWizardController {
    form: FormDefinition,
    state: WizardState,
    values: FormValues,
    marks: BTreeMap<String, FieldMark>,
    sections: BTreeMap<Section, bool>,
    lease: Option<LeaseRemainder>,
    notice: Option<Notice>,
    overlay_visible: bool,
    save_pending: Option<SubmitOrigin>,
    clock: Arc<dyn Clock>,
}

impl FormWizardController {
    pub fn new(form: FormDefinition, clock: Arc<dyn Clock>, idle_timeout: Duration) -> Self {
        Self {
            form,
            state: WizardState::new(IdleTimer::new(idle_timeout)),
            values: FormValues::default(),
            marks: BTreeMap::new(),
            sections: hidden_sections(),
            lease: None,
            notice: None,
            overlay_visible: false,
            save_pending: None,
            clock,
        }
    }

    /// Show step 1 and arm the idle timer. Reference data is requested separately.
    pub fn start(&mut self) {
        self.state.idle_timer.schedule(self.clock.now());
        info!(
            "[PHASE: wizard] [STEP: start] Wizard started on step {} of {}",
            self.state.current_step,
            self.form.step_count()
        );
    }

    // ---------------------------------------------------------------------
    // Read side
    // ---------------------------------------------------------------------

    pub fn form(&self) -> &FormDefinition {
        &self.form
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn current_step(&self) -> u32 {
        self.state.current_step
    }

    pub fn history(&self) -> &[u32] {
        &self.state.step_history
    }

    pub fn current_panel(&self) -> Option<&StepPanel> {
        self.form.step(self.state.current_step)
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, name: &str) -> &str {
        self.values.get(name)
    }

    pub fn reference_data(&self) -> Option<&ReferenceData> {
        self.state.reference_data.as_ref()
    }

    pub fn is_section_visible(&self, section: Section) -> bool {
        self.sections.get(&section).copied().unwrap_or(false)
    }

    /// Whether a control is shown (i.e. not inside a hidden section).
    pub fn is_field_visible(&self, name: &str) -> bool {
        match self.form.field(name).and_then(|f| f.section) {
            Some(section) => self.is_section_visible(section),
            None => true,
        }
    }

    pub fn mark(&self, name: &str) -> Option<FieldMark> {
        self.marks.get(name).copied()
    }

    pub fn lease(&self) -> Option<&LeaseRemainder> {
        self.lease.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn clear_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn save_pending(&self) -> bool {
        self.save_pending.is_some()
    }

    pub fn is_last_step(&self) -> bool {
        self.state.current_step >= self.form.step_count()
    }

    // ---------------------------------------------------------------------
    // Reference data
    // ---------------------------------------------------------------------

    pub fn apply_reference_data(&mut self, result: Result<ReferenceData, ServiceError>) {
        match result {
            Ok(data) => {
                info!(
                    "[PHASE: wizard] [STEP: reference_data] Loaded {} sites and {} equipments",
                    data.sites.len(),
                    data.equipments.len()
                );
                self.state.reference_data = Some(data);
            }
            Err(e) => {
                warn!(
                    "[PHASE: wizard] [STEP: reference_data] Reference data unavailable: {}",
                    e.internal_details
                );
                self.notice = Some(Notice::ReferenceDataUnavailable(e.user_message));
            }
        }
    }

    pub async fn load_reference_data(&mut self, service: &dyn DataService) {
        let result = service.fetch_reference_data().await;
        self.apply_reference_data(result);
    }

    // ---------------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------------

    pub fn next(&mut self) -> Transition {
        let step = self.state.current_step;
        if self.is_last_step() {
            return Transition::AtLastStep;
        }
        let result = self.check_step(step);
        if !result.is_valid() {
            let invalid = result.invalid_fields();
            info!(
                "[PHASE: wizard] [STEP: next] Step {} blocked by {} invalid field(s)",
                step,
                invalid.len()
            );
            return Transition::Blocked { invalid };
        }
        let (from, to) = self.state.advance();
        info!("[PHASE: wizard] [STEP: next] {} -> {}", from, to);
        Transition::Advanced { from, to }
    }

    /// Go back to the most recently visited step. `None` (and no change) with empty history.
    pub fn back(&mut self) -> Option<u32> {
        let from = self.state.current_step;
        let to = self.state.retreat()?;
        info!("[PHASE: wizard] [STEP: back] {} -> {}", from, to);
        Some(to)
    }

    /// Mark the required controls of `step`. Previous marks for that step are replaced.
    pub fn validate_step(&mut self, step: u32) -> bool {
        self.check_step(step).is_valid()
    }

    fn check_step(&mut self, step: u32) -> StepValidation {
        if let Some(panel) = self.form.step(step) {
            for field in &panel.fields {
                self.marks.remove(&field.name);
            }
        }
        let sections = &self.sections;
        let result = validation::validate_step(&self.form, step, &self.values, |s| {
            sections.get(&s).copied().unwrap_or(false)
        });
        self.marks
            .extend(result.marks.iter().map(|(name, mark)| (name.clone(), *mark)));
        result
    }

    // ---------------------------------------------------------------------
    // Field changes
    // ---------------------------------------------------------------------

    /// Record a new value for a control and run its conditional logic.
    pub fn set_value(&mut self, name: &str, value: &str) -> Option<FieldAction> {
        if self.form.field(name).is_none() {
            warn!(
                "[PHASE: wizard] [STEP: change] Ignoring change to undeclared control '{}'",
                name
            );
            return None;
        }
        self.values.set(name, value);
        let action = FieldAction::from_change(name, value)?;
        self.apply_action(action);
        Some(action)
    }

    pub fn apply_action(&mut self, action: FieldAction) {
        for (section, visible) in action.visibility() {
            self.sections.insert(section, visible);
        }
        match action {
            FieldAction::RecalculateLease => self.recalculate_lease(),
            FieldAction::OtherPayments(Choice::Yes) => {
                self.notice = Some(Notice::OtherPaymentsPlaceholder);
            }
            FieldAction::OtherPayments(Choice::No) => {
                // Unguarded: the current step is not validated on this path.
                if !self.is_last_step() {
                    let (from, to) = self.state.advance();
                    info!(
                        "[PHASE: wizard] [STEP: other_payments] Auto-advance {} -> {}",
                        from, to
                    );
                }
            }
            _ => {}
        }
    }

    /// Recompute from the two lease dates and the visit date. Clears the display when any of
    /// them is missing or malformed.
    pub fn recalculate_lease(&mut self) {
        self.lease = LeaseRemainder::from_inputs(
            self.values.get(controls::LEASE_START),
            self.values.get(controls::LEASE_END),
            self.values.get(controls::DATE),
        );
    }

    // ---------------------------------------------------------------------
    // Submission
    // ---------------------------------------------------------------------

    pub fn snapshot(&self) -> FormRecord {
        FormRecord::snapshot(&self.form, &self.values)
    }

    /// Snapshot the form for saving. `None` while another save is still in flight.
    pub fn begin_submit(&mut self, origin: SubmitOrigin) -> Option<FormRecord> {
        if let Some(pending) = self.save_pending {
            warn!(
                "[PHASE: wizard] [STEP: submit] {:?} ignored; {:?} save still in flight",
                origin, pending
            );
            return None;
        }
        let record = self.snapshot();
        info!(
            "[PHASE: wizard] [STEP: submit] {:?} with {}",
            origin,
            summarize_record(&record)
        );
        self.save_pending = Some(origin);
        Some(record)
    }

    /// Continuation of `begin_submit`. Success resets the wizard; failure keeps everything.
    pub fn finish_submit(&mut self, result: Result<(), ServiceError>) {
        let origin = self.save_pending.take();
        match result {
            Ok(()) => {
                info!("[PHASE: wizard] [STEP: submit] {:?} saved; resetting", origin);
                self.reset();
                self.notice = Some(Notice::Saved);
            }
            Err(e) => {
                error!(
                    "[PHASE: wizard] [STEP: submit] {:?} failed: {}",
                    origin, e.internal_details
                );
                self.notice = Some(Notice::SaveFailed(e.user_message));
            }
        }
    }

    pub async fn submit(
        &mut self,
        service: &dyn DataService,
        origin: SubmitOrigin,
        attempts: u32,
    ) -> SubmitOutcome {
        let Some(record) = self.begin_submit(origin) else {
            return SubmitOutcome::AlreadyPending;
        };
        let result = save_with_retry(service, &record, attempts).await;
        let outcome = match &result {
            Ok(()) => SubmitOutcome::Saved,
            Err(e) => SubmitOutcome::Failed(e.clone()),
        };
        self.finish_submit(result);
        outcome
    }

    pub async fn back_to_start(
        &mut self,
        service: &dyn DataService,
        attempts: u32,
    ) -> SubmitOutcome {
        self.submit(service, SubmitOrigin::BackToStart, attempts).await
    }

    /// Step 1, empty history, cleared controls. Reference data is kept.
    pub fn reset(&mut self) {
        self.state.reset();
        self.values.clear();
        self.marks.clear();
        self.sections = hidden_sections();
        self.lease = None;
    }

    // ---------------------------------------------------------------------
    // Idle timeout
    // ---------------------------------------------------------------------

    /// Key press, mouse movement or click: push the idle deadline out.
    pub fn record_activity(&mut self) {
        self.state.idle_timer.reschedule(self.clock.now());
    }

    /// Poll the idle timer. Returns true when the overlay was just shown.
    pub fn tick(&mut self) -> bool {
        if self.state.idle_timer.poll(self.clock.now()) {
            info!(
                "[PHASE: wizard] [STEP: idle] No activity for {:?}; showing timeout overlay",
                self.state.idle_timer.timeout()
            );
            self.overlay_visible = true;
            return true;
        }
        false
    }

    /// Called by the overlay itself when the user dismisses it.
    pub fn dismiss_overlay(&mut self) {
        self.overlay_visible = false;
        self.record_activity();
    }
}

fn hidden_sections() -> BTreeMap<Section, bool> {
    Section::ALL.iter().map(|s| (*s, false)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::StubService;
    use crate::wizard::idle::ManualClock;

    const IDLE: Duration = Duration::from_secs(900);

    fn controller() -> (FormWizardController, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let mut c = FormWizardController::new(FormDefinition::site_visit(), clock.clone(), IDLE);
        c.start();
        (c, clock)
    }

    fn fill_step(c: &mut FormWizardController, step: u32) {
        match step {
            1 => {
                c.set_value("date", "2024-01-05");
                c.set_value("site", "North Yard");
                c.set_value("equipment", "Crane 4");
            }
            2 => {
                c.set_value("leaseStartDate", "2024-01-01");
                c.set_value("leaseEndDate", "2024-01-11");
                c.set_value("renewal", "No");
            }
            3 => {}
            4 => {
                c.set_value("used", "Yes");
                c.set_value("hoursUsed", "6");
                c.set_value("breakdown", "No");
            }
            5 => {
                c.set_value("remarks", "all good");
                c.set_value("done", "Yes");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn next_with_valid_fields_advances_and_pushes_history() {
        let (mut c, _) = controller();
        for step in 1..5 {
            fill_step(&mut c, step);
            assert_eq!(
                c.next(),
                Transition::Advanced {
                    from: step,
                    to: step + 1
                }
            );
            assert_eq!(c.current_step(), step + 1);
            assert_eq!(c.history().last(), Some(&step));
        }
        assert_eq!(c.history(), &[1, 2, 3, 4]);
    }

    #[test]
    fn back_restores_previous_step_and_pops_once() {
        let (mut c, _) = controller();
        fill_step(&mut c, 1);
        c.next();
        fill_step(&mut c, 2);
        c.next();
        assert_eq!(c.current_step(), 3);

        assert_eq!(c.back(), Some(2));
        assert_eq!(c.current_step(), 2);
        assert_eq!(c.history(), &[1]);

        assert_eq!(c.back(), Some(1));
        assert_eq!(c.back(), None, "empty history is a no-op");
        assert_eq!(c.current_step(), 1);
    }

    #[test]
    fn blank_required_text_blocks_next() {
        let (mut c, _) = controller();
        c.set_value("date", "2024-01-05");
        c.set_value("equipment", "Crane 4");

        let t = c.next();
        assert_eq!(
            t,
            Transition::Blocked {
                invalid: vec!["site".to_string()]
            }
        );
        assert_eq!(c.current_step(), 1);
        assert!(c.history().is_empty());
        assert_eq!(c.mark("site"), Some(FieldMark::Error));
        assert_eq!(c.mark("date"), Some(FieldMark::Neutral));

        c.set_value("site", "Harbor");
        assert!(matches!(c.next(), Transition::Advanced { .. }));
        assert_eq!(c.mark("site"), Some(FieldMark::Neutral));
    }

    #[test]
    fn blocked_list_only_names_fields_of_the_current_step() {
        let (mut c, _) = controller();
        fill_step(&mut c, 1);
        c.next();
        assert!(matches!(c.next(), Transition::Blocked { .. }));
        assert_eq!(c.mark("renewal"), Some(FieldMark::Error));

        c.back();
        c.set_value("site", "");
        assert_eq!(
            c.next(),
            Transition::Blocked {
                invalid: vec!["site".to_string()]
            }
        );
        assert_eq!(c.current_step(), 1);
    }

    #[test]
    fn unchecked_required_radio_blocks_next() {
        let (mut c, _) = controller();
        fill_step(&mut c, 1);
        c.next();
        c.set_value("leaseStartDate", "2024-01-01");
        c.set_value("leaseEndDate", "2024-06-01");

        assert_eq!(
            c.next(),
            Transition::Blocked {
                invalid: vec!["renewal".to_string()]
            }
        );
        assert_eq!(c.current_step(), 2);
    }

    #[test]
    fn next_on_last_step_stays_put() {
        let (mut c, _) = controller();
        for step in 1..5 {
            fill_step(&mut c, step);
            c.next();
        }
        fill_step(&mut c, 5);
        assert_eq!(c.next(), Transition::AtLastStep);
        assert_eq!(c.current_step(), 5);
        assert!(c.current_panel().is_some());
    }

    #[test]
    fn binary_toggles_set_exclusive_visibility() {
        let (mut c, _) = controller();

        c.set_value("renewal", "Yes");
        assert!(c.is_section_visible(Section::RenewalOptions));
        c.set_value("renewal", "No");
        assert!(!c.is_section_visible(Section::RenewalOptions));

        c.set_value("used", "Yes");
        assert!(c.is_section_visible(Section::UsageYesOptions));
        assert!(!c.is_section_visible(Section::UsageNoOptions));
        c.set_value("used", "No");
        assert!(!c.is_section_visible(Section::UsageYesOptions));
        assert!(c.is_section_visible(Section::UsageNoOptions));

        c.set_value("breakdown", "Yes");
        assert!(c.is_section_visible(Section::BreakdownRemarks));
        c.set_value("breakdown", "No");
        assert!(!c.is_section_visible(Section::BreakdownRemarks));

        c.set_value("done", "Yes");
        assert!(c.is_section_visible(Section::FinalSubmit));
        assert!(!c.is_section_visible(Section::BackToStart));
        c.set_value("done", "No");
        assert!(!c.is_section_visible(Section::FinalSubmit));
        assert!(c.is_section_visible(Section::BackToStart));
    }

    #[test]
    fn other_payments_yes_shows_notice_without_moving() {
        let (mut c, _) = controller();
        fill_step(&mut c, 1);
        c.next();
        fill_step(&mut c, 2);
        c.next();

        c.set_value("otherPayments", "Yes");
        assert_eq!(c.notice(), Some(&Notice::OtherPaymentsPlaceholder));
        assert_eq!(c.current_step(), 3);
    }

    #[test]
    fn other_payments_no_auto_advances_one_step() {
        let (mut c, _) = controller();
        fill_step(&mut c, 1);
        c.next();
        fill_step(&mut c, 2);
        c.next();

        c.set_value("otherPayments", "No");
        assert_eq!(c.current_step(), 4);
        assert_eq!(c.history(), &[1, 2, 3]);
        assert_eq!(c.back(), Some(3));
    }

    #[test]
    fn lease_recalculates_when_either_lease_date_changes() {
        let (mut c, _) = controller();
        c.set_value("date", "2024-01-05");
        c.set_value("leaseStartDate", "2024-01-01");
        assert!(c.lease().is_none(), "end date still missing");

        c.set_value("leaseEndDate", "2024-01-11");
        assert_eq!(
            c.lease(),
            Some(&LeaseRemainder {
                total_days: 10,
                elapsed_days: 4,
                remaining_days: 6,
            })
        );

        c.set_value("leaseStartDate", "2024-01-07");
        let lease = c.lease().copied().unwrap();
        assert_eq!(lease.elapsed_days, -2);
        assert_eq!(lease.remaining_days, 6);
    }

    #[tokio::test]
    async fn reference_data_loads_into_state() {
        let (mut c, _) = controller();
        let stub = StubService::ok();
        c.load_reference_data(&stub).await;
        let data = c.reference_data().expect("reference data");
        assert_eq!(data.equipments, vec!["Crane 4", "Loader 2"]);
        assert!(c.notice().is_none());
    }

    #[tokio::test]
    async fn reference_data_failure_is_surfaced_not_silent() {
        let (mut c, _) = controller();
        let mut stub = StubService::ok();
        stub.reference = Err(ServiceError::transport("Service unreachable.", "refused"));
        c.load_reference_data(&stub).await;

        assert!(c.reference_data().is_none());
        assert!(matches!(
            c.notice(),
            Some(Notice::ReferenceDataUnavailable(msg)) if msg == "Service unreachable."
        ));
        assert_eq!(c.current_step(), 1, "wizard stays usable");
    }

    #[tokio::test]
    async fn submit_saves_once_with_every_field_then_resets() {
        let (mut c, _) = controller();
        let stub = StubService::ok();
        c.load_reference_data(&stub).await;
        for step in 1..5 {
            fill_step(&mut c, step);
            c.next();
        }
        fill_step(&mut c, 5);

        let outcome = c.submit(&stub, SubmitOrigin::Submit, 1).await;

        assert_eq!(outcome, SubmitOutcome::Saved);
        assert_eq!(stub.saves(), 1);
        let saved = stub.saved_records();
        let record = &saved[0];
        for field in FormDefinition::site_visit().fields() {
            if field.name == "otherPayments" {
                // Never checked in this run.
                assert_eq!(record.get("otherPayments"), None);
                continue;
            }
            assert_eq!(
                record.get(&field.name),
                Some(c_value_before_reset(&field.name)),
                "field {} missing or wrong",
                field.name
            );
        }

        assert_eq!(c.current_step(), 1);
        assert!(c.history().is_empty());
        assert_eq!(c.value("site"), "");
        assert!(!c.is_section_visible(Section::FinalSubmit));
        assert!(c.lease().is_none());
        assert_eq!(c.notice(), Some(&Notice::Saved));
        assert!(c.reference_data().is_some(), "lookup lists survive the reset");
    }

    fn c_value_before_reset(name: &str) -> &'static str {
        match name {
            "date" => "2024-01-05",
            "site" => "North Yard",
            "equipment" => "Crane 4",
            "leaseStartDate" => "2024-01-01",
            "leaseEndDate" => "2024-01-11",
            "renewal" => "No",
            "used" => "Yes",
            "hoursUsed" => "6",
            "breakdown" => "No",
            "remarks" => "all good",
            "done" => "Yes",
            _ => "",
        }
    }

    #[tokio::test]
    async fn failed_save_keeps_state_and_reports() {
        let (mut c, _) = controller();
        let stub = StubService::failing(5, ServiceError::rejected(400, "bad request"));
        fill_step(&mut c, 1);
        c.next();

        let outcome = c.submit(&stub, SubmitOrigin::Submit, 3).await;

        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert_eq!(stub.saves(), 1, "client errors are not retried");
        assert_eq!(c.current_step(), 2);
        assert_eq!(c.value("site"), "North Yard");
        assert!(matches!(c.notice(), Some(Notice::SaveFailed(_))));
        assert!(!c.save_pending());
    }

    #[tokio::test]
    async fn back_to_start_saves_then_resets() {
        let (mut c, _) = controller();
        let stub = StubService::ok();
        for step in 1..5 {
            fill_step(&mut c, step);
            c.next();
        }
        c.set_value("done", "No");
        assert!(c.is_section_visible(Section::BackToStart));

        let outcome = c.back_to_start(&stub, 1).await;

        assert_eq!(outcome, SubmitOutcome::Saved);
        assert_eq!(stub.saves(), 1);
        assert_eq!(stub.saved_records()[0].get("done"), Some("No"));
        assert_eq!(c.current_step(), 1);
        assert!(c.history().is_empty());
    }

    #[test]
    fn only_one_save_in_flight() {
        let (mut c, _) = controller();
        assert!(c.begin_submit(SubmitOrigin::Submit).is_some());
        assert!(c.save_pending());
        assert!(c.begin_submit(SubmitOrigin::BackToStart).is_none());

        c.finish_submit(Ok(()));
        assert!(!c.save_pending());
        assert!(c.begin_submit(SubmitOrigin::Submit).is_some());
    }

    #[test]
    fn idle_overlay_appears_after_quiet_period_only() {
        let (mut c, clock) = controller();

        clock.advance(Duration::from_secs(14 * 60));
        assert!(!c.tick());
        c.record_activity();

        clock.advance(Duration::from_secs(14 * 60));
        assert!(!c.tick(), "activity should have pushed the deadline out");
        assert!(!c.overlay_visible());

        clock.advance(Duration::from_secs(60));
        assert!(c.tick());
        assert!(c.overlay_visible());
        assert!(!c.tick(), "single-shot");

        // Activity alone does not hide the overlay.
        c.record_activity();
        assert!(c.overlay_visible());
        c.dismiss_overlay();
        assert!(!c.overlay_visible());
    }

    #[test]
    fn unknown_control_is_ignored() {
        let (mut c, _) = controller();
        assert_eq!(c.set_value("nope", "Yes"), None);
        assert_eq!(c.value("nope"), "");
    }
}
