// Form definition: step panels, named controls and conditional sections.
//
// This is the contract between the wizard controller and whatever renders it. The controller
// only ever refers to controls by name and to sections by `Section`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;

/// Control names the conditional logic and the lease calculation are wired to.
pub mod controls {
    pub const DATE: &str = "date";
    pub const SITE: &str = "site";
    pub const EQUIPMENT: &str = "equipment";
    pub const LEASE_START: &str = "leaseStartDate";
    pub const LEASE_END: &str = "leaseEndDate";
    pub const RENEWAL: &str = "renewal";
    pub const OTHER_PAYMENTS: &str = "otherPayments";
    pub const USED: &str = "used";
    pub const BREAKDOWN: &str = "breakdown";
    pub const DONE: &str = "done";

    pub const WIRED: [&str; 8] = [
        DATE,
        LEASE_START,
        LEASE_END,
        RENEWAL,
        OTHER_PAYMENTS,
        USED,
        BREAKDOWN,
        DONE,
    ];
}

/// Sub-sections whose visibility is driven by a Yes/No control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    RenewalOptions,
    UsageYesOptions,
    UsageNoOptions,
    BreakdownRemarks,
    FinalSubmit,
    BackToStart,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::RenewalOptions,
        Section::UsageYesOptions,
        Section::UsageNoOptions,
        Section::BreakdownRemarks,
        Section::FinalSubmit,
        Section::BackToStart,
    ];

    pub fn as_id(&self) -> &'static str {
        match self {
            Section::RenewalOptions => "renewal-options",
            Section::UsageYesOptions => "usage-yes-options",
            Section::UsageNoOptions => "usage-no-options",
            Section::BreakdownRemarks => "breakdown-remarks-div",
            Section::FinalSubmit => "final-submit-div",
            Section::BackToStart => "back-to-start-div",
        }
    }
}

/// Which reference-data list feeds a selection control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceList {
    Sites,
    Equipments,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Date,
    Number,
    /// Strict choice from a reference list.
    Select { source: ReferenceList },
    /// Free text with suggestions from a reference list.
    Suggest { source: ReferenceList },
    Radio { options: Vec<String> },
}

impl FieldKind {
    pub fn is_radio(&self) -> bool {
        matches!(self, FieldKind::Radio { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    /// Conditional section this control lives in, if any.
    #[serde(default)]
    pub section: Option<Section>,
}

impl FieldSpec {
    fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            required: false,
            section: None,
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn in_section(mut self, section: Section) -> Self {
        self.section = Some(section);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepPanel {
    pub number: u32,
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Error)]
pub enum FormDefinitionError {
    #[error("form has no steps")]
    NoSteps,
    #[error("step {position} is numbered {found}; steps must be numbered 1..N in order")]
    StepOutOfOrder { position: u32, found: u32 },
    #[error("field name '{0}' is not a valid identifier")]
    InvalidName(String),
    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),
    #[error("radio field '{0}' has no options")]
    EmptyRadio(String),
    #[error("control '{0}' is required by the wizard logic but is not declared")]
    MissingControl(String),
    #[error("failed to read form file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse form file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("internal error: failed to compile identifier pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDefinition {
    pub steps: Vec<StepPanel>,
}

fn yes_no() -> FieldKind {
    FieldKind::Radio {
        options: vec!["Yes".to_string(), "No".to_string()],
    }
}

impl FormDefinition {
    /// Built-in site visit form.
    pub fn site_visit() -> Self {
        use controls::*;

        let steps = vec![
            StepPanel {
                number: 1,
                title: "Site Visit".to_string(),
                fields: vec![
                    FieldSpec::new(DATE, "Date (YYYY-MM-DD)", FieldKind::Date).required(),
                    FieldSpec::new(
                        SITE,
                        "Site",
                        FieldKind::Suggest {
                            source: ReferenceList::Sites,
                        },
                    )
                    .required(),
                    FieldSpec::new(
                        EQUIPMENT,
                        "Equipment",
                        FieldKind::Select {
                            source: ReferenceList::Equipments,
                        },
                    )
                    .required(),
                ],
            },
            StepPanel {
                number: 2,
                title: "Lease".to_string(),
                fields: vec![
                    FieldSpec::new(LEASE_START, "Lease start date", FieldKind::Date).required(),
                    FieldSpec::new(LEASE_END, "Lease end date", FieldKind::Date).required(),
                    FieldSpec::new(RENEWAL, "Renewal?", yes_no()).required(),
                    FieldSpec::new("renewalTerms", "Renewal terms", FieldKind::Text)
                        .in_section(Section::RenewalOptions),
                ],
            },
            StepPanel {
                number: 3,
                title: "Payments".to_string(),
                fields: vec![
                    FieldSpec::new(OTHER_PAYMENTS, "Other payments?", yes_no()),
                    FieldSpec::new("paymentNotes", "Payment notes", FieldKind::Text),
                ],
            },
            StepPanel {
                number: 4,
                title: "Usage".to_string(),
                fields: vec![
                    FieldSpec::new(USED, "Equipment used?", yes_no()).required(),
                    FieldSpec::new("hoursUsed", "Hours used", FieldKind::Number)
                        .in_section(Section::UsageYesOptions),
                    FieldSpec::new("idleReason", "Reason not used", FieldKind::Text)
                        .in_section(Section::UsageNoOptions),
                    FieldSpec::new(BREAKDOWN, "Breakdown?", yes_no()).required(),
                    FieldSpec::new("breakdownRemarks", "Breakdown remarks", FieldKind::Text)
                        .in_section(Section::BreakdownRemarks),
                ],
            },
            StepPanel {
                number: 5,
                title: "Finish".to_string(),
                fields: vec![
                    FieldSpec::new("remarks", "Remarks", FieldKind::Text),
                    FieldSpec::new(DONE, "Done with this entry?", yes_no()).required(),
                ],
            },
        ];

        Self { steps }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, FormDefinitionError> {
        let form: FormDefinition = toml::from_str(s)?;
        form.validate()?;
        Ok(form)
    }

    pub fn load(path: &Path) -> Result<Self, FormDefinitionError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Check the panel / control contract the controller relies on.
    pub fn validate(&self) -> Result<(), FormDefinitionError> {
        if self.steps.is_empty() {
            return Err(FormDefinitionError::NoSteps);
        }

        for (idx, step) in self.steps.iter().enumerate() {
            let position = idx as u32 + 1;
            if step.number != position {
                return Err(FormDefinitionError::StepOutOfOrder {
                    position,
                    found: step.number,
                });
            }
        }

        let ident_re = Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$")?;
        let mut seen = HashSet::new();
        for field in self.fields() {
            if !ident_re.is_match(&field.name) {
                return Err(FormDefinitionError::InvalidName(field.name.clone()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(FormDefinitionError::DuplicateField(field.name.clone()));
            }
            if let FieldKind::Radio { options } = &field.kind {
                if options.is_empty() {
                    return Err(FormDefinitionError::EmptyRadio(field.name.clone()));
                }
            }
        }

        for name in controls::WIRED {
            if !seen.contains(name) {
                return Err(FormDefinitionError::MissingControl(name.to_string()));
            }
        }

        Ok(())
    }

    pub fn step_count(&self) -> u32 {
        self.steps.len() as u32
    }

    pub fn step(&self, number: u32) -> Option<&StepPanel> {
        self.steps.iter().find(|s| s.number == number)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.steps.iter().flat_map(|s| s.fields.iter())
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields().find(|f| f.name == name)
    }

    /// Step number a control lives on.
    pub fn step_of(&self, name: &str) -> Option<u32> {
        self.steps
            .iter()
            .find(|s| s.fields.iter().any(|f| f.name == name))
            .map(|s| s.number)
    }
}

/// Current values of every control, keyed by control name. Blank means "no value" (or, for a
/// radio group, "nothing checked").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: BTreeMap<String, String>,
}

impl FormValues {
    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Flat snapshot of the form sent to the save operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormRecord(BTreeMap<String, String>);

impl FormRecord {
    /// Every declared control appears with its current value, except radio groups with nothing
    /// checked, which are left out.
    pub fn snapshot(form: &FormDefinition, values: &FormValues) -> Self {
        let mut map = BTreeMap::new();
        for field in form.fields() {
            let value = values.get(&field.name);
            if field.kind.is_radio() && value.is_empty() {
                continue;
            }
            map.insert(field.name.clone(), value.to_string());
        }
        Self(map)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

impl From<BTreeMap<String, String>> for FormRecord {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_form_passes_its_own_checks() {
        let form = FormDefinition::site_visit();
        form.validate().expect("built-in form should validate");
        assert_eq!(form.step_count(), 5);
        assert_eq!(form.step_of(controls::OTHER_PAYMENTS), Some(3));
    }

    #[test]
    fn step_gap_is_rejected() {
        let mut form = FormDefinition::site_visit();
        form.steps[2].number = 7;
        let err = form.validate().unwrap_err();
        assert!(
            matches!(err, FormDefinitionError::StepOutOfOrder { position: 3, found: 7 }),
            "unexpected error: {}",
            err
        );
    }

    #[test]
    fn duplicate_and_invalid_names_are_rejected() {
        let mut form = FormDefinition::site_visit();
        form.steps[4].fields.push(FieldSpec::new("site", "Again", FieldKind::Text));
        assert!(matches!(
            form.validate(),
            Err(FormDefinitionError::DuplicateField(name)) if name == "site"
        ));

        let mut form = FormDefinition::site_visit();
        form.steps[4].fields.push(FieldSpec::new("bad name", "x", FieldKind::Text));
        assert!(matches!(
            form.validate(),
            Err(FormDefinitionError::InvalidName(_))
        ));
    }

    #[test]
    fn missing_wired_control_is_rejected() {
        let mut form = FormDefinition::site_visit();
        form.steps[4].fields.retain(|f| f.name != controls::DONE);
        assert!(matches!(
            form.validate(),
            Err(FormDefinitionError::MissingControl(name)) if name == "done"
        ));
    }

    #[test]
    fn form_round_trips_through_toml() {
        let form = FormDefinition::site_visit();
        let text = toml::to_string(&form).expect("serialize");
        let parsed = FormDefinition::from_toml_str(&text).expect("parse");
        assert_eq!(parsed, form);
    }

    #[test]
    fn snapshot_omits_unchecked_radio_groups_only() {
        let form = FormDefinition::site_visit();
        let mut values = FormValues::default();
        values.set("site", "North Yard");
        values.set("renewal", "Yes");

        let record = FormRecord::snapshot(&form, &values);
        assert_eq!(record.get("site"), Some("North Yard"));
        assert_eq!(record.get("renewal"), Some("Yes"));
        // Blank text controls are still present.
        assert_eq!(record.get("remarks"), Some(""));
        // Unchecked radio groups are not.
        assert_eq!(record.get("used"), None);
        assert_eq!(record.get("done"), None);
    }
}
