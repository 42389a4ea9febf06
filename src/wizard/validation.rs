// Presence-only step validation

use std::collections::BTreeMap;

use crate::models::form::{FieldKind, FormDefinition, FormValues, Section};

/// Visual state of a validated control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMark {
    Neutral,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepValidation {
    pub marks: BTreeMap<String, FieldMark>,
}

impl StepValidation {
    pub fn is_valid(&self) -> bool {
        self.marks.values().all(|m| *m == FieldMark::Neutral)
    }

    pub fn invalid_fields(&self) -> Vec<String> {
        self.marks
            .iter()
            .filter(|(_, m)| **m == FieldMark::Error)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// Check every required control on `step` for a non-empty value. Controls inside a hidden
/// section are skipped. A radio group counts as filled only when its value is one of its options.
pub fn validate_step(
    form: &FormDefinition,
    step: u32,
    values: &FormValues,
    is_visible: impl Fn(Section) -> bool,
) -> StepValidation {
    let mut result = StepValidation::default();
    let Some(panel) = form.step(step) else {
        return result;
    };

    for field in panel.fields.iter().filter(|f| f.required) {
        if let Some(section) = field.section {
            if !is_visible(section) {
                continue;
            }
        }

        let value = values.get(&field.name);
        let filled = match &field.kind {
            FieldKind::Radio { options } => options.iter().any(|o| o == value),
            _ => !value.is_empty(),
        };

        let mark = if filled {
            FieldMark::Neutral
        } else {
            FieldMark::Error
        };
        result.marks.insert(field.name.clone(), mark);
    }

    result
}
