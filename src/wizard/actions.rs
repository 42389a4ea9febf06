// Change-event dispatch: control name + new value -> what the wizard should do about it.

use crate::models::form::{controls, Section};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Yes,
    No,
}

impl Choice {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Yes" => Some(Choice::Yes),
            "No" => Some(Choice::No),
            _ => None,
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Choice::Yes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAction {
    ToggleRenewal(Choice),
    RecalculateLease,
    OtherPayments(Choice),
    ToggleUsage(Choice),
    ToggleBreakdown(Choice),
    FinalBranch(Choice),
}

impl FieldAction {
    /// Pure mapping from a changed control to its action. Controls with no conditional behavior
    /// (and Yes/No controls set to anything else) map to `None`.
    pub fn from_change(control: &str, value: &str) -> Option<Self> {
        let choice = || Choice::parse(value);
        match control {
            controls::RENEWAL => choice().map(FieldAction::ToggleRenewal),
            controls::LEASE_START | controls::LEASE_END => Some(FieldAction::RecalculateLease),
            controls::OTHER_PAYMENTS => choice().map(FieldAction::OtherPayments),
            controls::USED => choice().map(FieldAction::ToggleUsage),
            controls::BREAKDOWN => choice().map(FieldAction::ToggleBreakdown),
            controls::DONE => choice().map(FieldAction::FinalBranch),
            _ => None,
        }
    }

    /// Section visibility this action implies. Empty for actions that don't toggle sections.
    pub fn visibility(&self) -> Vec<(Section, bool)> {
        match *self {
            FieldAction::ToggleRenewal(c) => vec![(Section::RenewalOptions, c.is_yes())],
            FieldAction::ToggleUsage(c) => vec![
                (Section::UsageYesOptions, c.is_yes()),
                (Section::UsageNoOptions, !c.is_yes()),
            ],
            FieldAction::ToggleBreakdown(c) => vec![(Section::BreakdownRemarks, c.is_yes())],
            FieldAction::FinalBranch(c) => vec![
                (Section::FinalSubmit, c == Choice::Yes),
                (Section::BackToStart, c == Choice::No),
            ],
            FieldAction::RecalculateLease | FieldAction::OtherPayments(_) => Vec::new(),
        }
    }
}
