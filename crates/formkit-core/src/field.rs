#![forbid(unsafe_code)]

//! A single editable field: value, rules, and validity/visibility metadata.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::rules::{self, RequiredUnless, RuleOutcome, Rules, SourceIpRule};
use crate::value::{FieldValue, SelectOption};

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// A leaf editable unit of a form.
///
/// `is_valid` always reflects re-evaluating `rules` against the current
/// `value`; every constructor and mutator re-derives it, so it is never a
/// stale cache. `is_touched` flips to `true` on the first user edit (or a
/// required-fields sweep) and is what gates whether `validation_message` is
/// shown — a field has exactly two externally meaningful states,
/// untouched (no message) and touched (message iff invalid).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Field {
    /// Display label, also interpolated into validation messages.
    pub label: String,
    /// Current value.
    pub value: FieldValue,
    /// Verdict of the rules against the current value.
    pub is_valid: bool,
    /// Whether the user has edited the field (or a sweep forced it).
    pub is_touched: bool,
    /// Rendered as non-interactive; no effect on validity.
    pub is_read_only: bool,
    /// Not rendered; excluded from the aggregate validity fold.
    pub hidden: bool,
    /// Activated validation rules.
    pub rules: Rules,
    /// Message for the current violation; empty when valid.
    pub validation_message: String,
    /// Selectable options for select-type fields.
    pub options: Vec<SelectOption>,
}

impl Field {
    fn new(label: impl Into<String>, value: FieldValue) -> Self {
        let mut field = Self {
            label: label.into(),
            value,
            is_valid: true,
            is_touched: false,
            is_read_only: false,
            hidden: false,
            rules: Rules::none(),
            validation_message: String::new(),
            options: Vec::new(),
        };
        field.revalidate();
        field
    }

    /// Create a text field.
    pub fn text(label: impl Into<String>) -> Self {
        Self::new(label, FieldValue::Text(String::new()))
    }

    /// Create a numeric field with no value yet.
    pub fn number(label: impl Into<String>) -> Self {
        Self::new(label, FieldValue::Number(None))
    }

    /// Create a checkbox field.
    pub fn checkbox(label: impl Into<String>, checked: bool) -> Self {
        Self::new(label, FieldValue::Bool(checked))
    }

    /// Create a select field; options are usually seeded later once
    /// reference data loads.
    pub fn select(label: impl Into<String>, options: Vec<SelectOption>) -> Self {
        let mut field = Self::new(label, FieldValue::Text(String::new()));
        field.options = options;
        field
    }

    /// Create a multi-select field.
    pub fn multi_select(label: impl Into<String>) -> Self {
        Self::new(label, FieldValue::List(Vec::new()))
    }

    // -- builder-style rule activation --

    /// Require a non-empty value.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.rules.required = true;
        self.revalidate();
        self
    }

    /// Require a non-empty value unless a sibling holds the given value.
    #[must_use]
    pub fn required_unless(mut self, field: impl Into<String>, equals: impl Into<FieldValue>) -> Self {
        self.rules.required = true;
        self.rules.required_unless = Some(RequiredUnless {
            field: field.into(),
            equals: equals.into(),
        });
        self.revalidate();
        self
    }

    /// Cap the character count (inclusive).
    #[must_use]
    pub fn max_length(mut self, max: usize) -> Self {
        self.rules.max_length = Some(max);
        self.revalidate();
        self
    }

    /// Constrain a numeric value to an inclusive range.
    #[must_use]
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.rules.min_value = Some(min);
        self.rules.max_value = Some(max);
        self.revalidate();
        self
    }

    /// Restrict to the lowercase DNS-label shape resource names use.
    #[must_use]
    pub fn lower_dns_label(mut self) -> Self {
        self.rules.lower_dns_label = true;
        self.revalidate();
        self
    }

    /// Restrict to ASCII digits.
    #[must_use]
    pub fn digits_only(mut self) -> Self {
        self.rules.digits_only = true;
        self.revalidate();
        self
    }

    /// Require a well-formed URL when non-empty.
    #[must_use]
    pub fn url(mut self) -> Self {
        self.rules.url = true;
        self.revalidate();
        self
    }

    /// Require `any`, an IPv4 address, or CIDR per the grammar.
    #[must_use]
    pub fn source_ip(mut self, grammar: SourceIpRule) -> Self {
        self.rules.source_ip = Some(grammar);
        self.revalidate();
        self
    }

    /// Forbid repeating the value across sibling array rows.
    #[must_use]
    pub fn unique_across_siblings(mut self) -> Self {
        self.rules.unique_across_siblings = true;
        self
    }

    // -- builder-style metadata --

    /// Set an initial value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.value = value.into();
        self.revalidate();
        self
    }

    /// Seed selectable options (select and multi-select fields).
    #[must_use]
    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    /// Mark as read-only.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.is_read_only = true;
        self
    }

    /// Start hidden.
    #[must_use]
    pub fn start_hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    // -- validation --

    /// Re-run the rule evaluator against the current value, writing
    /// `is_valid` and `validation_message` back onto a returned copy.
    ///
    /// Never touches `is_touched`; callers control that explicitly so errors
    /// are not shown before first interaction.
    #[must_use]
    pub fn validated(&self) -> Self {
        let mut field = self.clone();
        field.revalidate();
        field
    }

    /// Like [`Field::validated`] but with `required` resolved by the caller
    /// (group passes resolve `required_unless` against the sibling value).
    #[must_use]
    pub fn validated_with_required(&self, required: bool) -> Self {
        let mut field = self.clone();
        field.apply(rules::evaluate_with_required(
            &field.label,
            &field.value,
            &field.rules,
            required,
        ));
        field
    }

    fn revalidate(&mut self) {
        self.apply(rules::evaluate(&self.label, &self.value, &self.rules));
    }

    fn apply(&mut self, outcome: RuleOutcome) {
        self.is_valid = outcome.is_valid();
        self.validation_message = match outcome {
            RuleOutcome::Valid => String::new(),
            RuleOutcome::Invalid(v) => v.message,
        };
    }

    /// The message the rendering layer should show right now.
    #[must_use]
    pub fn visible_message(&self) -> &str {
        if self.is_touched && !self.is_valid {
            &self.validation_message
        } else {
            ""
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_required_text_starts_invalid_untouched() {
        let f = Field::text("Name:").required();
        assert!(!f.is_valid);
        assert!(!f.is_touched);
        // Message derived but not shown before first interaction.
        assert_eq!(f.validation_message, "Name is required");
        assert_eq!(f.visible_message(), "");
    }

    #[test]
    fn optional_field_starts_valid() {
        let f = Field::text("Prefix:").max_length(10);
        assert!(f.is_valid);
        assert_eq!(f.validation_message, "");
    }

    #[test]
    fn with_value_rederives_validity() {
        let f = Field::text("Name:").required().with_value("node-1");
        assert!(f.is_valid);
        let f = f.with_value("");
        assert!(!f.is_valid);
    }

    #[test]
    fn validated_is_idempotent() {
        let f = Field::text("Name:")
            .required()
            .lower_dns_label()
            .with_value("My_Node");
        assert_eq!(f.validated(), f.validated().validated());
    }

    #[test]
    fn validated_preserves_touched() {
        let mut f = Field::text("Name:").required();
        f.is_touched = true;
        assert!(f.validated().is_touched);
    }

    #[test]
    fn validated_with_required_waives_requirement() {
        let f = Field::number("Expire days:").required();
        assert!(!f.is_valid);
        let waived = f.validated_with_required(false);
        assert!(waived.is_valid);
        assert_eq!(waived.validation_message, "");
    }

    #[test]
    fn visible_message_gated_on_touched() {
        let mut f = Field::text("Name:").required();
        assert_eq!(f.visible_message(), "");
        f.is_touched = true;
        assert_eq!(f.visible_message(), "Name is required");
    }

    #[test]
    fn hidden_and_read_only_do_not_change_validity() {
        let shown = Field::text("Name:").required();
        let hidden = Field::text("Name:").required().start_hidden().read_only();
        assert_eq!(shown.is_valid, hidden.is_valid);
    }

    #[test]
    fn scenario_node_name_rules() {
        let base = Field::text("Name:").required().lower_dns_label().max_length(63);
        assert!(base.clone().with_value("my-node-1").is_valid);
        assert!(!base.clone().with_value("My_Node").is_valid);
        let empty = base.with_value("");
        assert!(!empty.is_valid);
        assert_eq!(empty.visible_message(), "");
    }
}
