#![forbid(unsafe_code)]

//! The composite walker and aggregate validity API.
//!
//! [`FormGroup::is_valid`] answers "may this form submit?" as a read-only,
//! idempotent recursive AND over every leaf. [`FormGroup::show_required_fields`]
//! is the submit-blocked sweep: it forces every outstanding problem visible at
//! once. [`FormGroup::revalidate`] is the full-context pass that resolves the
//! two sibling-aware rules (`required_unless`, `unique_across_siblings`) the
//! point evaluator cannot see.

use crate::group::{FormGroup, FormNode};
use crate::rules::duplicate_violation;

impl FormGroup {
    // -----------------------------------------------------------------------
    // Aggregate validity (read-only)
    // -----------------------------------------------------------------------

    /// Whether every leaf of the form passes its rules.
    ///
    /// Plain fields contribute their `is_valid` flag, except hidden fields,
    /// which are excluded from the fold. Arrays recurse over every row and
    /// additionally require at least one row when marked required;
    /// dictionaries fold over their entries. Only reads; never mutates.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.iter().all(|(_, node)| match node {
            FormNode::Field(f) => f.hidden || f.is_valid,
            FormNode::Array(a) => {
                (!a.required || !a.items.is_empty())
                    && a.items.iter().all(FormGroup::is_valid)
            }
            FormNode::Dictionary(d) => {
                (!d.required || !d.entries.is_empty())
                    && d.entries.iter().all(FormGroup::is_valid)
            }
        })
    }

    // -----------------------------------------------------------------------
    // Required-fields sweep
    // -----------------------------------------------------------------------

    /// Reveal every outstanding error at once.
    ///
    /// Every field with active rules that is currently invalid becomes
    /// touched and is re-validated so its message is visible; rows of array
    /// and dictionary sub-forms are swept the same way. Valid fields are left
    /// untouched. Called once, synchronously, when a submit is attempted on
    /// an invalid form.
    #[must_use]
    pub fn show_required_fields(&self) -> Self {
        #[cfg(feature = "tracing")]
        tracing::trace!("required-fields sweep");

        let mut form = self.clone();
        let names: Vec<String> = form.iter().map(|(n, _)| n.to_string()).collect();
        for name in &names {
            match form.node(name) {
                Some(FormNode::Field(f)) => {
                    if !f.rules.is_empty() && !f.is_valid {
                        let required = form.effective_required(name);
                        if let Some(FormNode::Field(f)) = form.node_mut(name) {
                            f.is_touched = true;
                            *f = f.validated_with_required(required);
                        }
                    }
                }
                Some(FormNode::Array(_)) => {
                    if let Some(FormNode::Array(a)) = form.node_mut(name) {
                        for item in &mut a.items {
                            *item = item.show_required_fields();
                        }
                        apply_unique_rule(&mut a.items);
                        a.refold();
                    }
                }
                Some(FormNode::Dictionary(_)) => {
                    if let Some(FormNode::Dictionary(d)) = form.node_mut(name) {
                        for entry in &mut d.entries {
                            *entry = entry.show_required_fields();
                        }
                        d.refold();
                    }
                }
                None => {}
            }
        }
        form
    }

    // -----------------------------------------------------------------------
    // Full-context validation
    // -----------------------------------------------------------------------

    /// Re-derive every leaf's validity with sibling context applied.
    ///
    /// Resolves `required_unless` waivers against current sibling values and
    /// re-runs the sibling-uniqueness pass inside every array. Touched flags
    /// are preserved. Useful after building a form from literals or bulk
    /// seeding values.
    #[must_use]
    pub fn revalidate(&self) -> Self {
        let mut form = self.clone();
        let names: Vec<String> = form.iter().map(|(n, _)| n.to_string()).collect();
        for name in &names {
            match form.node(name) {
                Some(FormNode::Field(_)) => form.revalidate_field_in_place(name),
                Some(FormNode::Array(_)) => {
                    if let Some(FormNode::Array(a)) = form.node_mut(name) {
                        for item in &mut a.items {
                            *item = item.revalidate();
                        }
                        apply_unique_rule(&mut a.items);
                        a.refold();
                    }
                }
                Some(FormNode::Dictionary(_)) => {
                    if let Some(FormNode::Dictionary(d)) = form.node_mut(name) {
                        for entry in &mut d.entries {
                            *entry = entry.revalidate();
                        }
                        d.refold();
                    }
                }
                None => {}
            }
        }
        form
    }

    /// Resolve a field's effective `required` flag, honoring a
    /// `required_unless` waiver against the named sibling's current value.
    #[must_use]
    pub(crate) fn effective_required(&self, name: &str) -> bool {
        let Some(field) = self.field(name) else {
            return false;
        };
        if !field.rules.required {
            return false;
        }
        if let Some(waiver) = &field.rules.required_unless
            && let Some(sibling) = self.field(&waiver.field)
            && sibling.value == waiver.equals
        {
            return false;
        }
        true
    }

    /// Re-validate one field in place with its effective `required` flag.
    pub(crate) fn revalidate_field_in_place(&mut self, name: &str) {
        let required = self.effective_required(name);
        if let Some(FormNode::Field(f)) = self.node_mut(name) {
            *f = f.validated_with_required(required);
        }
    }

    /// Re-validate every sibling whose `required_unless` waiver names `name`.
    pub(crate) fn revalidate_dependents_of(&mut self, name: &str) {
        let dependents: Vec<String> = self
            .iter()
            .filter_map(|(n, node)| match node {
                FormNode::Field(f)
                    if f.rules
                        .required_unless
                        .as_ref()
                        .is_some_and(|w| w.field == name) =>
                {
                    Some(n.to_string())
                }
                _ => None,
            })
            .collect();
        for dependent in dependents {
            self.revalidate_field_in_place(&dependent);
        }
    }
}

// ---------------------------------------------------------------------------
// Sibling uniqueness
// ---------------------------------------------------------------------------

/// Enforce `unique_across_siblings` over the rows of one array.
///
/// Each ruled field is first re-validated on its point rules (clearing stale
/// duplicate marks), then every occurrence of a value shared by more than one
/// row is marked invalid. Emptiness is never a duplicate.
pub(crate) fn apply_unique_rule(items: &mut [FormGroup]) {
    let mut names: Vec<String> = Vec::new();
    for item in items.iter() {
        for (n, node) in item.iter() {
            if let FormNode::Field(f) = node
                && f.rules.unique_across_siblings
                && !names.iter().any(|x| x == n)
            {
                names.push(n.to_string());
            }
        }
    }

    for name in &names {
        // Restore point verdicts before re-marking duplicates.
        for idx in 0..items.len() {
            items[idx].revalidate_field_in_place(name);
        }

        let rendered: Vec<Option<String>> = items
            .iter()
            .map(|item| {
                item.field(name).and_then(|f| {
                    if f.value.is_empty() {
                        None
                    } else {
                        Some(f.value.to_string())
                    }
                })
            })
            .collect();

        for (idx, value) in rendered.iter().enumerate() {
            let Some(value) = value else { continue };
            let occurrences = rendered.iter().flatten().filter(|v| *v == value).count();
            if occurrences > 1
                && let Some(FormNode::Field(f)) = items[idx].node_mut(name)
                && f.is_valid
            {
                let violation = duplicate_violation(&f.label);
                f.is_valid = false;
                f.validation_message = violation.message;
            }
        }
    }
}

/// Fold validity across dictionary rows (AND over every row).
#[must_use]
pub fn dictionary_rows_valid(rows: &[FormGroup]) -> bool {
    rows.iter().all(FormGroup::is_valid)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::group::{ArrayField, DictionaryField};
    use crate::rules::SourceIpRule;
    use crate::value::FieldValue;

    fn ip_row() -> FormGroup {
        FormGroup::new().with_field(
            "ip",
            Field::text("Source IP:")
                .required()
                .max_length(50)
                .source_ip(SourceIpRule::LoadBalancer)
                .unique_across_siblings(),
        )
    }

    fn tag_row() -> FormGroup {
        FormGroup::new()
            .with_field("key", Field::text("Key:").required().max_length(20))
            .with_field("value", Field::text("Value:").required().max_length(20))
    }

    // -- is_valid --

    #[test]
    fn aggregate_is_and_over_leaves() {
        let form = FormGroup::new()
            .with_field("name", Field::text("Name:").required().with_value("lb-1"))
            .with_field("port", Field::number("Port:").required().with_value(80.0));
        assert!(form.is_valid());

        let form = form.set_value("port", FieldValue::empty_number());
        assert!(!form.is_valid());
    }

    #[test]
    fn hidden_fields_are_excluded_from_aggregate() {
        let form = FormGroup::new()
            .with_field("name", Field::text("Name:").required().with_value("x"))
            .with_field("labels", Field::text("Labels:").required().start_hidden());
        assert!(form.is_valid());
    }

    #[test]
    fn empty_required_array_blocks_submit() {
        let form = FormGroup::new().with_array("ips", ArrayField::empty(ip_row()).required());
        assert!(!form.is_valid());
    }

    #[test]
    fn scenario_source_ip_rows() {
        // One empty required row: invalid.
        let form = FormGroup::new().with_array("ips", ArrayField::new(ip_row()).required());
        assert!(!form.is_valid());

        // Fill the row: valid.
        let form = form.update_item("ips", 0, "ip", "10.0.0.1/24");
        assert!(form.is_valid());

        // Push a second empty row: invalid again.
        let form = form.push_item("ips");
        assert!(!form.is_valid());
    }

    #[test]
    fn is_valid_is_idempotent_and_pure() {
        let form = FormGroup::new()
            .with_field("name", Field::text("Name:").required())
            .with_array("ips", ArrayField::new(ip_row()).required());
        let before = form.clone();
        let _ = form.is_valid();
        let _ = form.is_valid();
        assert_eq!(form, before);
    }

    // -- sweep --

    #[test]
    fn sweep_touches_every_invalid_ruled_field() {
        let form = FormGroup::new()
            .with_field("name", Field::text("Name:").required())
            .with_field("note", Field::text("Note:")) // no rules
            .with_field("port", Field::number("Port:").required().with_value(80.0))
            .with_array("ips", ArrayField::new(ip_row()).required());

        let swept = form.show_required_fields();

        let name = swept.field("name").unwrap();
        assert!(name.is_touched);
        assert_eq!(name.visible_message(), "Name is required");

        // Rule-less and valid fields are unaffected.
        assert!(!swept.field("note").unwrap().is_touched);
        assert!(!swept.field("port").unwrap().is_touched);

        // Array rows are swept too.
        let row_ip = swept.array("ips").unwrap().items[0].field("ip").unwrap();
        assert!(row_ip.is_touched);
        assert_eq!(row_ip.visible_message(), "Source IP is required");
    }

    #[test]
    fn sweep_respects_required_unless_waiver() {
        let form = FormGroup::new()
            .with_field("delete_marker", Field::checkbox("Expire by delete marker:", true))
            .with_field(
                "expire_days",
                Field::number("Expire days:").required_unless("delete_marker", true),
            )
            .revalidate();
        assert!(form.is_valid());

        let swept = form.show_required_fields();
        assert!(!swept.field("expire_days").unwrap().is_touched);
    }

    // -- required_unless --

    #[test]
    fn waiver_toggles_with_sibling_value() {
        let form = FormGroup::new()
            .with_field("delete_marker", Field::checkbox("Expire by delete marker:", false))
            .with_field(
                "expire_days",
                Field::number("Expire days:").required_unless("delete_marker", true),
            );
        assert!(!form.is_valid(), "days required while marker unchecked");

        let form = form.update("delete_marker", true);
        assert!(form.is_valid(), "checking the marker waives the requirement");

        let form = form.update("delete_marker", false);
        assert!(!form.is_valid(), "unchecking restores the requirement");
    }

    // -- uniqueness --

    #[test]
    fn duplicate_values_across_rows_are_marked() {
        let form = FormGroup::new().with_array("ips", ArrayField::new(ip_row()).required());
        let form = form.update_item("ips", 0, "ip", "10.0.0.1");
        let form = form.push_item("ips");
        let form = form.update_item("ips", 1, "ip", "10.0.0.1");

        let items = &form.array("ips").unwrap().items;
        assert!(!items[0].field("ip").unwrap().is_valid);
        assert!(!items[1].field("ip").unwrap().is_valid);
        assert_eq!(
            items[1].field("ip").unwrap().validation_message,
            "Duplicate source ip"
        );
        assert!(!form.is_valid());
    }

    #[test]
    fn duplicate_mark_clears_when_value_changes() {
        let form = FormGroup::new().with_array("ips", ArrayField::new(ip_row()).required());
        let form = form.update_item("ips", 0, "ip", "10.0.0.1");
        let form = form.push_item("ips");
        let form = form.update_item("ips", 1, "ip", "10.0.0.1");
        let form = form.update_item("ips", 1, "ip", "10.0.0.2");

        let items = &form.array("ips").unwrap().items;
        assert!(items[0].field("ip").unwrap().is_valid);
        assert!(items[1].field("ip").unwrap().is_valid);
        assert!(form.is_valid());
    }

    #[test]
    fn empty_values_are_never_duplicates() {
        let form = FormGroup::new().with_array("ips", ArrayField::new(ip_row()).required());
        let form = form.push_item("ips");
        let items = &form.array("ips").unwrap().items;
        let messages: Vec<&str> = items
            .iter()
            .map(|i| i.field("ip").unwrap().validation_message.as_str())
            .collect();
        assert!(messages.iter().all(|m| !m.contains("Duplicate")));
    }

    // -- dictionaries --

    #[test]
    fn dictionary_folds_over_entries() {
        let form = FormGroup::new().with_dictionary("labels", DictionaryField::new(tag_row()));
        assert!(!form.is_valid(), "empty key/value row is incomplete");

        let form = form
            .update_entry("labels", 0, "key", "env")
            .update_entry("labels", 0, "value", "prod");
        assert!(form.is_valid());
        assert!(form.dictionary("labels").unwrap().is_valid);
    }

    #[test]
    fn dictionary_rows_valid_folds() {
        let good = tag_row()
            .update("key", "env")
            .update("value", "prod");
        let bad = tag_row();
        assert!(dictionary_rows_valid(&[good.clone()]));
        assert!(!dictionary_rows_valid(&[good, bad]));
        assert!(dictionary_rows_valid(&[]));
    }

    // -- revalidate --

    #[test]
    fn revalidate_resolves_waivers_after_literal_build() {
        let form = FormGroup::new()
            .with_field("delete_marker", Field::checkbox("Delete marker:", true))
            .with_field(
                "expire_days",
                Field::number("Expire days:").required_unless("delete_marker", true),
            );
        // Built from literals the days field is point-invalid; the context
        // pass resolves the waiver.
        assert!(!form.field("expire_days").unwrap().is_valid);
        let form = form.revalidate();
        assert!(form.field("expire_days").unwrap().is_valid);
    }
}
