#![forbid(unsafe_code)]

//! The composite form tree: groups of fields, array sub-forms, and
//! dictionary sub-forms.
//!
//! A [`FormGroup`] is an ordered, named mapping of field name to
//! [`FormNode`]. Nodes are an explicit tagged union so the walker dispatches
//! exhaustively — adding a node kind is a compile error at every match until
//! handled, instead of a silently skipped branch.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::field::Field;
use crate::value::{FieldValue, SelectOption};

// ---------------------------------------------------------------------------
// FormNode
// ---------------------------------------------------------------------------

/// One named entry of a form group.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FormNode {
    /// A plain leaf field.
    Field(Field),
    /// A user-resizable ordered list of repeated row groups.
    Array(ArrayField),
    /// An ordered list of key/value row groups (tags, labels).
    Dictionary(DictionaryField),
}

// ---------------------------------------------------------------------------
// ArrayField
// ---------------------------------------------------------------------------

/// A dynamically sized list of repeated sub-forms (listener rows, source-IP
/// rows).
///
/// `is_valid` is maintained as the AND-fold over `items`, and is explicitly
/// `false` when the array is `required` and empty. `template` is the pristine
/// row cloned by `push_item`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArrayField {
    /// Current rows.
    pub items: Vec<FormGroup>,
    /// AND-fold over `items` (false when required and empty).
    pub is_valid: bool,
    /// Whether at least one row must exist.
    pub required: bool,
    /// Pristine row cloned when a row is added.
    pub template: FormGroup,
}

impl ArrayField {
    /// Create an array starting with a single pristine row.
    #[must_use]
    pub fn new(template: FormGroup) -> Self {
        let mut array = Self {
            items: vec![template.clone()],
            is_valid: false,
            required: false,
            template,
        };
        array.refold();
        array
    }

    /// Create an array with no rows yet.
    #[must_use]
    pub fn empty(template: FormGroup) -> Self {
        let mut array = Self {
            items: Vec::new(),
            is_valid: false,
            required: false,
            template,
        };
        array.refold();
        array
    }

    /// Require at least one row.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self.refold();
        self
    }

    /// Recompute `is_valid` from the current rows.
    pub(crate) fn refold(&mut self) {
        self.is_valid = (!self.required || !self.items.is_empty())
            && self.items.iter().all(FormGroup::is_valid);
    }
}

// ---------------------------------------------------------------------------
// DictionaryField
// ---------------------------------------------------------------------------

/// An [`ArrayField`] specialized to key/value rows; each entry is
/// conventionally a two-field group (`key`, `value`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DictionaryField {
    /// Current key/value rows.
    pub entries: Vec<FormGroup>,
    /// AND-fold over `entries` (false when required and empty).
    pub is_valid: bool,
    /// Whether at least one entry must exist.
    pub required: bool,
    /// Pristine entry cloned when one is added.
    pub template: FormGroup,
}

impl DictionaryField {
    /// Create a dictionary starting with a single pristine entry.
    #[must_use]
    pub fn new(template: FormGroup) -> Self {
        let mut dict = Self {
            entries: vec![template.clone()],
            is_valid: false,
            required: false,
            template,
        };
        dict.refold();
        dict
    }

    /// Create a dictionary with no entries yet.
    #[must_use]
    pub fn empty(template: FormGroup) -> Self {
        let mut dict = Self {
            entries: Vec::new(),
            is_valid: false,
            required: false,
            template,
        };
        dict.refold();
        dict
    }

    /// Require at least one entry.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self.refold();
        self
    }

    pub(crate) fn refold(&mut self) {
        self.is_valid = (!self.required || !self.entries.is_empty())
            && self.entries.iter().all(FormGroup::is_valid);
    }
}

// ---------------------------------------------------------------------------
// FormGroup
// ---------------------------------------------------------------------------

/// An ordered, named collection of nodes: one whole screen's form, or one
/// repeatable row template.
///
/// Created once per screen from a literal initial state, then replaced
/// wholesale on every edit — the mutators clone and return a new tree, never
/// mutate in place.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FormGroup {
    entries: Vec<(String, FormNode)>,
}

impl FormGroup {
    /// Create an empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain field (builder style, preserves insertion order).
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.entries.push((name.into(), FormNode::Field(field)));
        self
    }

    /// Add an array sub-form.
    #[must_use]
    pub fn with_array(mut self, name: impl Into<String>, array: ArrayField) -> Self {
        self.entries.push((name.into(), FormNode::Array(array)));
        self
    }

    /// Add a dictionary sub-form.
    #[must_use]
    pub fn with_dictionary(mut self, name: impl Into<String>, dict: DictionaryField) -> Self {
        self.entries.push((name.into(), FormNode::Dictionary(dict)));
        self
    }

    /// Number of named entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the group has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormNode)> {
        self.entries.iter().map(|(n, node)| (n.as_str(), node))
    }

    /// Look up a node by name.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&FormNode> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    pub(crate) fn node_mut(&mut self, name: &str) -> Option<&mut FormNode> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    /// Look up a plain field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        match self.node(name) {
            Some(FormNode::Field(f)) => Some(f),
            _ => None,
        }
    }

    /// Look up an array sub-form by name.
    #[must_use]
    pub fn array(&self, name: &str) -> Option<&ArrayField> {
        match self.node(name) {
            Some(FormNode::Array(a)) => Some(a),
            _ => None,
        }
    }

    /// Look up a dictionary sub-form by name.
    #[must_use]
    pub fn dictionary(&self, name: &str) -> Option<&DictionaryField> {
        match self.node(name) {
            Some(FormNode::Dictionary(d)) => Some(d),
            _ => None,
        }
    }

    // -- submit contract --

    /// Extract a field's current value for payload assembly.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.field(name).map(|f| &f.value)
    }

    /// Text value of a field, or the empty string.
    #[must_use]
    pub fn value_str(&self, name: &str) -> &str {
        self.value(name).and_then(FieldValue::as_str).unwrap_or("")
    }

    /// Numeric value of a field, parsing text if needed.
    #[must_use]
    pub fn value_number(&self, name: &str) -> Option<f64> {
        self.value(name).and_then(FieldValue::as_number)
    }

    /// Checkbox value of a field.
    #[must_use]
    pub fn value_bool(&self, name: &str) -> bool {
        self.value(name).and_then(FieldValue::as_bool).unwrap_or(false)
    }

    /// Multi-select value of a field.
    #[must_use]
    pub fn value_list(&self, name: &str) -> &[String] {
        self.value(name).and_then(FieldValue::as_list).unwrap_or(&[])
    }

    /// A field's current options (select-type fields).
    #[must_use]
    pub fn options(&self, name: &str) -> &[SelectOption] {
        self.field(name).map_or(&[], |f| f.options.as_slice())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> FormGroup {
        FormGroup::new().with_field("ip", Field::text("Source IP:").required())
    }

    #[test]
    fn lookup_by_name() {
        let form = FormGroup::new()
            .with_field("name", Field::text("Name:"))
            .with_array("ips", ArrayField::new(row()));
        assert!(form.field("name").is_some());
        assert!(form.array("ips").is_some());
        assert!(form.field("ips").is_none(), "array is not a plain field");
        assert!(form.node("missing").is_none());
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let form = FormGroup::new()
            .with_field("b", Field::text("B"))
            .with_field("a", Field::text("A"))
            .with_field("c", Field::text("C"));
        let names: Vec<&str> = form.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn array_starts_with_one_pristine_row() {
        let array = ArrayField::new(row()).required();
        assert_eq!(array.items.len(), 1);
        assert!(!array.is_valid, "row has an empty required field");
    }

    #[test]
    fn empty_required_array_is_invalid() {
        let array = ArrayField::empty(row()).required();
        assert!(array.items.is_empty());
        assert!(!array.is_valid);
    }

    #[test]
    fn empty_optional_array_is_valid() {
        let array = ArrayField::empty(row());
        assert!(array.is_valid);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn form_tree_serde_round_trip() {
        let form = FormGroup::new()
            .with_field("name", Field::text("Name:").required())
            .with_array("ips", ArrayField::new(row()).required());
        let json = serde_json::to_string(&form).expect("serializes");
        let back: FormGroup = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, form);
    }

    #[test]
    fn value_extraction_helpers() {
        let form = FormGroup::new()
            .with_field("name", Field::text("Name:").with_value("lb-1"))
            .with_field("count", Field::number("Count:").with_value(4.0))
            .with_field("tls", Field::checkbox("TLS:", true))
            .with_field(
                "instances",
                Field::multi_select("Instances:")
                    .with_value(FieldValue::list(vec!["i-1".into()])),
            );
        assert_eq!(form.value_str("name"), "lb-1");
        assert_eq!(form.value_number("count"), Some(4.0));
        assert!(form.value_bool("tls"));
        assert_eq!(form.value_list("instances"), ["i-1".to_string()]);
        assert_eq!(form.value_str("missing"), "");
    }
}
