#![forbid(unsafe_code)]

//! Pure mutators over form trees.
//!
//! Every mutator clones the receiver and returns a new [`FormGroup`]; the
//! caller swaps the whole tree, so two snapshots are always comparable and no
//! edit is observable halfway. An unknown field name or out-of-range row
//! index returns the tree unchanged rather than panicking.

use crate::group::{FormGroup, FormNode};
use crate::validate::apply_unique_rule;
use crate::value::{FieldValue, SelectOption};

impl FormGroup {
    // -----------------------------------------------------------------------
    // Plain-field mutators
    // -----------------------------------------------------------------------

    /// Apply a user edit: set the value, mark the field touched, and
    /// re-validate it plus any sibling whose requirement waiver names it.
    #[must_use]
    pub fn update(&self, name: &str, value: impl Into<FieldValue>) -> Self {
        let mut form = self.clone();
        let Some(FormNode::Field(f)) = form.node_mut(name) else {
            return form;
        };
        f.value = value.into();
        f.is_touched = true;
        #[cfg(feature = "tracing")]
        tracing::trace!(field = name, "field edited");
        form.revalidate_field_in_place(name);
        form.revalidate_dependents_of(name);
        form
    }

    /// Set a value programmatically (seeding defaults, loading a resource for
    /// editing). Re-validates like [`FormGroup::update`] but never marks the
    /// field touched, so no error message surfaces from it.
    #[must_use]
    pub fn set_value(&self, name: &str, value: impl Into<FieldValue>) -> Self {
        let mut form = self.clone();
        let Some(FormNode::Field(f)) = form.node_mut(name) else {
            return form;
        };
        f.value = value.into();
        form.revalidate_field_in_place(name);
        form.revalidate_dependents_of(name);
        form
    }

    /// Replace a select field's options once reference data arrives. The
    /// current value and validity state are left alone.
    #[must_use]
    pub fn set_options(&self, name: &str, options: Vec<SelectOption>) -> Self {
        let mut form = self.clone();
        if let Some(FormNode::Field(f)) = form.node_mut(name) {
            f.options = options;
        }
        form
    }

    /// Show or hide a field. Hiding never rewrites the field's own validity;
    /// the aggregate fold is what skips hidden fields.
    #[must_use]
    pub fn set_hidden(&self, name: &str, hidden: bool) -> Self {
        let mut form = self.clone();
        if let Some(FormNode::Field(f)) = form.node_mut(name) {
            f.hidden = hidden;
        }
        form
    }

    /// Toggle a field's read-only presentation flag.
    #[must_use]
    pub fn set_read_only(&self, name: &str, read_only: bool) -> Self {
        let mut form = self.clone();
        if let Some(FormNode::Field(f)) = form.node_mut(name) {
            f.is_read_only = read_only;
        }
        form
    }

    /// Force an externally produced error onto a field (a server-side
    /// rejection, for instance). Marks it invalid and touched so the message
    /// is visible; the next edit re-derives validity from the rules again.
    #[must_use]
    pub fn set_validation_message(&self, name: &str, message: impl Into<String>) -> Self {
        let mut form = self.clone();
        if let Some(FormNode::Field(f)) = form.node_mut(name) {
            f.is_valid = false;
            f.is_touched = true;
            f.validation_message = message.into();
        }
        form
    }

    // -----------------------------------------------------------------------
    // Array mutators
    // -----------------------------------------------------------------------

    /// Edit one field of one array row, then re-run the sibling-uniqueness
    /// pass and the array fold.
    #[must_use]
    pub fn update_item(
        &self,
        array: &str,
        index: usize,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Self {
        let value = value.into();
        self.map_item(array, index, |row| row.update(field, value))
    }

    /// Apply an arbitrary transform to one array row (nested sub-form edits),
    /// then re-run the uniqueness pass and the fold.
    #[must_use]
    pub fn map_item(
        &self,
        array: &str,
        index: usize,
        op: impl FnOnce(&FormGroup) -> FormGroup,
    ) -> Self {
        let mut form = self.clone();
        let Some(FormNode::Array(a)) = form.node_mut(array) else {
            return form;
        };
        let Some(row) = a.items.get(index) else {
            return form;
        };
        let next = op(row);
        a.items[index] = next;
        apply_unique_rule(&mut a.items);
        a.refold();
        form
    }

    /// Append a pristine row cloned from the array's template.
    #[must_use]
    pub fn push_item(&self, array: &str) -> Self {
        let mut form = self.clone();
        if let Some(FormNode::Array(a)) = form.node_mut(array) {
            a.items.push(a.template.clone());
            a.refold();
        }
        form
    }

    /// Remove one array row. Values duplicated only against the removed row
    /// become valid again.
    #[must_use]
    pub fn remove_item(&self, array: &str, index: usize) -> Self {
        let mut form = self.clone();
        if let Some(FormNode::Array(a)) = form.node_mut(array) {
            if index >= a.items.len() {
                return form;
            }
            a.items.remove(index);
            apply_unique_rule(&mut a.items);
            a.refold();
        }
        form
    }

    // -----------------------------------------------------------------------
    // Dictionary mutators
    // -----------------------------------------------------------------------

    /// Edit one field of one dictionary entry and re-fold.
    #[must_use]
    pub fn update_entry(
        &self,
        dict: &str,
        index: usize,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Self {
        let mut form = self.clone();
        let Some(FormNode::Dictionary(d)) = form.node_mut(dict) else {
            return form;
        };
        let Some(entry) = d.entries.get(index) else {
            return form;
        };
        let next = entry.update(field, value);
        d.entries[index] = next;
        d.refold();
        form
    }

    /// Append a pristine entry cloned from the dictionary's template.
    #[must_use]
    pub fn push_entry(&self, dict: &str) -> Self {
        let mut form = self.clone();
        if let Some(FormNode::Dictionary(d)) = form.node_mut(dict) {
            d.entries.push(d.template.clone());
            d.refold();
        }
        form
    }

    /// Remove one dictionary entry and re-fold.
    #[must_use]
    pub fn remove_entry(&self, dict: &str, index: usize) -> Self {
        let mut form = self.clone();
        if let Some(FormNode::Dictionary(d)) = form.node_mut(dict) {
            if index >= d.entries.len() {
                return form;
            }
            d.entries.remove(index);
            d.refold();
        }
        form
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
