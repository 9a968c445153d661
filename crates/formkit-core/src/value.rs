#![forbid(unsafe_code)]

//! Field values and select options.
//!
//! A [`FieldValue`] is the scalar payload of a single editable field: free
//! text, an optional number, a checkbox flag, or a multi-select list. The
//! variants carry their own emptiness semantics, which is what the `required`
//! rule checks against.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FieldValue
// ---------------------------------------------------------------------------

/// The current value of a single form field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FieldValue {
    /// Free-form text input.
    Text(String),
    /// Numeric input; `None` means the user has not entered a number yet.
    Number(Option<f64>),
    /// Checkbox / toggle.
    Bool(bool),
    /// Multi-select: the selected option values.
    List(Vec<String>),
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl FieldValue {
    /// Create a text value.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Create a numeric value.
    #[must_use]
    pub fn number(n: f64) -> Self {
        Self::Number(Some(n))
    }

    /// An unset numeric value.
    #[must_use]
    pub fn empty_number() -> Self {
        Self::Number(None)
    }

    /// Create a multi-select value.
    #[must_use]
    pub fn list(values: Vec<String>) -> Self {
        Self::List(values)
    }

    /// Whether the value counts as empty for the `required` rule.
    ///
    /// Text is empty when blank, a number when unset, a checkbox when
    /// unchecked, and a list when it has no selections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Number(n) => n.is_none(),
            Self::Bool(b) => !b,
            Self::List(items) => items.is_empty(),
        }
    }

    /// Numeric view of the value, parsing text if necessary.
    ///
    /// Returns `None` for non-numeric text, unset numbers, checkboxes, and
    /// lists; numeric rules treat `None` as a violation, never a panic.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse().ok(),
            Self::Bool(_) | Self::List(_) => None,
        }
    }

    /// Text view of the value, if it is text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Checkbox view of the value, if it is a checkbox.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Multi-select view of the value, if it is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Character count used by the max-length rule (text only).
    #[must_use]
    pub fn char_len(&self) -> usize {
        match self {
            Self::Text(s) => s.chars().count(),
            _ => 0,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(Some(n))
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(Some(n)) => write!(f, "{n}"),
            Self::Number(None) => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::List(items) => f.write_str(&items.join(",")),
        }
    }
}

// ---------------------------------------------------------------------------
// SelectOption
// ---------------------------------------------------------------------------

/// One selectable `{name, value}` pair for a select-type field.
///
/// `name` is the human-readable caption; `value` is what lands in the field's
/// [`FieldValue`] when the option is picked.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SelectOption {
    /// Display caption.
    pub name: String,
    /// Stored value.
    pub value: String,
}

impl SelectOption {
    /// Create a select option.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
