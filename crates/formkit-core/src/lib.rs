#![forbid(unsafe_code)]

//! Declarative form-state engine for resource-creation screens.
//!
//! A screen declares its form once as a [`FormGroup`] literal: named
//! [`Field`]s with builder-activated rules, plus [`ArrayField`] /
//! [`DictionaryField`] sub-forms for repeatable rows. Every edit goes through
//! a pure mutator ([`FormGroup::update`] and friends) that returns a new
//! tree with validity re-derived, so `is_valid` is never stale and two
//! snapshots are always comparable.
//!
//! Validation is two-layered: the point evaluator in [`rules`] scores one
//! value against one rule set, and the group walker resolves the
//! sibling-aware rules (`required_unless` waivers, uniqueness across array
//! rows) plus the aggregate [`FormGroup::is_valid`] fold that gates submit.
//! When submit is attempted on an invalid form,
//! [`FormGroup::show_required_fields`] reveals every outstanding error at
//! once.
//!
//! ```
//! use formkit_core::{Field, FormGroup};
//!
//! let form = FormGroup::new()
//!     .with_field("name", Field::text("Name:").required().lower_dns_label())
//!     .with_field("port", Field::number("Port:").required().range(1.0, 65535.0));
//! assert!(!form.is_valid());
//!
//! let form = form.update("name", "lb-1").update("port", 80.0);
//! assert!(form.is_valid());
//! ```

pub mod field;
pub mod group;
pub mod rules;
pub mod value;

mod update;
mod validate;

pub use field::Field;
pub use group::{ArrayField, DictionaryField, FormGroup, FormNode};
pub use rules::{RequiredUnless, RuleOutcome, RuleViolation, Rules, SourceIpRule};
pub use validate::dictionary_rows_valid;
pub use value::{FieldValue, SelectOption};
