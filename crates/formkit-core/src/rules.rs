#![forbid(unsafe_code)]

//! Validation rules and the rule evaluator.
//!
//! [`Rules`] is a fixed, small vocabulary of named rule activations attached
//! to one field; [`evaluate`] is the pure function mapping a value and its
//! rules to a pass/fail verdict with a message. Same inputs always produce
//! the same output; there is no hidden state and nothing here ever panics on
//! malformed input (a non-numeric string fed to a numeric rule is simply
//! invalid).
//!
//! Two rule kinds need sibling context and are therefore applied by the
//! group-level validation passes rather than here: `required_unless` (the
//! point evaluator only sees the already-resolved `required` flag) and
//! `unique_across_siblings` (checked against the whole array by the walker).

use std::fmt;
use std::net::Ipv4Addr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::value::FieldValue;

// ---------------------------------------------------------------------------
// Violation codes
// ---------------------------------------------------------------------------

/// Violation code for the required rule.
pub const CODE_REQUIRED: &str = "required";
/// Violation code for the max-length rule.
pub const CODE_MAX_LENGTH: &str = "too_long";
/// Violation code for character-class rules (DNS label, digits).
pub const CODE_PATTERN: &str = "pattern";
/// Violation code for numeric bound rules.
pub const CODE_RANGE: &str = "range";
/// Violation code for the URL rule.
pub const CODE_URL: &str = "url";
/// Violation code for the source-IP rules.
pub const CODE_SOURCE_IP: &str = "ip";
/// Violation code for the sibling-uniqueness rule.
pub const CODE_DUPLICATE: &str = "duplicate";

// ---------------------------------------------------------------------------
// RuleViolation / RuleOutcome
// ---------------------------------------------------------------------------

/// A failed rule: a stable code plus a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleViolation {
    /// Stable identifier for programmatic handling.
    pub code: &'static str,
    /// Human-readable message, already interpolated with the field label.
    pub message: String,
}

impl RuleViolation {
    /// Create a violation with the given code and message.
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RuleViolation {}

/// The verdict of evaluating one field's rules against its value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RuleOutcome {
    /// All activated rules passed.
    #[default]
    Valid,
    /// The first activated rule that failed.
    Invalid(RuleViolation),
}

impl RuleOutcome {
    /// Returns `true` if the outcome is `Valid`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The violation, if any.
    #[must_use]
    pub fn violation(&self) -> Option<&RuleViolation> {
        match self {
            Self::Valid => None,
            Self::Invalid(v) => Some(v),
        }
    }

    /// The violation message, or the empty string when valid.
    #[must_use]
    pub fn message(&self) -> &str {
        self.violation().map_or("", |v| v.message.as_str())
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Which IP grammar a source-IP field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SourceIpRule {
    /// `any`, a single IPv4 address, or CIDR with prefix 1–32.
    Security,
    /// `any`, a single IPv4 address, or CIDR limited to /16 or /24.
    LoadBalancer,
}

/// Declarative waiver: the field stops being required while the named sibling
/// holds the given value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RequiredUnless {
    /// Name of the sibling field within the same group.
    pub field: String,
    /// Sibling value that waives the requirement.
    pub equals: FieldValue,
}

/// The set of named rule activations for one field.
///
/// Each rule is either absent or present with its own parameter. A field is
/// valid iff all activated rules pass, except that an optional field with an
/// empty value short-circuits to valid (optional + empty means "nothing to
/// validate").
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rules {
    /// Value must be non-empty.
    pub required: bool,
    /// Character count must not exceed this bound (inclusive).
    pub max_length: Option<usize>,
    /// Numeric value must be at least this bound (inclusive).
    pub min_value: Option<f64>,
    /// Numeric value must be at most this bound (inclusive).
    pub max_value: Option<f64>,
    /// Lowercase alphanumeric plus hyphen, alphanumeric at both ends.
    pub lower_dns_label: bool,
    /// ASCII digits only (ports).
    pub digits_only: bool,
    /// If non-empty, must be a well-formed URL.
    pub url: bool,
    /// `any`, IPv4, or CIDR per the chosen grammar.
    pub source_ip: Option<SourceIpRule>,
    /// Waive `required` while a sibling holds a given value.
    pub required_unless: Option<RequiredUnless>,
    /// Value must not repeat among sibling array rows.
    pub unique_across_siblings: bool,
}

impl Rules {
    /// A rule set with nothing activated.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether any rule is activated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.required
            && self.max_length.is_none()
            && self.min_value.is_none()
            && self.max_value.is_none()
            && !self.lower_dns_label
            && !self.digits_only
            && !self.url
            && self.source_ip.is_none()
            && self.required_unless.is_none()
            && !self.unique_across_siblings
    }
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

/// Field labels often carry UI suffixes ("Name: *"); strip them for messages.
fn display_label(label: &str) -> &str {
    label
        .trim_end_matches(" *")
        .trim_end_matches(':')
        .trim_end()
}

/// Evaluate `value` against `rules`, using the rule set's own `required` flag.
#[must_use]
pub fn evaluate(label: &str, value: &FieldValue, rules: &Rules) -> RuleOutcome {
    evaluate_with_required(label, value, rules, rules.required)
}

/// Evaluate with an externally resolved `required` flag.
///
/// Group-level passes resolve `required_unless` against the current sibling
/// value and hand the effective flag in here; rules evaluate in a fixed order
/// and the first violation wins.
#[must_use]
pub fn evaluate_with_required(
    label: &str,
    value: &FieldValue,
    rules: &Rules,
    required: bool,
) -> RuleOutcome {
    let label = display_label(label);

    if value.is_empty() {
        if required {
            return RuleOutcome::Invalid(RuleViolation::new(
                CODE_REQUIRED,
                format!("{label} is required"),
            ));
        }
        // Optional and empty: nothing to validate.
        return RuleOutcome::Valid;
    }

    if rules.lower_dns_label {
        let text = value.as_str().unwrap_or("");
        if !is_lower_dns_label(text) {
            return RuleOutcome::Invalid(RuleViolation::new(
                CODE_PATTERN,
                format!("Only lower case alphanumeric and hyphen (-) allowed for {label}"),
            ));
        }
    }

    if rules.digits_only {
        let text = value.as_str().unwrap_or("");
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return RuleOutcome::Invalid(RuleViolation::new(
                CODE_PATTERN,
                format!("Only digits allowed for {label}"),
            ));
        }
    }

    if let Some(max) = rules.max_length
        && value.char_len() > max
    {
        return RuleOutcome::Invalid(RuleViolation::new(
            CODE_MAX_LENGTH,
            format!("Max length {max} characters"),
        ));
    }

    if let Some(min) = rules.min_value {
        match value.as_number() {
            Some(n) if n >= min => {}
            _ => {
                return RuleOutcome::Invalid(RuleViolation::new(
                    CODE_RANGE,
                    format!("Value less than {min} is not allowed"),
                ));
            }
        }
    }

    if let Some(max) = rules.max_value {
        match value.as_number() {
            Some(n) if n <= max => {}
            _ => {
                return RuleOutcome::Invalid(RuleViolation::new(
                    CODE_RANGE,
                    format!("Value more than {max} is not allowed"),
                ));
            }
        }
    }

    if rules.url {
        let text = value.as_str().unwrap_or("");
        if !is_well_formed_url(text) {
            return RuleOutcome::Invalid(RuleViolation::new(CODE_URL, "Invalid URL"));
        }
    }

    if let Some(grammar) = rules.source_ip {
        let text = value.as_str().unwrap_or("");
        if !is_source_ip(text, grammar) {
            return RuleOutcome::Invalid(RuleViolation::new(CODE_SOURCE_IP, "Invalid IP"));
        }
    }

    RuleOutcome::Valid
}

/// Build the violation used when a sibling-uniqueness pass finds a repeat.
#[must_use]
pub fn duplicate_violation(label: &str) -> RuleViolation {
    RuleViolation::new(
        CODE_DUPLICATE,
        format!("Duplicate {}", display_label(label).to_lowercase()),
    )
}

// ---------------------------------------------------------------------------
// Pattern helpers (character scans; no regex engine)
// ---------------------------------------------------------------------------

/// `[a-z0-9]([a-z0-9-]*[a-z0-9])?` — the DNS-label shape resource names use.
fn is_lower_dns_label(s: &str) -> bool {
    let bytes = s.as_bytes();
    let inner = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-';
    let edge = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    match bytes {
        [] => false,
        [only] => edge(*only),
        [first, mid @ .., last] => {
            edge(*first) && edge(*last) && mid.iter().all(|&b| inner(b))
        }
    }
}

/// Minimal well-formedness check: `scheme://rest` with an alphabetic scheme
/// and a non-blank remainder.
fn is_well_formed_url(s: &str) -> bool {
    let Some((scheme, rest)) = s.split_once("://") else {
        return false;
    };
    let scheme_ok = !scheme.is_empty()
        && scheme.as_bytes()[0].is_ascii_alphabetic()
        && scheme
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.');
    scheme_ok && !rest.is_empty() && !rest.chars().any(char::is_whitespace)
}

/// `any`, a single IPv4 address, or CIDR notation per the grammar.
fn is_source_ip(s: &str, grammar: SourceIpRule) -> bool {
    if s == "any" {
        return true;
    }
    let (addr, prefix) = match s.split_once('/') {
        Some((addr, prefix)) => (addr, Some(prefix)),
        None => (s, None),
    };
    if addr.parse::<Ipv4Addr>().is_err() {
        return false;
    }
    match prefix {
        None => true,
        Some(p) => {
            let Ok(p) = p.parse::<u8>() else {
                return false;
            };
            match grammar {
                SourceIpRule::Security => (1..=32).contains(&p),
                SourceIpRule::LoadBalancer => p == 16 || p == 24,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
