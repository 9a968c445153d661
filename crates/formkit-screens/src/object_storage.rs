#![forbid(unsafe_code)]

//! Bucket lifecycle-rule screen.
//!
//! A lifecycle rule either expires object versions after a number of days or
//! expires delete markers; the day-count fields are only required while the
//! delete-marker toggle is off, expressed as requirement waivers on the
//! toggle's value.

use formkit_core::{Field, FormGroup};
use serde_json::{Value, json};

/// Build the lifecycle-rule form.
#[must_use]
pub fn lifecycle_rule_form() -> FormGroup {
    FormGroup::new()
        .with_field(
            "rule_name",
            Field::text("Rule name:").required().lower_dns_label().max_length(63),
        )
        .with_field("prefix", Field::text("Prefix:").max_length(1024))
        .with_field(
            "delete_marker",
            Field::checkbox("Expire delete markers:", false),
        )
        .with_field(
            "expire_days",
            Field::number("Expire days:")
                .required_unless("delete_marker", true)
                .range(1.0, 2557.0),
        )
        .with_field(
            "noncurrent_expire_days",
            Field::number("Noncurrent expire days:")
                .required_unless("delete_marker", true)
                .range(1.0, 2557.0),
        )
}

/// Assemble the create-request body from a valid form.
///
/// When the rule expires delete markers the day counts travel as zero, the
/// sentinel the service stores for "not configured".
#[must_use]
pub fn lifecycle_rule_payload(form: &FormGroup) -> Value {
    let delete_marker = form.value_bool("delete_marker");
    let days = |name: &str| {
        if delete_marker {
            0.0
        } else {
            form.value_number(name).unwrap_or(0.0)
        }
    };

    json!({
        "metadata": { "ruleName": form.value_str("rule_name") },
        "spec": {
            "prefix": form.value_str("prefix"),
            "expireDays": days("expire_days"),
            "noncurrentExpireDays": days("noncurrent_expire_days"),
            "deleteMarker": delete_marker,
        },
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use formkit_core::FieldValue;

    #[test]
    fn day_counts_required_while_marker_off() {
        let form = lifecycle_rule_form().update("rule_name", "rule1");
        assert!(!form.is_valid());

        let form = form
            .update("expire_days", 30.0)
            .update("noncurrent_expire_days", 30.0);
        assert!(form.is_valid());
    }

    #[test]
    fn marker_waives_day_counts_and_unchecking_restores() {
        let form = lifecycle_rule_form()
            .update("rule_name", "rule1")
            .update("delete_marker", true);
        assert!(form.is_valid(), "day counts waived");

        let form = form.update("delete_marker", false);
        assert!(!form.is_valid(), "waiver lifted, day counts empty again");
        let days = form.field("expire_days").unwrap();
        assert!(!days.is_valid);
        assert_eq!(days.validation_message, "Expire days is required");
    }

    #[test]
    fn day_counts_are_bounded() {
        let form = lifecycle_rule_form()
            .update("rule_name", "rule1")
            .update("expire_days", 3000.0)
            .update("noncurrent_expire_days", 30.0);
        assert!(!form.is_valid());
        assert_eq!(
            form.field("expire_days").unwrap().visible_message(),
            "Value more than 2557 is not allowed"
        );
    }

    #[test]
    fn prefix_is_optional() {
        let form = lifecycle_rule_form()
            .update("rule_name", "rule1")
            .update("expire_days", 30.0)
            .update("noncurrent_expire_days", 30.0);
        assert_eq!(form.value_str("prefix"), "");
        assert!(form.is_valid());
    }

    #[test]
    fn payload_zeroes_days_in_marker_mode() {
        let form = lifecycle_rule_form()
            .update("rule_name", "rule1")
            .update("prefix", "logs/")
            .update("expire_days", FieldValue::number(45.0))
            .update("delete_marker", true)
            .update("noncurrent_expire_days", FieldValue::empty_number());
        let payload = lifecycle_rule_payload(&form);
        assert_eq!(payload["metadata"]["ruleName"], "rule1");
        assert_eq!(payload["spec"]["prefix"], "logs/");
        assert_eq!(payload["spec"]["expireDays"], 0.0);
        assert_eq!(payload["spec"]["deleteMarker"], true);
    }

    #[test]
    fn payload_carries_entered_days() {
        let form = lifecycle_rule_form()
            .update("rule_name", "rule1")
            .update("expire_days", 331.0)
            .update("noncurrent_expire_days", 221.0);
        let payload = lifecycle_rule_payload(&form);
        assert_eq!(payload["spec"]["expireDays"], 331.0);
        assert_eq!(payload["spec"]["noncurrentExpireDays"], 221.0);
        assert_eq!(payload["spec"]["deleteMarker"], false);
    }
}
