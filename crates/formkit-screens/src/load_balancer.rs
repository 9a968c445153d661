#![forbid(unsafe_code)]

//! Load balancer launch screen: form literal, catalog seeding, and the
//! create-request payload.
//!
//! The form is one name field plus two row arrays: source IPs (each `any`,
//! an IPv4 address, or a /16 or /24 CIDR, unique across rows) and listeners
//! (external port unique across rows, internal port, monitor, balancing mode,
//! and a pool selector that targets either concrete instances or label
//! selectors).

use formkit_core::{
    ArrayField, DictionaryField, Field, FieldValue, FormGroup, SelectOption, SourceIpRule,
};
use serde_json::{Value, json};

use crate::catalog::CatalogSnapshot;

/// Selector-type value that switches a listener pool to label selectors.
pub const SELECTOR_LABELS: &str = "labels";
/// Selector-type value that targets concrete instances (the default).
pub const SELECTOR_INSTANCES: &str = "instances";

// ---------------------------------------------------------------------------
// Form literal
// ---------------------------------------------------------------------------

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

fn label_row() -> FormGroup {
    FormGroup::new()
        .with_field("key", Field::text("Key:").required().max_length(50))
        .with_field("value", Field::text("Value:").required().max_length(50))
}

fn listener_row(catalog: &CatalogSnapshot) -> FormGroup {
    FormGroup::new()
        .with_field(
            "external_port",
            Field::text("Listener Port:")
                .required()
                .digits_only()
                .max_length(5)
                .range(1.0, 65535.0)
                .unique_across_siblings(),
        )
        .with_field(
            "internal_port",
            Field::text("Instance Port:")
                .required()
                .digits_only()
                .max_length(5)
                .range(1.0, 65535.0),
        )
        .with_field(
            "monitor_type",
            Field::select("Monitor type:", catalog.monitor_options()).required(),
        )
        .with_field(
            "load_balancing_mode",
            Field::select("Mode:", balancing_mode_options()).required(),
        )
        .with_field(
            "selector_type",
            Field::select(
                "Selector type:",
                vec![
                    SelectOption::new("Instance Labels", SELECTOR_LABELS),
                    SelectOption::new("Instances", SELECTOR_INSTANCES),
                ],
            )
            .with_value(SELECTOR_INSTANCES),
        )
        .with_field(
            "instances",
            Field::multi_select("Instances:")
                .required_unless("selector_type", SELECTOR_LABELS)
                .with_options(catalog.instance_options()),
        )
        .with_dictionary("instance_labels", DictionaryField::empty(label_row()))
}

fn balancing_mode_options() -> Vec<SelectOption> {
    vec![
        SelectOption::new("Round Robin", "round-robin"),
        SelectOption::new("Least Connections", "least-connections"),
    ]
}

/// Build the launch form with select options seeded from the catalog.
///
/// One pristine source-IP row and one pristine listener row, matching what
/// the screen renders before any interaction.
#[must_use]
pub fn launch_form(catalog: &CatalogSnapshot) -> FormGroup {
    FormGroup::new()
        .with_field(
            "name",
            Field::text("Name:").required().lower_dns_label().max_length(50),
        )
        .with_array("ips", ArrayField::new(ip_row()).required())
        .with_array("listeners", ArrayField::new(listener_row(catalog)).required())
}

// ---------------------------------------------------------------------------
// Interactions
// ---------------------------------------------------------------------------

/// Switch one listener's pool between concrete instances and label selectors.
///
/// In labels mode the instances multi-select stops being required (its
/// waiver sees the new selector value) and a first label row is added if none
/// exists; switching back leaves entered labels in place but they no longer
/// reach the payload.
#[must_use]
pub fn set_selector_type(form: &FormGroup, listener: usize, selector: &str) -> FormGroup {
    let selector = selector.to_string();
    form.map_item("listeners", listener, |row| {
        let row = row.update("selector_type", selector.as_str());
        if selector == SELECTOR_LABELS
            && row
                .dictionary("instance_labels")
                .is_some_and(|d| d.entries.is_empty())
        {
            row.push_entry("instance_labels")
        } else {
            row
        }
    })
}

/// Select every known instance for one listener, or clear the selection if
/// all are already selected.
#[must_use]
pub fn toggle_all_instances(form: &FormGroup, listener: usize, catalog: &CatalogSnapshot) -> FormGroup {
    let all: Vec<String> = catalog.instances.iter().map(|i| i.id.clone()).collect();
    form.map_item("listeners", listener, |row| {
        let selected = row.value_list("instances");
        let next = if !all.is_empty() && all.iter().all(|id| selected.contains(id)) {
            Vec::new()
        } else {
            all.clone()
        };
        row.update("instances", FieldValue::list(next))
    })
}

// ---------------------------------------------------------------------------
// Submit guardrails
// ---------------------------------------------------------------------------

/// Account limits on row counts, enforced before the payload is built.
#[derive(Debug, Clone, Copy, Default)]
pub struct Limits {
    pub max_listeners: Option<usize>,
    pub max_source_ips: Option<usize>,
}

/// A row-count limit violation blocking submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitError {
    /// More listener rows than the account allows.
    TooManyListeners { max: usize },
    /// More source-IP rows than the account allows.
    TooManySourceIps { max: usize },
}

impl std::fmt::Display for LimitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooManyListeners { max } => {
                write!(f, "The number of listeners cannot exceed the limit ({max}).")
            }
            Self::TooManySourceIps { max } => {
                write!(f, "The number of source ips cannot exceed the limit ({max}).")
            }
        }
    }
}

impl std::error::Error for LimitError {}

/// Check the row counts against the account limits.
pub fn check_limits(form: &FormGroup, limits: &Limits) -> Result<(), LimitError> {
    let listeners = form.array("listeners").map_or(0, |a| a.items.len());
    let ips = form.array("ips").map_or(0, |a| a.items.len());
    if let Some(max) = limits.max_listeners
        && listeners > max
    {
        return Err(LimitError::TooManyListeners { max });
    }
    if let Some(max) = limits.max_source_ips
        && ips > max
    {
        return Err(LimitError::TooManySourceIps { max });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Assemble the create-request body from a valid form.
///
/// Ports travel as the entered strings; the pool carries either
/// `instanceSelectors` (a key/value map from the label rows) or
/// `instanceResourceIds`, depending on the listener's selector type.
#[must_use]
pub fn launch_payload(form: &FormGroup) -> Value {
    let listeners: Vec<Value> = form
        .array("listeners")
        .map(|a| a.items.as_slice())
        .unwrap_or_default()
        .iter()
        .map(listener_payload)
        .collect();

    let sourceips: Vec<&str> = form
        .array("ips")
        .map(|a| a.items.as_slice())
        .unwrap_or_default()
        .iter()
        .map(|row| row.value_str("ip"))
        .collect();

    tracing::debug!(listeners = listeners.len(), sourceips = sourceips.len(), "payload assembled");

    json!({
        "metadata": { "name": form.value_str("name") },
        "spec": {
            "listeners": listeners,
            "security": { "sourceips": sourceips },
        },
    })
}

fn listener_payload(row: &FormGroup) -> Value {
    let mut pool = json!({
        "port": row.value_str("internal_port"),
        "monitor": row.value_str("monitor_type"),
        "loadBalancingMode": row.value_str("load_balancing_mode"),
    });

    if row.value_str("selector_type") == SELECTOR_LABELS {
        let mut selectors = serde_json::Map::new();
        if let Some(labels) = row.dictionary("instance_labels") {
            for entry in &labels.entries {
                selectors.insert(
                    entry.value_str("key").to_string(),
                    Value::String(entry.value_str("value").to_string()),
                );
            }
        }
        pool["instanceSelectors"] = Value::Object(selectors);
    } else {
        pool["instanceResourceIds"] = json!(row.value_list("instances"));
    }

    json!({
        "port": row.value_str("external_port"),
        "pool": pool,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
