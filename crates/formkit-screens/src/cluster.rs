#![forbid(unsafe_code)]

//! Cluster reservation screen.
//!
//! Name, kubernetes version, an optional container-runtime choice that stays
//! hidden until the account exposes more than one runtime, and lower-case
//! key/value tags.

use formkit_core::{DictionaryField, Field, FormGroup};
use serde_json::{Value, json};

use crate::catalog::CatalogSnapshot;

fn tag_row() -> FormGroup {
    FormGroup::new()
        .with_field(
            "key",
            Field::text("Key:").required().lower_dns_label().max_length(63),
        )
        .with_field(
            "value",
            Field::text("Value:").required().lower_dns_label().max_length(63),
        )
}

/// Build the reservation form with select options seeded from the catalog.
///
/// The runtime field starts hidden; it only participates in aggregate
/// validity once [`reveal_runtime_choice`] shows it.
#[must_use]
pub fn reserve_form(catalog: &CatalogSnapshot) -> FormGroup {
    FormGroup::new()
        .with_field(
            "cluster_name",
            Field::text("Cluster name:")
                .required()
                .lower_dns_label()
                .max_length(63),
        )
        .with_field(
            "runtime",
            Field::select("Container runtime:", catalog.runtime_options())
                .required()
                .start_hidden(),
        )
        .with_field(
            "k8s_version",
            Field::select(
                "Select cluster kubernetes version:",
                catalog.k8s_version_options(),
            )
            .required(),
        )
        .with_dictionary("tags", DictionaryField::empty(tag_row()))
}

/// Show the runtime dropdown when the account has a real choice to make,
/// defaulting the value when there is exactly one runtime.
#[must_use]
pub fn reveal_runtime_choice(form: &FormGroup, catalog: &CatalogSnapshot) -> FormGroup {
    match catalog.runtimes.as_slice() {
        [] => form.clone(),
        [only] => form.set_value("runtime", only.id.as_str()),
        _ => form.set_hidden("runtime", false),
    }
}

/// Add an empty tag row.
#[must_use]
pub fn add_tag(form: &FormGroup) -> FormGroup {
    form.push_entry("tags")
}

/// Assemble the create-request body from a valid form.
#[must_use]
pub fn reserve_payload(form: &FormGroup) -> Value {
    let mut tags = serde_json::Map::new();
    if let Some(dict) = form.dictionary("tags") {
        for entry in &dict.entries {
            tags.insert(
                entry.value_str("key").to_string(),
                Value::String(entry.value_str("value").to_string()),
            );
        }
    }

    json!({
        "name": form.value_str("cluster_name"),
        "k8sversionname": form.value_str("k8s_version"),
        "runtimename": form.value_str("runtime"),
        "tags": tags,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
