#![forbid(unsafe_code)]

//! Reference data backing the screens' select fields.
//!
//! Shapes, images, instances and health monitors arrive as one JSON document
//! from the control plane; a [`CatalogSnapshot`] is the parsed form, and the
//! `*_options` methods turn each list into the `{name, value}` pairs a select
//! field holds.

use std::fmt;

use formkit_core::SelectOption;
use serde::Deserialize;

/// One catalog item: a display name plus the identifier sent in payloads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub id: String,
}

/// Parsed reference data for the creation screens.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct CatalogSnapshot {
    pub shapes: Vec<CatalogEntry>,
    pub instances: Vec<CatalogEntry>,
    pub monitors: Vec<CatalogEntry>,
    pub runtimes: Vec<CatalogEntry>,
    pub k8s_versions: Vec<CatalogEntry>,
}

impl CatalogSnapshot {
    /// Parse a catalog document.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let snapshot: Self = serde_json::from_str(raw)?;
        tracing::debug!(
            shapes = snapshot.shapes.len(),
            instances = snapshot.instances.len(),
            monitors = snapshot.monitors.len(),
            "catalog parsed"
        );
        Ok(snapshot)
    }

    /// Shape options for a shape select field.
    #[must_use]
    pub fn shape_options(&self) -> Vec<SelectOption> {
        to_options(&self.shapes)
    }

    /// Instance options for an instance multi-select field.
    #[must_use]
    pub fn instance_options(&self) -> Vec<SelectOption> {
        to_options(&self.instances)
    }

    /// Health-monitor options for a monitor select field.
    #[must_use]
    pub fn monitor_options(&self) -> Vec<SelectOption> {
        to_options(&self.monitors)
    }

    /// Container-runtime options for a runtime select field.
    #[must_use]
    pub fn runtime_options(&self) -> Vec<SelectOption> {
        to_options(&self.runtimes)
    }

    /// Kubernetes-version options for a version select field.
    #[must_use]
    pub fn k8s_version_options(&self) -> Vec<SelectOption> {
        to_options(&self.k8s_versions)
    }
}

fn to_options(entries: &[CatalogEntry]) -> Vec<SelectOption> {
    entries
        .iter()
        .map(|e| SelectOption::new(&e.name, &e.id))
        .collect()
}

/// Failure to parse a catalog document.
#[derive(Debug)]
pub enum CatalogError {
    /// The document was not the expected JSON shape.
    Parse(serde_json::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "malformed catalog document: {e}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "shapes": [
            {"name": "Small (2 vCPU)", "id": "small"},
            {"name": "Large (8 vCPU)", "id": "large"}
        ],
        "instances": [
            {"name": "web-1", "id": "i-001"}
        ],
        "monitors": [
            {"name": "HTTP 200 on /healthz", "id": "mon-http"}
        ]
    }"#;

    #[test]
    fn parses_full_document() {
        let snapshot = CatalogSnapshot::from_json(SAMPLE).unwrap();
        assert_eq!(snapshot.shapes.len(), 2);
        let options = snapshot.shape_options();
        assert_eq!(options[0].name, "Small (2 vCPU)");
        assert_eq!(options[0].value, "small");
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let snapshot = CatalogSnapshot::from_json(r#"{"shapes": []}"#).unwrap();
        assert!(snapshot.instances.is_empty());
        assert!(snapshot.monitor_options().is_empty());
    }

    #[test]
    fn malformed_document_is_an_error() {
        let err = CatalogSnapshot::from_json("not json").unwrap_err();
        assert!(err.to_string().contains("malformed catalog document"));
    }
}
