//! Host-facing data-source schema.
//!
//! A configuration-management host sees a deployment lookup as a data source
//! with three required inputs and two computed outputs. This module declares
//! those fields and projects a resolved [`DeploymentRecord`] onto them.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::resolver::DeploymentRecord;

/// Attribute holding the identifier on input and the canonical id on output.
pub const FIELD_UUID: &str = "uuid";

/// Workspace attribute.
pub const FIELD_WORKSPACE: &str = "workspace";

/// Repository attribute.
pub const FIELD_REPOSITORY: &str = "repository";

/// Display name attribute.
pub const FIELD_NAME: &str = "name";

/// Stage name attribute.
pub const FIELD_STAGE: &str = "stage";

/// How the host treats an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldMode {
    /// Must be supplied by the caller.
    Required,
    /// Filled in from the lookup result.
    Computed,
}

impl fmt::Display for FieldMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "required"),
            Self::Computed => write!(f, "computed"),
        }
    }
}

/// One attribute of the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Attribute name.
    pub name: &'static str,
    /// Input or output.
    pub mode: FieldMode,
    /// Human-readable description.
    pub description: &'static str,
}

/// The deployment data-source schema, in declaration order.
pub const DEPLOYMENT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: FIELD_UUID,
        mode: FieldMode::Required,
        description: "Environment UUID or display name; always the UUID once read",
    },
    FieldSpec {
        name: FIELD_WORKSPACE,
        mode: FieldMode::Required,
        description: "Workspace slug or UUID owning the repository",
    },
    FieldSpec {
        name: FIELD_REPOSITORY,
        mode: FieldMode::Required,
        description: "Repository slug or UUID",
    },
    FieldSpec {
        name: FIELD_NAME,
        mode: FieldMode::Computed,
        description: "Display name of the environment",
    },
    FieldSpec {
        name: FIELD_STAGE,
        mode: FieldMode::Computed,
        description: "Display name of the environment stage",
    },
];

/// State written back to the host after a successful read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSourceState {
    /// Resource id; the canonical environment id.
    pub id: String,
    /// Every schema attribute with its value.
    pub attributes: BTreeMap<&'static str, String>,
}

impl From<&DeploymentRecord> for DataSourceState {
    fn from(record: &DeploymentRecord) -> Self {
        let attributes = DEPLOYMENT_FIELDS
            .iter()
            .map(|field| {
                let value = match field.name {
                    FIELD_UUID => &record.uuid,
                    FIELD_WORKSPACE => &record.workspace,
                    FIELD_REPOSITORY => &record.repository,
                    FIELD_NAME => &record.name,
                    _ => &record.stage,
                };
                (field.name, value.clone())
            })
            .collect();

        Self {
            id: record.uuid.clone(),
            attributes,
        }
    }
}

/// Returns the schema fields the caller must supply.
pub fn required_fields() -> impl Iterator<Item = &'static FieldSpec> {
    DEPLOYMENT_FIELDS
        .iter()
        .filter(|field| field.mode == FieldMode::Required)
}
