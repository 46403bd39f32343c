mod local;
mod object_store;
mod s3;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::error::{Result, StowageError};

pub use local::LocalObjectStore;
pub use object_store::ObjectStore;
pub use s3::{S3ObjectStore, S3ObjectStoreConfig};

pub type StoreFields = HashMap<String, String>;

/// Credential envelope: which backend to build and the fields it needs.
///
/// ```json
/// {"storage_type": "s3", "fields": {"region": "auto", "access_key": "...", "secret_key": "..."}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreCredential {
    pub storage_type: String,
    #[serde(default)]
    pub fields: StoreFields,
}

pub struct StoreField {
    pub key: &'static str,
    pub help: &'static str,
    pub required: bool,
    pub secret: bool,
    pub default_value: Option<fn(&StoreFields) -> String>,
}

pub struct StoreDefinition {
    pub id: &'static str,
    pub label: &'static str,
    pub fields: &'static [StoreField],
    pub build_store: fn(&StoreFields) -> Result<Arc<dyn ObjectStore>>,
}

const STORE_DEFINITIONS: &[StoreDefinition] = &[local::DEFINITION, s3::DEFINITION];

pub fn store_definitions() -> &'static [StoreDefinition] {
    STORE_DEFINITIONS
}

pub fn store_definition(storage_type: &str) -> Option<&'static StoreDefinition> {
    STORE_DEFINITIONS
        .iter()
        .find(|definition| definition.id == storage_type)
}

pub fn store_type_values() -> Vec<&'static str> {
    STORE_DEFINITIONS
        .iter()
        .map(|definition| definition.id)
        .collect()
}

pub fn parse_credential(bytes: &[u8]) -> Result<StoreCredential> {
    serde_json::from_slice::<StoreCredential>(bytes).map_err(|e| StowageError::Credential {
        message: format!("Failed to parse credential: {}", e),
    })
}

/// Fills absent optional fields from their definition's `default_value`.
///
/// Defaults see the caller's fields, so a default may derive from another
/// field (the S3 endpoint from the region).
pub fn resolve_fields(definition: &StoreDefinition, fields: &StoreFields) -> StoreFields {
    let mut resolved = fields.clone();
    for field in definition.fields {
        if let Some(default_value) = field.default_value {
            if !resolved.contains_key(field.key) {
                resolved.insert(field.key.to_string(), default_value(fields));
            }
        }
    }
    resolved
}

/// Builds the backend named by the credential.
///
/// Missing required fields are reported as `Credential` errors before the
/// backend's own constructor runs. Optional fields with a default are
/// filled in first.
pub fn build_store(credential: &StoreCredential) -> Result<Arc<dyn ObjectStore>> {
    let definition =
        store_definition(&credential.storage_type).ok_or_else(|| StowageError::Credential {
            message: format!(
                "Unknown storage type '{}' (expected one of: {})",
                credential.storage_type,
                store_type_values().join(", ")
            ),
        })?;

    for field in definition.fields {
        if field.required && !credential.fields.contains_key(field.key) {
            return Err(StowageError::Credential {
                message: format!("Missing required field: {}", field.key),
            });
        }
    }

    (definition.build_store)(&resolve_fields(definition, &credential.fields))
}

pub(crate) fn required_field<'a>(fields: &'a StoreFields, key: &str) -> Result<&'a String> {
    fields.get(key).ok_or_else(|| StowageError::Credential {
        message: format!("Missing required field: {}", key),
    })
}

pub fn credential_details(credential: &StoreCredential) -> String {
    let Some(definition) = store_definition(&credential.storage_type) else {
        return "unknown".to_string();
    };

    let mut parts = Vec::new();
    for field in definition.fields {
        if let Some(value) = credential.fields.get(field.key) {
            let display_value = if field.secret {
                "********".to_string()
            } else {
                value.clone()
            };
            parts.push(format!("{}: {}", field.key, display_value));
        }
    }

    if parts.is_empty() {
        "no details".to_string()
    } else {
        parts.join(", ")
    }
}

pub fn public_fields(credential: &StoreCredential) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();

    if let Some(definition) = store_definition(&credential.storage_type) {
        for field in definition.fields {
            if field.secret {
                continue;
            }
            if let Some(value) = credential.fields.get(field.key) {
                fields.insert(field.key.to_string(), value.clone());
            }
        }
    }

    fields
}
