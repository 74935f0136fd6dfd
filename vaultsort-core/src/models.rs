//! Data models for Bitwarden export documents.
//!
//! The structs here give typed access to exactly the fields the organizer
//! reads or writes (`name`, `notes`, `login.uris`, `fields`, `folderId`,
//! `collectionIds`, and the folder/collection registries). Every other key —
//! item ids, timestamps, card/identity payloads, and all credential material
//! (`login.username`, `login.password`, TOTP secrets) — rides in a flattened
//! passthrough map and is serialized back out verbatim.
//!
//! # Security Guarantees
//! - Credential fields are never interpreted, only round-tripped
//! - Optional keys distinguish an absent key from an explicit JSON `null`,
//!   so an untouched item re-serializes with its exact key shape

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, VaultSortError};

/// Bitwarden custom field type code for plain text fields.
pub const FIELD_TYPE_TEXT: u8 = 0;

/// Deserializer adapter that keeps explicit `null` distinguishable from a
/// missing key. Combined with `#[serde(default, skip_serializing_if =
/// "Option::is_none")]`, a missing key stays missing, `null` stays `null`,
/// and a value stays a value across a round-trip.
mod keep_null {
    use serde::{Deserialize, Deserializer};

    pub(super) fn deserialize<'de, T, D>(
        deserializer: D,
    ) -> std::result::Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// Whether a document is a personal vault or an organization export.
///
/// Presence of the top-level `collections` key (even when bound to `null`)
/// marks an organization export; otherwise the document is a personal vault
/// and `folders` is the active registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultKind {
    Personal,
    Organization,
}

impl std::fmt::Display for VaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VaultKind::Personal => write!(f, "personal vault"),
            VaultKind::Organization => write!(f, "organization"),
        }
    }
}

/// A complete Bitwarden export document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Export {
    /// Credential items, in export order
    pub items: Vec<Item>,

    /// Folder registry (personal vaults)
    #[serde(
        default,
        deserialize_with = "keep_null::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub folders: Option<Option<Vec<Folder>>>,

    /// Collection registry (organization exports)
    #[serde(
        default,
        deserialize_with = "keep_null::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub collections: Option<Option<Vec<Collection>>>,

    /// All other top-level keys, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Export {
    /// Parses an export from a JSON value after minimal shape checks.
    ///
    /// The value must be a JSON object carrying an `items` array; anything
    /// else is a fatal [`VaultSortError::MalformedExport`] raised before any
    /// processing begins.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(ref map) = value else {
            return Err(VaultSortError::malformed_export(
                "export must be a JSON object",
            ));
        };
        match map.get("items") {
            Some(Value::Array(_)) => {}
            Some(_) => {
                return Err(VaultSortError::malformed_export(
                    "`items` must be an array",
                ));
            }
            None => {
                return Err(VaultSortError::malformed_export(
                    "export is missing the `items` array",
                ));
            }
        }
        serde_json::from_value(value)
            .map_err(|e| VaultSortError::serialization_failed("Failed to parse export items", e))
    }

    /// Returns the vault kind selected by the `collections` key.
    pub fn vault_kind(&self) -> VaultKind {
        if self.collections.is_some() {
            VaultKind::Organization
        } else {
            VaultKind::Personal
        }
    }

    /// Materializes the folder list, treating a missing or `null` key as empty.
    pub fn folders_vec(&self) -> Vec<Folder> {
        self.folders.clone().flatten().unwrap_or_default()
    }

    /// Materializes the collection list, treating a missing or `null` key as empty.
    pub fn collections_vec(&self) -> Vec<Collection> {
        self.collections.clone().flatten().unwrap_or_default()
    }
}

/// One credential entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Display name
    #[serde(
        default,
        deserialize_with = "keep_null::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<Option<String>>,

    /// Free-form notes
    #[serde(
        default,
        deserialize_with = "keep_null::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,

    /// Login payload; credential fields live in its passthrough map
    #[serde(
        default,
        deserialize_with = "keep_null::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub login: Option<Option<Login>>,

    /// Custom key/value/type fields
    #[serde(
        default,
        deserialize_with = "keep_null::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub fields: Option<Option<Vec<CustomField>>>,

    /// Folder assignment (personal vaults)
    #[serde(
        default,
        deserialize_with = "keep_null::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub folder_id: Option<Option<String>>,

    /// Collection assignments (organization exports)
    #[serde(
        default,
        deserialize_with = "keep_null::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub collection_ids: Option<Option<Vec<String>>>,

    /// All other item keys (id, type, timestamps, card/identity payloads),
    /// preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// Display name, empty when absent or `null`.
    pub fn name(&self) -> &str {
        flat_str(&self.name)
    }

    /// Replaces the display name.
    pub fn set_name(&mut self, name: String) {
        self.name = Some(Some(name));
    }

    /// Notes text, empty when absent or `null`.
    pub fn notes(&self) -> &str {
        flat_str(&self.notes)
    }

    /// Replaces the notes text.
    pub fn set_notes(&mut self, notes: String) {
        self.notes = Some(Some(notes));
    }

    /// Login payload, if any.
    pub fn login(&self) -> Option<&Login> {
        self.login.as_ref().and_then(Option::as_ref)
    }

    /// Custom fields, empty when absent or `null`.
    pub fn fields(&self) -> &[CustomField] {
        match &self.fields {
            Some(Some(fields)) => fields,
            _ => &[],
        }
    }

    /// Custom fields for in-place editing, materializing the list if the
    /// item had none.
    pub fn fields_mut(&mut self) -> &mut Vec<CustomField> {
        self.fields
            .get_or_insert_with(|| Some(Vec::new()))
            .get_or_insert_with(Vec::new)
    }

    /// Assigns the item to a folder (personal vaults).
    pub fn set_folder(&mut self, folder_id: String) {
        self.folder_id = Some(Some(folder_id));
    }

    /// Current folder assignment, if any.
    pub fn folder_id(&self) -> Option<&str> {
        self.folder_id.as_ref().and_then(|v| v.as_deref())
    }

    /// Assigns the item to collections (organization exports).
    pub fn set_collections(&mut self, collection_ids: Vec<String>) {
        self.collection_ids = Some(Some(collection_ids));
    }

    /// Current collection assignments, empty when absent or `null`.
    pub fn collection_ids(&self) -> &[String] {
        match &self.collection_ids {
            Some(Some(ids)) => ids,
            _ => &[],
        }
    }
}

/// Login payload of an item.
///
/// Only `uris` is interpreted. Username, password, TOTP secret, and any
/// other login keys stay in the passthrough map, untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Login {
    /// Stored URIs
    #[serde(
        default,
        deserialize_with = "keep_null::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub uris: Option<Option<Vec<LoginUri>>>,

    /// Credential material and other login keys, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Login {
    /// Stored URIs, empty when absent or `null`.
    pub fn uris(&self) -> &[LoginUri] {
        match &self.uris {
            Some(Some(uris)) => uris,
            _ => &[],
        }
    }
}

/// One stored URI of a login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginUri {
    /// The URI string
    #[serde(
        default,
        deserialize_with = "keep_null::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub uri: Option<Option<String>>,

    /// Match mode and other keys, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LoginUri {
    /// The URI string, if present and non-`null`.
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_ref().and_then(|v| v.as_deref())
    }
}

/// A custom key/value/type field on an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    #[serde(
        default,
        deserialize_with = "keep_null::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "keep_null::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Option<String>>,

    /// Bitwarden field type code (0 = text)
    #[serde(
        rename = "type",
        default,
        deserialize_with = "keep_null::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub field_type: Option<Option<u8>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CustomField {
    /// Creates a new text field.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(Some(name.into())),
            value: Some(Some(value.into())),
            field_type: Some(Some(FIELD_TYPE_TEXT)),
            extra: Map::new(),
        }
    }

    /// Field name, empty when absent or `null`.
    pub fn name(&self) -> &str {
        flat_str(&self.name)
    }

    /// Field value, empty when absent or `null`.
    pub fn value(&self) -> &str {
        flat_str(&self.value)
    }

    /// Replaces the field value.
    pub fn set_value(&mut self, value: String) {
        self.value = Some(Some(value));
    }
}

/// A folder in a personal vault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,

    #[serde(
        default,
        deserialize_with = "keep_null::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "keep_null::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub revision_date: Option<Option<String>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Folder {
    /// Folder name, empty when absent or `null`.
    pub fn name(&self) -> &str {
        flat_str(&self.name)
    }
}

/// A collection in an organization export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,

    #[serde(
        default,
        deserialize_with = "keep_null::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "keep_null::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub revision_date: Option<Option<String>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Collection {
    /// Collection name, empty when absent or `null`.
    pub fn name(&self) -> &str {
        flat_str(&self.name)
    }
}

fn flat_str(field: &Option<Option<String>>) -> &str {
    field
        .as_ref()
        .and_then(|v| v.as_deref())
        .unwrap_or_default()
}
