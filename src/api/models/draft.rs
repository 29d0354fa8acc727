use super::enums::{DataType, DraftField};
use super::value::{TypedValue, lenient_optional_string, lenient_string};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;
use uuid::Uuid;

/// A record as the backend lists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecord {
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub data_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,
}

impl RemoteRecord {
    pub fn new(id: Option<&str>, name: &str, data_type: DataType, value: &str) -> Self {
        Self {
            id: id.map(str::to_string),
            name: name.to_string(),
            data_type: data_type.as_str().to_string(),
            value: value.to_string(),
        }
    }

    /// Declared type, falling back to `STRING` for unknown or `INVALID` types.
    pub fn resolved_type(&self) -> DataType {
        if self.data_type.is_empty() {
            return DataType::String;
        }
        match self.data_type.parse::<DataType>() {
            Ok(data_type) => data_type,
            Err(_) => {
                warn!(
                    "Record '{}' has unrecognised type '{}', treating it as STRING",
                    self.name, self.data_type
                );
                DataType::String
            }
        }
    }
}

/// Client-side edit state of a single record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDraft {
    /// Local identity for list keying and selection. Never sent to the backend.
    pub client_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    pub value: String,
    pub original_name: String,
    pub original_type: DataType,
    pub original_value: String,
    pub is_new: bool,
    pub is_deleted: bool,
    pub modified_fields: BTreeSet<DraftField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl RecordDraft {
    /// Fresh, never-synced draft with an empty name and value.
    pub fn new_empty() -> Self {
        Self {
            client_id: Uuid::new_v4(),
            server_id: None,
            name: String::new(),
            data_type: DataType::String,
            value: String::new(),
            original_name: String::new(),
            original_type: DataType::String,
            original_value: String::new(),
            is_new: true,
            is_deleted: false,
            modified_fields: BTreeSet::new(),
            error_message: None,
        }
    }

    /// Draft for a persisted record; originals equal current fields.
    pub fn from_remote(record: &RemoteRecord) -> Self {
        let data_type = record.resolved_type();
        Self {
            client_id: Uuid::new_v4(),
            server_id: record.id.clone(),
            name: record.name.clone(),
            data_type,
            value: record.value.clone(),
            original_name: record.name.clone(),
            original_type: data_type,
            original_value: record.value.clone(),
            is_new: false,
            is_deleted: false,
            modified_fields: BTreeSet::new(),
            error_message: None,
        }
    }

    pub fn is_modified(&self) -> bool {
        !self.is_new && !self.modified_fields.is_empty()
    }

    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }

    pub fn is_live(&self) -> bool {
        !self.is_deleted
    }

    pub fn typed_value(&self) -> TypedValue {
        TypedValue::new(self.data_type, self.value.clone())
    }

    /// Whether `field` currently differs from its last-synced counterpart.
    pub fn differs(&self, field: DraftField) -> bool {
        match field {
            DraftField::Name => self.name != self.original_name,
            DraftField::Type => self.data_type != self.original_type,
            DraftField::Value => self.value != self.original_value,
        }
    }

    /// Rebuilds `modified_fields` from a field-by-field comparison.
    pub fn recompute_modified(&mut self) {
        self.modified_fields = if self.is_new {
            BTreeSet::new()
        } else {
            DraftField::ALL
                .into_iter()
                .filter(|field| self.differs(*field))
                .collect()
        };
    }

    /// Marks one field as synced.
    pub fn advance(&mut self, field: DraftField) {
        match field {
            DraftField::Name => self.original_name = self.name.clone(),
            DraftField::Type => self.original_type = self.data_type,
            DraftField::Value => self.original_value = self.value.clone(),
        }
        self.modified_fields.remove(&field);
    }

    /// Marks every field as synced.
    pub fn commit(&mut self) {
        self.is_new = false;
        self.original_name = self.name.clone();
        self.original_type = self.data_type;
        self.original_value = self.value.clone();
        self.modified_fields.clear();
    }

    /// Treats `record` as the synced state of this draft, keeping the local fields.
    ///
    /// Fields that still differ from the record stay pending.
    pub fn adopt(&mut self, record: &RemoteRecord) {
        self.server_id = record.id.clone();
        self.is_new = false;
        self.original_name = record.name.clone();
        self.original_type = record.resolved_type();
        self.original_value = record.value.clone();
        self.recompute_modified();
    }

    /// Drops local edits, restoring the last-synced fields.
    pub fn revert(&mut self) {
        self.name = self.original_name.clone();
        self.data_type = self.original_type;
        self.value = self.original_value.clone();
        self.is_deleted = false;
        self.modified_fields.clear();
        self.error_message = None;
    }
}
