use super::enums::DataType;
use crate::services::type_registry;
use crate::services::type_registry::ValidationError;
use serde::{Deserialize, Deserializer, Serialize};

/// A raw value tagged with the type it must satisfy.
///
/// Validation and transport formatting always go through the tag, so a value
/// can never be checked or encoded against the wrong type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedValue {
    #[serde(rename = "type")]
    pub data_type: DataType,
    pub raw: String,
}

impl TypedValue {
    pub fn new(data_type: DataType, raw: impl Into<String>) -> Self {
        Self {
            data_type,
            raw: raw.into(),
        }
    }

    /// Empty placeholder value for a type.
    pub fn placeholder(data_type: DataType) -> Self {
        Self::new(data_type, type_registry::default_value_for(data_type))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        type_registry::validate_value(&self.raw, self.data_type)
    }

    /// Encoding used in the `value` query parameter.
    pub fn to_transport(&self) -> String {
        type_registry::format_for_transport(&self.raw, self.data_type)
    }
}

/// Backend ids and values arrive as strings, numbers or arrays depending on the endpoint.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

pub(crate) fn lenient_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_string(deserializer)?;
    Ok(if value.is_empty() { None } else { Some(value) })
}
