//! Type registry: what counts as a legal record value per declared type.
//!
//! Validation runs client-side before any network call. The backend only
//! answers with a generic failure and a text body, so this is the only place
//! a user gets field-level feedback.

use crate::models::enums::{DataType, InputKind, TypeCategory};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

/// Longest name accepted for projects, collections, clusters and records.
pub const MAX_NAME_LENGTH: usize = 32;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid name regex"));
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date regex"));
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}:[0-9]{2}:[0-9]{2}$").expect("valid time regex"));
static DATETIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}$")
        .expect("valid datetime regex")
});
static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("valid uuid regex")
});

/// Local, pre-flight validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationError {
    #[error("Name is required")]
    EmptyName,
    #[error("Name must be {max} characters or less")]
    NameTooLong { max: usize },
    #[error("Name cannot contain spaces")]
    NameContainsWhitespace,
    #[error("Name can only contain letters, numbers, underscores (_), and hyphens (-)")]
    InvalidNameCharacters,
    #[error("An entry named '{name}' already exists")]
    DuplicateName { name: String },
    #[error("Invalid {data_type} value: {reason}")]
    InvalidValue { data_type: DataType, reason: String },
}

impl ValidationError {
    fn invalid(data_type: DataType, reason: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            data_type,
            reason: reason.into(),
        }
    }
}

/// Presentation metadata for a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeInfo {
    pub data_type: DataType,
    pub category: TypeCategory,
    pub description: &'static str,
    pub example: &'static str,
    pub input: InputKind,
}

impl TypeInfo {
    /// Hint shown in an empty value cell.
    pub fn placeholder(&self) -> String {
        format!("e.g. {}", self.example)
    }
}

/// Validate a project, collection, cluster or record name.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong {
            max: MAX_NAME_LENGTH,
        });
    }
    if name.chars().any(char::is_whitespace) {
        return Err(ValidationError::NameContainsWhitespace);
    }
    if !NAME_RE.is_match(name) {
        return Err(ValidationError::InvalidNameCharacters);
    }
    Ok(())
}

/// Validate a raw value against its declared type.
pub fn validate_value(value: &str, data_type: DataType) -> Result<(), ValidationError> {
    if data_type == DataType::String {
        return Ok(());
    }
    if value.is_empty() {
        return Err(ValidationError::invalid(data_type, "Value is required"));
    }

    match data_type.element_type() {
        Some(element_type) => validate_array(value, data_type, element_type),
        None => validate_scalar(value, data_type)
            .map_err(|reason| ValidationError::invalid(data_type, reason)),
    }
}

fn validate_scalar(value: &str, data_type: DataType) -> Result<(), String> {
    match data_type {
        DataType::String => Ok(()),
        DataType::Char => {
            if value.chars().count() == 1 {
                Ok(())
            } else {
                Err("Value must be exactly one character".to_string())
            }
        }
        DataType::Integer => value
            .parse::<i64>()
            .map(|_| ())
            .map_err(|_| format!("'{}' is not a whole number", value)),
        DataType::Float => match value.parse::<f64>() {
            Ok(parsed) if parsed.is_finite() => Ok(()),
            _ => Err(format!("'{}' is not a decimal number", value)),
        },
        DataType::Boolean => match value {
            "true" | "false" => Ok(()),
            _ => Err("Value must be either 'true' or 'false'".to_string()),
        },
        DataType::Date => {
            if DATE_RE.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
                Ok(())
            } else {
                Err("Date must use YYYY-MM-DD format".to_string())
            }
        }
        DataType::Time => {
            if TIME_RE.is_match(value) && NaiveTime::parse_from_str(value, "%H:%M:%S").is_ok() {
                Ok(())
            } else {
                Err("Time must use HH:MM:SS format (24-hour)".to_string())
            }
        }
        DataType::DateTime => {
            if DATETIME_RE.is_match(value)
                && NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
            {
                Ok(())
            } else {
                Err("DateTime must use YYYY-MM-DDTHH:MM:SS format".to_string())
            }
        }
        DataType::Uuid => {
            if UUID_RE.is_match(value) {
                Ok(())
            } else {
                Err("UUID must use the 8-4-4-4-12 hyphenated hex format".to_string())
            }
        }
        DataType::Null => {
            if value == "null" {
                Ok(())
            } else {
                Err("Value must be the literal 'null'".to_string())
            }
        }
        _ => Err(format!("{} is not a scalar type", data_type)),
    }
}

fn validate_array(
    value: &str,
    data_type: DataType,
    element_type: DataType,
) -> Result<(), ValidationError> {
    let elements =
        parse_array(value).map_err(|reason| ValidationError::invalid(data_type, reason))?;

    for (index, element) in elements.iter().enumerate() {
        if element.is_empty() {
            return Err(ValidationError::invalid(
                data_type,
                format!("Element {} is empty", index),
            ));
        }
        if element.contains([',', '[', ']']) {
            return Err(ValidationError::invalid(
                data_type,
                format!("Element {} cannot contain ',', '[' or ']'", index),
            ));
        }
        validate_scalar(element, element_type).map_err(|reason| {
            ValidationError::invalid(data_type, format!("Element {}: {}", index, reason))
        })?;
    }
    Ok(())
}

/// Parse the editable JSON form of an array value into raw element texts.
///
/// Strings contribute their contents, numbers and booleans their literal text.
pub fn parse_array(value: &str) -> Result<Vec<String>, String> {
    let parsed: Vec<serde_json::Value> = serde_json::from_str(value)
        .map_err(|_| "Array values must be valid JSON arrays".to_string())?;

    parsed
        .into_iter()
        .enumerate()
        .map(|(index, element)| match element {
            serde_json::Value::String(s) => Ok(s),
            serde_json::Value::Number(n) => Ok(n.to_string()),
            serde_json::Value::Bool(b) => Ok(b.to_string()),
            _ => Err(format!(
                "Element {} must be a string, number or boolean",
                index
            )),
        })
        .collect()
}

/// Stored default for a freshly typed value.
///
/// Always empty: the editor shows a type-specific hint, but the user has to
/// supply a real value before the record validates.
pub fn default_value_for(_data_type: DataType) -> String {
    String::new()
}

/// Encode a value for the `value` query parameter.
///
/// Arrays become `[a,b,c]`; scalars pass through unchanged.
pub fn format_for_transport(value: &str, data_type: DataType) -> String {
    if !data_type.is_array() {
        return value.to_string();
    }
    match parse_array(value) {
        Ok(elements) => format!("[{}]", elements.join(",")),
        Err(_) => value.to_string(),
    }
}

/// Decode an array the way the backend does when reading the transport form back.
pub fn decode_transport(raw: &str) -> Option<Vec<String>> {
    let inner = raw.strip_prefix('[')?.strip_suffix(']')?;
    if inner.is_empty() {
        return Some(Vec::new());
    }
    Some(inner.split(',').map(str::to_string).collect())
}

pub fn type_info(data_type: DataType) -> TypeInfo {
    let (description, example) = match data_type {
        DataType::Char => ("Single character", "A"),
        DataType::String => ("Text of any length", "Hello world"),
        DataType::Integer => ("Whole number", "42"),
        DataType::Float => ("Decimal number", "3.14"),
        DataType::Boolean => ("true or false", "true"),
        DataType::Date => ("Calendar date (YYYY-MM-DD)", "2024-01-15"),
        DataType::Time => ("Time of day (HH:MM:SS, 24-hour)", "14:30:00"),
        DataType::DateTime => ("Date and time (YYYY-MM-DDTHH:MM:SS)", "2024-01-15T14:30:00"),
        DataType::Uuid => (
            "Universally unique identifier",
            "550e8400-e29b-41d4-a716-446655440000",
        ),
        DataType::Null => ("Explicit absence of a value", "null"),
        DataType::CharArray => ("Array of characters", r#"["A","B"]"#),
        DataType::StringArray => ("Array of strings", r#"["apple","banana"]"#),
        DataType::IntegerArray => ("Array of whole numbers", "[1,2,3]"),
        DataType::FloatArray => ("Array of decimal numbers", "[1.5,2.25]"),
        DataType::BooleanArray => ("Array of booleans", "[true,false]"),
        DataType::DateArray => ("Array of dates", r#"["2024-01-15","2024-02-01"]"#),
        DataType::TimeArray => ("Array of times", r#"["09:00:00","17:30:00"]"#),
        DataType::DateTimeArray => ("Array of date-times", r#"["2024-01-15T09:00:00"]"#),
        DataType::UuidArray => (
            "Array of UUIDs",
            r#"["550e8400-e29b-41d4-a716-446655440000"]"#,
        ),
    };

    let input = match data_type {
        DataType::Integer => InputKind::Number { step_any: false },
        DataType::Float => InputKind::Number { step_any: true },
        DataType::Boolean => InputKind::Select {
            options: &["true", "false"],
        },
        DataType::Date => InputKind::Date,
        DataType::Time => InputKind::Time,
        DataType::DateTime => InputKind::DateTime,
        t if t.is_array() => InputKind::JsonArray,
        _ => InputKind::Text,
    };

    TypeInfo {
        data_type,
        category: data_type.category(),
        description,
        example,
        input,
    }
}

/// Types grouped by category, in display order.
pub fn types_by_category() -> Vec<(TypeCategory, Vec<DataType>)> {
    let categories = [
        TypeCategory::Primitive,
        TypeCategory::DateTime,
        TypeCategory::Special,
        TypeCategory::Array,
    ];
    categories
        .into_iter()
        .map(|category| {
            let types = DataType::ALL
                .iter()
                .copied()
                .filter(|t| t.category() == category)
                .collect();
            (category, types)
        })
        .collect()
}
