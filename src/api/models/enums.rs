use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of value types a record may declare.
///
/// Wire names are the backend's canonical spellings (`STRING`, `[]INTEGER`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DataType {
    #[serde(rename = "CHAR")]
    Char,
    #[serde(rename = "STRING")]
    String,
    #[serde(rename = "INTEGER")]
    Integer,
    #[serde(rename = "FLOAT")]
    Float,
    #[serde(rename = "BOOLEAN")]
    Boolean,
    #[serde(rename = "DATE")]
    Date,
    #[serde(rename = "TIME")]
    Time,
    #[serde(rename = "DATETIME")]
    DateTime,
    #[serde(rename = "UUID")]
    Uuid,
    #[serde(rename = "NULL")]
    Null,
    #[serde(rename = "[]CHAR")]
    CharArray,
    #[serde(rename = "[]STRING")]
    StringArray,
    #[serde(rename = "[]INTEGER")]
    IntegerArray,
    #[serde(rename = "[]FLOAT")]
    FloatArray,
    #[serde(rename = "[]BOOLEAN")]
    BooleanArray,
    #[serde(rename = "[]DATE")]
    DateArray,
    #[serde(rename = "[]TIME")]
    TimeArray,
    #[serde(rename = "[]DATETIME")]
    DateTimeArray,
    #[serde(rename = "[]UUID")]
    UuidArray,
}

impl DataType {
    pub const ALL: [DataType; 19] = [
        DataType::Char,
        DataType::String,
        DataType::Integer,
        DataType::Float,
        DataType::Boolean,
        DataType::Date,
        DataType::Time,
        DataType::DateTime,
        DataType::Uuid,
        DataType::Null,
        DataType::CharArray,
        DataType::StringArray,
        DataType::IntegerArray,
        DataType::FloatArray,
        DataType::BooleanArray,
        DataType::DateArray,
        DataType::TimeArray,
        DataType::DateTimeArray,
        DataType::UuidArray,
    ];

    /// Canonical backend spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Char => "CHAR",
            DataType::String => "STRING",
            DataType::Integer => "INTEGER",
            DataType::Float => "FLOAT",
            DataType::Boolean => "BOOLEAN",
            DataType::Date => "DATE",
            DataType::Time => "TIME",
            DataType::DateTime => "DATETIME",
            DataType::Uuid => "UUID",
            DataType::Null => "NULL",
            DataType::CharArray => "[]CHAR",
            DataType::StringArray => "[]STRING",
            DataType::IntegerArray => "[]INTEGER",
            DataType::FloatArray => "[]FLOAT",
            DataType::BooleanArray => "[]BOOLEAN",
            DataType::DateArray => "[]DATE",
            DataType::TimeArray => "[]TIME",
            DataType::DateTimeArray => "[]DATETIME",
            DataType::UuidArray => "[]UUID",
        }
    }

    pub fn is_array(&self) -> bool {
        self.element_type().is_some()
    }

    /// Scalar element type of an array type, `None` for scalars.
    pub fn element_type(&self) -> Option<DataType> {
        match self {
            DataType::CharArray => Some(DataType::Char),
            DataType::StringArray => Some(DataType::String),
            DataType::IntegerArray => Some(DataType::Integer),
            DataType::FloatArray => Some(DataType::Float),
            DataType::BooleanArray => Some(DataType::Boolean),
            DataType::DateArray => Some(DataType::Date),
            DataType::TimeArray => Some(DataType::Time),
            DataType::DateTimeArray => Some(DataType::DateTime),
            DataType::UuidArray => Some(DataType::Uuid),
            _ => None,
        }
    }

    pub fn category(&self) -> TypeCategory {
        match self {
            DataType::Char
            | DataType::String
            | DataType::Integer
            | DataType::Float
            | DataType::Boolean => TypeCategory::Primitive,
            DataType::Date | DataType::Time | DataType::DateTime => TypeCategory::DateTime,
            DataType::Uuid | DataType::Null => TypeCategory::Special,
            _ => TypeCategory::Array,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    /// Accepts canonical names case-insensitively plus the backend's short aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        let (is_array, scalar) = match upper.strip_prefix("[]") {
            Some(rest) => (true, rest),
            None => (false, upper.as_str()),
        };

        let base = match scalar {
            "CHAR" => DataType::Char,
            "STRING" | "STR" => DataType::String,
            "INTEGER" | "INT" => DataType::Integer,
            "FLOAT" | "FLT" => DataType::Float,
            "BOOLEAN" | "BOOL" => DataType::Boolean,
            "DATE" => DataType::Date,
            "TIME" => DataType::Time,
            "DATETIME" => DataType::DateTime,
            "UUID" => DataType::Uuid,
            "NULL" if !is_array => DataType::Null,
            _ => return Err(format!("Unknown data type: {}", s)),
        };

        if !is_array {
            return Ok(base);
        }

        DataType::ALL
            .iter()
            .copied()
            .find(|t| t.element_type() == Some(base))
            .ok_or_else(|| format!("Unknown data type: {}", s))
    }
}

/// Grouping used when listing types to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeCategory {
    Primitive,
    DateTime,
    Special,
    Array,
}

impl TypeCategory {
    pub fn label(&self) -> &'static str {
        match self {
            TypeCategory::Primitive => "Primitive Types",
            TypeCategory::DateTime => "Date & Time Types",
            TypeCategory::Special => "Special Types",
            TypeCategory::Array => "Array Types",
        }
    }
}

/// Input affordance an editor should offer for a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Text,
    Number { step_any: bool },
    Select { options: &'static [&'static str] },
    Date,
    Time,
    DateTime,
    JsonArray,
}

/// Editable fields of a record draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftField {
    Name,
    Type,
    Value,
}

impl DraftField {
    pub const ALL: [DraftField; 3] = [DraftField::Name, DraftField::Type, DraftField::Value];
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DraftField::Name => "name",
            DraftField::Type => "type",
            DraftField::Value => "value",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Name,
    Type,
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}
