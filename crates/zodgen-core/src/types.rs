use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kind of a field within an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Scalar,
    Enum,
    Relation,
}

/// Well-known scalar type names of the source data model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarType {
    String,
    Int,
    BigInt,
    Float,
    Decimal,
    Boolean,
    DateTime,
    Json,
    Bytes,
    Other(String),
}

impl ScalarType {
    /// Maps a declared type name onto a known scalar type.
    pub fn from_type_name(type_name: &str) -> Self {
        match type_name {
            "String" => ScalarType::String,
            "Int" => ScalarType::Int,
            "BigInt" => ScalarType::BigInt,
            "Float" => ScalarType::Float,
            "Decimal" => ScalarType::Decimal,
            "Boolean" => ScalarType::Boolean,
            "DateTime" => ScalarType::DateTime,
            "Json" => ScalarType::Json,
            "Bytes" => ScalarType::Bytes,
            other => ScalarType::Other(other.to_string()),
        }
    }
}

/// Enumeration declared in the data model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Enumeration {
    pub name: String,
    /// Value names in declaration order.
    pub values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_names_are_preserved() {
        assert_eq!(ScalarType::from_type_name("Int"), ScalarType::Int);
        assert_eq!(
            ScalarType::from_type_name("Geometry"),
            ScalarType::Other("Geometry".to_string())
        );
    }
}
