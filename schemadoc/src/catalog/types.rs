use chrono::NaiveDateTime;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Comment the engine reports for views in a table status listing.
pub const VIEW_MARKER: &str = "VIEW";

/// One row of a table status listing. Tables and views arrive mixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStatus {
    pub name: String,
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default)]
    pub rows: Option<u64>,
    #[serde(default)]
    pub update_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub comment: String,
}

impl TableStatus {
    /// Views are only distinguishable by their comment.
    pub fn is_view(&self) -> bool {
        self.comment == VIEW_MARKER
    }
}

/// Raw nullability flag of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nullability {
    #[serde(rename = "YES")]
    Yes,
    #[serde(rename = "NO")]
    No,
}

impl Nullability {
    pub fn is_nullable(self) -> bool {
        self == Nullability::Yes
    }
}

impl fmt::Display for Nullability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Nullability::Yes => "YES",
            Nullability::No => "NO",
        })
    }
}

/// Raw key flag of a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyFlag {
    #[default]
    #[serde(rename = "")]
    None,
    #[serde(rename = "PRI")]
    Primary,
    #[serde(rename = "UNI")]
    Unique,
    #[serde(rename = "MUL")]
    Indexed,
}

/// One row of a full column listing for a table or view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRow {
    pub field: String,
    #[serde(rename = "type")]
    pub type_text: String,
    pub nullable: Nullability,
    #[serde(default)]
    pub key: KeyFlag,
    /// `None` is a true SQL NULL; `Some("")` is an explicit empty default
    #[serde(default, deserialize_with = "scalar_as_text")]
    pub default: Option<String>,
    #[serde(default)]
    pub comment: String,
}

/// Which side of a foreign key the documented table is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FkDirection {
    /// The table holds the referencing column
    Outbound,
    /// Another table references this one
    Inbound,
}

/// One column pair of a foreign-key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRow {
    /// Referencing table
    pub table: String,
    /// Referencing column
    pub column: String,
    #[serde(default)]
    pub constraint: String,
    pub referenced_table: String,
    pub referenced_column: String,
    #[serde(default = "default_rule")]
    pub update_rule: String,
    #[serde(default = "default_rule")]
    pub delete_rule: String,
}

fn default_rule() -> String {
    "NO ACTION".to_string()
}

/// One trigger defined on a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRow {
    pub name: String,
    /// `BEFORE` or `AFTER`
    pub timing: String,
    /// `INSERT`, `UPDATE` or `DELETE`
    pub event: String,
    pub statement: String,
}

/// One row of a procedure or function status listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineStatus {
    pub name: String,
    #[serde(default)]
    pub comment: String,
}

/// Accept a string, integer or boolean column default and keep it as text,
/// so that `default: 0` in a snapshot means the same as `default: "0"`.
///
/// Unquoted non-integer numbers are rejected: by the time they arrive they
/// are floats, and `1.50` would come back as `1.5`.
fn scalar_as_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_option(DefaultVisitor)
}

struct DefaultVisitor;

impl<'de> Visitor<'de> for DefaultVisitor {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, integer or boolean column default")
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
        Err(E::custom(format!(
            "unquoted non-integer default {v}; quote it to keep its text"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_marker() {
        let mut status = TableStatus {
            name: "v_users".into(),
            engine: None,
            rows: None,
            update_time: None,
            comment: "VIEW".into(),
        };
        assert!(status.is_view());

        status.comment = "view of users".into();
        assert!(!status.is_view());
    }

    #[test]
    fn test_column_default_states() {
        let yaml = r#"
- { field: id, type: int, nullable: "NO", key: PRI }
- { field: note, type: text, nullable: "YES", default: ~ }
- { field: code, type: varchar(8), nullable: "NO", default: "" }
- { field: qty, type: int, nullable: "NO", default: 0 }
"#;
        let columns: Vec<ColumnRow> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(columns[0].default, None);
        assert_eq!(columns[0].key, KeyFlag::Primary);
        assert_eq!(columns[1].default, None);
        assert_eq!(columns[1].key, KeyFlag::None);
        assert_eq!(columns[2].default.as_deref(), Some(""));
        assert_eq!(columns[3].default.as_deref(), Some("0"));
    }

    #[test]
    fn test_decimal_default_must_be_quoted() {
        let unquoted = r#"{ field: price, type: "decimal(5,2)", nullable: "NO", default: 1.50 }"#;
        let err = serde_yaml::from_str::<ColumnRow>(unquoted).unwrap_err();
        assert!(err.to_string().contains("quote it"), "{err}");

        let quoted = r#"{ field: price, type: "decimal(5,2)", nullable: "NO", default: "1.50" }"#;
        let column: ColumnRow = serde_yaml::from_str(quoted).unwrap();
        assert_eq!(column.default.as_deref(), Some("1.50"));

        let json = r#"{"field": "price", "type": "decimal(5,2)", "nullable": "NO", "default": 1.5}"#;
        assert!(serde_json::from_str::<ColumnRow>(json).is_err());
    }

    #[test]
    fn test_unknown_flags_rejected() {
        let bad_null = r#"{ field: id, type: int, nullable: "MAYBE" }"#;
        assert!(serde_yaml::from_str::<ColumnRow>(bad_null).is_err());

        let bad_key = r#"{ field: id, type: int, nullable: "NO", key: FOR }"#;
        assert!(serde_yaml::from_str::<ColumnRow>(bad_key).is_err());
    }
}
