use super::types::{
    ColumnRow, FkDirection, ForeignKeyRow, RoutineStatus, TableStatus, TriggerRow, VIEW_MARKER,
};
use super::CatalogReader;
use crate::document::EntityKind;
use crate::error::{Result, SchemaDocError};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// A captured catalog of one database, loaded from YAML or JSON.
///
/// Answers every [`CatalogReader`] query from memory, shaped the way the
/// engine answers them: `table_status` interleaves tables and views by name
/// and marks views with the `VIEW` comment, and foreign keys are stored once
/// and looked up from either side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub database: String,
    #[serde(default)]
    pub tables: Vec<TableSnapshot>,
    #[serde(default)]
    pub views: Vec<ViewSnapshot>,
    #[serde(default)]
    pub procedures: Vec<RoutineSnapshot>,
    #[serde(default)]
    pub functions: Vec<RoutineSnapshot>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub name: String,
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default)]
    pub rows: Option<u64>,
    #[serde(default)]
    pub update_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub columns: Vec<ColumnRow>,
    #[serde(default)]
    pub create_statement: Option<String>,
    #[serde(default)]
    pub triggers: Vec<TriggerRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSnapshot {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnRow>,
    #[serde(default)]
    pub create_statement: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineSnapshot {
    pub name: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub create_statement: Option<String>,
}

impl CatalogSnapshot {
    /// Load a snapshot file. `.json` files are read as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let snapshot: CatalogSnapshot = serde_yaml::from_str(content)?;
        snapshot.check_unique_names()?;
        Ok(snapshot)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let snapshot: CatalogSnapshot = serde_json::from_str(content)?;
        snapshot.check_unique_names()?;
        Ok(snapshot)
    }

    /// Names must be unique per kind; tables and views share one namespace.
    fn check_unique_names(&self) -> Result<()> {
        let relations = self
            .tables
            .iter()
            .map(|t| t.name.as_str())
            .chain(self.views.iter().map(|v| v.name.as_str()));
        check_unique("table or view", relations)?;
        check_unique("procedure", self.procedures.iter().map(|p| p.name.as_str()))?;
        check_unique("function", self.functions.iter().map(|f| f.name.as_str()))?;
        Ok(())
    }

    fn table(&self, name: &str) -> Option<&TableSnapshot> {
        self.tables.iter().find(|t| t.name == name)
    }

    fn view(&self, name: &str) -> Option<&ViewSnapshot> {
        self.views.iter().find(|v| v.name == name)
    }

    fn routine(&self, kind: EntityKind, name: &str) -> Option<&RoutineSnapshot> {
        let list = match kind {
            EntityKind::Procedure => &self.procedures,
            _ => &self.functions,
        };
        list.iter().find(|r| r.name == name)
    }
}

fn check_unique<'a>(what: &str, names: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(SchemaDocError::Catalog(format!(
                "Duplicate {what} name '{name}' in snapshot"
            )));
        }
    }
    Ok(())
}

fn not_found(kind: EntityKind, name: &str) -> SchemaDocError {
    SchemaDocError::Catalog(format!("{kind} '{name}' doesn't exist"))
}

impl CatalogReader for CatalogSnapshot {
    fn database_name(&self) -> Result<String> {
        Ok(self.database.clone())
    }

    fn table_status(&self) -> Result<Vec<TableStatus>> {
        let mut rows: Vec<TableStatus> = self
            .tables
            .iter()
            .map(|t| TableStatus {
                name: t.name.clone(),
                engine: t.engine.clone(),
                rows: t.rows,
                update_time: t.update_time,
                comment: t.comment.clone(),
            })
            .chain(self.views.iter().map(|v| TableStatus {
                name: v.name.clone(),
                engine: None,
                rows: None,
                update_time: None,
                comment: VIEW_MARKER.to_string(),
            }))
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    fn columns(&self, relation: &str) -> Result<Vec<ColumnRow>> {
        if let Some(table) = self.table(relation) {
            return Ok(table.columns.clone());
        }
        if let Some(view) = self.view(relation) {
            return Ok(view.columns.clone());
        }
        Err(not_found(EntityKind::Table, relation))
    }

    fn procedure_status(&self) -> Result<Vec<RoutineStatus>> {
        Ok(self
            .procedures
            .iter()
            .map(|p| RoutineStatus {
                name: p.name.clone(),
                comment: p.comment.clone(),
            })
            .collect())
    }

    fn function_status(&self) -> Result<Vec<RoutineStatus>> {
        Ok(self
            .functions
            .iter()
            .map(|f| RoutineStatus {
                name: f.name.clone(),
                comment: f.comment.clone(),
            })
            .collect())
    }

    fn show_create(&self, kind: EntityKind, name: &str) -> Result<Option<String>> {
        let statement = match kind {
            EntityKind::Table => self.table(name).map(|t| t.create_statement.clone()),
            EntityKind::View => self.view(name).map(|v| v.create_statement.clone()),
            EntityKind::Procedure | EntityKind::Function => {
                self.routine(kind, name).map(|r| r.create_statement.clone())
            }
        };
        statement.ok_or_else(|| not_found(kind, name))
    }

    fn foreign_keys(&self, table: &str, direction: FkDirection) -> Result<Vec<ForeignKeyRow>> {
        if self.table(table).is_none() {
            return Err(not_found(EntityKind::Table, table));
        }
        Ok(self
            .foreign_keys
            .iter()
            .filter(|fk| match direction {
                FkDirection::Outbound => fk.table == table,
                FkDirection::Inbound => fk.referenced_table == table,
            })
            .cloned()
            .collect())
    }

    fn triggers(&self, table: &str) -> Result<Vec<TriggerRow>> {
        self.table(table)
            .map(|t| t.triggers.clone())
            .ok_or_else(|| not_found(EntityKind::Table, table))
    }
}
