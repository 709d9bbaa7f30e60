// Catalog access: the reader contract and the per-run working set

pub mod snapshot;
pub mod types;

pub use snapshot::CatalogSnapshot;
pub use types::{
    ColumnRow, FkDirection, ForeignKeyRow, KeyFlag, Nullability, RoutineStatus, TableStatus,
    TriggerRow, VIEW_MARKER,
};

use crate::document::{EntityKind, EntityRef};
use crate::error::Result;

/// Read access to the catalog of one database.
///
/// Every listing is returned fully drained; the builder never holds two
/// queries open at once. Failures are reported as
/// [`SchemaDocError::Catalog`](crate::SchemaDocError::Catalog) and end the run.
pub trait CatalogReader {
    /// Name of the database being documented.
    fn database_name(&self) -> Result<String>;

    /// Tables and views together; views carry the [`VIEW_MARKER`] comment.
    fn table_status(&self) -> Result<Vec<TableStatus>>;

    /// Full column listing of a table or view.
    fn columns(&self, relation: &str) -> Result<Vec<ColumnRow>>;

    fn procedure_status(&self) -> Result<Vec<RoutineStatus>>;

    fn function_status(&self) -> Result<Vec<RoutineStatus>>;

    /// The CREATE statement of an entity, if the engine reports one.
    fn show_create(&self, kind: EntityKind, name: &str) -> Result<Option<String>>;

    /// Foreign keys the table takes part in, from the given side.
    fn foreign_keys(&self, table: &str, direction: FkDirection) -> Result<Vec<ForeignKeyRow>>;

    fn triggers(&self, table: &str) -> Result<Vec<TriggerRow>>;
}

/// Names collected during the overview pass.
///
/// Built once by the overview step and only read afterwards; the detail
/// and table-of-contents steps take it by shared reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseCatalog {
    database: String,
    tables: Vec<EntityRef>,
    views: Vec<EntityRef>,
    procedures: Vec<EntityRef>,
    functions: Vec<EntityRef>,
}

impl DatabaseCatalog {
    pub(crate) fn new(database: impl Into<String>) -> Self {
        DatabaseCatalog {
            database: database.into(),
            ..Default::default()
        }
    }

    pub(crate) fn push(&mut self, entity: EntityRef) {
        let list = match entity.kind {
            EntityKind::Table => &mut self.tables,
            EntityKind::View => &mut self.views,
            EntityKind::Procedure => &mut self.procedures,
            EntityKind::Function => &mut self.functions,
        };
        list.push(entity);
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn entities(&self, kind: EntityKind) -> &[EntityRef] {
        match kind {
            EntityKind::Table => &self.tables,
            EntityKind::View => &self.views,
            EntityKind::Procedure => &self.procedures,
            EntityKind::Function => &self.functions,
        }
    }

    pub fn tables(&self) -> &[EntityRef] {
        &self.tables
    }

    pub fn views(&self) -> &[EntityRef] {
        &self.views
    }

    /// Procedures followed by functions.
    pub fn routines(&self) -> impl Iterator<Item = &EntityRef> {
        self.procedures.iter().chain(self.functions.iter())
    }

}
