use crate::catalog::{CatalogReader, DatabaseCatalog, FkDirection};
use crate::config::{PublishingTarget, RenderOptions, RunConfig};
use crate::document::{DocumentSet, EntityKind, EntityRef, GeneratedDocument};
use crate::error::{Result, SchemaDocError};
use crate::path_resolver::PathResolver;
use crate::render::{Renderer, RoutineDetail, TableDetail, ViewDetail};
use crate::sink::Sink;
use serde::Serialize;
use std::collections::HashSet;

/// Summary of a finished publish run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub database: String,
    pub target: PublishingTarget,
    /// Paths written, relative to the publish directory, in write order
    pub documents: Vec<String>,
}

/// Builds the document set of one database.
///
/// Construction validates the run configuration; nothing touches the
/// catalog until [`build`](Self::build) or [`publish`](Self::publish).
/// The overview pass always runs first and its name lists are frozen
/// before any detail page or the table of contents is rendered.
pub struct DocumentSetBuilder<'r, R: CatalogReader + ?Sized> {
    reader: &'r R,
    resolver: PathResolver,
}

impl<'r, R: CatalogReader + ?Sized> DocumentSetBuilder<'r, R> {
    pub fn new(reader: &'r R, config: &RunConfig) -> Result<Self> {
        let resolver = PathResolver::new(config)?;
        Ok(DocumentSetBuilder { reader, resolver })
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Render every document without writing anything.
    pub fn build(&self) -> Result<DocumentSet> {
        self.build_with_catalog().map(|(documents, _)| documents)
    }

    /// Build the full set, then hand it to `sink` document by document.
    ///
    /// A catalog failure leaves the sink untouched. A write failure stops
    /// the run; documents already written stay in place.
    pub fn publish<S: Sink + ?Sized>(&self, sink: &mut S) -> Result<PublishReport> {
        let (documents, catalog) = self.build_with_catalog()?;

        let mut written = Vec::with_capacity(documents.len());
        for document in documents {
            sink.write(&document.path, document.body.as_bytes())?;
            written.push(document.path);
        }
        log::info!(
            "Published {} documents for database '{}'",
            written.len(),
            catalog.database()
        );

        Ok(PublishReport {
            database: catalog.database().to_string(),
            target: self.resolver.target(),
            documents: written,
        })
    }

    fn build_with_catalog(&self) -> Result<(DocumentSet, DatabaseCatalog)> {
        let renderer = Renderer::new(&self.resolver);
        let mut documents = DocumentSet::new();

        let (overview, catalog) = self.build_overview(&renderer)?;
        documents.push(overview);
        documents.extend(self.build_tables(&renderer, &catalog)?);
        documents.extend(self.build_views(&renderer, &catalog)?);
        documents.extend(self.build_routines(&renderer, &catalog)?);
        if let Some(toc) = self.build_toc(&renderer, &catalog) {
            documents.push(toc);
        }

        check_unique_paths(&documents)?;
        Ok((documents, catalog))
    }

    /// The overview, and the name lists every later step reads.
    fn build_overview(
        &self,
        renderer: &Renderer<'_>,
    ) -> Result<(GeneratedDocument, DatabaseCatalog)> {
        let database = self.reader.database_name()?;
        log::info!("Reading catalog of database '{}'", database);

        let mut catalog = DatabaseCatalog::new(&database);
        let mut overview = renderer.overview(&database);

        for status in self.reader.table_status()? {
            if status.is_view() {
                overview.push_view(&status.name);
                catalog.push(EntityRef::new(EntityKind::View, status.name, None));
            } else {
                overview.push_table(&status);
                catalog.push(EntityRef::new(
                    EntityKind::Table,
                    status.name,
                    Some(status.comment),
                ));
            }
        }

        let routines = [
            (EntityKind::Procedure, self.reader.procedure_status()?),
            (EntityKind::Function, self.reader.function_status()?),
        ];
        for (kind, listing) in routines {
            for status in listing {
                overview.push_routine(kind, &status);
                catalog.push(EntityRef::new(kind, status.name, Some(status.comment)));
            }
        }

        log::info!(
            "Found {} tables, {} views, {} routines",
            catalog.tables().len(),
            catalog.views().len(),
            catalog.routines().count()
        );

        let name = self.resolver.overview_name().to_string();
        let document = self.document(None, name, overview.finish());
        Ok((document, catalog))
    }

    fn build_tables(
        &self,
        renderer: &Renderer<'_>,
        catalog: &DatabaseCatalog,
    ) -> Result<Vec<GeneratedDocument>> {
        let mut documents = Vec::with_capacity(catalog.tables().len());
        for entity in catalog.tables() {
            let detail = TableDetail {
                columns: self.reader.columns(&entity.name)?,
                references: self.reader.foreign_keys(&entity.name, FkDirection::Outbound)?,
                referenced_by: self.reader.foreign_keys(&entity.name, FkDirection::Inbound)?,
                triggers: self.reader.triggers(&entity.name)?,
                create_statement: self.ddl(entity)?,
            };
            let body = renderer.render_table(entity, &detail);
            documents.push(self.document(Some(entity.kind), entity.name.clone(), body));
        }
        Ok(documents)
    }

    fn build_views(
        &self,
        renderer: &Renderer<'_>,
        catalog: &DatabaseCatalog,
    ) -> Result<Vec<GeneratedDocument>> {
        let mut documents = Vec::with_capacity(catalog.views().len());
        for entity in catalog.views() {
            let detail = ViewDetail {
                columns: self.reader.columns(&entity.name)?,
                create_statement: self.ddl(entity)?,
            };
            let body = renderer.render_view(entity, &detail);
            documents.push(self.document(Some(entity.kind), entity.name.clone(), body));
        }
        Ok(documents)
    }

    /// Procedures, then functions.
    fn build_routines(
        &self,
        renderer: &Renderer<'_>,
        catalog: &DatabaseCatalog,
    ) -> Result<Vec<GeneratedDocument>> {
        let mut documents = Vec::new();
        for entity in catalog.routines() {
            let create_statement = self.reader.show_create(entity.kind, &entity.name)?;
            if create_statement.is_none() {
                log::warn!("{} '{}' has no CREATE statement", entity.kind, entity.name);
            }
            let body = renderer.render_routine(entity, &RoutineDetail { create_statement });
            documents.push(self.document(Some(entity.kind), entity.name.clone(), body));
        }
        Ok(documents)
    }

    fn build_toc(
        &self,
        renderer: &Renderer<'_>,
        catalog: &DatabaseCatalog,
    ) -> Option<GeneratedDocument> {
        if !self.resolver.options().contains(RenderOptions::EMIT_TOC) {
            return None;
        }
        let name = self.resolver.toc_name().to_string();
        Some(self.document(None, name, renderer.render_toc(catalog)))
    }

    /// The CREATE statement of a table or view, only fetched when it is shown.
    fn ddl(&self, entity: &EntityRef) -> Result<Option<String>> {
        if !self.resolver.options().contains(RenderOptions::INCLUDE_DDL) {
            return Ok(None);
        }
        let statement = self.reader.show_create(entity.kind, &entity.name)?;
        if statement.is_none() {
            log::warn!("{} '{}' has no CREATE statement", entity.kind, entity.name);
        }
        Ok(statement)
    }

    fn document(&self, kind: Option<EntityKind>, name: String, body: String) -> GeneratedDocument {
        let path = self.resolver.link_path_for(kind, &name).file_path();
        log::debug!("Rendered {}", path);
        GeneratedDocument {
            address: self.resolver.resolve_write_path(kind, &name),
            name,
            kind,
            path,
            body,
        }
    }
}

/// Two documents on one path would leave only the later one on disk.
fn check_unique_paths(documents: &DocumentSet) -> Result<()> {
    let mut seen = HashSet::with_capacity(documents.len());
    for document in documents {
        if !seen.insert(document.path.as_str()) {
            return Err(SchemaDocError::Configuration(format!(
                "Document path '{}' is produced twice; rename the overview or table of contents",
                document.path
            )));
        }
    }
    Ok(())
}
