// Markdown rendering of detail pages, the overview and the table of contents.
// Every link goes through the PathResolver.

pub mod column;

use crate::catalog::{
    ColumnRow, DatabaseCatalog, ForeignKeyRow, RoutineStatus, TableStatus, TriggerRow,
};
use crate::config::RenderOptions;
use crate::document::{EntityKind, EntityRef};
use crate::path_resolver::PathResolver;
use column::{column_header, column_row, constraint_rule, escape_cell, table_row};

/// Catalog rows describing one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableDetail {
    pub columns: Vec<ColumnRow>,
    /// Foreign keys held by this table
    pub references: Vec<ForeignKeyRow>,
    /// Foreign keys of other tables pointing here
    pub referenced_by: Vec<ForeignKeyRow>,
    pub triggers: Vec<TriggerRow>,
    pub create_statement: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewDetail {
    pub columns: Vec<ColumnRow>,
    pub create_statement: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutineDetail {
    pub create_statement: Option<String>,
}

/// Renders document bodies for one run.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    resolver: &'a PathResolver,
}

impl<'a> Renderer<'a> {
    pub fn new(resolver: &'a PathResolver) -> Self {
        Renderer { resolver }
    }

    /// Start the overview of `database`.
    pub fn overview(&self, database: &str) -> Overview<'a> {
        Overview::new(self.resolver, database)
    }

    pub fn render_table(&self, entity: &EntityRef, detail: &TableDetail) -> String {
        let mut md = self.heading(entity);
        if let Some(comment) = &entity.comment {
            md.push_str(&format!("**{comment}**\n\n"));
        }
        md.push_str(&self.column_table(entity.kind, &detail.columns));

        if !detail.references.is_empty() {
            md.push_str("\n\n## References to other Tables\n");
            md.push_str(&table_row(&["Column", "Reference to", "UPDATE", "DELETE"]));
            md.push_str(&table_row(&["------", "------------", "------", "------"]));
            for fk in &detail.references {
                md.push_str(&table_row(&[
                    format!("`{}`", fk.column),
                    format!("`{}` . `{}`", fk.referenced_table, fk.referenced_column),
                    constraint_rule(&fk.update_rule),
                    constraint_rule(&fk.delete_rule),
                ]));
            }
        }

        if !detail.referenced_by.is_empty() {
            md.push_str("\n\n## Tables referencing this Table\n");
            md.push_str(&table_row(&["Column", "Referenced by", "UPDATE", "DELETE"]));
            md.push_str(&table_row(&["------", "-------------", "------", "------"]));
            for fk in &detail.referenced_by {
                md.push_str(&table_row(&[
                    format!("`{}`", fk.referenced_column),
                    format!("`{}` . `{}`", fk.table, fk.column),
                    constraint_rule(&fk.update_rule),
                    constraint_rule(&fk.delete_rule),
                ]));
            }
        }

        if !detail.triggers.is_empty() {
            md.push_str("\n\n## Trigger\n");
            for trigger in &detail.triggers {
                md.push_str(&format!(
                    "\n### {}: {} {}\n\n",
                    trigger.name, trigger.timing, trigger.event
                ));
                md.push_str(&sql_block(&trigger.statement));
            }
        }

        if self.includes_ddl() {
            if let Some(ddl) = &detail.create_statement {
                md.push_str("\n## Table Create Statement:\n\n");
                md.push_str(&sql_block(ddl));
            }
        }
        md
    }

    pub fn render_view(&self, entity: &EntityRef, detail: &ViewDetail) -> String {
        let mut md = self.heading(entity);
        md.push_str(&self.column_table(entity.kind, &detail.columns));

        if self.includes_ddl() {
            if let Some(ddl) = &detail.create_statement {
                md.push_str("\n## View Create Statement:\n\n");
                md.push_str(&sql_block(ddl));
            }
        }
        md
    }

    /// Procedure or function page. The CREATE statement is part of every
    /// routine page, whatever the DDL option says.
    pub fn render_routine(&self, entity: &EntityRef, detail: &RoutineDetail) -> String {
        let mut md = self.heading(entity);
        if let Some(comment) = &entity.comment {
            md.push_str(&format!("**{comment}**\n\n"));
        }
        if let Some(ddl) = &detail.create_statement {
            md.push_str(&sql_block(ddl));
        }
        md
    }

    /// Nested list of every document: the overview first, then one group
    /// per non-empty kind. Procedures and functions share a group.
    pub fn render_toc(&self, catalog: &DatabaseCatalog) -> String {
        let r = self.resolver;
        let mut md = format!("# Database \"{}\"\n\n", catalog.database());
        md.push_str(&format!("- [Overview]({})\n", r.overview_link_from(None)));

        let groups: [(EntityKind, Vec<&EntityRef>); 3] = [
            (EntityKind::Table, catalog.entities(EntityKind::Table).iter().collect()),
            (EntityKind::View, catalog.entities(EntityKind::View).iter().collect()),
            (EntityKind::Procedure, catalog.routines().collect()),
        ];
        for (kind, entities) in groups {
            if entities.is_empty() {
                continue;
            }
            md.push_str(&format!("  - {}\n", r.group_label(kind)));
            for entity in entities {
                md.push_str(&format!(
                    "    - {}\n",
                    r.entity_link(entity.kind, &entity.name)
                ));
            }
        }
        md
    }

    fn includes_ddl(&self) -> bool {
        self.resolver.options().contains(RenderOptions::INCLUDE_DDL)
    }

    /// Title and backlink. The blank line after the backlink is kept even
    /// when the backlink is suppressed.
    fn heading(&self, entity: &EntityRef) -> String {
        let mut md = format!("# {}: {}\n\n", entity.kind.title(), entity.name);
        if !self.resolver.options().contains(RenderOptions::SUPPRESS_BACKLINK) {
            md.push_str(&format!(
                "[Overview]({})\n",
                self.resolver.overview_link_from(Some(entity.kind))
            ));
        }
        md.push('\n');
        md
    }

    fn column_table(&self, kind: EntityKind, columns: &[ColumnRow]) -> String {
        let image_dir = self.resolver.image_path_for(Some(kind));
        let mut md = column_header();
        for column in columns {
            md.push_str(&column_row(&image_dir, column));
        }
        md
    }
}

fn sql_block(statement: &str) -> String {
    format!("```SQL\n{}\n```\n", statement.trim_end())
}

/// The overview document, filled while the catalog listings are read.
///
/// Tables are rendered as they arrive; views are listed after all tables,
/// and the shared routine table gets its header from whichever routine
/// comes first.
#[derive(Debug, Clone)]
pub struct Overview<'a> {
    resolver: &'a PathResolver,
    title: String,
    tables: String,
    views: Vec<String>,
    routines: Option<String>,
}

impl<'a> Overview<'a> {
    fn new(resolver: &'a PathResolver, database: &str) -> Self {
        let mut tables = table_row(&["Name", "Engine", "Rows", "updated", "Comment"]);
        tables.push_str(&table_row(&["----", "------", "----", "-------", "-------"]));
        Overview {
            resolver,
            title: format!("# Database \"{database}\" Overview\n\n"),
            tables,
            views: Vec::new(),
            routines: None,
        }
    }

    pub fn push_table(&mut self, status: &TableStatus) {
        let updated = status
            .update_time
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        self.tables.push_str(&table_row(&[
            escape_cell(&self.resolver.entity_link(EntityKind::Table, &status.name)),
            status.engine.clone().unwrap_or_default(),
            status.rows.map(|r| r.to_string()).unwrap_or_default(),
            updated,
            escape_cell(status.comment.trim()),
        ]));
    }

    pub fn push_view(&mut self, name: &str) {
        self.views.push(format!(
            "- {}\n",
            self.resolver.entity_link(EntityKind::View, name)
        ));
    }

    pub fn push_routine(&mut self, kind: EntityKind, status: &RoutineStatus) {
        let routines = self.routines.get_or_insert_with(|| {
            let mut header = String::from("\n\n## Routines\n");
            header.push_str(&table_row(&["Name", "Type", "Comment"]));
            header.push_str(&table_row(&["----", "----", "-------"]));
            header
        });
        routines.push_str(&table_row(&[
            escape_cell(&self.resolver.entity_link(kind, &status.name)),
            kind.routine_type().unwrap_or_default().to_string(),
            escape_cell(status.comment.trim()),
        ]));
    }

    pub fn finish(self) -> String {
        let mut md = self.title;
        md.push_str("## Tables\n\n");
        md.push_str(&self.tables);
        if !self.views.is_empty() {
            md.push_str("\n## Views\n\n");
            for line in &self.views {
                md.push_str(line);
            }
        }
        if let Some(routines) = self.routines {
            md.push_str(&routines);
        }
        md
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{KeyFlag, Nullability};
    use crate::config::{PublishingTarget, RunConfig};
    use pretty_assertions::assert_eq;

    fn resolver(target: PublishingTarget, options: RenderOptions) -> PathResolver {
        PathResolver::new(&RunConfig::new(target, options)).unwrap()
    }

    fn id_column() -> ColumnRow {
        ColumnRow {
            field: "id".into(),
            type_text: "int(11)".into(),
            nullable: Nullability::No,
            key: KeyFlag::Primary,
            default: None,
            comment: String::new(),
        }
    }

    fn fk(table: &str, column: &str, referenced_table: &str, rule: &str) -> ForeignKeyRow {
        ForeignKeyRow {
            table: table.into(),
            column: column.into(),
            constraint: format!("fk_{table}_{referenced_table}"),
            referenced_table: referenced_table.into(),
            referenced_column: "id".into(),
            update_rule: rule.into(),
            delete_rule: "CASCADE".into(),
        }
    }

    #[test]
    fn test_table_sections_in_order() {
        let r = resolver(
            PublishingTarget::Standalone,
            RenderOptions::GROUP_BY_KIND | RenderOptions::INCLUDE_DDL,
        );
        let entity = EntityRef::new(EntityKind::Table, "orders", Some("Orders".into()));
        let detail = TableDetail {
            columns: vec![id_column()],
            references: vec![fk("orders", "user_id", "users", "NO ACTION")],
            referenced_by: vec![fk("lines", "order_id", "orders", "CASCADE")],
            triggers: vec![TriggerRow {
                name: "orders_bi".into(),
                timing: "BEFORE".into(),
                event: "INSERT".into(),
                statement: "SET NEW.created = NOW()".into(),
            }],
            create_statement: Some("CREATE TABLE `orders` ()".into()),
        };

        let expected = "# Table: orders\n\n\
[Overview](../index.md)\n\n\
**Orders**\n\n\
|Field|Type|Null|Key|Default|Comment|\n\
|-----|----|-|:-:|-------|-------|\n\
|`id`|int(11)|![No](../images/unchecked.png \"Not NULL\")|![PRI](../images/pri_key.png \"Primary Key\")|*not set*||\n\
\n\n## References to other Tables\n\
|Column|Reference to|UPDATE|DELETE|\n\
|------|------------|------|------|\n\
|`user_id`|`users` . `id`|RESTRICT|CASCADE|\n\
\n\n## Tables referencing this Table\n\
|Column|Referenced by|UPDATE|DELETE|\n\
|------|-------------|------|------|\n\
|`id`|`lines` . `order_id`|CASCADE|CASCADE|\n\
\n\n## Trigger\n\
\n### orders_bi: BEFORE INSERT\n\n\
```SQL\nSET NEW.created = NOW()\n```\n\
\n## Table Create Statement:\n\n\
```SQL\nCREATE TABLE `orders` ()\n```\n";

        assert_eq!(Renderer::new(&r).render_table(&entity, &detail), expected);
    }

    #[test]
    fn test_table_without_ddl_option_has_no_ddl() {
        let r = resolver(PublishingTarget::Standalone, RenderOptions::empty());
        let entity = EntityRef::new(EntityKind::Table, "users", None);
        let detail = TableDetail {
            columns: vec![id_column()],
            create_statement: Some("CREATE TABLE users ()".into()),
            ..Default::default()
        };

        let body = Renderer::new(&r).render_table(&entity, &detail);
        assert!(!body.contains("Create Statement"));
        assert!(body.starts_with("# Table: users\n\n[Overview](./index.md)\n\n|Field|"));
        assert!(body.contains("(./images/unchecked.png"));
    }

    #[test]
    fn test_suppressed_backlink() {
        let r = resolver(PublishingTarget::Standalone, RenderOptions::SUPPRESS_BACKLINK);
        let entity = EntityRef::new(EntityKind::View, "v_users", None);
        let body = Renderer::new(&r).render_view(&entity, &ViewDetail::default());
        assert_eq!(
            body,
            "# View: v_users\n\n\n|Field|Type|Null|Key|Default|Comment|\n|-----|----|-|:-:|-------|-------|\n"
        );
    }

    #[test]
    fn test_view_ddl_follows_option() {
        let entity = EntityRef::new(EntityKind::View, "v_users", None);
        let detail = ViewDetail {
            columns: vec![],
            create_statement: Some("CREATE VIEW v_users AS SELECT 1".into()),
        };

        let with = resolver(PublishingTarget::PlatformWiki, RenderOptions::INCLUDE_DDL);
        let body = Renderer::new(&with).render_view(&entity, &detail);
        assert!(body.contains("[Overview](./Home)"));
        assert!(body.ends_with(
            "\n## View Create Statement:\n\n```SQL\nCREATE VIEW v_users AS SELECT 1\n```\n"
        ));

        let without = resolver(PublishingTarget::PlatformWiki, RenderOptions::empty());
        assert!(!Renderer::new(&without)
            .render_view(&entity, &detail)
            .contains("```SQL"));
    }

    #[test]
    fn test_routine_always_has_ddl() {
        let r = resolver(PublishingTarget::EmbeddedWiki, RenderOptions::empty());
        let entity = EntityRef::new(EntityKind::Function, "f_total", Some("Sum".into()));
        let detail = RoutineDetail {
            create_statement: Some("CREATE FUNCTION f_total() RETURNS INT RETURN 1\n".into()),
        };

        assert_eq!(
            Renderer::new(&r).render_routine(&entity, &detail),
            "# Function: f_total\n\n[Overview](/wiki/index.md)\n\n**Sum**\n\n\
```SQL\nCREATE FUNCTION f_total() RETURNS INT RETURN 1\n```\n"
        );
    }

    #[test]
    fn test_overview_assembly() {
        let r = resolver(PublishingTarget::Standalone, RenderOptions::GROUP_BY_KIND);
        let renderer = Renderer::new(&r);
        let mut overview = renderer.overview("shop");

        overview.push_table(&TableStatus {
            name: "users".into(),
            engine: Some("InnoDB".into()),
            rows: Some(3),
            update_time: chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
                .and_then(|d| d.and_hms_opt(12, 30, 0)),
            comment: "Customers ".into(),
        });
        overview.push_view("v_users");
        overview.push_routine(
            EntityKind::Procedure,
            &RoutineStatus {
                name: "cleanup".into(),
                comment: String::new(),
            },
        );
        overview.push_routine(
            EntityKind::Function,
            &RoutineStatus {
                name: "f_total".into(),
                comment: "Sum".into(),
            },
        );

        let expected = "# Database \"shop\" Overview\n\n\
## Tables\n\n\
|Name|Engine|Rows|updated|Comment|\n\
|----|------|----|-------|-------|\n\
|[users](./Tables/Table_users.md)|InnoDB|3|2024-03-01 12:30:00|Customers|\n\
\n## Views\n\n\
- [v_users](./Views/View_v_users.md)\n\
\n\n## Routines\n\
|Name|Type|Comment|\n\
|----|----|-------|\n\
|[cleanup](./Procedures/Procedure_cleanup.md)|PROCEDURE||\n\
|[f_total](./Functions/Function_f_total.md)|FUNCTION|Sum|\n";

        assert_eq!(overview.finish(), expected);
    }

    #[test]
    fn test_overview_escapes_pipes_in_names() {
        let r = resolver(PublishingTarget::Standalone, RenderOptions::empty());
        let renderer = Renderer::new(&r);
        let mut overview = renderer.overview("shop");

        overview.push_table(&TableStatus {
            name: "a|b".into(),
            engine: Some("InnoDB".into()),
            rows: None,
            update_time: None,
            comment: String::new(),
        });
        overview.push_routine(
            EntityKind::Function,
            &RoutineStatus {
                name: "f|g".into(),
                comment: String::new(),
            },
        );
        let body = overview.finish();

        let table_row = body.lines().find(|l| l.starts_with("|[a")).unwrap();
        assert_eq!(table_row, "|[a\\|b](./Table_a\\|b.md)|InnoDB||||");
        assert_eq!(table_row.replace("\\|", "").matches('|').count(), 6);
        assert!(body.contains("|[f\\|g](./Function_f\\|g.md)|FUNCTION||\n"));
    }

    #[test]
    fn test_overview_routine_header_once_for_functions_only() {
        let r = resolver(PublishingTarget::PlatformWiki, RenderOptions::empty());
        let mut overview = Renderer::new(&r).overview("shop");
        for name in ["f_a", "f_b"] {
            overview.push_routine(
                EntityKind::Function,
                &RoutineStatus {
                    name: name.into(),
                    comment: String::new(),
                },
            );
        }
        let body = overview.finish();
        assert_eq!(body.matches("## Routines").count(), 1);
        assert_eq!(body.matches("|Name|Type|Comment|").count(), 1);
        assert!(body.contains("|[f_b](./Function_f_b)|FUNCTION||\n"));
        assert!(!body.contains("## Views"));
    }

    #[test]
    fn test_toc_groups() {
        let r = resolver(
            PublishingTarget::EmbeddedWiki,
            RenderOptions::EMIT_TOC | RenderOptions::SUPPRESS_BACKLINK,
        );
        let mut catalog = DatabaseCatalog::new("shop");
        catalog.push(EntityRef::new(EntityKind::Table, "users", None));
        catalog.push(EntityRef::new(EntityKind::Function, "f_total", None));
        catalog.push(EntityRef::new(EntityKind::Procedure, "cleanup", None));

        let expected = [
            "# Database \"shop\"",
            "",
            "- [Overview](/wiki/index.md)",
            "  - 01_Tables",
            "    - [users](/wiki/01_Tables/Table_users.md)",
            "  - 03_Routines",
            "    - [cleanup](/wiki/03_Routines/Procedure_cleanup.md)",
            "    - [f_total](/wiki/03_Routines/Function_f_total.md)",
            "",
        ]
        .join("\n");

        assert_eq!(Renderer::new(&r).render_toc(&catalog), expected);
    }
}
