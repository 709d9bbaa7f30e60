// Path resolution - where every document lives and how it is linked

pub mod layout;

pub use layout::{layout_for, Anchor, Layout, TargetDefaults};

use crate::config::{PublishingTarget, RenderOptions, RunConfig};
use crate::document::EntityKind;
use crate::error::{Result, SchemaDocError};
use std::fmt;
use std::path::Path;

const EXTENSION: &str = ".md";

/// The address of one document, as other documents link to it.
///
/// Rendering with [`Display`](fmt::Display) gives the link as seen from the
/// publish directory; [`link_from`](Self::link_from) adds the leading
/// traversal for documents inside a kind sub-directory, and
/// [`file_path`](Self::file_path) gives the file the address resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentAddress {
    anchor: Anchor,
    dir: Option<String>,
    stem: String,
    extension: bool,
}

impl DocumentAddress {
    /// Link text from a document `depth` directories below the publish
    /// directory. Absolute addresses look the same from everywhere.
    pub fn link_from(&self, depth: usize) -> String {
        let mut link = match &self.anchor {
            Anchor::Relative if depth == 0 => "./".to_string(),
            Anchor::Relative => "../".repeat(depth),
            Anchor::Absolute(base) if base.is_empty() => "/".to_string(),
            Anchor::Absolute(base) => format!("/{base}/"),
        };
        if let Some(dir) = &self.dir {
            link.push_str(dir);
            link.push('/');
        }
        link.push_str(&self.stem);
        if self.extension {
            link.push_str(EXTENSION);
        }
        link
    }

    /// File location relative to the publish directory.
    pub fn file_path(&self) -> String {
        match &self.dir {
            Some(dir) => format!("{dir}/{}{EXTENSION}", self.stem),
            None => format!("{}{EXTENSION}", self.stem),
        }
    }

    pub fn anchor(&self) -> &Anchor {
        &self.anchor
    }
}

impl fmt::Display for DocumentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.link_from(0))
    }
}

/// Resolves document locations and links for one run.
///
/// Captures the target's layout and the run options once; every path the
/// renderer and the builder need comes from here.
#[derive(Debug, Clone)]
pub struct PathResolver {
    layout: &'static dyn Layout,
    options: RenderOptions,
    base_path: String,
    image_path: String,
    overview_name: String,
    toc_name: String,
}

impl PathResolver {
    /// Validate the configuration and capture it. All configuration errors
    /// surface here, before any catalog access.
    pub fn new(config: &RunConfig) -> Result<Self> {
        let layout = layout_for(config.target);
        let defaults = layout.defaults();

        let overview_name = document_name(
            "overview",
            config.overview_name.as_deref().unwrap_or(defaults.overview_name),
        )?;
        let toc_name = document_name(
            "table of contents",
            config.toc_name.as_deref().unwrap_or(defaults.toc_name),
        )?;

        if config.options.contains(RenderOptions::EMIT_TOC) && overview_name == toc_name {
            return Err(SchemaDocError::Configuration(format!(
                "Overview and table of contents are both named '{overview_name}'"
            )));
        }

        let base_path = trim_path(config.path.as_deref().unwrap_or(defaults.base_path));
        let image_path = trim_path(config.image_path.as_deref().unwrap_or(defaults.image_path));

        Ok(PathResolver {
            layout,
            options: config.options,
            base_path,
            image_path,
            overview_name,
            toc_name,
        })
    }

    pub fn target(&self) -> PublishingTarget {
        self.layout.target()
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Publish directory below the document root, without surrounding slashes.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn overview_name(&self) -> &str {
        &self.overview_name
    }

    pub fn toc_name(&self) -> &str {
        &self.toc_name
    }

    pub fn groups_by_kind(&self) -> bool {
        self.layout.groups_by_kind(self.options)
    }

    /// Sub-directory holding documents of `kind`, if documents are grouped.
    pub fn sub_dir(&self, kind: EntityKind) -> Option<&'static str> {
        let dir = self.layout.defaults().sub_dir(kind);
        (self.groups_by_kind() && !dir.is_empty()).then_some(dir)
    }

    /// Label of a kind group in the table of contents.
    pub fn group_label(&self, kind: EntityKind) -> &'static str {
        let label = self.layout.defaults().sub_dir(kind);
        if !label.is_empty() {
            return label;
        }
        match kind {
            EntityKind::Table => "Tables",
            EntityKind::View => "Views",
            EntityKind::Procedure | EntityKind::Function => "Routines",
        }
    }

    /// Directory depth below the publish directory of a document of `kind`;
    /// `None` is a structural document.
    pub fn depth_of(&self, kind: Option<EntityKind>) -> usize {
        match kind.and_then(|k| self.sub_dir(k)) {
            Some(_) => 1,
            None => 0,
        }
    }

    /// Link prefix of the directory holding documents of `kind`.
    pub fn base_path_for(&self, kind: Option<EntityKind>) -> String {
        let address = DocumentAddress {
            anchor: self.layout.anchor(&self.base_path),
            dir: kind.and_then(|k| self.sub_dir(k)).map(str::to_string),
            stem: String::new(),
            extension: false,
        };
        address.to_string()
    }

    /// Address of the document for `name`. With `kind` set this is an entity
    /// detail page; without, `name` is a structural document name.
    pub fn link_path_for(&self, kind: Option<EntityKind>, name: &str) -> DocumentAddress {
        let stem = match kind {
            Some(k) => format!("{}{name}", k.prefix()),
            None => name.to_string(),
        };
        DocumentAddress {
            anchor: self.layout.anchor(&self.base_path),
            dir: kind.and_then(|k| self.sub_dir(k)).map(str::to_string),
            stem,
            extension: self.layout.links_carry_extension(),
        }
    }

    /// Link text addressing the document, as seen from the publish directory.
    pub fn resolve_link(&self, kind: Option<EntityKind>, name: &str) -> String {
        self.link_path_for(kind, name).to_string()
    }

    /// Address a document is recorded under when it is written. Identical
    /// to [`resolve_link`](Self::resolve_link); the file on disk is the
    /// [`DocumentAddress::file_path`] that address resolves to.
    pub fn resolve_write_path(&self, kind: Option<EntityKind>, name: &str) -> String {
        self.link_path_for(kind, name).to_string()
    }

    pub fn overview_address(&self) -> DocumentAddress {
        self.link_path_for(None, &self.overview_name)
    }

    pub fn toc_address(&self) -> DocumentAddress {
        self.link_path_for(None, &self.toc_name)
    }

    /// Link to the overview from a document of `from` kind.
    pub fn overview_link_from(&self, from: Option<EntityKind>) -> String {
        self.overview_address().link_from(self.depth_of(from))
    }

    /// Directory the icons are referenced from, for a document of `from` kind.
    pub fn image_path_for(&self, from: Option<EntityKind>) -> String {
        self.layout.image_dir(&self.image_path, self.depth_of(from))
    }

    /// Markdown link to an entity, from a structural document.
    pub fn entity_link(&self, kind: EntityKind, name: &str) -> String {
        format!("[{name}]({})", self.resolve_link(Some(kind), name))
    }
}

/// Validate a structural document name and strip any extension.
fn document_name(what: &str, raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.contains('/') || raw.contains('\\') {
        return Err(SchemaDocError::Configuration(format!(
            "The {what} name '{raw}' must not contain a path separator"
        )));
    }
    let stem = Path::new(raw)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    if stem.is_empty() {
        return Err(SchemaDocError::Configuration(format!(
            "The {what} name must not be empty"
        )));
    }
    Ok(stem)
}

fn trim_path(path: &str) -> String {
    path.trim().trim_matches('/').to_string()
}
