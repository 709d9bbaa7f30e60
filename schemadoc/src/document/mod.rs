// Generated documents and the entity vocabulary they are keyed by

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of catalog object documented by one detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Table,
    View,
    Procedure,
    Function,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Table,
        EntityKind::View,
        EntityKind::Procedure,
        EntityKind::Function,
    ];

    /// Filename prefix of the detail page, e.g. `Table_` for `Table_users.md`.
    pub fn prefix(self) -> &'static str {
        match self {
            EntityKind::Table => "Table_",
            EntityKind::View => "View_",
            EntityKind::Procedure => "Procedure_",
            EntityKind::Function => "Function_",
        }
    }

    /// Human-readable name used in page titles.
    pub fn title(self) -> &'static str {
        match self {
            EntityKind::Table => "Table",
            EntityKind::View => "View",
            EntityKind::Procedure => "Procedure",
            EntityKind::Function => "Function",
        }
    }

    /// Value of the `Type` column in the overview's routine table.
    pub fn routine_type(self) -> Option<&'static str> {
        match self {
            EntityKind::Procedure => Some("PROCEDURE"),
            EntityKind::Function => Some("FUNCTION"),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A documented entity. Identity is `(kind, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub name: String,
    #[serde(default)]
    pub comment: Option<String>,
}

impl EntityRef {
    pub fn new(kind: EntityKind, name: impl Into<String>, comment: Option<String>) -> Self {
        let comment = comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        EntityRef {
            kind,
            name: name.into(),
            comment,
        }
    }
}

/// One rendered document, ready to be handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedDocument {
    /// Logical name: the entity name, or the overview/TOC name
    pub name: String,
    /// `None` for the two structural documents (overview and table of contents)
    pub kind: Option<EntityKind>,
    /// Address other documents use to link here
    pub address: String,
    /// Location relative to the publish directory
    pub path: String,
    #[serde(skip)]
    pub body: String,
}

impl GeneratedDocument {
    pub fn is_structural(&self) -> bool {
        self.kind.is_none()
    }
}

/// The complete, ordered output of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSet {
    documents: Vec<GeneratedDocument>,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, document: GeneratedDocument) {
        self.documents.push(document);
    }

    pub fn extend(&mut self, documents: impl IntoIterator<Item = GeneratedDocument>) {
        self.documents.extend(documents);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeneratedDocument> {
        self.documents.iter()
    }

    /// Look up a document by its path relative to the publish directory.
    pub fn get(&self, path: &str) -> Option<&GeneratedDocument> {
        self.documents.iter().find(|d| d.path == path)
    }

    pub fn paths(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.path.as_str()).collect()
    }
}

impl IntoIterator for DocumentSet {
    type Item = GeneratedDocument;
    type IntoIter = std::vec::IntoIter<GeneratedDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}

impl<'a> IntoIterator for &'a DocumentSet {
    type Item = &'a GeneratedDocument;
    type IntoIter = std::slice::Iter<'a, GeneratedDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}
