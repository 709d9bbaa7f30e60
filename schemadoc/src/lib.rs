pub mod builder;
pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod path_resolver;
pub mod render;
pub mod sink;

pub use builder::{DocumentSetBuilder, PublishReport};
pub use catalog::{CatalogReader, CatalogSnapshot, DatabaseCatalog};
pub use config::{parse_config, PublishingTarget, RenderOption, RenderOptions, RunConfig};
pub use document::{DocumentSet, EntityKind, EntityRef, GeneratedDocument};
pub use error::{Result, SchemaDocError};
pub use path_resolver::{DocumentAddress, PathResolver};
pub use sink::{FsSink, MemorySink, Sink};
