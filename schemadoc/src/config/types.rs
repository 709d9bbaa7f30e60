use crate::error::{Result, SchemaDocError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;
use std::path::PathBuf;
use std::str::FromStr;

/// Output layout to generate for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "TargetValue")]
pub enum PublishingTarget {
    /// Plain file tree, viewed locally or from any web server
    Standalone,
    /// Wiki hosted by a version-control platform (flat, extensionless links)
    PlatformWiki,
    /// Wiki mounted below an existing site (root-absolute links)
    EmbeddedWiki,
}

impl PublishingTarget {
    pub const ALL: [PublishingTarget; 3] = [
        PublishingTarget::Standalone,
        PublishingTarget::PlatformWiki,
        PublishingTarget::EmbeddedWiki,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PublishingTarget::Standalone => "standalone",
            PublishingTarget::PlatformWiki => "platform_wiki",
            PublishingTarget::EmbeddedWiki => "embedded_wiki",
        }
    }

    /// Numeric code, stable across releases.
    pub fn code(self) -> u8 {
        match self {
            PublishingTarget::Standalone => 0,
            PublishingTarget::PlatformWiki => 1,
            PublishingTarget::EmbeddedWiki => 2,
        }
    }
}

impl fmt::Display for PublishingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<i64> for PublishingTarget {
    type Error = SchemaDocError;

    fn try_from(code: i64) -> Result<Self> {
        PublishingTarget::ALL
            .into_iter()
            .find(|t| i64::from(t.code()) == code)
            .ok_or_else(|| SchemaDocError::Configuration(format!("Invalid target: {code}")))
    }
}

impl FromStr for PublishingTarget {
    type Err = SchemaDocError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        if let Ok(code) = normalized.parse::<i64>() {
            return PublishingTarget::try_from(code);
        }
        PublishingTarget::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| SchemaDocError::Configuration(format!("Invalid target: '{s}'")))
    }
}

/// Raw target as written in a config file: a name or a numeric code.
#[derive(Deserialize)]
#[serde(untagged)]
enum TargetValue {
    Code(i64),
    Name(String),
}

impl TryFrom<TargetValue> for PublishingTarget {
    type Error = SchemaDocError;

    fn try_from(value: TargetValue) -> Result<Self> {
        match value {
            TargetValue::Code(code) => PublishingTarget::try_from(code),
            TargetValue::Name(name) => name.parse(),
        }
    }
}

/// A single rendering flag, as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderOption {
    /// No "Overview" link at the top of detail pages
    SuppressBacklink,
    /// Put detail pages into one sub-directory per entity kind
    GroupByKind,
    /// Append the CREATE statement to table and view pages
    IncludeDdl,
    /// Write a table-of-contents document
    EmitToc,
}

impl RenderOption {
    pub const ALL: [RenderOption; 4] = [
        RenderOption::SuppressBacklink,
        RenderOption::GroupByKind,
        RenderOption::IncludeDdl,
        RenderOption::EmitToc,
    ];

    pub fn bit(self) -> u8 {
        match self {
            RenderOption::SuppressBacklink => 0x01,
            RenderOption::GroupByKind => 0x02,
            RenderOption::IncludeDdl => 0x04,
            RenderOption::EmitToc => 0x08,
        }
    }
}

/// Immutable set of [`RenderOption`]s, fixed for the duration of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "OptionsValue", into = "Vec<RenderOption>")]
pub struct RenderOptions(u8);

impl RenderOptions {
    pub const SUPPRESS_BACKLINK: RenderOptions = RenderOptions(0x01);
    pub const GROUP_BY_KIND: RenderOptions = RenderOptions(0x02);
    pub const INCLUDE_DDL: RenderOptions = RenderOptions(0x04);
    pub const EMIT_TOC: RenderOptions = RenderOptions(0x08);

    const MASK: u8 = 0x0f;

    pub const fn empty() -> Self {
        RenderOptions(0)
    }

    /// Build from a raw bit value; unknown bits are a configuration error.
    pub fn from_bits(bits: u8) -> Result<Self> {
        if bits & !Self::MASK != 0 {
            return Err(SchemaDocError::Configuration(format!(
                "Unknown option bits: {:#06x}",
                bits & !Self::MASK
            )));
        }
        Ok(RenderOptions(bits))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: RenderOptions) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn has(self, option: RenderOption) -> bool {
        self.0 & option.bit() != 0
    }

    pub fn with(self, option: RenderOption) -> Self {
        RenderOptions(self.0 | option.bit())
    }

    pub fn without(self, option: RenderOption) -> Self {
        RenderOptions(self.0 & !option.bit())
    }

    pub fn iter(self) -> impl Iterator<Item = RenderOption> {
        RenderOption::ALL.into_iter().filter(move |o| self.has(*o))
    }
}

impl BitOr for RenderOptions {
    type Output = RenderOptions;

    fn bitor(self, rhs: RenderOptions) -> RenderOptions {
        RenderOptions(self.0 | rhs.0)
    }
}

impl From<RenderOption> for RenderOptions {
    fn from(option: RenderOption) -> Self {
        RenderOptions(option.bit())
    }
}

impl FromIterator<RenderOption> for RenderOptions {
    fn from_iter<I: IntoIterator<Item = RenderOption>>(iter: I) -> Self {
        iter.into_iter()
            .fold(RenderOptions::empty(), |acc, option| acc.with(option))
    }
}

impl From<RenderOptions> for Vec<RenderOption> {
    fn from(options: RenderOptions) -> Self {
        options.iter().collect()
    }
}

/// Options as written in a config file: a list of names or the raw bit value.
#[derive(Deserialize)]
#[serde(untagged)]
enum OptionsValue {
    Bits(u8),
    Names(Vec<RenderOption>),
}

impl TryFrom<OptionsValue> for RenderOptions {
    type Error = SchemaDocError;

    fn try_from(value: OptionsValue) -> Result<Self> {
        match value {
            OptionsValue::Bits(bits) => RenderOptions::from_bits(bits),
            OptionsValue::Names(names) => Ok(names.into_iter().collect()),
        }
    }
}

/// Everything one run needs to know before it touches the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub target: PublishingTarget,
    #[serde(default)]
    pub options: RenderOptions,
    /// Document root; every other path is relative to it
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Create the document root if it is missing
    #[serde(default)]
    pub create_root: bool,
    /// Publish directory below the root
    #[serde(default)]
    pub path: Option<String>,
    /// Image directory; relative to the publish directory, or to the site
    /// root for embedded wikis
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub overview_name: Option<String>,
    #[serde(default)]
    pub toc_name: Option<String>,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

impl RunConfig {
    pub fn new(target: PublishingTarget, options: RenderOptions) -> Self {
        RunConfig {
            target,
            options,
            root: default_root(),
            create_root: false,
            path: None,
            image_path: None,
            overview_name: None,
            toc_name: None,
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_image_path(mut self, image_path: impl Into<String>) -> Self {
        self.image_path = Some(image_path.into());
        self
    }

    pub fn with_overview_name(mut self, name: impl Into<String>) -> Self {
        self.overview_name = Some(name.into());
        self
    }

    pub fn with_toc_name(mut self, name: impl Into<String>) -> Self {
        self.toc_name = Some(name.into());
        self
    }
}
