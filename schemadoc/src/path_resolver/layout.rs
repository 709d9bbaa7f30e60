// Per-target layout rules. Everything that differs between publishing
// targets lives behind the `Layout` trait; the resolver never matches on
// the target itself.

use crate::config::{PublishingTarget, RenderOption, RenderOptions};
use crate::document::EntityKind;
use std::fmt;

/// Fixed defaults a target carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDefaults {
    /// Sub-directory per kind, in `EntityKind::ALL` order; empty when the
    /// target never groups
    pub sub_dirs: [&'static str; 4],
    pub overview_name: &'static str,
    pub toc_name: &'static str,
    pub base_path: &'static str,
    pub image_path: &'static str,
}

impl TargetDefaults {
    pub fn sub_dir(&self, kind: EntityKind) -> &'static str {
        self.sub_dirs[kind_index(kind)]
    }
}

fn kind_index(kind: EntityKind) -> usize {
    match kind {
        EntityKind::Table => 0,
        EntityKind::View => 1,
        EntityKind::Procedure => 2,
        EntityKind::Function => 3,
    }
}

/// Where a link starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// The publish directory, written `./` (or `../` from a kind sub-directory)
    Relative,
    /// The site root, written `/<base>/` from anywhere
    Absolute(String),
}

/// Layout strategy of one publishing target.
pub trait Layout: fmt::Debug + Send + Sync {
    fn target(&self) -> PublishingTarget;

    fn defaults(&self) -> &'static TargetDefaults;

    /// Whether detail pages live in per-kind sub-directories.
    fn groups_by_kind(&self, options: RenderOptions) -> bool;

    /// Starting point of every document link.
    fn anchor(&self, base_path: &str) -> Anchor;

    /// Whether links name the `.md` file or the bare page.
    fn links_carry_extension(&self) -> bool;

    /// Image directory as seen from a document `depth` directories below
    /// the publish directory. No trailing slash.
    fn image_dir(&self, image_path: &str, depth: usize) -> String;
}

/// Image directory relative to the writing document.
fn relative_dir(path: &str, depth: usize) -> String {
    let up = if depth == 0 {
        ".".to_string()
    } else {
        vec![".."; depth].join("/")
    };
    if path.is_empty() {
        up
    } else {
        format!("{up}/{path}")
    }
}

static STANDALONE_DEFAULTS: TargetDefaults = TargetDefaults {
    sub_dirs: ["Tables", "Views", "Procedures", "Functions"],
    overview_name: "index",
    toc_name: "TOC",
    base_path: "",
    image_path: "images",
};

static PLATFORM_WIKI_DEFAULTS: TargetDefaults = TargetDefaults {
    sub_dirs: ["", "", "", ""],
    overview_name: "Home",
    toc_name: "_Sidebar",
    base_path: "",
    image_path: "images",
};

static EMBEDDED_WIKI_DEFAULTS: TargetDefaults = TargetDefaults {
    sub_dirs: ["01_Tables", "02_Views", "03_Routines", "03_Routines"],
    overview_name: "index",
    toc_name: "TOC",
    base_path: "wiki",
    image_path: "wiki/images",
};

/// File tree viewed from disk or any web server.
#[derive(Debug, Clone, Copy)]
pub struct StandaloneLayout;

impl Layout for StandaloneLayout {
    fn target(&self) -> PublishingTarget {
        PublishingTarget::Standalone
    }

    fn defaults(&self) -> &'static TargetDefaults {
        &STANDALONE_DEFAULTS
    }

    fn groups_by_kind(&self, options: RenderOptions) -> bool {
        options.has(RenderOption::GroupByKind)
    }

    fn anchor(&self, _base_path: &str) -> Anchor {
        Anchor::Relative
    }

    fn links_carry_extension(&self) -> bool {
        true
    }

    fn image_dir(&self, image_path: &str, depth: usize) -> String {
        relative_dir(image_path, depth)
    }
}

/// Flat wiki of a hosting platform. Pages are addressed without extension
/// and the platform has no notion of folders.
#[derive(Debug, Clone, Copy)]
pub struct PlatformWikiLayout;

impl Layout for PlatformWikiLayout {
    fn target(&self) -> PublishingTarget {
        PublishingTarget::PlatformWiki
    }

    fn defaults(&self) -> &'static TargetDefaults {
        &PLATFORM_WIKI_DEFAULTS
    }

    fn groups_by_kind(&self, _options: RenderOptions) -> bool {
        false
    }

    fn anchor(&self, _base_path: &str) -> Anchor {
        Anchor::Relative
    }

    fn links_carry_extension(&self) -> bool {
        false
    }

    fn image_dir(&self, image_path: &str, _depth: usize) -> String {
        relative_dir(image_path, 0)
    }
}

/// Wiki mounted inside an existing site; links are absolute from the site root.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedWikiLayout;

impl Layout for EmbeddedWikiLayout {
    fn target(&self) -> PublishingTarget {
        PublishingTarget::EmbeddedWiki
    }

    fn defaults(&self) -> &'static TargetDefaults {
        &EMBEDDED_WIKI_DEFAULTS
    }

    fn groups_by_kind(&self, _options: RenderOptions) -> bool {
        true
    }

    fn anchor(&self, base_path: &str) -> Anchor {
        Anchor::Absolute(base_path.to_string())
    }

    fn links_carry_extension(&self) -> bool {
        true
    }

    fn image_dir(&self, image_path: &str, _depth: usize) -> String {
        if image_path.is_empty() {
            String::new()
        } else {
            format!("/{image_path}")
        }
    }
}

static STANDALONE: StandaloneLayout = StandaloneLayout;
static PLATFORM_WIKI: PlatformWikiLayout = PlatformWikiLayout;
static EMBEDDED_WIKI: EmbeddedWikiLayout = EmbeddedWikiLayout;

/// The layout strategy for a target.
pub fn layout_for(target: PublishingTarget) -> &'static dyn Layout {
    match target {
        PublishingTarget::Standalone => &STANDALONE,
        PublishingTarget::PlatformWiki => &PLATFORM_WIKI,
        PublishingTarget::EmbeddedWiki => &EMBEDDED_WIKI,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_for_each_target() {
        for target in PublishingTarget::ALL {
            assert_eq!(layout_for(target).target(), target);
        }
    }

    #[test]
    fn test_grouping_rules() {
        let grouped = RenderOptions::GROUP_BY_KIND;
        let flat = RenderOptions::empty();

        assert!(StandaloneLayout.groups_by_kind(grouped));
        assert!(!StandaloneLayout.groups_by_kind(flat));
        assert!(!PlatformWikiLayout.groups_by_kind(grouped));
        assert!(EmbeddedWikiLayout.groups_by_kind(flat));
    }

    #[test]
    fn test_image_dirs() {
        assert_eq!(StandaloneLayout.image_dir("images", 0), "./images");
        assert_eq!(StandaloneLayout.image_dir("images", 1), "../images");
        assert_eq!(StandaloneLayout.image_dir("", 1), "..");
        assert_eq!(PlatformWikiLayout.image_dir("images", 1), "./images");
        assert_eq!(EmbeddedWikiLayout.image_dir("wiki/images", 1), "/wiki/images");
    }

    #[test]
    fn test_routines_share_embedded_sub_dir() {
        let defaults = EmbeddedWikiLayout.defaults();
        assert_eq!(
            defaults.sub_dir(EntityKind::Procedure),
            defaults.sub_dir(EntityKind::Function)
        );
    }
}
