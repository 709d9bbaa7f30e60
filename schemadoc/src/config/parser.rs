use super::types::RunConfig;
use crate::error::Result;
use std::path::Path;

/// Parse a run configuration file (YAML)
pub fn parse_config(path: &Path) -> Result<RunConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config_str(&content)
}

/// Parse a run configuration from a YAML string
pub fn parse_config_str(content: &str) -> Result<RunConfig> {
    let config: RunConfig = serde_yaml::from_str(content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PublishingTarget, RenderOption, RenderOptions};

    #[test]
    fn test_parse_full_config() {
        let config = parse_config_str(
            r#"
target: embedded_wiki
options: [group_by_kind, include_ddl, suppress_backlink]
root: /srv/www
path: /packages/demo/wiki/DBDesign
image_path: /packages/demo/wiki/images
"#,
        )
        .unwrap();

        assert_eq!(config.target, PublishingTarget::EmbeddedWiki);
        assert!(config.options.has(RenderOption::GroupByKind));
        assert!(config.options.has(RenderOption::IncludeDdl));
        assert!(config.options.has(RenderOption::SuppressBacklink));
        assert!(!config.options.has(RenderOption::EmitToc));
        assert_eq!(config.root.to_str(), Some("/srv/www"));
        assert_eq!(config.path.as_deref(), Some("/packages/demo/wiki/DBDesign"));
        assert!(!config.create_root);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = parse_config_str("target: standalone").unwrap();
        assert_eq!(config.target, PublishingTarget::Standalone);
        assert_eq!(config.options, RenderOptions::empty());
        assert_eq!(config.root.to_str(), Some("."));
        assert_eq!(config.overview_name, None);
    }

    #[test]
    fn test_numeric_target_and_option_bits() {
        let config = parse_config_str("target: 1\noptions: 12").unwrap();
        assert_eq!(config.target, PublishingTarget::PlatformWiki);
        assert_eq!(
            config.options,
            RenderOptions::INCLUDE_DDL | RenderOptions::EMIT_TOC
        );
    }

    #[test]
    fn test_unknown_target_rejected() {
        assert!(parse_config_str("target: confluence").is_err());
        assert!(parse_config_str("target: 7").is_err());
    }

    #[test]
    fn test_unknown_option_rejected() {
        assert!(parse_config_str("target: standalone\noptions: [colorize]").is_err());
        assert!(parse_config_str("target: standalone\noptions: 64").is_err());
    }

    #[test]
    fn test_config_file_roundtrip_through_disk() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("schemadoc.yaml");
        let config = crate::config::RunConfig::new(
            PublishingTarget::PlatformWiki,
            RenderOptions::EMIT_TOC,
        )
        .with_overview_name("Database.md");
        std::fs::write(&path, serde_yaml::to_string(&config).unwrap()).unwrap();

        let loaded = parse_config(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
