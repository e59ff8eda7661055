//! Site configuration (_config.yml)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::content::DEFAULT_RELATED_LIMIT;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub url: String,

    // Directory
    pub content_dir: String,
    pub messages_dir: String,

    // Locales
    pub locales: Vec<String>,
    pub default_locale: String,
    /// Content directory used when a locale has no directory of its own
    pub fallback_locale: String,

    // Listing
    pub per_page: usize,
    pub related_limit: usize,

    #[serde(default)]
    pub highlight: HighlightConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            url: "http://localhost".to_string(),

            content_dir: "content/blog".to_string(),
            messages_dir: "messages".to_string(),

            locales: vec!["el".to_string(), "en".to_string()],
            default_locale: "el".to_string(),
            fallback_locale: "en".to_string(),

            per_page: 6,
            related_limit: DEFAULT_RELATED_LIMIT,

            highlight: HighlightConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the loader and router cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.per_page == 0 {
            bail!("per_page must be at least 1");
        }
        if self.locales.is_empty() {
            bail!("locales must list at least one locale");
        }
        if !self.locales.contains(&self.default_locale) {
            bail!(
                "default_locale {:?} is not one of the configured locales {:?}",
                self.default_locale,
                self.locales
            );
        }
        Ok(())
    }

    /// Whether `locale` is one of the configured locales
    pub fn supports(&self, locale: &str) -> bool {
        self.locales.iter().any(|l| l == locale)
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub line_number: bool,
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            line_number: true,
            theme: "base16-ocean.dark".to_string(),
        }
    }
}
