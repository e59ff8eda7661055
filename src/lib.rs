//! locale-blog: localized Markdown blog content for a bilingual site
//!
//! Posts live in `content/blog/<locale>/<slug>.md` with YAML front-matter.
//! This crate loads them per locale (falling back to a default locale's
//! directory), filters and pages them, renders bodies on demand, serves them
//! as JSON behind a locale-prefix router, and loads per-locale message bundles.

pub mod commands;
pub mod config;
pub mod content;
pub mod i18n;
pub mod routing;
pub mod server;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A site rooted at a directory
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Root of the per-locale post directories
    pub content_dir: PathBuf,
    /// Root of the per-locale message bundles
    pub messages_dir: PathBuf,
}

impl Site {
    /// Open a site, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No {:?}, using default configuration", config_path);
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.content_dir);
        let messages_dir = base_dir.join(&config.messages_dir);

        Self {
            config,
            base_dir,
            content_dir,
            messages_dir,
        }
    }

    /// Content loader for this site
    pub fn loader(&self) -> content::ContentLoader {
        content::ContentLoader::new(self)
    }

    /// Locale router for this site
    pub fn router(&self) -> routing::LocaleRouter {
        routing::LocaleRouter::from_config(&self.config)
    }

    /// Message bundle for a locale
    pub fn messages(&self, locale: &str) -> Result<i18n::Messages> {
        i18n::Messages::for_site(self, locale)
    }
}
