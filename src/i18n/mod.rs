//! Internationalization (i18n) support
//!
//! Message bundles live in `<messages_dir>/<locale>/<namespace>.json`. Each
//! namespace file becomes the value stored under its namespace name, so
//! `blog.json`'s `title` is looked up as `"blog.title"`.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::Site;

/// Namespaces loaded for every locale, in merge order
pub const NAMESPACES: [&str; 5] = ["common", "home", "about", "products", "blog"];

/// The merged message bundle of one locale
#[derive(Debug, Clone)]
pub struct Messages {
    locale: String,
    dictionary: Map<String, Value>,
}

impl Messages {
    /// Load every namespace file of `locale` from `dir`.
    ///
    /// Missing namespace files are skipped; invalid JSON is an error.
    pub fn load<P: AsRef<Path>>(dir: P, locale: &str) -> Result<Self> {
        let locale_dir = dir.as_ref().join(locale);
        let mut dictionary = Map::new();

        for namespace in NAMESPACES {
            let path = locale_dir.join(format!("{}.json", namespace));
            if !path.is_file() {
                tracing::debug!("No {} messages for {}: {:?}", namespace, locale, path);
                continue;
            }

            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read message file {:?}", path))?;
            let value: Value = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse message file {:?}", path))?;
            dictionary.insert(namespace.to_string(), value);
            tracing::debug!("Loaded message file: {:?}", path);
        }

        Ok(Self {
            locale: locale.to_string(),
            dictionary,
        })
    }

    /// Load the bundle for a site, using the default locale for unsupported ones
    pub fn for_site(site: &Site, locale: &str) -> Result<Self> {
        let locale = if site.config.supports(locale) {
            locale
        } else {
            site.config.default_locale.as_str()
        };
        Self::load(&site.messages_dir, locale)
    }

    /// Build a bundle from an in-memory JSON object
    pub fn from_value(locale: &str, value: Value) -> Self {
        let dictionary = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            locale: locale.to_string(),
            dictionary,
        }
    }

    /// Get the locale of this bundle
    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn dictionary(&self) -> &Map<String, Value> {
        &self.dictionary
    }

    /// Get a translation by dotted key, e.g. "blog.title".
    /// Unknown keys and non-string values come back as the key itself.
    pub fn t(&self, key: &str) -> String {
        match self.lookup(key) {
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                tracing::warn!("Translation key is not a string: {}", key);
                key.to_string()
            }
            None => {
                tracing::warn!("Missing translation key: {}", key);
                key.to_string()
            }
        }
    }

    /// A translator scoped to one namespace
    pub fn namespace<'a>(&'a self, namespace: &'a str) -> Translator<'a> {
        Translator {
            messages: self,
            namespace,
        }
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        let mut parts = key.split('.');
        let mut current = self.dictionary.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }
}

/// Looks keys up relative to a namespace
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    messages: &'a Messages,
    namespace: &'a str,
}

impl Translator<'_> {
    pub fn t(&self, key: &str) -> String {
        self.messages.t(&format!("{}.{}", self.namespace, key))
    }
}
