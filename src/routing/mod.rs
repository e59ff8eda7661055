//! Locale routing
//!
//! Every page URL carries its locale as the first path segment. Requests
//! without one are redirected to the negotiated locale; assets and API
//! routes are left alone.

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::SiteConfig;

lazy_static! {
    /// Paths that are never locale-prefixed: API, build assets, and anything
    /// that looks like a file
    static ref EXCLUDED: Regex =
        Regex::new(r"^/(?:api|_next/static|_next/image|favicon\.ico|.*\.)").unwrap();
}

/// What to do with an incoming request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Not a localized page; serve as is
    Skip,
    /// Already prefixed with a supported locale
    Pass { locale: String },
    /// Redirect to the localized URL
    Redirect { location: String },
}

#[derive(Debug, Clone)]
pub struct LocaleRouter {
    locales: Vec<String>,
    default_locale: String,
}

impl LocaleRouter {
    pub fn new(locales: Vec<String>, default_locale: &str) -> Self {
        Self {
            locales,
            default_locale: default_locale.to_string(),
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(config.locales.clone(), &config.default_locale)
    }

    /// Decide how to route `path` (with optional query string)
    pub fn decide(
        &self,
        path: &str,
        query: Option<&str>,
        accept_language: Option<&str>,
    ) -> RouteDecision {
        if is_excluded(path) {
            return RouteDecision::Skip;
        }

        if let Some(locale) = self.path_locale(path) {
            return RouteDecision::Pass {
                locale: locale.to_string(),
            };
        }

        let locale = self.negotiate(accept_language);
        let mut location = if path == "/" || path.is_empty() {
            format!("/{}", locale)
        } else {
            format!("/{}{}", locale, path)
        };
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            location.push('?');
            location.push_str(query);
        }

        RouteDecision::Redirect { location }
    }

    /// Pick the best supported locale from an Accept-Language header
    pub fn negotiate(&self, accept_language: Option<&str>) -> &str {
        let Some(header) = accept_language else {
            return &self.default_locale;
        };

        let mut ranges: Vec<(&str, f32)> = header
            .split(',')
            .filter_map(|part| {
                let mut pieces = part.split(';');
                let tag = pieces.next()?.trim();
                let quality = pieces
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .map(|q| q.trim().parse::<f32>().ok())
                    .unwrap_or(Some(1.0))?;
                (!tag.is_empty() && quality > 0.0).then_some((tag, quality))
            })
            .collect();
        // Stable: equal weights keep header order
        ranges.sort_by(|a, b| b.1.total_cmp(&a.1));

        ranges
            .iter()
            .find_map(|(tag, _)| self.match_tag(tag))
            .unwrap_or(self.default_locale.as_str())
    }

    /// Match a language tag such as "en-GB" against the supported locales
    fn match_tag(&self, tag: &str) -> Option<&str> {
        let primary = tag.split('-').next().unwrap_or(tag);
        self.locales
            .iter()
            .find(|l| l.eq_ignore_ascii_case(tag))
            .or_else(|| self.locales.iter().find(|l| l.eq_ignore_ascii_case(primary)))
            .map(String::as_str)
    }

    fn path_locale<'a>(&'a self, path: &str) -> Option<&'a str> {
        let first = path.trim_start_matches('/').split('/').next()?;
        self.locales
            .iter()
            .find(|l| l.as_str() == first)
            .map(String::as_str)
    }
}

/// Whether a path bypasses locale routing
pub fn is_excluded(path: &str) -> bool {
    EXCLUDED.is_match(path)
}
