//! Content loader - loads posts from a locale's content directory

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::{ContentError, FrontMatter, Post};
use crate::Site;

/// How many related posts are returned when the caller does not say
pub const DEFAULT_RELATED_LIMIT: usize = 3;

lazy_static! {
    static ref SORTABLE_DATE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap();
}

/// The directory a locale's posts were actually read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDir {
    /// Locale whose directory is used
    pub locale: String,
    pub path: PathBuf,
    /// True when the requested locale had no directory
    pub fell_back: bool,
}

/// Loads posts from `<content_dir>/<locale>/*.md`.
///
/// Every call reads the disk again; nothing is cached.
#[derive(Debug, Clone)]
pub struct ContentLoader {
    content_dir: PathBuf,
    fallback_locale: String,
}

impl ContentLoader {
    /// Create a new content loader for a site
    pub fn new(site: &Site) -> Self {
        Self::with_dirs(&site.content_dir, &site.config.fallback_locale)
    }

    pub fn with_dirs<P: AsRef<Path>>(content_dir: P, fallback_locale: &str) -> Self {
        Self {
            content_dir: content_dir.as_ref().to_path_buf(),
            fallback_locale: fallback_locale.to_string(),
        }
    }

    /// Pick the locale directory, or the fallback locale's if it is missing
    pub fn resolve_dir(&self, locale: &str) -> Result<ResolvedDir, ContentError> {
        let requested = self.content_dir.join(locale);
        if is_single_component(locale) && requested.is_dir() {
            return Ok(ResolvedDir {
                locale: locale.to_string(),
                path: requested,
                fell_back: false,
            });
        }

        let fallback = self.content_dir.join(&self.fallback_locale);
        if fallback.is_dir() {
            tracing::debug!(
                "No content directory for locale {:?}, using {:?}",
                locale,
                fallback
            );
            return Ok(ResolvedDir {
                locale: self.fallback_locale.clone(),
                path: fallback,
                fell_back: true,
            });
        }

        Err(ContentError::SourceNotFound {
            requested,
            fallback,
        })
    }

    /// Published posts of a locale, newest first.
    ///
    /// The first malformed file aborts the whole listing.
    pub fn all_posts(&self, locale: &str) -> Result<Vec<Post>, ContentError> {
        let dir = self.resolve_dir(locale)?;
        let mut posts = Vec::new();

        // File-name order makes ties on equal dates deterministic
        for entry in WalkDir::new(&dir.path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir.path.as_path()).to_path_buf();
                ContentError::io(path, e.into())
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_post_file(path) {
                continue;
            }

            let post = self.load_post(path)?;
            if post.published {
                posts.push(post);
            } else {
                tracing::debug!("Skipping unpublished post {:?}", path);
            }
        }

        // Sort by date descending (newest first); stable for equal dates
        posts.sort_by(|a, b| b.date.cmp(&a.date));

        tracing::debug!(
            "Loaded {} published posts for {:?} from {:?}",
            posts.len(),
            locale,
            dir.path
        );
        Ok(posts)
    }

    /// Look a post up by slug, trying the locale's file then the fallback's.
    ///
    /// Returns the post whether or not it is published.
    pub fn post_by_slug(&self, slug: &str, locale: &str) -> Result<Option<Post>, ContentError> {
        if !is_single_component(slug) {
            return Ok(None);
        }
        let file_name = format!("{}.md", slug);

        let mut candidates = Vec::with_capacity(2);
        if is_single_component(locale) {
            candidates.push(self.content_dir.join(locale).join(&file_name));
        }
        candidates.push(
            self.content_dir
                .join(&self.fallback_locale)
                .join(&file_name),
        );

        match candidates.into_iter().find(|path| path.is_file()) {
            Some(path) => self.load_post(&path).map(Some),
            None => Ok(None),
        }
    }

    /// Published posts whose category is exactly `category`
    pub fn posts_by_category(
        &self,
        category: &str,
        locale: &str,
    ) -> Result<Vec<Post>, ContentError> {
        let mut posts = self.all_posts(locale)?;
        posts.retain(|post| post.category == category);
        Ok(posts)
    }

    /// Up to `limit` other posts of the same category, newest first
    pub fn related_posts(
        &self,
        current_slug: &str,
        category: &str,
        locale: &str,
        limit: usize,
    ) -> Result<Vec<Post>, ContentError> {
        Ok(self
            .posts_by_category(category, locale)?
            .into_iter()
            .filter(|post| post.slug != current_slug)
            .take(limit)
            .collect())
    }

    /// Every tag used by a published post, deduplicated and sorted
    pub fn all_tags(&self, locale: &str) -> Result<Vec<String>, ContentError> {
        let tags: BTreeSet<String> = self
            .all_posts(locale)?
            .into_iter()
            .flat_map(|post| post.tags)
            .collect();
        Ok(tags.into_iter().collect())
    }

    /// Categories with their post counts, most used first
    pub fn all_categories(&self, locale: &str) -> Result<Vec<(String, usize)>, ContentError> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for post in self.all_posts(locale)? {
            *counts.entry(post.category).or_insert(0) += 1;
        }

        let mut categories: Vec<_> = counts.into_iter().collect();
        categories.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(categories)
    }

    /// Load a single post from a file
    fn load_post(&self, path: &Path) -> Result<Post, ContentError> {
        let content = fs::read_to_string(path).map_err(|e| ContentError::io(path, e))?;

        let malformed = |e: anyhow::Error| ContentError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let (fm, body) = FrontMatter::parse(&content).map_err(malformed)?;

        // The slug is the file name, not the title
        let slug = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let post = fm.into_post(slug, body.to_string()).map_err(malformed)?;

        if !SORTABLE_DATE.is_match(&post.date) {
            tracing::warn!(
                "Post {:?} has date {:?}, which does not sort chronologically; use YYYY-MM-DD",
                path,
                post.date
            );
        }

        Ok(post)
    }
}

/// Check if a file is a post file
fn is_post_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("md")
}

/// Whether `name` names exactly one entry inside a directory
fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
