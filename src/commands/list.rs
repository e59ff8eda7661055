//! List site content

use anyhow::{bail, Result};

use crate::content::paginate;
use crate::Site;

/// Filters and paging for `list post`
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub locale: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// List site content by type
pub fn run(site: &Site, content_type: &str, options: &ListOptions) -> Result<()> {
    let loader = site.loader();
    let locale = options
        .locale
        .as_deref()
        .unwrap_or(site.config.default_locale.as_str());

    match content_type {
        "post" | "posts" => {
            let page = options.page.unwrap_or(1);
            let per_page = options.per_page.unwrap_or(site.config.per_page);
            if page == 0 || per_page == 0 {
                bail!("--page and --per-page must be at least 1");
            }

            let mut posts = match &options.category {
                Some(category) => loader.posts_by_category(category, locale)?,
                None => loader.all_posts(locale)?,
            };
            if let Some(tag) = &options.tag {
                posts.retain(|post| post.has_tag(tag));
            }

            let listing = paginate(&posts, page, per_page);
            println!(
                "Posts ({}), page {} of {}:",
                listing.total, page, listing.total_pages
            );
            for post in listing.posts {
                println!(
                    "  {} - {} [{}] ({})",
                    post.date, post.title, post.slug, post.category
                );
            }
        }
        "tag" | "tags" => {
            let tags = loader.all_tags(locale)?;
            println!("Tags ({}):", tags.len());
            for tag in tags {
                println!("  {}", tag);
            }
        }
        "category" | "categories" => {
            let categories = loader.all_categories(locale)?;
            println!("Categories ({}):", categories.len());
            for (category, count) in categories {
                println!("  {} ({})", category, count);
            }
        }
        _ => {
            bail!(
                "Unknown type: {}. Available: post, tag, category",
                content_type
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn site_with_post() -> (tempfile::TempDir, Site) {
        let tmp = tempfile::tempdir().unwrap();
        let site = Site::new(tmp.path()).unwrap();
        let dir = site.content_dir.join("en");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("hello.md"),
            "---\ntitle: Hello\ndate: 2025-01-01\nauthor: A\ncategory: news\ntags: [intro]\nexcerpt: Hi\npublished: true\n---\nHi\n",
        )
        .unwrap();
        (tmp, site)
    }

    #[test]
    fn test_list_every_type() {
        let (_tmp, site) = site_with_post();
        let options = ListOptions {
            tag: Some("intro".to_string()),
            ..Default::default()
        };
        run(&site, "post", &options).unwrap();
        run(&site, "tags", &ListOptions::default()).unwrap();
        run(&site, "category", &ListOptions::default()).unwrap();
    }

    #[test]
    fn test_list_rejects_bad_input() {
        let (_tmp, site) = site_with_post();
        assert!(run(&site, "pages", &ListOptions::default()).is_err());

        let options = ListOptions {
            page: Some(0),
            ..Default::default()
        };
        assert!(run(&site, "post", &options).is_err());
    }

    #[test]
    fn test_list_missing_content_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let site = Site::new(tmp.path()).unwrap();
        assert!(run(&site, "post", &ListOptions::default()).is_err());
    }
}
