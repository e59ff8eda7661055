//! List posts related to a post

use anyhow::{bail, Result};

use crate::Site;

/// Print up to `limit` posts sharing the category of `slug`
pub fn run(site: &Site, slug: &str, locale: Option<&str>, limit: Option<usize>) -> Result<()> {
    let locale = locale.unwrap_or(site.config.default_locale.as_str());
    let loader = site.loader();

    let Some(post) = loader.post_by_slug(slug, locale)? else {
        bail!("No post {:?} for locale {}", slug, locale);
    };

    let limit = limit.unwrap_or(site.config.related_limit);
    let related = loader.related_posts(&post.slug, &post.category, locale, limit)?;

    println!("Related to {} ({}):", post.title, post.category);
    for post in related {
        println!("  {} - {} [{}]", post.date, post.title, post.slug);
    }

    Ok(())
}
