//! Show a single post

use anyhow::{bail, Result};

use crate::content::MarkdownRenderer;
use crate::Site;

/// Print a post's metadata and its body (raw or rendered)
pub fn run(site: &Site, slug: &str, locale: Option<&str>, html: bool) -> Result<()> {
    let locale = locale.unwrap_or(site.config.default_locale.as_str());

    let Some(post) = site.loader().post_by_slug(slug, locale)? else {
        bail!("No post {:?} for locale {}", slug, locale);
    };

    println!("{}", post.title);
    match post.parsed_date() {
        Some(date) => println!("  date:     {}", date.format("%B %d, %Y")),
        None => println!("  date:     {}", post.date),
    }
    println!("  author:   {}", post.author);
    println!("  category: {}", post.category);
    if !post.tags.is_empty() {
        println!("  tags:     {}", post.tags.join(", "));
    }
    if let Some(image) = &post.featured_image {
        println!("  image:    {}", image);
    }
    if !post.published {
        println!("  (draft)");
    }
    println!();

    if html {
        let renderer = MarkdownRenderer::from_config(&site.config.highlight);
        println!("{}", renderer.render(&post.body)?);
    } else {
        println!("{}", post.body);
    }

    Ok(())
}
