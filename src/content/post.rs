//! Post model

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// A blog post loaded from `<locale>/<slug>.md`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// File stem, unique within a locale directory
    pub slug: String,

    pub title: String,

    /// Publication date, kept as written so that string order is date order
    pub date: String,

    pub author: String,

    pub featured_image: Option<String>,

    pub category: String,

    pub tags: Vec<String>,

    /// Short summary shown in listings
    pub excerpt: String,

    pub published: bool,

    /// Raw markdown after the front-matter block
    pub body: String,
}

impl Post {
    /// Parse the date for display; `None` if it is not an ISO date or timestamp
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let s = self.date.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some(date);
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.date_naive());
        }
        // "2025-01-01 10:00" and similar: the date prefix is enough
        s.get(..10)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
    }

    /// Whether the post carries `tag`
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// The listing view of a post: everything except the body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub author: String,
    pub featured_image: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub excerpt: String,
}

impl From<Post> for PostSummary {
    fn from(post: Post) -> Self {
        Self {
            slug: post.slug,
            title: post.title,
            date: post.date,
            author: post.author,
            featured_image: post.featured_image,
            category: post.category,
            tags: post.tags,
            excerpt: post.excerpt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_dated(date: &str) -> Post {
        Post {
            slug: "grid-storage".to_string(),
            title: "Grid storage".to_string(),
            date: date.to_string(),
            author: "Ops".to_string(),
            featured_image: None,
            category: "energy".to_string(),
            tags: vec!["battery".to_string()],
            excerpt: "Why batteries".to_string(),
            published: true,
            body: "# Body".to_string(),
        }
    }

    #[test]
    fn test_parsed_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(post_dated("2025-03-01").parsed_date(), Some(expected));
        assert_eq!(post_dated("2025-03-01 09:30").parsed_date(), Some(expected));
        assert_eq!(
            post_dated("2025-03-01T09:30:00+02:00").parsed_date(),
            Some(expected)
        );
        assert_eq!(post_dated("March 1, 2025").parsed_date(), None);
    }

    #[test]
    fn test_summary_drops_body() {
        let post = post_dated("2025-03-01");
        assert!(post.has_tag("battery"));
        let summary = PostSummary::from(post);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["slug"], "grid-storage");
        assert_eq!(json["featured_image"], serde_json::Value::Null);
        assert!(json.get("body").is_none());
    }
}
