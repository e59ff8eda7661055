//! Content module - loads, filters and pages blog posts

mod error;
mod frontmatter;
pub mod loader;
mod markdown;
pub mod paginate;
mod post;

pub use error::ContentError;
pub use frontmatter::FrontMatter;
pub use loader::{ContentLoader, ResolvedDir, DEFAULT_RELATED_LIMIT};
pub use markdown::MarkdownRenderer;
pub use paginate::{paginate, Paginated};
pub use post::{Post, PostSummary};
