//! CLI entry point for locale-blog

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use locale_blog::commands::list::ListOptions;

#[derive(Parser)]
#[command(name = "locale-blog")]
#[command(version)]
#[command(about = "Localized Markdown blog content: list, inspect and serve posts", long_about = None)]
struct Cli {
    /// Set the site directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List posts, tags or categories
    List {
        /// Type of content to list (post, tag, category)
        #[arg(default_value = "post")]
        r#type: String,

        /// Locale to list (defaults to the site's default locale)
        #[arg(short, long)]
        locale: Option<String>,

        /// Only posts in this category
        #[arg(long)]
        category: Option<String>,

        /// Only posts carrying this tag
        #[arg(long)]
        tag: Option<String>,

        /// Page number, starting at 1
        #[arg(short, long)]
        page: Option<usize>,

        /// Posts per page (defaults to per_page from _config.yml)
        #[arg(long)]
        per_page: Option<usize>,
    },

    /// Show a single post
    Show {
        slug: String,

        #[arg(short, long)]
        locale: Option<String>,

        /// Render the body to HTML
        #[arg(long)]
        html: bool,
    },

    /// List posts in the same category as a post
    Related {
        slug: String,

        #[arg(short, long)]
        locale: Option<String>,

        /// Maximum number of posts (defaults to related_limit from _config.yml)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Serve posts and messages as JSON
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "locale_blog=debug,info"
    } else {
        "locale_blog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };

    match cli.command {
        Commands::List {
            r#type,
            locale,
            category,
            tag,
            page,
            per_page,
        } => {
            let site = locale_blog::Site::new(&base_dir)?;
            let options = ListOptions {
                locale,
                category,
                tag,
                page,
                per_page,
            };
            locale_blog::commands::list::run(&site, &r#type, &options)?;
        }

        Commands::Show { slug, locale, html } => {
            let site = locale_blog::Site::new(&base_dir)?;
            locale_blog::commands::show::run(&site, &slug, locale.as_deref(), html)?;
        }

        Commands::Related {
            slug,
            locale,
            limit,
        } => {
            let site = locale_blog::Site::new(&base_dir)?;
            locale_blog::commands::related::run(&site, &slug, locale.as_deref(), limit)?;
        }

        Commands::Server { port, ip } => {
            let site = locale_blog::Site::new(&base_dir)?;
            tracing::info!("Serving content from {:?}", site.content_dir);
            locale_blog::server::start(&site, &ip, port).await?;
        }

        Commands::Version => {
            println!("locale-blog version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
