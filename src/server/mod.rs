//! JSON service for blog content behind the locale router

use anyhow::Result;
use axum::{
    extract::{Path, Query, Request, State},
    http::{
        header::{ACCEPT_LANGUAGE, CONTENT_LANGUAGE},
        HeaderValue, StatusCode,
    },
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::content::{
    paginate, ContentError, ContentLoader, MarkdownRenderer, Paginated, Post, PostSummary,
};
use crate::routing::{LocaleRouter, RouteDecision};
use crate::Site;

/// Server state
struct AppState {
    site: Site,
    loader: ContentLoader,
    router: LocaleRouter,
    renderer: MarkdownRenderer,
}

/// Build the application router for a site
pub fn app(site: &Site) -> Router {
    let state = Arc::new(AppState {
        site: site.clone(),
        loader: site.loader(),
        router: site.router(),
        renderer: MarkdownRenderer::from_config(&site.config.highlight),
    });

    Router::new()
        .route("/api/health", get(health))
        .route("/:locale/blog", get(list_posts))
        .route("/:locale/blog/tags", get(list_tags))
        .route("/:locale/blog/categories", get(list_categories))
        .route("/:locale/blog/:slug", get(show_post))
        .route("/:locale/messages", get(show_messages))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), localize))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(site: &Site, ip: &str, port: u16) -> Result<()> {
    let app = app(site);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("{} ({})", site.config.title, site.config.url);
    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Redirect requests without a locale prefix
async fn localize(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let accept_language = request
        .headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());

    let decision = state.router.decide(
        request.uri().path(),
        request.uri().query(),
        accept_language,
    );

    match decision {
        RouteDecision::Redirect { location } => {
            tracing::debug!("Redirecting {} to {}", request.uri(), location);
            Redirect::temporary(&location).into_response()
        }
        RouteDecision::Pass { locale } => {
            let mut response = next.run(request).await;
            if let Ok(value) = HeaderValue::from_str(&locale) {
                response.headers_mut().insert(CONTENT_LANGUAGE, value);
            }
            response
        }
        RouteDecision::Skip => next.run(request).await,
    }
}

/// Errors returned to clients as `{"error": ...}`
#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    NotFound(String),
    Content(ContentError),
    Internal(String),
}

impl From<ContentError> for ApiError {
    fn from(e: ContentError) -> Self {
        Self::Content(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Content(e) => {
                tracing::error!("Failed to load content: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            ApiError::Internal(message) => {
                tracing::error!("Request failed: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Run file-system work off the async workers
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("worker failed: {}", e)))?
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let config = &state.site.config;
    Json(json!({ "status": "ok", "title": config.title, "url": config.url }))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("not found".to_string())
}

#[derive(Debug, Deserialize)]
struct ListParams {
    page: Option<String>,
    category: Option<String>,
}

#[derive(Debug, Serialize)]
struct PostList {
    locale: String,
    category: Option<String>,
    page: usize,
    per_page: usize,
    #[serde(flatten)]
    listing: Paginated<PostSummary>,
}

/// Page numbers are 1-based; a missing page means the first one
fn parse_page(page: Option<&str>) -> Result<usize, ApiError> {
    match page.map(str::trim).filter(|p| !p.is_empty()) {
        None => Ok(1),
        Some(raw) => match raw.parse::<usize>() {
            Ok(page) if page >= 1 => Ok(page),
            _ => Err(ApiError::BadRequest(format!("invalid page: {:?}", raw))),
        },
    }
}

async fn list_posts(
    State(state): State<Arc<AppState>>,
    Path(locale): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<PostList>, ApiError> {
    let page = parse_page(params.page.as_deref())?;
    let category = params.category.filter(|c| !c.is_empty());
    let per_page = state.site.config.per_page;

    let loader = state.loader.clone();
    let (locale, category, posts) = blocking(move || {
        let posts = match &category {
            Some(category) => loader.posts_by_category(category, &locale)?,
            None => loader.all_posts(&locale)?,
        };
        Ok((locale, category, posts))
    })
    .await?;

    let listing = paginate(&posts, page, per_page).map(PostSummary::from);

    Ok(Json(PostList {
        locale,
        category,
        page,
        per_page,
        listing,
    }))
}

async fn list_tags(
    State(state): State<Arc<AppState>>,
    Path(locale): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let loader = state.loader.clone();
    let tags = blocking(move || Ok(loader.all_tags(&locale)?)).await?;
    Ok(Json(tags))
}

#[derive(Debug, Serialize)]
struct CategoryCount {
    name: String,
    count: usize,
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
    Path(locale): Path<String>,
) -> Result<Json<Vec<CategoryCount>>, ApiError> {
    let loader = state.loader.clone();
    let categories = blocking(move || Ok(loader.all_categories(&locale)?)).await?;
    Ok(Json(
        categories
            .into_iter()
            .map(|(name, count)| CategoryCount { name, count })
            .collect(),
    ))
}

#[derive(Debug, Serialize)]
struct PostPage {
    locale: String,
    #[serde(flatten)]
    post: Post,
    html: String,
    related: Vec<PostSummary>,
}

async fn show_post(
    State(state): State<Arc<AppState>>,
    Path((locale, slug)): Path<(String, String)>,
) -> Result<Json<PostPage>, ApiError> {
    let page = blocking(move || {
        let loader = &state.loader;
        let post = match loader.post_by_slug(&slug, &locale)? {
            // Drafts can be loaded by slug but are not served
            Some(post) if post.published => post,
            _ => return Err(ApiError::NotFound(format!("no post {:?}", slug))),
        };

        let related = loader
            .related_posts(
                &post.slug,
                &post.category,
                &locale,
                state.site.config.related_limit,
            )?
            .into_iter()
            .map(PostSummary::from)
            .collect();

        let html = state
            .renderer
            .render(&post.body)
            .map_err(|e| ApiError::Internal(format!("failed to render {:?}: {}", slug, e)))?;

        Ok(PostPage {
            locale,
            post,
            html,
            related,
        })
    })
    .await?;

    Ok(Json(page))
}

#[derive(Debug, Serialize)]
struct MessageBundle {
    locale: String,
    messages: Map<String, Value>,
}

async fn show_messages(
    State(state): State<Arc<AppState>>,
    Path(locale): Path<String>,
) -> Result<Json<MessageBundle>, ApiError> {
    let site = state.site.clone();
    let messages = blocking(move || {
        site.messages(&locale)
            .map_err(|e| ApiError::Internal(format!("{:#}", e)))
    })
    .await?;

    Ok(Json(MessageBundle {
        locale: messages.locale().to_string(),
        messages: messages.dictionary().clone(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::LOCATION;
    use axum::http::Request as HttpRequest;
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn write_post(site: &Site, locale: &str, slug: &str, date: &str, category: &str, published: bool) {
        let dir = site.content_dir.join(locale);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(format!("{}.md", slug)),
            format!(
                "---\ntitle: {slug}\ndate: {date}\nauthor: Team\ncategory: {category}\ntags: [{category}]\nexcerpt: About {slug}\npublished: {published}\n---\n# {slug}\n\nBody.\n"
            ),
        )
        .unwrap();
    }

    fn test_site() -> (TempDir, Site) {
        let tmp = TempDir::new().unwrap();
        let config = crate::config::SiteConfig {
            title: "Energy Blog".to_string(),
            per_page: 1,
            ..Default::default()
        };
        let site = Site::with_config(tmp.path(), config);

        write_post(&site, "en", "a", "2025-01-01", "news", true);
        write_post(&site, "en", "b", "2025-03-01", "news", false);
        write_post(&site, "en", "c", "2025-02-01", "tech", true);

        let messages = site.messages_dir.join("en");
        fs::create_dir_all(&messages).unwrap();
        fs::write(messages.join("blog.json"), r#"{"title": "Blog"}"#).unwrap();
        (tmp, site)
    }

    async fn get(app: &Router, uri: &str) -> Response {
        app.clone()
            .oneshot(HttpRequest::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_not_localized() {
        let (_tmp, site) = test_site();
        let response = get(&app(&site), "/api/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(CONTENT_LANGUAGE).is_none());
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["title"], "Energy Blog");
        assert_eq!(body["url"], "http://localhost");
    }

    #[tokio::test]
    async fn test_localized_responses_carry_content_language() {
        let (_tmp, site) = test_site();
        let app = app(&site);

        let response = get(&app, "/el/blog").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_LANGUAGE], "el");

        let response = get(&app, "/en/blog/missing").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_LANGUAGE], "en");
    }

    #[tokio::test]
    async fn test_redirects_unprefixed_paths() {
        let (_tmp, site) = test_site();
        let app = app(&site);

        let response = get(&app, "/blog?page=2").await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[LOCATION], "/el/blog?page=2");

        let response = app
            .clone()
            .oneshot(
                HttpRequest::builder()
                    .uri("/")
                    .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[LOCATION], "/en");
    }

    #[tokio::test]
    async fn test_list_posts_paginates() {
        let (_tmp, site) = test_site();
        let app = app(&site);

        let body = json_body(get(&app, "/en/blog").await).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["total_pages"], 2);
        assert_eq!(body["posts"][0]["slug"], "c");
        assert!(body["posts"][0].get("body").is_none());

        let body = json_body(get(&app, "/en/blog?page=2").await).await;
        assert_eq!(body["posts"][0]["slug"], "a");

        let body = json_body(get(&app, "/en/blog?page=3").await).await;
        assert_eq!(body["posts"], json!([]));
        assert_eq!(body["total"], 2);
    }

    #[tokio::test]
    async fn test_list_posts_falls_back_and_filters() {
        let (_tmp, site) = test_site();
        let app = app(&site);

        // No "el" directory: English content is served
        let body = json_body(get(&app, "/el/blog?category=news").await).await;
        assert_eq!(body["locale"], "el");
        assert_eq!(body["category"], "news");
        assert_eq!(body["total"], 1);
        assert_eq!(body["posts"][0]["slug"], "a");

        let body = json_body(get(&app, "/el/blog?category=none").await).await;
        assert_eq!(body["total"], 0);
        assert_eq!(body["total_pages"], 0);
    }

    #[tokio::test]
    async fn test_invalid_page_is_bad_request() {
        let (_tmp, site) = test_site();
        let app = app(&site);
        for uri in ["/en/blog?page=0", "/en/blog?page=two", "/en/blog?page=-1"] {
            let response = get(&app, uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_show_post() {
        let (_tmp, site) = test_site();
        write_post(&site, "en", "d", "2025-04-01", "news", true);
        let app = app(&site);

        let response = get(&app, "/en/blog/a").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["slug"], "a");
        assert!(body["html"].as_str().unwrap().contains("<h1>a</h1>"));
        assert_eq!(body["related"][0]["slug"], "d");
        assert_eq!(body["related"].as_array().unwrap().len(), 1);

        assert_eq!(get(&app, "/en/blog/missing").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(get(&app, "/en/blog/b").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tags_and_categories() {
        let (_tmp, site) = test_site();
        let app = app(&site);

        let body = json_body(get(&app, "/en/blog/tags").await).await;
        assert_eq!(body, json!(["news", "tech"]));

        let body = json_body(get(&app, "/en/blog/categories").await).await;
        assert_eq!(
            body,
            json!([{ "name": "news", "count": 1 }, { "name": "tech", "count": 1 }])
        );
    }

    #[tokio::test]
    async fn test_missing_content_source_is_server_error() {
        let tmp = TempDir::new().unwrap();
        let site = Site::with_config(tmp.path(), Default::default());
        let app = app(&site);

        let response = get(&app, "/en/blog").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("content source not found"));
    }

    #[tokio::test]
    async fn test_malformed_post_is_server_error() {
        let (_tmp, site) = test_site();
        fs::write(site.content_dir.join("en").join("bad.md"), "no front-matter").unwrap();
        let response = get(&app(&site), "/en/blog").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_messages() {
        let (_tmp, site) = test_site();
        let body = json_body(get(&app(&site), "/en/messages").await).await;
        assert_eq!(body["locale"], "en");
        assert_eq!(body["messages"]["blog"]["title"], "Blog");
    }
}
