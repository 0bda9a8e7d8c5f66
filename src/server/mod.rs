//! Blog server with on-demand fallback rendering
//!
//! Pre-built pages are served from the public directory. A post page that
//! was not built ahead of time is resolved and rendered on its first
//! request, then written back into the public directory so later requests
//! hit the static file. Preview mode serves draft content but never writes
//! it into the published cache.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path as UrlPath, State},
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::{ResolveError, Visibility};
use crate::generator::Generator;
use crate::helpers;
use crate::Press;

/// Server state
struct ServerState {
    press: Press,
    generator: Generator,
    preview: bool,
}

/// Start the blog server
pub async fn start(press: &Press, ip: &str, port: u16, preview: bool) -> Result<()> {
    let state = Arc::new(ServerState {
        generator: Generator::new(press)?,
        press: press.clone(),
        preview,
    });

    let blog_route = format!("/{}", press.config.blog_dir.trim_matches('/'));
    let slug_route = format!("{}/:slug", blog_route);

    let app = Router::new()
        .route("/", get(root_handler))
        .route(&blog_route, get(list_handler))
        .route(&format!("{}/", blog_route), get(list_handler))
        .route(&slug_route, get(post_handler))
        .fallback(static_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    // Handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    if preview {
        println!("Preview mode: draft content is visible.");
    }
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// The root only redirects to the blog index
async fn root_handler(State(state): State<Arc<ServerState>>) -> Redirect {
    Redirect::to(&helpers::blog_path(&state.press.config))
}

/// `GET /blog` - the list page
async fn list_handler(State(state): State<Arc<ServerState>>) -> Response {
    let built = state
        .press
        .public_dir
        .join(&state.press.config.blog_dir)
        .join("index.html");

    if let Ok(html) = tokio::fs::read_to_string(&built).await {
        return Html(html).into_response();
    }

    let visibility = Visibility::from_preview(state.preview);
    let metas = match state.generator.store().list(visibility) {
        Ok(metas) => metas,
        Err(e) => return internal_error(e.into()),
    };

    match state.generator.render_list(&metas) {
        Ok(html) => {
            if !state.preview {
                cache_page(&built, &html).await;
            }
            Html(html).into_response()
        }
        Err(e) => internal_error(e),
    }
}

/// `GET /blog/:slug` - a single post page, generated on demand when it was
/// not part of the build
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    UrlPath(slug): UrlPath<String>,
) -> Response {
    // Route parameters arrive percent-decoded; anything that is not a
    // single path segment cannot name a post.
    if slug.is_empty() || slug == ".." || slug.contains(['/', '\\']) {
        return not_found_response(&state).await;
    }

    let built = state.generator.post_output_path(&slug);
    if let Ok(html) = tokio::fs::read_to_string(&built).await {
        return Html(html).into_response();
    }

    let visibility = Visibility::from_preview(state.preview);
    match state.generator.store().resolve_page(&slug, visibility) {
        Ok(payload) => match state.generator.render_post(&payload) {
            Ok(html) => {
                if !state.preview {
                    match state.generator.write_post_page(&slug, &html) {
                        Ok(()) => tracing::info!("Cached on-demand render for {:?}", slug),
                        Err(e) => {
                            tracing::warn!("Could not cache render for {:?}: {}", slug, e)
                        }
                    }
                }
                Html(html).into_response()
            }
            Err(e) => internal_error(e),
        },
        Err(ResolveError::NotFound(slug)) => {
            tracing::debug!("No post for slug {:?}", slug);
            not_found_response(&state).await
        }
        Err(ResolveError::Content(e)) => internal_error(e.into()),
    }
}

/// Serve everything else (stylesheet, cached pages) from the public directory
async fn static_handler(State(state): State<Arc<ServerState>>, request: Request<Body>) -> Response {
    let mut service = ServeDir::new(&state.press.public_dir).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

/// The 404 outcome: the built page when available, a fresh render otherwise
async fn not_found_response(state: &ServerState) -> Response {
    let html = match tokio::fs::read_to_string(state.press.public_dir.join("404.html")).await {
        Ok(html) => html,
        Err(_) => state
            .generator
            .render_not_found()
            .unwrap_or_else(|_| "404 Not Found".to_string()),
    };
    (StatusCode::NOT_FOUND, Html(html)).into_response()
}

fn internal_error(err: anyhow::Error) -> Response {
    tracing::error!("Request failed: {:#}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

/// Write an on-demand render into the public directory
async fn cache_page(path: &Path, html: &str) {
    if let Some(parent) = path.parent() {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            tracing::warn!("Could not create {:?}: {}", parent, e);
            return;
        }
    }
    match tokio::fs::write(path, html).await {
        Ok(()) => tracing::debug!("Cached {:?}", path),
        Err(e) => tracing::warn!("Could not cache {:?}: {}", path, e),
    }
}
