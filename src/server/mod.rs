use axum::body::Body;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub mod api;
pub mod routes;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Every request goes through [routes::route_request]; axum only supplies transport and tracing.
pub fn router() -> Router {
    Router::new()
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http())
}

pub fn run_server(bind_addr: &str) -> std::io::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(bind_addr).await?;
        info!(bind_addr, "fairplay server listening on http://{bind_addr}");
        axum::serve(listener, router()).await
    })
}

async fn dispatch(method: Method, uri: Uri, body: String) -> Response {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    // Balancing is CPU-bound; keep it off the async workers.
    let routed =
        tokio::task::spawn_blocking(move || routes::route_request(method.as_str(), &path, &body))
            .await;

    match routed {
        Ok(response) => {
            let status =
                StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                [(header::CONTENT_TYPE, response.content_type)],
                Body::from(response.body),
            )
                .into_response()
        }
        Err(err) => {
            error!(error = %err, "request handler panicked");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
