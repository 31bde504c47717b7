//! Local development server.
//!
//! Serves the route table over HTTP. Each request is converted into the gateway event
//! the Lambda runtime would receive, and `x-customer-*` headers stand in for the
//! authorizer context.

use std::collections::HashMap;

use anyhow::Result;
use axum::{
    body::to_bytes,
    extract::{Query, Request, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use base64::Engine;
use serde_json::{Map, Value};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;

use appointsync_core::response::ResponseEnvelope;

use crate::pipeline::{InboundEvent, RequestContext};
use crate::routes::Routes;

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Request headers copied into the authorizer context, by context name.
const AUTHORIZER_HEADERS: [(&str, &str); 6] = [
    ("x-customer-id", "shopifyCustomerId"),
    ("x-customer-email", "email"),
    ("x-customer-phone", "phone"),
    ("x-customer-first-name", "firstName"),
    ("x-customer-last-name", "lastName"),
    ("x-shop-domain", "shopDomain"),
];

pub fn create_app(routes: Routes) -> Router {
    Router::new()
        .fallback(forward)
        .layer(TraceLayer::new_for_http())
        .with_state(routes)
}

/// Binds `host:port` and serves until Ctrl+C or SIGTERM.
pub async fn serve(routes: Routes, host: &str, port: u16) -> Result<()> {
    let listener = TcpListener::bind(format!("{host}:{port}")).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, create_app(routes))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn forward(State(routes): State<Routes>, request: Request) -> Response {
    match into_event(request).await {
        Ok(event) => into_response(routes.dispatch(event).await),
        Err(response) => response,
    }
}

async fn into_event(request: Request) -> Result<InboundEvent, Response> {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_BODY_BYTES).await.map_err(|error| {
        tracing::warn!(error = %error, "Unreadable request body");
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response()
    })?;

    let headers: HashMap<String, String> = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((name.as_str().to_string(), value.to_string()))
        })
        .collect();

    let authorizer: Map<String, Value> = AUTHORIZER_HEADERS
        .iter()
        .filter_map(|(header, name)| {
            let value = headers.get(*header)?;
            Some((name.to_string(), Value::String(value.clone())))
        })
        .collect();

    let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .ok()
        .map(|Query(params)| params)
        .filter(|params| !params.is_empty());

    // Binary bodies travel base64-encoded, as the gateway sends them.
    let (body, is_base64_encoded) = if bytes.is_empty() {
        (None, false)
    } else {
        match String::from_utf8(bytes.to_vec()) {
            Ok(text) => (Some(text), false),
            Err(_) => (
                Some(base64::engine::general_purpose::STANDARD.encode(&bytes)),
                true,
            ),
        }
    };

    let path = parts.uri.path().to_string();
    Ok(InboundEvent {
        resource: Some(path.clone()),
        path: Some(path),
        http_method: parts.method.as_str().to_string(),
        headers: Some(headers),
        query_string_parameters: query,
        body,
        is_base64_encoded,
        request_context: Some(RequestContext {
            authorizer: Some(authorizer),
            request_id: Some(format!("local-{}", chrono::Utc::now().timestamp_micros())),
        }),
    })
}

fn into_response(envelope: ResponseEnvelope) -> Response {
    let status =
        StatusCode::from_u16(envelope.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, envelope.body).into_response();

    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    for (name, value) in &envelope.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_str()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }

    response
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!(error = %error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!(error = %error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
