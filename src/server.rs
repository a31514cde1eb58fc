//! HTTP server exposing the fulfillment endpoint.

use crate::config::ServerConfig;
use crate::conversation::{FulfillmentHandler, FulfillmentResponse, WebhookRequest};
use anyhow::{Context, Result};
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Build the router: the fulfillment route at `path` plus `/health`.
pub fn create_router(handler: Arc<FulfillmentHandler>, path: &str) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(path, post(fulfillment_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Answer one Dialogflow fulfillment request.
///
/// The response is only written once the turn's lookup has settled.
async fn fulfillment_handler(
    State(handler): State<Arc<FulfillmentHandler>>,
    Json(request): Json<WebhookRequest>,
) -> Json<FulfillmentResponse> {
    let reply = handler.handle(&request).await;

    debug!(
        "Replying with {} messages, {} suggestions{}",
        reply.messages().len(),
        reply.suggestions().len(),
        if reply.permission_request().is_some() {
            " and a permission prompt"
        } else {
            ""
        }
    );

    Json(reply.to_fulfillment())
}

/// Bind and serve until Ctrl+C or SIGTERM.
pub async fn run(config: &ServerConfig, handler: Arc<FulfillmentHandler>) -> Result<()> {
    let app = create_router(handler, &config.path);

    let bind_address = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    info!("Listening on http://{}{}", bind_address, config.path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::conversation::handler::tests::{banana, StubLookup};
    use crate::nutrition::LookupError;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app(stub: StubLookup) -> Router {
        let handler = Arc::new(FulfillmentHandler::new(&Config::default(), Arc::new(stub)));
        create_router(handler, "/fulfillment")
    }

    async fn post_json(app: Router, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/fulfillment")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn nutrition_request(text: &str) -> Value {
        json!({
            "responseId": "r-1",
            "session": "projects/macros/agent/sessions/s-1",
            "queryResult": {"queryText": text, "intent": {"displayName": "nutrition data"}},
            "originalDetectIntentRequest": {"source": "google", "payload": {"inputs": [{
                "rawInputs": [{"query": text}],
                "arguments": [{"name": "text", "textValue": text}]
            }]}}
        })
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(StubLookup::answering(Ok(vec![])))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_fulfillment_success() {
        let (status, body) = post_json(
            app(StubLookup::answering(Ok(vec![banana()]))),
            nutrition_request("I ate 1 banana"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let text = body["fulfillmentText"].as_str().unwrap();
        assert!(text.contains("Total Calories: 105"));
        assert!(text.contains("Total Protein: 1"));
        assert_eq!(body["payload"]["google"]["expectUserResponse"], true);
        assert_eq!(
            body["payload"]["google"]["richResponse"]["items"][1]["simpleResponse"]["textToSpeech"],
            "Ask me something else!"
        );
    }

    #[tokio::test]
    async fn test_fulfillment_upstream_failure_still_answers() {
        let (status, body) = post_json(
            app(StubLookup::answering(Err(LookupError::Transport(
                "request timed out after 4s".to_string(),
            )))),
            nutrition_request("I ate 1 banana"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let text = body["fulfillmentText"].as_str().unwrap();
        assert!(text.starts_with("Sorry"));
        assert!(!body["payload"]["google"]["richResponse"]["suggestions"]
            .as_array()
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_fulfillment_welcome_permission_prompt() {
        let (status, body) = post_json(
            app(StubLookup::answering(Ok(vec![]))),
            json!({"queryResult": {"intent": {"displayName": "Default Welcome Intent"}}}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["payload"]["google"]["systemIntent"]["data"]["permissions"],
            json!(["NAME"])
        );
    }

    #[tokio::test]
    async fn test_fulfillment_rejects_non_json() {
        let response = app(StubLookup::answering(Ok(vec![])))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/fulfillment")
                    .header("content-type", "application/json")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }
}
