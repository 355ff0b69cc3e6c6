//! Callback API endpoint.
//!
//! VK POSTs every community event to our URL and expects the plain string
//! `ok` back, or the confirmation code for the `confirmation` event.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::event::{GroupEvent, IncomingMessage};

/// What the endpoint checks incoming requests against.
#[derive(Debug, Clone)]
pub struct CallbackSettings {
    pub group_id: u64,
    pub confirmation: String,
    pub secret: Option<String>,
}

struct CallbackState {
    settings: CallbackSettings,
    events: mpsc::Sender<IncomingMessage>,
}

#[derive(Debug, PartialEq)]
enum Outcome {
    /// Reply with the confirmation code.
    Confirm(String),
    /// Reply `ok`, forwarding the message if the event carried one.
    Accept(Option<IncomingMessage>),
    /// Wrong community or wrong secret.
    Reject,
}

fn classify(settings: &CallbackSettings, event: GroupEvent) -> Outcome {
    if event.group_id.is_some_and(|id| id != settings.group_id as i64) {
        return Outcome::Reject;
    }

    if event.kind == "confirmation" {
        return Outcome::Confirm(settings.confirmation.clone());
    }

    if let Some(expected) = &settings.secret {
        if event.secret.as_deref() != Some(expected.as_str()) {
            return Outcome::Reject;
        }
    }

    Outcome::Accept(event.into_message())
}

async fn handle(State(state): State<Arc<CallbackState>>, Json(event): Json<GroupEvent>) -> Response {
    match classify(&state.settings, event) {
        Outcome::Confirm(code) => code.into_response(),
        Outcome::Accept(message) => {
            if let Some(message) = message {
                if state.events.send(message).await.is_err() {
                    warn!("Event receiver closed, dropping callback event");
                }
            }
            "ok".into_response()
        }
        Outcome::Reject => {
            warn!("Rejected callback request (group id or secret mismatch)");
            StatusCode::FORBIDDEN.into_response()
        }
    }
}

/// Serve the Callback API endpoint until Ctrl+C.
pub async fn serve(
    port: u16,
    settings: CallbackSettings,
    events: mpsc::Sender<IncomingMessage>,
) -> Result<()> {
    let state = Arc::new(CallbackState { settings, events });
    let app = Router::new().route("/", post(handle)).with_state(state);

    let address = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!("Callback API listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down callback server");
        })
        .await
        .context("Callback server failed")
}
