//! HTTP + WebSocket API for the recognizer
//!
//! Endpoints:
//! - POST /tick - Apply one detection batch
//! - POST /reset - Clear sign history
//! - GET /state?t= - Current display state
//! - GET /catalogue - Known jutsu
//! - WS /ws - Live tick outputs
//! - GET /health - Health check
//!
//! One recognizer per server. Each request holds the write lock for its whole
//! batch and broadcasts before releasing it, so batches never interleave and
//! subscribers see outputs in lock order.
//!
//! Requests without `t` use the server clock, clamped to the latest tick time
//! so a client-driven timeline never runs backwards.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::core::Recognizer;
use crate::types::{Detection, DisplayState, ReasonCode, SymbolId, TickOutput};

/// App state
pub struct AppState {
    pub recognizer: RwLock<Recognizer>,
    /// Recognizer time zero
    pub started: DateTime<Utc>,
    pub catalogue_digest: String,
    pub update_tx: broadcast::Sender<TickOutput>,
}

impl AppState {
    /// Seconds since the server started
    fn server_now(&self) -> f64 {
        let elapsed = Utc::now() - self.started;
        elapsed.num_microseconds().unwrap_or(i64::MAX) as f64 / 1_000_000.0
    }

    /// Server clock, never behind the latest tick the recognizer has seen
    fn now(&self, recognizer: &Recognizer) -> f64 {
        let now = self.server_now();
        recognizer.last_tick_time().map_or(now, |last| last.max(now))
    }
}

/// Tick request
#[derive(Debug, Deserialize)]
pub struct TickRequest {
    #[serde(default)]
    pub detections: Vec<Detection>,
    /// Explicit tick time; server clock when absent
    pub t: Option<f64>,
}

/// Optional query time for `/state`
#[derive(Debug, Default, Deserialize)]
pub struct StateQuery {
    pub t: Option<f64>,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub catalogue_digest: String,
    pub symbols: usize,
    pub sequences: usize,
    pub ticks: u64,
}

/// One catalogue row as served
#[derive(Debug, Serialize)]
pub struct SequenceSummary {
    pub index: usize,
    pub name: String,
    pub symbols: Vec<SymbolId>,
    /// Sign labels in the trail language
    pub signs: String,
}

/// Catalogue response
#[derive(Debug, Serialize)]
pub struct CatalogueResponse {
    pub languages: Vec<String>,
    pub language: usize,
    pub sequences: Vec<SequenceSummary>,
}

fn app_state(recognizer: Recognizer) -> Arc<AppState> {
    let (update_tx, _) = broadcast::channel(100);
    Arc::new(AppState {
        catalogue_digest: recognizer.catalogue().digest(),
        recognizer: RwLock::new(recognizer),
        started: Utc::now(),
        update_tx,
    })
}

/// Create the API router
pub fn create_router(recognizer: Recognizer) -> Router {
    let state = app_state(recognizer);

    Router::new()
        .route("/health", get(health))
        .route("/tick", post(tick))
        .route("/reset", post(reset))
        .route("/state", get(current_state))
        .route("/catalogue", get(catalogue))
        .route("/ws", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let recognizer = state.recognizer.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        catalogue_digest: state.catalogue_digest.clone(),
        symbols: recognizer.catalogue().symbol_count(),
        sequences: recognizer.catalogue().sequences().len(),
        ticks: recognizer.tick_count(),
    })
}

/// Apply one detection batch
async fn tick(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TickRequest>,
) -> Json<TickOutput> {
    let mut recognizer = state.recognizer.write().await;
    let now = req
        .t
        .filter(|t| t.is_finite())
        .unwrap_or_else(|| state.now(&recognizer));

    let previous = recognizer.display_state(now);
    let (output, report) = recognizer.tick_with_report(&req.detections, now);
    let _ = state.update_tx.send(output.clone());
    drop(recognizer);

    for detection in report.unknown() {
        warn!(symbol = detection.symbol, confidence = detection.confidence, "unknown sign id rejected");
    }
    if is_new_match(&previous, &output) {
        info!(text = %output.text, t = now, "jutsu recognized");
    }
    Json(output)
}

/// Clear sign history
async fn reset(State(state): State<Arc<AppState>>) -> Json<TickOutput> {
    let mut recognizer = state.recognizer.write().await;
    let now = state.now(&recognizer);
    recognizer.reset();
    let mut output = recognizer.current_output(now);
    output.reason = ReasonCode::R002_HISTORY_RESET;
    let _ = state.update_tx.send(output.clone());
    Json(output)
}

/// Current display state at `t`, or at the clamped server time
async fn current_state(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StateQuery>,
) -> Json<TickOutput> {
    let recognizer = state.recognizer.read().await;
    let now = query
        .t
        .filter(|t| t.is_finite())
        .unwrap_or_else(|| state.now(&recognizer));
    Json(recognizer.current_output(now))
}

/// A held window re-matches every tick; only a name that was not already on
/// screen counts as a new recognition
fn is_new_match(previous: &DisplayState, output: &TickOutput) -> bool {
    output.reason == ReasonCode::R003_SEQUENCE_MATCHED && previous.match_index != output.match_index
}

/// Known jutsu in the configured language
async fn catalogue(State(state): State<Arc<AppState>>) -> Json<CatalogueResponse> {
    let recognizer = state.recognizer.read().await;
    let config = recognizer.config();
    let catalogue = recognizer.catalogue();

    let sequences = catalogue
        .sequences()
        .iter()
        .enumerate()
        .map(|(index, entry)| SequenceSummary {
            index,
            name: entry.display_name(config.language, &config.category_separator),
            symbols: entry.symbols.clone(),
            signs: catalogue.render(entry.symbols.iter().copied(), config.trail_language, " "),
        })
        .collect();

    Json(CatalogueResponse {
        languages: catalogue.languages().to_vec(),
        language: config.language,
        sequences,
    })
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let rx = state.update_tx.subscribe();
    ws.on_upgrade(move |socket| handle_websocket(socket, rx))
}

/// Forward tick outputs until either side goes away
async fn handle_websocket(socket: WebSocket, mut rx: broadcast::Receiver<TickOutput>) {
    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(update) => {
                    let json = serde_json::to_string(&update).unwrap_or_default();
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "websocket subscriber lagging");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if matches!(message, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
}

/// Run the API server
pub async fn run_server(addr: &str, recognizer: Recognizer) -> Result<(), crate::Error> {
    let router = create_router(recognizer);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "kuji API listening");
    info!("  POST /tick       - Apply detection batch");
    info!("  POST /reset      - Clear sign history");
    info!("  GET  /state      - Current display state (?t= optional)");
    info!("  GET  /catalogue  - Known jutsu");
    info!("  WS   /ws         - Live updates");
    info!("  GET  /health     - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Catalogue;
    use crate::types::DisplayMode;
    use crate::RecognizerConfig;

    fn recognizer() -> Recognizer {
        let catalogue = Catalogue::builder(&["en"])
            .symbol(&["A"])
            .symbol(&["B"])
            .symbol(&["C"])
            .sequence(&[""], &["Fireball"], &[0, 1, 2])
            .build()
            .unwrap();
        let config = RecognizerConfig {
            score_threshold: 0.5,
            inactivity_timeout: 10.0,
            ..Default::default()
        };
        Recognizer::new(Arc::new(catalogue), config).unwrap()
    }

    /// The last broadcast must describe the state left by the last lock holder
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_ticks_broadcast_in_lock_order() {
        let state = app_state(recognizer());
        let mut rx = state.update_tx.subscribe();

        let handles: Vec<_> = (0..32u32)
            .map(|i| {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let req = TickRequest {
                        detections: vec![Detection::new(i % 3, 0.9)],
                        t: Some(i as f64 * 0.01),
                    };
                    tick(State(state), Json(req)).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let mut received = 0;
        let mut last = None;
        while let Ok(output) = rx.try_recv() {
            received += 1;
            last = Some(output);
        }
        assert_eq!(received, 32);

        let recognizer = state.recognizer.read().await;
        assert_eq!(last.unwrap().trail, recognizer.state().display_trail().to_vec());
    }

    fn output(reason: ReasonCode, match_index: Option<usize>) -> TickOutput {
        let display = match match_index {
            Some(index) => DisplayState::showing_match(index, "Fireball".into()),
            None => DisplayState::showing_trail(String::new()),
        };
        TickOutput::new(0.0, display, Vec::new(), 0, 0, false, reason)
    }

    #[test]
    fn test_first_match_is_new() {
        let previous = DisplayState::showing_trail("AB".into());
        assert!(is_new_match(&previous, &output(ReasonCode::R003_SEQUENCE_MATCHED, Some(0))));
    }

    #[test]
    fn test_held_match_is_not_new() {
        let previous = DisplayState::showing_match(0, "Fireball".into());
        assert_eq!(previous.mode, DisplayMode::ShowingMatch);
        assert!(!is_new_match(&previous, &output(ReasonCode::R003_SEQUENCE_MATCHED, Some(0))));
    }

    #[test]
    fn test_different_sequence_is_new() {
        let previous = DisplayState::showing_match(0, "Fireball".into());
        assert!(is_new_match(&previous, &output(ReasonCode::R003_SEQUENCE_MATCHED, Some(1))));
        assert!(!is_new_match(&previous, &output(ReasonCode::R004_SHOWING_MATCH, Some(0))));
    }
}
