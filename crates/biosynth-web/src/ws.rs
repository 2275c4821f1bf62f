//! WebSocket simulation channel.
//!
//! Each text frame from the client is a JSON [`SynthesisRequest`]; the server
//! answers with one `processing` event per pipeline stage and a terminal
//! `completed` or `error` event. Requests on one socket run one at a time;
//! frames received meanwhile are queued, and closing the socket abandons the
//! request in flight.

use axum::extract::ws::{Message, Utf8Bytes, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use biosynth_common::SynthesisRequest;
use biosynth_engine::{PipelineEvent, SynthesisService};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde::Serialize;
use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::state::SharedState;

/// GET /ws/simulate/{client_id}
pub async fn simulate(
    ws: WebSocketUpgrade,
    Path(client_id): Path<String>,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    let service = state.service.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, client_id, service))
}

async fn handle_socket(socket: WebSocket, client_id: String, service: Arc<SynthesisService>) {
    info!(client_id = %client_id, "WebSocket client connected");
    let (mut sink, mut stream) = socket.split();
    // Text frames that arrived while an earlier request was running.
    let mut queued: VecDeque<Utf8Bytes> = VecDeque::new();

    loop {
        let text = match queued.pop_front() {
            Some(text) => text,
            None => match next_text(&mut stream).await {
                Some(text) => text,
                None => break,
            },
        };

        let request: SynthesisRequest = match serde_json::from_str(text.as_str()) {
            Ok(r) => r,
            Err(e) => {
                if send_json(&mut sink, &error_frame(format!("Invalid request: {}", e))).await.is_err() {
                    break;
                }
                continue;
            }
        };

        if run_request(&mut sink, &mut stream, &mut queued, &service, request).await.is_break() {
            break;
        }
    }

    info!(client_id = %client_id, "WebSocket client disconnected");
}

/// Next text frame; `None` once the client closes or the socket fails.
async fn next_text<R>(stream: &mut R) -> Option<Utf8Bytes>
where
    R: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => return Some(text),
            Ok(Message::Close(_)) => return None,
            Ok(_) => continue,
            Err(e) => {
                debug!(error = %e, "WebSocket receive failed");
                return None;
            }
        }
    }
    None
}

/// Runs one request, forwarding progress as it arrives, while still reading
/// the socket. The run is dropped as soon as the client closes or a send
/// fails; `Break` means the client is gone.
async fn run_request<S, R>(
    sink: &mut S,
    stream: &mut R,
    queued: &mut VecDeque<Utf8Bytes>,
    service: &Arc<SynthesisService>,
    request: SynthesisRequest,
) -> ControlFlow<()>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
    R: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let outcome = {
        let (tx, mut rx) = mpsc::unbounded_channel::<PipelineEvent>();
        let svc = service.clone();
        let run = async move {
            let outcome = svc.synthesize_streaming(&request, &tx).await;
            drop(tx);
            Ok::<_, axum::Error>(outcome)
        };
        let forward = async {
            while let Some(event) = rx.recv().await {
                send_json(&mut *sink, &event).await?;
            }
            Ok::<(), axum::Error>(())
        };
        let work = async { tokio::try_join!(run, forward) };
        tokio::pin!(work);

        loop {
            tokio::select! {
                done = &mut work => match done {
                    Ok((outcome, ())) => break outcome,
                    Err(e) => {
                        debug!(error = %e, "WebSocket send failed, abandoning request");
                        return ControlFlow::Break(());
                    }
                },
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => queued.push_back(text),
                    Some(Ok(Message::Close(_))) | None => {
                        info!("WebSocket closed mid-request, abandoning request");
                        return ControlFlow::Break(());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(error = %e, "WebSocket receive failed mid-request");
                        return ControlFlow::Break(());
                    }
                },
            }
        }
    };

    if let Err(e) = outcome {
        warn!(error = %e, "Rejected WebSocket synthesis request");
        if send_json(sink, &error_frame(e.to_string())).await.is_err() {
            return ControlFlow::Break(());
        }
    }
    ControlFlow::Continue(())
}

#[derive(Serialize)]
struct ErrorFrame {
    status: &'static str,
    error: String,
}

fn error_frame(error: String) -> ErrorFrame {
    ErrorFrame { status: "error", error }
}

async fn send_json<S, T>(sink: &mut S, value: &T) -> Result<(), axum::Error>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
    T: Serialize,
{
    match serde_json::to_string(value) {
        Ok(json) => sink.send(Message::Text(json.into())).await,
        Err(e) => {
            warn!(error = %e, "Failed to serialise WebSocket frame");
            Ok(())
        }
    }
}
