use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    serve, Json, Router,
};
use minijinja::Environment;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::constants;
use crate::router::{AssistantReply, IntentRouter, RouterError};
use crate::transcript::{ChatMessage, Transcript};

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

// Shared application state. Holds no session data: each WebSocket connection
// owns its own transcript.
#[derive(Clone)]
struct AppState {
    templates: Arc<Environment<'static>>,
    router: IntentRouter,
}

fn create_minijinja_env() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.add_template("index.html", INDEX_TEMPLATE)
        .context("Failed to parse index.html template")?;
    Ok(env)
}

/// Build the application router. Exposed for tests.
pub fn app(router: IntentRouter) -> Result<Router> {
    let templates = create_minijinja_env().context("Failed to initialize template engine")?;
    let state = AppState {
        templates: Arc::new(templates),
        router,
    };

    Ok(Router::new()
        .route("/", get(index_handler))
        .route("/health", get(|| async { "ok" }))
        .route("/ws", get(ws_handler))
        .route("/api/chat", post(chat_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http()))
}

pub async fn start_web_server(port: u16, router: IntentRouter) -> Result<()> {
    let app = app(router)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}

async fn index_handler(State(state): State<AppState>) -> Result<Html<String>, Response> {
    state
        .templates
        .get_template("index.html")
        .and_then(|tmpl| {
            tmpl.render(minijinja::context! {
                title => constants::APP_TITLE,
                credential_prompt => constants::CREDENTIAL_PROMPT,
                missing_credential => constants::MISSING_CREDENTIAL_INFO,
                placeholder => constants::CHAT_PLACEHOLDER,
                zoom => constants::MAP_ZOOM,
            })
        })
        .map(Html)
        .map_err(|e| {
            error!("Failed to get or render template: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal Server Error: {}", e),
            )
                .into_response()
        })
}

#[derive(Deserialize, Debug)]
pub struct ChatRequest {
    #[serde(default)]
    pub credential: String,
    pub message: String,
    #[serde(default)]
    pub transcript: Transcript,
}

#[derive(Serialize, Debug)]
pub struct ChatResponse {
    pub reply: AssistantReply,
    pub display: String,
    pub transcript: Transcript,
}

// Stateless turn: the caller sends its transcript and gets the extended one back.
async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let ChatRequest {
        credential,
        message,
        mut transcript,
    } = request;

    match state
        .router
        .handle_turn(&mut transcript, &message, &credential)
        .await
    {
        Ok(reply) => Json(ChatResponse {
            display: reply.display(),
            reply,
            transcript,
        })
        .into_response(),
        Err(RouterError::MissingCredential) => error_response(
            StatusCode::UNAUTHORIZED,
            constants::MISSING_CREDENTIAL_INFO.to_string(),
        ),
        Err(e @ RouterError::Transcript(_)) => {
            warn!(error = %e, "Rejected chat turn");
            error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

// Frames received from the browser
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientFrame {
    Credential { key: String },
    Chat { text: String },
}

// Frames sent to the browser
#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerFrame<'a> {
    Info {
        message: &'a str,
    },
    History {
        messages: &'a [ChatMessage],
    },
    User {
        content: &'a str,
    },
    Assistant {
        display: String,
        #[serde(flatten)]
        reply: &'a AssistantReply,
    },
    Error {
        message: String,
    },
}

// One browser tab's worth of state, alive for the lifetime of its socket.
#[derive(Default)]
struct Session {
    transcript: Transcript,
    credential: String,
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let session_id = Uuid::new_v4();
    info!(%session_id, "WebSocket connection upgrade requested");
    ws.on_upgrade(move |socket| {
        handle_socket(socket, state).instrument(info_span!("session", id = %session_id))
    })
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    info!("New WebSocket connection established");
    let mut session = Session::default();

    if send_frame(
        &mut socket,
        &ServerFrame::Info {
            message: constants::MISSING_CREDENTIAL_INFO,
        },
    )
    .await
    .is_err()
    {
        warn!("Failed to send greeting to new WebSocket client");
        return;
    }

    while let Some(msg) = socket.recv().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => {
                info!("Client requested WebSocket close");
                break;
            }
            Ok(Message::Binary(_)) => {
                warn!("Received unexpected binary message from client");
                continue;
            }
            // Axum answers pings itself
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        };

        let frame = match serde_json::from_str::<ClientFrame>(&text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Unparseable client frame: {}", e);
                let reply = ServerFrame::Error {
                    message: format!("Invalid message: {}", e),
                };
                if send_frame(&mut socket, &reply).await.is_err() {
                    break;
                }
                continue;
            }
        };

        if handle_frame(&mut socket, &state.router, &mut session, frame)
            .await
            .is_err()
        {
            warn!("WebSocket client disconnected or send error. Closing connection.");
            break;
        }
    }
    info!(turns = session.transcript.len() / 2, "WebSocket connection closed");
}

async fn handle_frame(
    socket: &mut WebSocket,
    router: &IntentRouter,
    session: &mut Session,
    frame: ClientFrame,
) -> Result<()> {
    match frame {
        ClientFrame::Credential { key } => {
            session.credential = key;
            if session.credential.is_empty() {
                send_frame(
                    socket,
                    &ServerFrame::Info {
                        message: constants::MISSING_CREDENTIAL_INFO,
                    },
                )
                .await
            } else {
                info!("Credential supplied, chat unlocked");
                send_frame(
                    socket,
                    &ServerFrame::History {
                        messages: session.transcript.messages(),
                    },
                )
                .await
            }
        }
        ClientFrame::Chat { text } => {
            if session.credential.is_empty() {
                return send_frame(
                    socket,
                    &ServerFrame::Info {
                        message: constants::MISSING_CREDENTIAL_INFO,
                    },
                )
                .await;
            }
            send_frame(socket, &ServerFrame::User { content: &text }).await?;
            match router
                .handle_turn(&mut session.transcript, &text, &session.credential)
                .await
            {
                Ok(reply) => {
                    let frame = ServerFrame::Assistant {
                        display: reply.display(),
                        reply: &reply,
                    };
                    send_frame(socket, &frame).await
                }
                Err(e) => {
                    warn!(error = %e, "Rejected chat turn");
                    send_frame(
                        socket,
                        &ServerFrame::Error {
                            message: e.to_string(),
                        },
                    )
                    .await
                }
            }
        }
    }
}

async fn send_frame(socket: &mut WebSocket, frame: &ServerFrame<'_>) -> Result<()> {
    let json = serde_json::to_string(frame).context("Failed to serialize frame")?;
    socket
        .send(Message::Text(json))
        .await
        .context("Failed to send frame")
}
