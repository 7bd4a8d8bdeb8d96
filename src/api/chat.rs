//! Agent chat endpoints.
//!
//! The shopping assistant keeps per-thread history and can pause a turn for
//! checkout approval; the math agent is stateless.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::Stream;
use tokio::sync::{mpsc, OwnedMutexGuard};
use tower_http::trace::TraceLayer;

use super::error::ApiError;
use super::routes::{cors, health};
use super::types::{
    ChatReply, ChatRequest, IncomingMessage, InvokeRequest, MathChatRequest, MathResponse,
};
use crate::agent::{Agent, AgentEvent, Conversation, EventSender, RunOutcome, ThreadStore};
use crate::llm::ChatMessage;

/// Shared state of the shopping assistant server.
#[derive(Clone)]
pub struct ChatState {
    agent: Arc<Agent>,
    threads: ThreadStore,
}

impl ChatState {
    pub fn new(agent: Agent) -> Self {
        Self {
            agent: Arc::new(agent),
            threads: ThreadStore::new(),
        }
    }
}

pub fn shopping_router(state: ChatState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/chat/stream", post(chat_stream))
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn math_router(agent: Arc<Agent>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/invoke", post(invoke))
        .route("/chat", post(math_chat))
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(agent)
}

/// What to do with a locked thread.
enum Turn {
    NewInput,
    Resume(bool),
}

/// Lock the request's thread and apply its input.
///
/// A new thread is seeded with every message; an existing one only gets the
/// last, since clients resend the whole transcript. A paused thread accepts
/// nothing but a decision, and only a paused thread accepts one.
async fn prepare_turn(
    state: &ChatState,
    req: ChatRequest,
) -> Result<(OwnedMutexGuard<Conversation>, Turn), ApiError> {
    if let Some(approved) = req.resume_value {
        let conversation = match state.threads.get(&req.thread_id).await {
            Some(conversation) => conversation.lock_owned().await,
            None => return Err(nothing_pending(&req.thread_id)),
        };
        if !conversation.is_interrupted() {
            return Err(nothing_pending(&req.thread_id));
        }
        tracing::info!(thread_id = %req.thread_id, approved, "Resuming thread");
        return Ok((conversation, Turn::Resume(approved)));
    }

    let (conversation, created) = state.threads.get_or_create(&req.thread_id).await;
    let mut conversation = conversation.lock_owned().await;
    if conversation.is_interrupted() {
        return Err(ApiError::Conflict(format!(
            "Thread {} is waiting for approval; send resume_value first",
            req.thread_id
        )));
    }

    let incoming: Vec<ChatMessage> = if created {
        req.messages
            .iter()
            .filter_map(IncomingMessage::to_chat_message)
            .collect()
    } else {
        req.messages
            .last()
            .and_then(IncomingMessage::to_chat_message)
            .into_iter()
            .collect()
    };
    if incoming.is_empty() {
        return Err(ApiError::Unprocessable(
            "messages must contain at least one message".to_string(),
        ));
    }

    tracing::info!(
        thread_id = %req.thread_id,
        new_thread = created,
        added = incoming.len(),
        "Chat turn"
    );
    conversation.messages.extend(incoming);
    Ok((conversation, Turn::NewInput))
}

fn nothing_pending(thread_id: &str) -> ApiError {
    ApiError::Conflict(format!(
        "Thread {} has nothing waiting for approval",
        thread_id
    ))
}

async fn execute_turn(
    agent: &Agent,
    conversation: &mut Conversation,
    turn: Turn,
    events: Option<&EventSender>,
) -> anyhow::Result<RunOutcome> {
    match turn {
        Turn::NewInput => agent.run(conversation, events).await,
        Turn::Resume(approved) => agent.resume(conversation, approved, events).await,
    }
}

async fn chat(
    State(state): State<ChatState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let thread_id = req.thread_id.clone();
    let (mut conversation, turn) = prepare_turn(&state, req).await?;

    let reply = match execute_turn(&state.agent, &mut conversation, turn, None).await? {
        RunOutcome::Completed { reply } => ChatReply::Completed { thread_id, reply },
        RunOutcome::Interrupted { requests } => ChatReply::Interrupted {
            thread_id,
            interrupts: requests,
        },
    };
    Ok(Json(reply))
}

/// Stream a turn as SSE `data:` frames, terminated by `data: [DONE]`.
async fn chat_stream(
    State(state): State<ChatState>,
    Json(req): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let thread_id = req.thread_id.clone();
    let (mut conversation, turn) = prepare_turn(&state, req).await?;
    let (tx, mut rx) = mpsc::unbounded_channel::<AgentEvent>();

    // The run owns the thread lock and keeps going if the client disconnects.
    let agent = state.agent.clone();
    tokio::spawn(async move {
        if let Err(e) = execute_turn(&agent, &mut conversation, turn, Some(&tx)).await {
            tracing::error!(thread_id = %thread_id, "Chat turn failed: {:#}", e);
            let _ = tx.send(AgentEvent::Error {
                message: format!("{:#}", e),
            });
        }
    });

    let stream = async_stream::stream! {
        while let Some(ev) = rx.recv().await {
            match Event::default().json_data(&ev) {
                Ok(sse) => yield Ok(sse),
                Err(e) => {
                    tracing::error!(event = %ev.event_name(), error = %e, "Failed to serialize SSE event; dropping");
                }
            }
        }
        yield Ok(Event::default().data("[DONE]"));
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive"),
    ))
}

async fn invoke(
    State(agent): State<Arc<Agent>>,
    Json(req): Json<InvokeRequest>,
) -> Result<Json<MathResponse>, ApiError> {
    let mut conversation = Conversation::from_messages(vec![ChatMessage::user(req.message)]);
    agent.run(&mut conversation, None).await?;
    Ok(Json(MathResponse::from_history(
        conversation.llm_calls,
        &conversation.messages,
    )))
}

async fn math_chat(
    State(agent): State<Arc<Agent>>,
    Json(req): Json<MathChatRequest>,
) -> Result<Json<MathResponse>, ApiError> {
    let messages: Vec<ChatMessage> = req
        .messages
        .iter()
        .filter_map(IncomingMessage::to_chat_message)
        .collect();
    if messages.is_empty() {
        return Err(ApiError::Unprocessable(
            "messages must contain at least one message".to_string(),
        ));
    }

    let mut conversation = Conversation::from_messages(messages);
    agent.run(&mut conversation, None).await?;
    Ok(Json(MathResponse::from_history(
        conversation.llm_calls,
        &conversation.messages,
    )))
}
