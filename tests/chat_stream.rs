mod common;

use std::sync::Arc;

use serde_json::{json, Value};
use storefront::agent::{math_agent, shopping_agent};
use storefront::api::{
    math_router, shopping_router, store_router, ChatReply, ChatState, ErrorResponse, MathResponse,
};
use storefront::config::Config;
use storefront::llm::{LlmClient, Role, ScriptedClient};
use storefront::store::Database;

use common::{spawn, stocked_store};

/// Data payloads of an SSE body, in order.
fn data_frames(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| data.trim().to_string())
        .collect()
}

fn event_types(frames: &[String]) -> Vec<String> {
    frames
        .iter()
        .map(|frame| {
            if frame == "[DONE]" {
                return "[DONE]".to_string();
            }
            let value: Value = serde_json::from_str(frame).expect("frame json");
            value["type"].as_str().unwrap_or_default().to_string()
        })
        .collect()
}

async fn post_stream(http: &reqwest::Client, base: &str, body: Value) -> Vec<String> {
    let response = http
        .post(format!("{}/chat/stream", base))
        .json(&body)
        .send()
        .await
        .expect("stream request");
    assert!(response.status().is_success());
    data_frames(&response.text().await.expect("stream body"))
}

async fn shopping_server(db: &Database, llm: Arc<ScriptedClient>) -> String {
    let store = spawn(store_router(db.clone())).await;
    let config = Config {
        backend_url: store,
        ..Config::default()
    };
    let llm: Arc<dyn LlmClient> = llm;
    let agent = shopping_agent(llm, "test-model", &config);
    spawn(shopping_router(ChatState::new(agent))).await
}

#[tokio::test]
async fn checkout_pauses_for_approval_then_resumes() {
    let (db, products) = stocked_store().await;
    let football = products[0].id.to_string();
    let llm = Arc::new(ScriptedClient::new(vec![
        ScriptedClient::call(
            Some("I will add the football to your cart."),
            "call_1",
            "add_to_cart",
            json!({ "product_id": football }),
        ),
        ScriptedClient::call(Some("Now I will check out."), "call_2", "checkout", json!({})),
        ScriptedClient::reply("Your order is placed."),
    ]));
    let base = shopping_server(&db, llm.clone()).await;
    let http = reqwest::Client::new();
    let messages = json!([{ "role": "user", "content": "Buy me a football" }]);

    let frames = post_stream(
        &http,
        &base,
        json!({ "messages": messages, "thread_id": "buyer" }),
    )
    .await;
    assert_eq!(
        event_types(&frames),
        ["token", "tool_start", "tool_end", "token", "interrupt", "[DONE]"]
    );
    let interrupt: Value = serde_json::from_str(&frames[4]).expect("interrupt");
    assert_eq!(interrupt["content"][0]["name"], "checkout");
    assert_eq!(db.get_cart().await.len(), 1);
    assert!(db.list_orders().await.is_empty());

    let frames = post_stream(
        &http,
        &base,
        json!({ "messages": messages, "thread_id": "buyer", "resume_value": true }),
    )
    .await;
    assert_eq!(
        event_types(&frames),
        ["tool_start", "tool_end", "token", "[DONE]"]
    );
    let tool_end: Value = serde_json::from_str(&frames[1]).expect("tool_end");
    assert!(tool_end["output"]
        .as_str()
        .unwrap_or_default()
        .starts_with("Order created successfully!"));
    let token: Value = serde_json::from_str(&frames[2]).expect("token");
    assert_eq!(token["content"], "Your order is placed.");

    assert!(db.get_cart().await.is_empty());
    assert_eq!(db.list_orders().await.len(), 1);
    assert_eq!(llm.remaining(), 0);
}

#[tokio::test]
async fn existing_threads_only_take_the_last_message() {
    let (db, _) = stocked_store().await;
    let llm = Arc::new(ScriptedClient::new(vec![
        ScriptedClient::reply("Hello! How can I help?"),
        ScriptedClient::reply("We sell sports gear."),
    ]));
    let base = shopping_server(&db, llm.clone()).await;
    let http = reqwest::Client::new();

    let first: ChatReply = http
        .post(format!("{}/chat", base))
        .json(&json!({ "messages": [{ "role": "user", "content": "hi" }] }))
        .send()
        .await
        .expect("chat")
        .json()
        .await
        .expect("json");
    assert_eq!(
        first,
        ChatReply::Completed {
            thread_id: "1".to_string(),
            reply: "Hello! How can I help?".to_string()
        }
    );

    // The client resends the whole transcript.
    let _: ChatReply = http
        .post(format!("{}/chat", base))
        .json(&json!({ "messages": [
            { "role": "user", "content": "hi" },
            { "role": "assistant", "content": "Hello! How can I help?" },
            { "role": "user", "content": "what do you sell?" }
        ] }))
        .send()
        .await
        .expect("chat")
        .json()
        .await
        .expect("json");

    let requests = llm.requests();
    assert_eq!(requests.len(), 2);
    // system + user + assistant + user
    assert_eq!(requests[1].len(), 4);
    assert_eq!(
        requests[1][3].content.as_deref(),
        Some("what do you sell?")
    );
}

#[tokio::test]
async fn single_shot_chat_reports_interrupts() {
    let (db, products) = stocked_store().await;
    db.add_to_cart(products[1].id, 1).await.expect("add");
    let llm = Arc::new(ScriptedClient::new(vec![ScriptedClient::call(
        None,
        "call_1",
        "checkout",
        json!({}),
    )]));
    let base = shopping_server(&db, llm).await;

    let reply: ChatReply = reqwest::Client::new()
        .post(format!("{}/chat", base))
        .json(&json!({ "messages": [{ "role": "user", "content": "checkout" }], "thread_id": "t" }))
        .send()
        .await
        .expect("chat")
        .json()
        .await
        .expect("json");

    let ChatReply::Interrupted { thread_id, interrupts } = reply else {
        panic!("expected an interrupt, got {:?}", reply);
    };
    assert_eq!(thread_id, "t");
    assert_eq!(interrupts.len(), 1);
    assert_eq!(interrupts[0].name, "checkout");
    assert_eq!(db.get_cart().await.len(), 1);
}

#[tokio::test]
async fn paused_threads_only_accept_a_decision() {
    let (db, products) = stocked_store().await;
    db.add_to_cart(products[0].id, 1).await.expect("add");
    let llm = Arc::new(ScriptedClient::new(vec![
        ScriptedClient::call(None, "call_1", "checkout", json!({})),
        ScriptedClient::reply("Your order is placed."),
    ]));
    let base = shopping_server(&db, llm.clone()).await;
    let http = reqwest::Client::new();

    let paused: ChatReply = http
        .post(format!("{}/chat", base))
        .json(&json!({ "messages": [{ "role": "user", "content": "checkout" }], "thread_id": "t" }))
        .send()
        .await
        .expect("chat")
        .json()
        .await
        .expect("json");
    assert!(matches!(paused, ChatReply::Interrupted { .. }));

    let refused = http
        .post(format!("{}/chat", base))
        .json(&json!({ "messages": [
            { "role": "user", "content": "checkout" },
            { "role": "user", "content": "actually wait" }
        ], "thread_id": "t" }))
        .send()
        .await
        .expect("chat");
    assert_eq!(refused.status(), reqwest::StatusCode::CONFLICT);
    let body: ErrorResponse = refused.json().await.expect("json");
    assert!(body.detail.contains("waiting for approval"));

    let resumed: ChatReply = http
        .post(format!("{}/chat", base))
        .json(&json!({ "thread_id": "t", "resume_value": true }))
        .send()
        .await
        .expect("resume")
        .json()
        .await
        .expect("json");
    assert_eq!(
        resumed,
        ChatReply::Completed {
            thread_id: "t".to_string(),
            reply: "Your order is placed.".to_string()
        }
    );

    // The refused message never entered the history: the tool result
    // directly follows the call it answers.
    let requests = llm.requests();
    let roles: Vec<Role> = requests[1].iter().map(|m| m.role).collect();
    assert_eq!(roles, [Role::System, Role::User, Role::Assistant, Role::Tool]);
    assert_eq!(requests[1][3].tool_call_id.as_deref(), Some("call_1"));
}

#[tokio::test]
async fn resuming_without_a_pause_is_a_conflict() {
    let (db, _) = stocked_store().await;
    let llm = Arc::new(ScriptedClient::new(vec![ScriptedClient::reply("Hi!")]));
    let base = shopping_server(&db, llm).await;
    let http = reqwest::Client::new();

    let unknown = http
        .post(format!("{}/chat/stream", base))
        .json(&json!({ "thread_id": "nobody", "resume_value": true }))
        .send()
        .await
        .expect("request");
    assert_eq!(unknown.status(), reqwest::StatusCode::CONFLICT);

    let frames = post_stream(
        &http,
        &base,
        json!({ "messages": [{ "role": "user", "content": "hello" }], "thread_id": "idle" }),
    )
    .await;
    assert_eq!(event_types(&frames), ["token", "[DONE]"]);

    let idle = http
        .post(format!("{}/chat/stream", base))
        .json(&json!({ "thread_id": "idle", "resume_value": false }))
        .send()
        .await
        .expect("request");
    assert_eq!(idle.status(), reqwest::StatusCode::CONFLICT);
}

#[tokio::test]
async fn failures_stream_an_error_frame() {
    let (db, _) = stocked_store().await;
    let llm = Arc::new(ScriptedClient::default());
    let base = shopping_server(&db, llm).await;
    let http = reqwest::Client::new();

    // The model has nothing left to say.
    let frames = post_stream(
        &http,
        &base,
        json!({ "messages": [{ "role": "user", "content": "hello" }], "thread_id": "broken" }),
    )
    .await;
    assert_eq!(event_types(&frames), ["error", "[DONE]"]);
    let error: Value = serde_json::from_str(&frames[0]).expect("error");
    assert!(error["message"]
        .as_str()
        .unwrap_or_default()
        .contains("ran out of responses"));

    let empty = http
        .post(format!("{}/chat/stream", base))
        .json(&json!({ "messages": [], "thread_id": "other" }))
        .send()
        .await
        .expect("request");
    assert_eq!(empty.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn math_invoke_returns_every_message() {
    let llm: Arc<dyn LlmClient> = Arc::new(ScriptedClient::new(vec![
        ScriptedClient::call(None, "call_1", "add", json!({ "a": 45, "b": 55 })),
        ScriptedClient::reply("45 + 55 = 100"),
    ]));
    let agent = Arc::new(math_agent(llm, "test-model", &Config::default()));
    let base = spawn(math_router(agent)).await;

    let response: MathResponse = reqwest::Client::new()
        .post(format!("{}/invoke", base))
        .json(&json!({ "message": "What is 45 + 55?" }))
        .send()
        .await
        .expect("invoke")
        .json()
        .await
        .expect("json");

    assert_eq!(response.llm_calls, 2);
    assert_eq!(
        response.messages,
        ["What is 45 + 55?", "", "100", "45 + 55 = 100"]
    );
}

#[tokio::test]
async fn math_chat_runs_on_the_supplied_transcript() {
    let llm = Arc::new(ScriptedClient::new(vec![
        ScriptedClient::call(None, "call_1", "multiply", json!({ "a": 100, "b": 2 })),
        ScriptedClient::reply("Doubled, that is 200."),
    ]));
    let client: Arc<dyn LlmClient> = llm.clone();
    let agent = Arc::new(math_agent(client, "test-model", &Config::default()));
    let base = spawn(math_router(agent)).await;
    let http = reqwest::Client::new();

    let response: MathResponse = http
        .post(format!("{}/chat", base))
        .json(&json!({ "messages": [
            { "role": "user", "content": "What is 45 + 55?" },
            { "role": "assistant", "content": "100" },
            { "role": "user", "content": "Now double it." }
        ] }))
        .send()
        .await
        .expect("chat")
        .json()
        .await
        .expect("json");

    assert_eq!(response.llm_calls, 2);
    assert_eq!(
        response.messages,
        [
            "What is 45 + 55?",
            "100",
            "Now double it.",
            "",
            "200",
            "Doubled, that is 200."
        ]
    );
    // system prompt + the three supplied messages
    assert_eq!(llm.requests()[0].len(), 4);

    let empty = http
        .post(format!("{}/chat", base))
        .json(&json!({ "messages": [] }))
        .send()
        .await
        .expect("request");
    assert_eq!(empty.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorResponse = empty.json().await.expect("json");
    assert_eq!(body.detail, "messages must contain at least one message");
    assert_eq!(llm.remaining(), 0);
}
