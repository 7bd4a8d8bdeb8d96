//! Interactive terminal chat with the shopping assistant (default) or the
//! math agent.
//!
//! Usage: `assistant-cli [shopping|math]`

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use storefront::agent::{math_agent, shopping_agent, Agent, AgentEvent, Conversation, RunOutcome};
use storefront::config::{Config, LlmConfig};
use storefront::llm::{ChatMessage, OpenAiClient};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;

const RESULT_PREVIEW_CHARS: usize = 100;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storefront::init_tracing("storefront=warn");

    let mode = std::env::args().nth(1).unwrap_or_else(|| "shopping".to_string());
    let config = Config::from_env(8001)?;
    let llm_config = LlmConfig::from_env()?;
    let llm = Arc::new(OpenAiClient::new(&llm_config)?);

    let agent = match mode.as_str() {
        "shopping" => {
            println!("--- Shopping Assistant Agent ---");
            println!("Backend: {}", config.backend_url);
            shopping_agent(llm, &llm_config.model, &config)
        }
        "math" => {
            println!("--- Arithmetic Agent ---");
            math_agent(llm, &llm_config.model, &config)
        }
        other => anyhow::bail!("Unknown agent {:?}; expected `shopping` or `math`", other),
    };
    println!("Type 'exit' or 'quit' to end.\n");

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut conversation = Conversation::new();

    loop {
        let Some(line) = prompt(&mut input, "\nYou: ").await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        conversation.push(ChatMessage::user(line));
        print!("AI: ");
        flush();
        let mut outcome = turn(&agent, &mut conversation, None).await;

        while let Ok(RunOutcome::Interrupted { requests }) = &outcome {
            for request in requests {
                println!("\n[INTERRUPT: {} {}]", request.question, request.args);
            }
            let answer = prompt(&mut input, "\nApprove? (y/n): ")
                .await?
                .unwrap_or_default();
            let approved = answer.trim().eq_ignore_ascii_case("y");
            println!("Sending approval: {}", approved);
            print!("AI: ");
            flush();
            outcome = turn(&agent, &mut conversation, Some(approved)).await;
        }

        if let Err(e) = outcome {
            eprintln!("\nError: {:#}", e);
        }
        println!();
    }

    Ok(())
}

async fn prompt(input: &mut Lines<BufReader<Stdin>>, label: &str) -> anyhow::Result<Option<String>> {
    print!("{}", label);
    flush();
    input.next_line().await.context("Failed to read from stdin")
}

/// Run (or resume, when `decision` is set) one turn, printing its events.
async fn turn(
    agent: &Agent,
    conversation: &mut Conversation,
    decision: Option<bool>,
) -> anyhow::Result<RunOutcome> {
    let (tx, rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(print_events(rx));

    let outcome = match decision {
        None => agent.run(conversation, Some(&tx)).await,
        Some(approved) => agent.resume(conversation, approved, Some(&tx)).await,
    };
    drop(tx);
    printer.await.context("Event printer panicked")?;
    outcome
}

async fn print_events(mut rx: mpsc::UnboundedReceiver<AgentEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            AgentEvent::Token { content } => {
                print!("{}", content);
                flush();
            }
            AgentEvent::ToolStart { name, input } => {
                println!("\n  [Tool Start: {}({})]", name, input);
            }
            AgentEvent::ToolEnd { name, output } => {
                println!("\n  [Tool End: {}] Result: {}", name, preview(&output));
                print!("AI: ");
                flush();
            }
            AgentEvent::Error { message } => eprintln!("\nError: {}", message),
            AgentEvent::Interrupt { .. } => {}
        }
    }
}

fn preview(output: &str) -> String {
    match output.char_indices().nth(RESULT_PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &output[..idx]),
        None => output.to_string(),
    }
}

fn flush() {
    let _ = std::io::stdout().flush();
}
