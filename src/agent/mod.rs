//! Agent module - the tool-calling conversation loop.
//!
//! The agent follows a "tools in a loop" pattern:
//! 1. Send the system prompt plus the thread's history to the LLM
//! 2. If the LLM requests tool calls, execute them and feed the results back
//! 3. Pause when a call needs the user's approval, continue on resume
//! 4. Repeat until the LLM produces a plain reply or max iterations is reached

mod agent_loop;
mod events;
mod presets;
mod prompt;
mod threads;

pub use agent_loop::{Agent, Conversation, EventSender, RunOutcome};
pub use events::{AgentEvent, ApprovalRequest};
pub use presets::{math_agent, shopping_agent};
pub use prompt::{build_shopping_prompt, MATH_PROMPT};
pub use threads::{SharedConversation, ThreadStore};
