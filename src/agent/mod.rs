//! The external move-proposing agent, seen through a narrow contract.
//!
//! The conversation history lives on the agent's side. The referee only
//! appends steering messages, drops the last reply it rejected and peeks at
//! the last reply when it needs to recover a stated move.

pub mod history;
pub mod ladder;
pub mod scripted;

pub use history::{Conversation, Message};
pub use ladder::{next_tier, ModelLadder};
pub use scripted::ScriptedAgent;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Failure sentinel of a solicitation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("agent unavailable: {0}")]
    Unavailable(String),

    #[error("agent has no more replies")]
    Exhausted,
}

pub trait Agent {
    /// One blocking round-trip. The prompt and the reply join the history.
    fn propose_move(
        &mut self,
        prompt: &str,
        model: &str,
        temperature: f32,
    ) -> Result<String, AgentError>;

    /// Append a steering message.
    fn send_feedback(&mut self, role: Role, text: &str);

    /// Remove the most recent assistant reply from the history.
    fn discard_last_reply(&mut self) -> Option<String>;

    /// Most recent message of `role`, left in place.
    fn peek_last_reply(&self, role: Role) -> Option<String>;
}

impl<A: Agent + ?Sized> Agent for Box<A> {
    fn propose_move(
        &mut self,
        prompt: &str,
        model: &str,
        temperature: f32,
    ) -> Result<String, AgentError> {
        (**self).propose_move(prompt, model, temperature)
    }

    fn send_feedback(&mut self, role: Role, text: &str) {
        (**self).send_feedback(role, text)
    }

    fn discard_last_reply(&mut self) -> Option<String> {
        (**self).discard_last_reply()
    }

    fn peek_last_reply(&self, role: Role) -> Option<String> {
        (**self).peek_last_reply(role)
    }
}
