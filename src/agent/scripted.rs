//! Agent replaying canned replies.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use super::{Agent, AgentError, Conversation, Role};

/// Plays back a fixed queue of replies and keeps the full history, so a
/// recorded session can be replayed or a test can inspect the feedback.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAgent {
    replies: VecDeque<Result<String, AgentError>>,
    history: Conversation,
    /// (model, temperature) of every solicitation, in order
    calls: Vec<(String, f32)>,
}

impl ScriptedAgent {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: replies.into_iter().map(|r| Ok(r.into())).collect(),
            ..Self::default()
        }
    }

    /// Load a JSON array of reply strings.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let text = fs::read_to_string(path)?;
        let replies: Vec<String> = serde_json::from_str(&text)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(Self::new(replies))
    }

    /// Bound the kept history, dropping what was recorded so far.
    pub fn with_history_limit(mut self, max_history: usize) -> Self {
        self.history = Conversation::new(max_history);
        self
    }

    pub fn push_reply(&mut self, reply: impl Into<String>) {
        self.replies.push_back(Ok(reply.into()));
    }

    /// Queue a transport failure.
    pub fn push_failure(&mut self, reason: impl Into<String>) {
        self.replies
            .push_back(Err(AgentError::Unavailable(reason.into())));
    }

    pub fn history(&self) -> &Conversation {
        &self.history
    }

    pub fn calls(&self) -> &[(String, f32)] {
        &self.calls
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }

    /// Steering messages sent with the user role, oldest first.
    pub fn feedback(&self) -> Vec<&str> {
        self.history
            .of_role(Role::User)
            .map(|m| m.content.as_str())
            .filter(|c| c.starts_with('['))
            .collect()
    }
}

impl Agent for ScriptedAgent {
    fn propose_move(
        &mut self,
        prompt: &str,
        model: &str,
        temperature: f32,
    ) -> Result<String, AgentError> {
        self.calls.push((model.to_string(), temperature));
        if self.history.last(Role::User).map(|m| m.content.as_str()) != Some(prompt) {
            self.history.push(Role::User, prompt);
        }
        let reply = self.replies.pop_front().unwrap_or(Err(AgentError::Exhausted))?;
        self.history.push(Role::Assistant, reply.clone());
        Ok(reply)
    }

    fn send_feedback(&mut self, role: Role, text: &str) {
        self.history.push(role, text);
    }

    fn discard_last_reply(&mut self) -> Option<String> {
        self.history.pop_last(Role::Assistant).map(|m| m.content)
    }

    fn peek_last_reply(&self, role: Role) -> Option<String> {
        self.history.last(role).map(|m| m.content.clone())
    }
}
