//! Ordered chat history with a bounded size.

use super::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    /// Maximum number of non-system messages kept
    max_history: usize,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Conversation {
    pub fn new(max_history: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_history,
        }
    }

    /// Append a message, evicting the oldest non-system one when full.
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message {
            role,
            content: content.into(),
        });
        let chat = self.messages.iter().filter(|m| m.role != Role::System).count();
        if chat > self.max_history {
            if let Some(idx) = self.messages.iter().position(|m| m.role != Role::System) {
                self.messages.remove(idx);
            }
        }
    }

    /// Remove and return the last message of `role`.
    pub fn pop_last(&mut self, role: Role) -> Option<Message> {
        let idx = self.messages.iter().rposition(|m| m.role == role)?;
        Some(self.messages.remove(idx))
    }

    pub fn last(&self, role: Role) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == role)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages of `role`, oldest first.
    pub fn of_role(&self, role: Role) -> impl Iterator<Item = &Message> + '_ {
        self.messages.iter().filter(move |m| m.role == role)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
