//! Best-effort cleanup of agent replies.
//!
//! Heuristic, applied at most once per reply: strip a Markdown code fence and
//! close any braces the agent forgot. Anything it cannot fix is rejected.

use log::debug;

use crate::error::{GameError, Result};
use crate::wire::AgentReply;

/// Normalize a raw reply without parsing it.
pub fn repair_reply(raw: &str) -> String {
    let mut text = raw.trim().to_string();

    if let Some(body) = text.strip_prefix("```") {
        let body = body.strip_prefix("json").unwrap_or(body);
        text = body.trim_end().trim_end_matches('`').trim().to_string();
    }

    let open = text.matches('{').count();
    let close = text.matches('}').count();
    if open > close {
        text.push_str(&"}".repeat(open - close));
    }
    text
}

/// Parse a reply, retrying once on the repaired text.
pub fn parse_reply(raw: &str) -> Result<AgentReply> {
    match serde_json::from_str::<AgentReply>(raw) {
        Ok(reply) => Ok(reply),
        Err(first) => {
            debug!("reply is not valid JSON ({}), attempting repair", first);
            let repaired = repair_reply(raw);
            serde_json::from_str::<AgentReply>(&repaired)
                .map_err(|e| GameError::MalformedEncoding(e.to_string()))
        }
    }
}
