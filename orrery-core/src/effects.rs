//! Deferred effect records.
//!
//! Effects are enqueued during the hot response path and drained later by
//! the [`crate::processor::EffectProcessor`]. The wire shape is an
//! internally tagged JSON object so the queue can grow new kinds without
//! breaking old readers; unrecognized tags deserialize as [`Effect::Unknown`]
//! and are logged and skipped.

use serde::{Deserialize, Serialize};

use crate::types::{GridCoords, Message, Role};

/// One deferred side effect of a conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Classify a user message and apply the resulting impulse.
    UserSentiment {
        /// The user's message text.
        message: String,
    },
    /// Classify an assistant message and apply a muted impulse.
    AssistantSentiment {
        /// The assistant's message text.
        message: String,
    },
    /// Reevaluate the character's current task.
    TaskUpdate {
        /// Recent conversation slice for the generator.
        messages: Vec<Message>,
    },
    /// Rewrite a location description if recent dialogue warrants it.
    EnvironmentalRewrite {
        /// Which location to rewrite.
        coords: GridCoords,
    },
    /// An effect kind this build does not understand.
    #[serde(other)]
    Unknown,
}

/// Recent dialogue split by speaker, for event detection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DialogueContext {
    /// The user's recent lines, oldest first, joined with spaces.
    pub user: String,
    /// The assistant's recent lines, oldest first, joined with spaces.
    pub assistant: String,
}

/// Build a [`DialogueContext`] from the tail of a conversation.
///
/// Looks at the last ten messages, drops narrator interjections delivered
/// through the user role, and keeps the last three lines per speaker.
#[must_use]
pub fn dialogue_context(messages: &[Message]) -> DialogueContext {
    let tail = &messages[messages.len().saturating_sub(10)..];

    let recent = |role: Role| -> String {
        let lines: Vec<&str> = tail
            .iter()
            .filter(|m| m.role == role)
            .filter(|m| !(role == Role::User && m.content.starts_with("[NARRATOR:")))
            .map(|m| m.content.as_str())
            .collect();
        lines[lines.len().saturating_sub(3)..].join(" ")
    };

    DialogueContext {
        user: recent(Role::User),
        assistant: recent(Role::Assistant),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_deserializes_to_unknown() {
        let effect: Effect =
            serde_json::from_str(r#"{"type": "telemetry_flush", "payload": 7}"#).expect("parse");
        assert_eq!(effect, Effect::Unknown);
    }

    #[test]
    fn tagged_round_trip() {
        let effect = Effect::EnvironmentalRewrite {
            coords: GridCoords { x: 3, y: -1 },
        };
        let json = serde_json::to_string(&effect).expect("serialize");
        assert!(json.contains(r#""type":"environmental_rewrite""#));
        let back: Effect = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, effect);
    }

    #[test]
    fn context_keeps_last_three_lines_per_role() {
        let mut messages = Vec::new();
        for i in 0..6 {
            messages.push(Message::user(format!("u{i}")));
            messages.push(Message::assistant(format!("a{i}")));
        }
        let ctx = dialogue_context(&messages);
        // Last 10 messages span u1..a5; last three user lines are u3 u4 u5.
        assert_eq!(ctx.user, "u3 u4 u5");
        assert_eq!(ctx.assistant, "a3 a4 a5");
    }

    #[test]
    fn narrator_lines_are_dropped() {
        let messages = vec![
            Message::user("[NARRATOR: The rain begins.]"),
            Message::user("hello"),
            Message::assistant("well met"),
        ];
        let ctx = dialogue_context(&messages);
        assert_eq!(ctx.user, "hello");
        assert_eq!(ctx.assistant, "well met");
    }

    #[test]
    fn empty_history_yields_empty_context() {
        assert_eq!(dialogue_context(&[]), DialogueContext::default());
    }
}
