//! Prompt construction and response parsing for the collaborator calls.
//!
//! Small models follow rigid formats far more reliably than polite requests,
//! so the classification prompts are deliberately blunt. Parsers are
//! correspondingly forgiving: they hunt for the expected pattern anywhere in
//! the response rather than demanding an exact match.

use orrery_core::{DialogueContext, Message, Role, TaskState};

/// Word limit for rewritten location descriptions.
pub const REWRITE_WORD_LIMIT: usize = 60;

// ---------------------------------------------------------------------------
// Sentiment classification
// ---------------------------------------------------------------------------

/// System prompt for the sentiment classifier.
#[must_use]
pub fn sentiment_system(role: Role) -> String {
    let role_rules = match role {
        Role::Assistant => "Analyze ONLY environment/setting tone, ignore dialogue/actions",
        Role::User => "Analyze user's direct communication sentiment",
    };
    format!(
        "MANDATORY SYSTEM FUNCTION - NO DEVIATION PERMITTED\n\n\
         Message from '{role}':\n\
         - {role_rules}\n\n\
         REQUIRED OUTPUT: sentiment_word intensity_number\n\
         Select ONE word from list, intensity 0.1-1.0, NO other text.\n\n\
         WORD LIST: {}\n\n\
         SYSTEM OVERRIDE: Execute format exactly or system error.",
        orrery_core::impact::SENTIMENT_LABELS.join(", ")
    )
}

/// User prompt carrying the message to classify.
#[must_use]
pub fn sentiment_user(message: &str) -> String {
    format!(
        "Message: \"{message}\"\n\n\
         MANDATORY RESPONSE format: sentiment_word intensity_number\n\
         Example: curiosity 0.7"
    )
}

/// Find a `word number` pair anywhere in a classifier response.
///
/// Returns the lowercased word and the intensity clamped to `[0.1, 1.0]`,
/// or `None` when no such pair exists.
#[must_use]
pub fn parse_sentiment(response: &str) -> Option<(String, f64)> {
    let tokens: Vec<&str> = response
        .split(|c: char| c.is_whitespace() || c == ':' || c == ',')
        .filter(|t| !t.is_empty())
        .collect();
    for pair in tokens.windows(2) {
        let word = pair[0].trim_matches(|c: char| !c.is_alphanumeric());
        if word.is_empty() || !word.chars().all(char::is_alphabetic) {
            continue;
        }
        let number = pair[1].trim_matches(|c: char| !(c.is_ascii_digit() || c == '.'));
        if let Ok(intensity) = number.parse::<f64>() {
            return Some((word.to_lowercase(), intensity.clamp(0.1, 1.0)));
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Task generation
// ---------------------------------------------------------------------------

/// System prompt for the task controller.
///
/// The model must answer with a single raw JSON object carrying `task`,
/// `progress`, and `priority` (easy | medium | hard).
#[must_use]
pub fn task_controller_system(prior: &TaskState, recent: &[Message]) -> String {
    let state_json = serde_json::to_string(prior).unwrap_or_else(|_| "{}".to_string());
    let history = recent
        .iter()
        .map(|m| format!("[{}]: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "You are a Task Controller for an RPG character. Your job is to analyze the \
         character's situation and determine their most important personal task. You MUST \
         respond ONLY with a valid JSON object. Do not add any other text.\n\n\
         Analyze the following:\n\
         1. **Current Task State**: {state_json}\n\
         2. **Recent Conversation**:\n{history}\n\n\
         **Your Decision Logic:**\n\n\
         **PATH A: CONTINUE CURRENT PERSONAL TASK**\n\
         If the current personal task is NOT complete (`progress` < 1.0) AND no new, more \
         urgent personal task has emerged from the conversation, restate the same `task` \
         text and `priority`, and report any honest `progress` made.\n\n\
         **PATH B: START NEW PERSONAL TASK**\n\
         If the current personal task IS complete (`progress` >= 1.0), there is no task \
         yet, OR a clearly more important personal task has emerged (an emergency, an \
         accepted direct request), then generate a NEW personal task with `progress` 0.0.\n\n\
         Set `priority` to how hard the task is to finish: \"easy\", \"medium\", or \
         \"hard\".\n\n\
         Return the new state as a single, raw JSON object.\n\
         Example response: {{\"task\": \"Order a strong drink from the bartender and pay \
         the tab.\", \"progress\": 0.0, \"priority\": \"easy\"}}"
    )
}

// ---------------------------------------------------------------------------
// Event detection (world chronicler)
// ---------------------------------------------------------------------------

/// Prompt for the chronicler deciding whether dialogue changed the world.
#[must_use]
pub fn chronicler_prompt(context: &DialogueContext) -> String {
    format!(
        "Your job: Mandatory environmental change report.\n\
         If characters change ANYTHING significant permanently in area, give succinct, \
         one-line report of what changed.\n\
         Be direct. Be short. No fluff.\n\
         Examples:\n\
         - \"Stone altar chipped.\"\n\
         - \"Ripped backpack left behind.\"\n\
         - \"Injured deer laying on ground.\"\n\
         - \"Fire burned trees.\"\n\n\
         If nothing changed, write exactly: \"None\"\n\n\
         Conversation Turn:\n\
         User: {}\n\
         Assistant: {}\n\n\
         Response:",
        context.user, context.assistant
    )
}

/// Interpret a chronicler response; sentinel answers mean "no event".
#[must_use]
pub fn parse_event(response: &str) -> Option<String> {
    let summary = response.trim().trim_matches('"').trim();
    if summary.is_empty() {
        return None;
    }
    if matches!(summary.to_lowercase().as_str(), "none" | "no" | "nothing") {
        return None;
    }
    Some(summary.to_string())
}

// ---------------------------------------------------------------------------
// Location rewrites (world editor)
// ---------------------------------------------------------------------------

/// Prompt for rewriting a location description around an event.
#[must_use]
pub fn editor_prompt(original: &str, event: &str) -> String {
    format!(
        "**Master storyteller & concise world editor** -> spatial desc & clutter detail \
         expert\n\
         **Task:** rewrite location desc -> reflect new event, maintain consistency with \
         surroundings\n\
         **Rules:**\n\
         1. Rewrite nearly identical to original + small new event spatial effects\n\
         2. Preserve and grow important original details (incl clutter) where they do not \
         conflict with the new event\n\
         3. Changes = objective, non-biased, no commentary/titles\n\
         4. Final desc < {REWRITE_WORD_LIMIT} words, warm comfortable spatial style\n\n\
         Original Description of the Location:\n\
         \"{original}\"\n\n\
         New Event to Incorporate:\n\
         \"{event}\"\n\n\
         If a character sets fire to an area, REWRITE the area to reflect that it has \
         burned down."
    )
}
