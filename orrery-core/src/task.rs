//! Task state machine.
//!
//! Tracks the character's current objective, its difficulty, and fractional
//! progress. Every few user turns the controller either nudges progress
//! forward by a difficulty-dependent increment or asks a generator for a
//! fresh objective once the current one completes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{OrreryError, Result};

/// Task difficulty, controlling the per-reevaluation progress increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Completes in roughly three reevaluations.
    Easy,
    /// Completes in roughly five reevaluations.
    #[default]
    Medium,
    /// Completes in roughly eight reevaluations.
    Hard,
}

impl Priority {
    /// Progress gained per reevaluation at this difficulty.
    #[must_use]
    pub fn increment(self) -> f64 {
        match self {
            Priority::Easy => 1.0 / 3.0,
            Priority::Medium => 1.0 / 5.0,
            Priority::Hard => 1.0 / 8.0,
        }
    }
}

/// Persisted task state for one conversation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskState {
    /// Current objective text; `None` until the first generation.
    pub task: Option<String>,
    /// Completion fraction in `[0, 1]`.
    pub progress: f64,
    /// Difficulty of the current objective.
    pub priority: Priority,
    /// User turns seen since the last reevaluation.
    pub turn_counter: u32,
}

/// A candidate task produced by a generator, not yet validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Objective text.
    pub task: String,
    /// Claimed completion fraction.
    #[serde(default)]
    pub progress: f64,
    /// Difficulty.
    #[serde(default)]
    pub priority: Priority,
}

/// Drives one conversation's task state.
pub struct TaskController {
    state: TaskState,
    threshold: u32,
}

impl TaskController {
    /// Wrap persisted state with the configured reevaluation threshold.
    #[must_use]
    pub fn new(state: TaskState, threshold: u32) -> Self {
        Self { state, threshold }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &TaskState {
        &self.state
    }

    /// Tear down into the persisted state.
    #[must_use]
    pub fn into_state(self) -> TaskState {
        self.state
    }

    /// Record one user turn. Returns true when the threshold is reached and
    /// a reevaluation is due; the counter resets in that case.
    pub fn advance_turn(&mut self) -> bool {
        self.state.turn_counter += 1;
        if self.state.turn_counter >= self.threshold {
            self.state.turn_counter = 0;
            true
        } else {
            false
        }
    }

    /// Should a reevaluation generate a new task instead of incrementing?
    #[must_use]
    pub fn needs_generation(&self) -> bool {
        self.state.task.is_none() || self.state.progress >= 1.0
    }

    /// Advance progress by the current difficulty's increment, capped at 1.
    pub fn apply_increment(&mut self) {
        let before = self.state.progress;
        self.state.progress = (before + self.state.priority.increment()).min(1.0);
        debug!(
            task = self.state.task.as_deref().unwrap_or("<none>"),
            before,
            after = self.state.progress,
            "task progress advanced"
        );
    }

    /// Install a generated draft after validation.
    ///
    /// A draft naming a new objective resets progress to zero; one restating
    /// the current objective can only move progress forward. Malformed
    /// drafts are rejected and the prior state is untouched.
    ///
    /// # Errors
    /// Returns `OrreryError::Validation` when the draft's task text is empty
    /// or its progress is not a finite number.
    pub fn apply_draft(&mut self, draft: TaskDraft) -> Result<()> {
        if draft.task.trim().is_empty() {
            return Err(OrreryError::Validation("generated task text is empty".into()));
        }
        if !draft.progress.is_finite() {
            return Err(OrreryError::Validation(format!(
                "generated progress {} is not finite",
                draft.progress
            )));
        }

        let same_task = self.state.task.as_deref() == Some(draft.task.as_str());
        let progress = if same_task {
            self.state.progress.max(draft.progress).min(1.0)
        } else {
            0.0
        };
        debug!(task = %draft.task, progress, ?draft.priority, "task installed");
        self.state.task = Some(draft.task);
        self.state.progress = progress;
        self.state.priority = draft.priority;
        Ok(())
    }

    /// Out-of-character prompt note describing the current objective.
    #[must_use]
    pub fn prompt_fragment(&self) -> Option<String> {
        let task = self.state.task.as_deref()?;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = (self.state.progress * 100.0).round() as u32;
        Some(format!(
            "[OOC Note: Your current personal goal is: \"{task}\". You are {percent}% of the \
             way there. Let this goal subtly color your mood and replies, but never state it \
             outright.]"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_gates_reevaluation() {
        let mut c = TaskController::new(TaskState::default(), 2);
        assert!(!c.advance_turn());
        assert!(c.advance_turn());
        assert_eq!(c.state().turn_counter, 0);
        assert!(!c.advance_turn());
    }

    #[test]
    fn fresh_state_needs_generation() {
        let c = TaskController::new(TaskState::default(), 2);
        assert!(c.needs_generation());
    }

    #[test]
    fn completed_task_needs_generation() {
        let state = TaskState {
            task: Some("sharpen the axe".into()),
            progress: 1.0,
            ..TaskState::default()
        };
        assert!(TaskController::new(state, 2).needs_generation());
    }

    #[test]
    fn medium_increment_is_a_fifth() {
        let state = TaskState {
            task: Some("patrol the wall".into()),
            progress: 0.6,
            priority: Priority::Medium,
            ..TaskState::default()
        };
        let mut c = TaskController::new(state, 2);
        c.apply_increment();
        assert!((c.state().progress - 0.8).abs() < 1e-9);
    }

    #[test]
    fn increment_caps_at_one() {
        let state = TaskState {
            task: Some("rest".into()),
            progress: 0.9,
            priority: Priority::Easy,
            ..TaskState::default()
        };
        let mut c = TaskController::new(state, 2);
        c.apply_increment();
        assert!((c.state().progress - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn new_task_resets_progress() {
        let state = TaskState {
            task: Some("old goal".into()),
            progress: 0.7,
            ..TaskState::default()
        };
        let mut c = TaskController::new(state, 2);
        c.apply_draft(TaskDraft {
            task: "new goal".into(),
            progress: 0.9,
            priority: Priority::Hard,
        })
        .expect("valid draft");
        assert!((c.state().progress).abs() < f64::EPSILON);
        assert_eq!(c.state().priority, Priority::Hard);
    }

    #[test]
    fn same_task_never_regresses() {
        let state = TaskState {
            task: Some("hold the line".into()),
            progress: 0.7,
            ..TaskState::default()
        };
        let mut c = TaskController::new(state, 2);
        c.apply_draft(TaskDraft {
            task: "hold the line".into(),
            progress: 0.4,
            priority: Priority::Medium,
        })
        .expect("valid draft");
        assert!((c.state().progress - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_draft_is_rejected_and_state_kept() {
        let state = TaskState {
            task: Some("keep watch".into()),
            progress: 0.4,
            ..TaskState::default()
        };
        let mut c = TaskController::new(state.clone(), 2);
        assert!(c
            .apply_draft(TaskDraft {
                task: "   ".into(),
                progress: 0.0,
                priority: Priority::Easy,
            })
            .is_err());
        assert_eq!(c.state(), &state);
    }

    #[test]
    fn prompt_fragment_reports_percent() {
        let state = TaskState {
            task: Some("find the lost caravan".into()),
            progress: 0.6,
            ..TaskState::default()
        };
        let c = TaskController::new(state, 2);
        let fragment = c.prompt_fragment().expect("task set");
        assert!(fragment.contains("find the lost caravan"));
        assert!(fragment.contains("60%"));
    }

    #[test]
    fn no_task_means_no_fragment() {
        let c = TaskController::new(TaskState::default(), 2);
        assert!(c.prompt_fragment().is_none());
    }
}
