//! End-to-end tests for the effect processor over an in-memory store.
//!
//! Collaborators are scripted fakes: the classifier reads the sentiment
//! straight out of the message text, the generator and detector return
//! canned answers or canned failures. This keeps every scenario
//! deterministic while exercising the real queue, engine, task, and
//! persistence paths.

use std::sync::Arc;

use orrery_core::collaborators::{
    EventDetector, LocationRewriter, SentimentClassifier, TaskGenerator,
};
use orrery_core::{
    ConversationId, ConversationLocks, ConversationRecord, ConversationStore, DialogueContext,
    Effect, EffectProcessor, EngineConfig, GridCoords, Message, OrreryError, PersistenceConfig,
    Priority, Result, Role, SentimentReading, TaskConfig, TaskDraft, TaskState,
};

// ---------------------------------------------------------------------------
// Scripted collaborators
// ---------------------------------------------------------------------------

/// Reads `label intensity` out of the message text itself.
struct EchoClassifier;

impl SentimentClassifier for EchoClassifier {
    async fn classify(&self, text: &str, _role: Role) -> Result<SentimentReading> {
        let mut parts = text.split_whitespace();
        let label = parts.next().unwrap_or("neutral");
        let intensity: f64 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0.5);
        Ok(SentimentReading::new(label, intensity))
    }
}

/// Always fails, exercising the degrade-to-neutral path.
struct BrokenClassifier;

impl SentimentClassifier for BrokenClassifier {
    async fn classify(&self, _text: &str, _role: Role) -> Result<SentimentReading> {
        Err(OrreryError::Collaborator("classifier offline".into()))
    }
}

/// Returns a canned draft, or a canned failure when `draft` is `None`.
struct FixedGenerator {
    draft: Option<TaskDraft>,
}

impl TaskGenerator for FixedGenerator {
    async fn generate(&self, _prior: &TaskState, _recent: &[Message]) -> Result<TaskDraft> {
        self.draft
            .clone()
            .ok_or_else(|| OrreryError::Collaborator("generator offline".into()))
    }
}

/// Returns a canned event verdict.
struct FixedDetector {
    event: Option<String>,
}

impl EventDetector for FixedDetector {
    async fn detect(&self, _context: &DialogueContext) -> Result<Option<String>> {
        Ok(self.event.clone())
    }
}

/// Appends the event to the original description.
struct AppendRewriter;

impl LocationRewriter for AppendRewriter {
    async fn rewrite(&self, original: &str, event: &str, _coords: GridCoords) -> Result<String> {
        Ok(format!("{original} {event}").trim().to_string())
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

type TestProcessor<C, G> = EffectProcessor<C, G, FixedDetector, AppendRewriter>;

fn processor<C, G>(
    store: &Arc<ConversationStore>,
    classifier: C,
    generator: G,
    event: Option<String>,
) -> TestProcessor<C, G>
where
    C: SentimentClassifier,
    G: TaskGenerator,
{
    EffectProcessor::new(
        Arc::clone(store),
        Arc::new(ConversationLocks::new()),
        classifier,
        generator,
        FixedDetector { event },
        AppendRewriter,
        EngineConfig::default(),
        TaskConfig::default(),
    )
}

fn seeded_store() -> (Arc<ConversationStore>, ConversationId) {
    let store = Arc::new(
        ConversationStore::open_in_memory(&PersistenceConfig::default()).expect("open"),
    );
    let record = ConversationRecord::new(
        ConversationId::new(),
        &orrery_core::config::default_trait_template(),
    );
    store.save(&record).expect("save");
    (store, record.id)
}

fn user_sentiment(text: &str) -> Effect {
    Effect::UserSentiment {
        message: text.into(),
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_queue_returns_record_unchanged() {
    let (store, id) = seeded_store();
    let before = store.load(id).expect("load").expect("exists");

    let p = processor(&store, EchoClassifier, FixedGenerator { draft: None }, None);
    let after = p.process(id).await.expect("process");
    assert_eq!(after, before);
}

#[tokio::test]
async fn missing_conversation_is_an_error() {
    let (store, _) = seeded_store();
    let p = processor(&store, EchoClassifier, FixedGenerator { draft: None }, None);
    let result = p.process(ConversationId::new()).await;
    assert!(matches!(result, Err(OrreryError::ConversationNotFound(_))));
}

#[tokio::test]
async fn effects_apply_in_enqueue_order() {
    let (store, id) = seeded_store();
    for text in ["praise 0.5", "criticism 0.5", "levity 0.5"] {
        store.enqueue_effect(id, &user_sentiment(text)).expect("enqueue");
    }

    let p = processor(&store, EchoClassifier, FixedGenerator { draft: None }, None);
    let record = p.process(id).await.expect("process");

    assert_eq!(
        record.recent_user_sentiments,
        ["praise", "criticism", "levity"]
    );
    assert_eq!(store.pending_count(id).expect("count"), 0);
}

#[tokio::test]
async fn processed_record_is_persisted() {
    let (store, id) = seeded_store();
    store
        .enqueue_effect(id, &user_sentiment("betrayal 1.0"))
        .expect("enqueue");

    let p = processor(&store, EchoClassifier, FixedGenerator { draft: None }, None);
    let returned = p.process(id).await.expect("process");
    let stored = store.load(id).expect("load").expect("exists");
    assert_eq!(returned, stored);
    assert!(stored.personality_state["trust"] < 0.3);
}

#[tokio::test]
async fn assistant_sentiment_is_muted_and_unwindowed() {
    let (store, id) = seeded_store();
    store
        .enqueue_effect(
            id,
            &Effect::AssistantSentiment {
                message: "praise 1.0".into(),
            },
        )
        .expect("enqueue");

    let p = processor(&store, EchoClassifier, FixedGenerator { draft: None }, None);
    let record = p.process(id).await.expect("process");

    assert!(record.recent_user_sentiments.is_empty());
    // Quarter-strength praise: trust moves, but barely.
    let trust = record.personality_state["trust"];
    assert!(trust > 0.5 && trust < 0.53);
}

#[tokio::test]
async fn broken_classifier_degrades_to_neutral() {
    let (store, id) = seeded_store();
    store
        .enqueue_effect(id, &user_sentiment("this text is never read"))
        .expect("enqueue");

    let p = processor(&store, BrokenClassifier, FixedGenerator { draft: None }, None);
    let record = p.process(id).await.expect("process");
    assert_eq!(record.recent_user_sentiments, ["neutral"]);
}

#[tokio::test]
async fn repeated_sentiments_activate_the_penalty() {
    let (store, id) = seeded_store();
    for _ in 0..3 {
        store
            .enqueue_effect(id, &user_sentiment("praise 0.3"))
            .expect("enqueue");
    }

    let p = processor(&store, EchoClassifier, FixedGenerator { draft: None }, None);
    let record = p.process(id).await.expect("process");
    assert!(record.repetitive_sentiment_penalty_active);
}

#[tokio::test]
async fn task_progress_advances_on_threshold() {
    let (store, id) = seeded_store();
    let mut record = store.load(id).expect("load").expect("exists");
    record.task = TaskState {
        task: Some("patrol the wall".into()),
        progress: 0.6,
        priority: Priority::Medium,
        turn_counter: 0,
    };
    store.save(&record).expect("save");

    for _ in 0..2 {
        store
            .enqueue_effect(id, &Effect::TaskUpdate { messages: vec![] })
            .expect("enqueue");
    }

    let p = processor(&store, EchoClassifier, FixedGenerator { draft: None }, None);
    let record = p.process(id).await.expect("process");

    // Two turns hit the threshold once: 0.6 + 1/5 = 0.8.
    assert!((record.task.progress - 0.8).abs() < 1e-9);
    assert_eq!(record.task.turn_counter, 0);
}

#[tokio::test]
async fn completed_task_triggers_generation() {
    let (store, id) = seeded_store();
    let mut record = store.load(id).expect("load").expect("exists");
    record.task = TaskState {
        task: Some("old errand".into()),
        progress: 1.0,
        priority: Priority::Easy,
        turn_counter: 1,
    };
    store.save(&record).expect("save");

    store
        .enqueue_effect(id, &Effect::TaskUpdate { messages: vec![] })
        .expect("enqueue");

    let draft = TaskDraft {
        task: "find the lost caravan".into(),
        progress: 0.5,
        priority: Priority::Hard,
    };
    let p = processor(
        &store,
        EchoClassifier,
        FixedGenerator { draft: Some(draft) },
        None,
    );
    let record = p.process(id).await.expect("process");

    assert_eq!(record.task.task.as_deref(), Some("find the lost caravan"));
    // A new objective starts from zero regardless of the draft's claim.
    assert!((record.task.progress).abs() < f64::EPSILON);
    assert_eq!(record.task.priority, Priority::Hard);
}

#[tokio::test]
async fn failed_generation_keeps_prior_task() {
    let (store, id) = seeded_store();
    let mut record = store.load(id).expect("load").expect("exists");
    let prior = TaskState {
        task: Some("old errand".into()),
        progress: 1.0,
        priority: Priority::Easy,
        turn_counter: 1,
    };
    record.task = prior.clone();
    store.save(&record).expect("save");

    store
        .enqueue_effect(id, &Effect::TaskUpdate { messages: vec![] })
        .expect("enqueue");

    let p = processor(&store, EchoClassifier, FixedGenerator { draft: None }, None);
    let record = p.process(id).await.expect("process");

    assert_eq!(record.task.task, prior.task);
    assert!((record.task.progress - prior.progress).abs() < f64::EPSILON);
}

#[tokio::test]
async fn failure_in_one_effect_spares_the_rest() {
    let (store, id) = seeded_store();
    store
        .enqueue_effect(id, &user_sentiment("praise 0.5"))
        .expect("enqueue");
    // Generation fails for this one.
    store
        .enqueue_effect(id, &Effect::TaskUpdate { messages: vec![] })
        .expect("enqueue");
    store
        .enqueue_effect(id, &user_sentiment("levity 0.5"))
        .expect("enqueue");

    let mut record = store.load(id).expect("load").expect("exists");
    record.task.turn_counter = 1; // Next TaskUpdate hits the threshold.
    store.save(&record).expect("save");

    let p = processor(&store, EchoClassifier, FixedGenerator { draft: None }, None);
    let record = p.process(id).await.expect("process");

    assert_eq!(record.recent_user_sentiments, ["praise", "levity"]);
    assert!(record.task.task.is_none());
    assert_eq!(store.pending_count(id).expect("count"), 0);
}

#[tokio::test]
async fn unknown_effects_are_skipped() {
    let (store, id) = seeded_store();
    store.enqueue_effect(id, &Effect::Unknown).expect("enqueue");
    store
        .enqueue_effect(id, &user_sentiment("hope 0.5"))
        .expect("enqueue");

    let p = processor(&store, EchoClassifier, FixedGenerator { draft: None }, None);
    let record = p.process(id).await.expect("process");
    assert_eq!(record.recent_user_sentiments, ["hope"]);
}

#[tokio::test]
async fn detected_event_rewrites_the_location() {
    let (store, id) = seeded_store();
    let coords = GridCoords { x: 2, y: 3 };
    store
        .save_location_description(id, coords, "A quiet grove of birches.")
        .expect("seed location");

    let mut record = store.load(id).expect("load").expect("exists");
    record.messages.push(Message::user("I set fire to the grove"));
    record.messages.push(Message::assistant("Flames leap between the trees."));
    store.save(&record).expect("save");

    store
        .enqueue_effect(id, &Effect::EnvironmentalRewrite { coords })
        .expect("enqueue");

    let p = processor(
        &store,
        EchoClassifier,
        FixedGenerator { draft: None },
        Some("Fire burned trees.".to_string()),
    );
    p.process(id).await.expect("process");

    let description = store
        .location_description(id, coords)
        .expect("query")
        .expect("exists");
    assert_eq!(description, "A quiet grove of birches. Fire burned trees.");
}

#[tokio::test]
async fn deleted_conversation_is_gone() {
    let (store, id) = seeded_store();
    store
        .enqueue_effect(id, &user_sentiment("praise 0.5"))
        .expect("enqueue");

    let p = processor(&store, EchoClassifier, FixedGenerator { draft: None }, None);
    p.delete_conversation(id).await.expect("delete");

    assert!(store.load(id).expect("load").is_none());
    assert_eq!(store.pending_count(id).expect("count"), 0);
    assert!(matches!(
        p.process(id).await,
        Err(OrreryError::ConversationNotFound(_))
    ));
}

#[tokio::test]
async fn no_event_leaves_the_location_alone() {
    let (store, id) = seeded_store();
    let coords = GridCoords { x: 2, y: 3 };
    store
        .save_location_description(id, coords, "A quiet grove of birches.")
        .expect("seed location");

    store
        .enqueue_effect(id, &Effect::EnvironmentalRewrite { coords })
        .expect("enqueue");

    let p = processor(&store, EchoClassifier, FixedGenerator { draft: None }, None);
    p.process(id).await.expect("process");

    let description = store
        .location_description(id, coords)
        .expect("query")
        .expect("exists");
    assert_eq!(description, "A quiet grove of birches.");
}
