// End-to-end generation flow through ContentService
//
// Scripted providers stand in for vendors; a temp-dir JSON store stands in
// for the data directory.

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use infogen::config::{Config, Credentials, ProviderKind, ProviderOverrides};
use infogen::content::{ContentCard, ContentCategory, ContentSet, Creator, Difficulty};
use infogen::generation::{BatchPhase, PARSE_FAILED_MARKER};
use infogen::providers::{
    CompletionRequest, LlmProvider, ProviderError, ProviderRegistry, ScriptedProvider,
    TextCompletionClient,
};
use infogen::storage::{ContentStore, JsonStore};
use infogen::{ContentService, Error, ValidationError};

const PASSAGE: &str = "A meditação é uma prática antiga que ajuda a reduzir o estresse, \
    melhora a concentração e contribui para o equilíbrio emocional no dia a dia.";

fn card_reply(request: &CompletionRequest) -> String {
    let topic = request
        .prompt
        .lines()
        .find_map(|l| l.strip_prefix("Topic to address: "))
        .unwrap_or("?")
        .to_string();
    format!(
        "TITLE: Você sabia isto sobre {topic}?\n\
         SUMMARY: Um resumo direto sobre {topic}.\n\
         DETAILED: Uma explicação mais longa sobre {topic}, com exemplos.\n\
         KEYWORDS: {topic}, bem-estar, saúde\n\
         DIFFICULTY: beginner"
    )
}

struct Harness {
    _dir: TempDir,
    store: Arc<JsonStore>,
    service: ContentService,
    creator: Creator,
}

fn scripted_client(providers: Vec<Arc<ScriptedProvider>>) -> TextCompletionClient {
    let credentials = providers.iter().fold(Credentials::default(), |c, p| {
        c.with_key(p.kind(), "real-key")
    });
    let registry = Arc::new(ProviderRegistry::from_credentials(
        &credentials,
        &ProviderOverrides::default(),
    ));
    providers.into_iter().fold(
        TextCompletionClient::new(registry, Duration::from_secs(30)),
        |client, p| client.with_adapter(p),
    )
}

fn harness(providers: Vec<Arc<ScriptedProvider>>) -> Harness {
    let dir = TempDir::new().unwrap();
    let client = scripted_client(providers);

    let store = Arc::new(JsonStore::open(dir.path()).unwrap());
    let creator = Creator::new("Ana Souza", "Bem-estar e mente", vec![ContentCategory::Wellness]).unwrap();
    store.add_creator(&creator).unwrap();

    let config = Config {
        data_dir: dir.path().to_path_buf(),
        usage_log: false,
        ..Config::default()
    };
    let service = ContentService::with_client(config, client, store.clone());
    Harness {
        _dir: dir,
        store,
        service,
        creator,
    }
}

fn topics(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

// ─── generation ────────────────────────────────────────────────

#[tokio::test]
async fn test_three_topics_three_ordered_cards() {
    let spy = Arc::new(ScriptedProvider::new(ProviderKind::Gemini).respond_with(card_reply));
    let h = harness(vec![spy.clone()]);

    let batch = topics(&["benefícios da meditação", "equilíbrio emocional", "redução do estresse"]);
    let result = h
        .service
        .generate_cards("ana souza", "", &batch, None)
        .await
        .unwrap();

    assert_eq!(spy.calls(), 3);
    assert!(result.is_complete_success());
    assert_eq!(
        result.cards.iter().map(|c| c.order_index).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    for card in &result.cards {
        assert!(!card.title.contains(PARSE_FAILED_MARKER));
        assert!(!card.summary.contains(PARSE_FAILED_MARKER));
        assert!(!card.detailed_content.contains(PARSE_FAILED_MARKER));
        assert_eq!(card.difficulty, Difficulty::Beginner);
        assert_eq!(card.creator_id, h.creator.creator_id);
        assert_eq!(card.generation.category, ContentCategory::Wellness);
        assert_eq!(card.domain_data["content_category"], "health_wellness");
    }
    assert_eq!(
        result.phases,
        vec![
            BatchPhase::Idle,
            BatchPhase::Validated,
            BatchPhase::Generating,
            BatchPhase::Completed
        ]
    );

    // Persisted as one set with matching counts
    let set_id = result.cards[0].set_id.clone();
    assert!(set_id.starts_with(&format!("{}_benefícios_da_meditação_", h.creator.creator_id)));
    let stored = h.store.get_cards_by_set(&set_id).unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[0].card_id, format!("{}_card_001", set_id));

    assert_eq!(result.stored_set_id.as_deref(), Some(set_id.as_str()));
    assert!(result.storage_error.is_none());
    assert_eq!(h.service.cards_for_set(&set_id).unwrap(), stored);

    let set = h.store.get_content_set(&set_id).unwrap().unwrap();
    assert_eq!(set.card_count, 3);
    assert_eq!(set.estimated_time_minutes, 9);
    assert_eq!(set.topics, batch);
}

#[tokio::test]
async fn test_failure_on_second_of_five_keeps_going() {
    let spy = Arc::new(
        ScriptedProvider::new(ProviderKind::Anthropic)
            .respond_with(card_reply)
            .fail_on(2, ProviderError::Http {
                status: 529,
                body: "overloaded".to_string(),
            }),
    );
    let h = harness(vec![spy.clone()]);

    let batch = topics(&[
        "Sono profundo",
        "Meditação guiada",
        "Respiração consciente",
        "Alimentação leve",
        "Caminhadas diárias",
    ]);
    let result = h
        .service
        .generate_cards(&h.creator.creator_id, "Rotina saudável", &batch, None)
        .await
        .unwrap();

    assert_eq!(spy.calls(), 5);
    assert_eq!(result.cards.len(), 4);
    assert_eq!(result.failed(), 1);
    assert!(!result.is_complete_success());
    assert!(!result.is_total_failure());

    let failed: Vec<_> = result.failures().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].index, 2);
    assert_eq!(failed[0].topic, "Meditação guiada");

    assert_eq!(
        result.cards.iter().map(|c| c.order_index).collect::<Vec<_>>(),
        vec![1, 3, 4, 5]
    );

    let set = h
        .store
        .get_content_set(&result.cards[0].set_id)
        .unwrap()
        .unwrap();
    assert_eq!(set.title, "Rotina saudável");
    assert_eq!(set.card_count, 4);
}

#[tokio::test]
async fn test_total_failure_stores_nothing() {
    let spy = Arc::new(ScriptedProvider::new(ProviderKind::Openai));
    let h = harness(vec![spy.clone()]);

    let batch = topics(&["Sono profundo", "Meditação guiada", "Respiração consciente"]);
    let result = h
        .service
        .generate_cards("Ana Souza", "", &batch, None)
        .await
        .unwrap();

    assert_eq!(spy.calls(), 3);
    assert!(result.is_total_failure());
    assert!(!result.is_stored());
    assert!(h
        .store
        .list_content_sets(&h.creator.creator_id)
        .unwrap()
        .is_empty());
}

/// Delegates to a JSON store; can fail card writes or report every set id as taken.
struct FaultyStore {
    inner: JsonStore,
    disk_full: bool,
    sets_taken: bool,
}

impl ContentStore for FaultyStore {
    fn add_creator(&self, creator: &Creator) -> anyhow::Result<bool> {
        self.inner.add_creator(creator)
    }
    fn get_creator(&self, creator_id: &str) -> anyhow::Result<Option<Creator>> {
        self.inner.get_creator(creator_id)
    }
    fn list_creators(&self) -> anyhow::Result<Vec<Creator>> {
        self.inner.list_creators()
    }
    fn delete_creator(&self, creator_id: &str) -> anyhow::Result<bool> {
        self.inner.delete_creator(creator_id)
    }
    fn add_content_set(&self, set: &ContentSet) -> anyhow::Result<bool> {
        if self.sets_taken {
            return Ok(false);
        }
        self.inner.add_content_set(set)
    }
    fn get_content_set(&self, set_id: &str) -> anyhow::Result<Option<ContentSet>> {
        self.inner.get_content_set(set_id)
    }
    fn update_content_set(&self, set: &ContentSet) -> anyhow::Result<bool> {
        self.inner.update_content_set(set)
    }
    fn list_content_sets(&self, creator_id: &str) -> anyhow::Result<Vec<ContentSet>> {
        self.inner.list_content_sets(creator_id)
    }
    fn add_card(&self, card: &ContentCard) -> anyhow::Result<bool> {
        if self.disk_full {
            anyhow::bail!("disk full");
        }
        self.inner.add_card(card)
    }
    fn get_cards_by_set(&self, set_id: &str) -> anyhow::Result<Vec<ContentCard>> {
        self.inner.get_cards_by_set(set_id)
    }
}

fn faulty_service(
    dir: &TempDir,
    spy: Arc<ScriptedProvider>,
    disk_full: bool,
    sets_taken: bool,
) -> (Arc<FaultyStore>, ContentService, Creator) {
    let store = Arc::new(FaultyStore {
        inner: JsonStore::open(dir.path()).unwrap(),
        disk_full,
        sets_taken,
    });
    let creator = Creator::new("Ana Souza", "", vec![ContentCategory::Wellness]).unwrap();
    store.add_creator(&creator).unwrap();

    let config = Config {
        data_dir: dir.path().to_path_buf(),
        usage_log: false,
        ..Config::default()
    };
    let service = ContentService::with_client(config, scripted_client(vec![spy]), store.clone());
    (store, service, creator)
}

#[tokio::test]
async fn test_card_write_failure_keeps_batch_and_leaves_no_set() {
    let dir = TempDir::new().unwrap();
    let spy = Arc::new(ScriptedProvider::new(ProviderKind::Gemini).respond_with(card_reply));
    let (store, service, creator) = faulty_service(&dir, spy.clone(), true, false);

    let batch = topics(&["Sono profundo", "Meditação guiada", "Respiração consciente"]);
    let result = service
        .generate_cards("Ana Souza", "", &batch, None)
        .await
        .unwrap();

    // The paid-for cards come back even though nothing was stored
    assert_eq!(spy.calls(), 3);
    assert_eq!(result.cards.len(), 3);
    assert!(result.is_complete_success());
    assert!(!result.is_stored());
    let error = result.storage_error.as_deref().unwrap();
    assert!(error.contains("disk full"), "unexpected error: {}", error);

    assert!(store.list_content_sets(&creator.creator_id).unwrap().is_empty());
    assert!(service.content_sets(&creator.creator_id).unwrap().is_empty());

    let json = serde_json::to_value(&result).unwrap();
    assert!(json["storage_error"].as_str().unwrap().contains("disk full"));
    assert!(json.get("stored_set_id").is_none());
}

#[tokio::test]
async fn test_rejected_set_insert_is_reported() {
    let dir = TempDir::new().unwrap();
    let spy = Arc::new(ScriptedProvider::new(ProviderKind::Gemini).respond_with(card_reply));
    let (_store, service, creator) = faulty_service(&dir, spy.clone(), false, true);

    let batch = topics(&["Sono profundo", "Meditação guiada", "Respiração consciente"]);
    let result = service
        .generate_cards("Ana Souza", "", &batch, None)
        .await
        .unwrap();

    assert_eq!(result.cards.len(), 3);
    assert!(!result.is_stored());
    let error = result.storage_error.as_deref().unwrap();
    assert!(error.contains("already exists"), "unexpected error: {}", error);
    assert!(service.content_sets(&creator.creator_id).unwrap().is_empty());
}

#[tokio::test]
async fn test_explicit_dead_provider_falls_back_to_default() {
    let gemini = Arc::new(ScriptedProvider::new(ProviderKind::Gemini).respond_with(card_reply));
    let h = harness(vec![gemini.clone()]);

    let batch = topics(&["Sono profundo", "Meditação guiada", "Respiração consciente"]);
    let result = h
        .service
        .generate_cards("Ana Souza", "", &batch, Some(ProviderKind::Openai))
        .await
        .unwrap();

    assert_eq!(result.provider_used, ProviderKind::Gemini);
    assert_eq!(gemini.calls(), 3);
}

#[tokio::test]
async fn test_invalid_batch_never_calls_provider() {
    let spy = Arc::new(ScriptedProvider::new(ProviderKind::Gemini).respond_with(card_reply));
    let h = harness(vec![spy.clone()]);

    let duplicates = topics(&["Sono profundo", "SONO PROFUNDO", "Respiração consciente"]);
    let err = h
        .service
        .generate_cards("Ana Souza", "", &duplicates, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::DuplicateTopic { .. })
    ));

    let too_few = topics(&["Sono profundo"]);
    assert!(h
        .service
        .generate_cards("Ana Souza", "", &too_few, None)
        .await
        .is_err());
    assert_eq!(spy.calls(), 0);
}

#[tokio::test]
async fn test_unknown_creator_is_validation_error() {
    let spy = Arc::new(ScriptedProvider::new(ProviderKind::Gemini).respond_with(card_reply));
    let h = harness(vec![spy.clone()]);

    let batch = topics(&["Sono profundo", "Meditação guiada", "Respiração consciente"]);
    let err = h
        .service
        .generate_cards("Bruno", "", &batch, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::UnknownCreator(ref name)) if name == "Bruno"
    ));
    assert_eq!(spy.calls(), 0);
}

#[tokio::test]
async fn test_placeholder_credential_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let credentials = Credentials::from_lookup(|var| match var {
        "ANTHROPIC_API_KEY" => Some("your-anthropic-key-here".to_string()),
        _ => None,
    });
    let config = Config {
        data_dir: dir.path().to_path_buf(),
        usage_log: false,
        ..Config::default()
    };
    let store = Arc::new(JsonStore::open(dir.path()).unwrap());
    let service = ContentService::from_parts(config, &credentials, store).unwrap();

    assert!(service.registry().list_available().is_empty());
    assert!(service.list_available_providers().is_empty());

    let batch = topics(&["Sono profundo", "Meditação guiada", "Respiração consciente"]);
    let err = service
        .generate_cards("Ana Souza", "", &batch, None)
        .await
        .unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("No LLM providers configured"));
}

// ─── extraction ────────────────────────────────────────────────

#[tokio::test]
async fn test_extract_topics_returns_cleaned_lines() {
    let spy = Arc::new(ScriptedProvider::new(ProviderKind::Gemini).reply(
        "1. Redução do estresse\n2. Concentração\n- Equilíbrio emocional\n3. ok",
    ));
    let h = harness(vec![spy.clone()]);

    let topics = h
        .service
        .extract_topics(PASSAGE, "bem-estar", "Ana Souza", None)
        .await;
    assert_eq!(
        topics,
        vec!["Redução do estresse", "Concentração", "Equilíbrio emocional"]
    );
    assert_eq!(spy.calls(), 1);
    assert!(h.service.validate_topic_batch(&topics).is_ok());
}

#[tokio::test]
async fn test_extract_short_content_is_empty_without_call() {
    let spy = Arc::new(ScriptedProvider::new(ProviderKind::Gemini).always("Tópico qualquer"));
    let h = harness(vec![spy.clone()]);

    for content in ["", "curto demais", "   espaços    não    contam   "] {
        assert!(h.service.extract_topics(content, "", "", None).await.is_empty());
    }
    assert_eq!(spy.calls(), 0);
}

#[tokio::test]
async fn test_extract_provider_failure_is_empty() {
    let spy = Arc::new(ScriptedProvider::new(ProviderKind::Gemini).fail(ProviderError::EmptyResponse));
    let h = harness(vec![spy.clone()]);

    assert!(h.service.extract_topics(PASSAGE, "", "", None).await.is_empty());
    assert_eq!(spy.calls(), 1);
}
