// Per-provider smoke tests
//
// One card request per provider: sends the real card prompt and checks the
// reply parses into a card with at least a title and a summary.
//
// Run all: INFOGEN_LIVE_TESTS=1 cargo test -- --include-ignored live_
// Run one: INFOGEN_LIVE_TESTS=1 ANTHROPIC_API_KEY=sk-ant-... cargo test -- --include-ignored live_anthropic

use infogen::config::ProviderKind;
use infogen::content::ContentCategory;
use infogen::generation::prompts::CARD_SYSTEM_PROMPT;
use infogen::generation::{CardField, CardParser, GenerationRequest, LabeledCardParser};
use infogen::providers::{CompletionRequest, LlmProvider};

use crate::{live_tests_enabled, make_provider, resolve_api_key};

async fn card_smoke(kind: ProviderKind) {
    if !live_tests_enabled() {
        return;
    }
    if resolve_api_key(kind).is_none() {
        eprintln!("skip: no API key for {}", kind);
        return;
    }
    let provider = make_provider(kind).expect("provider");

    let prompt = GenerationRequest {
        topic: "Por que a Lua tem fases?".to_string(),
        category: ContentCategory::SpaceExploration,
        position: 1,
        card_count: 1,
        provider: Some(kind),
        context: String::new(),
        language: "pt-BR".to_string(),
    }
    .user_prompt();
    let request = CompletionRequest::new(prompt)
        .with_system(CARD_SYSTEM_PROMPT)
        .with_max_tokens(1000)
        .with_temperature(0.6);

    let completion = provider
        .complete(&request)
        .await
        .unwrap_or_else(|e| panic!("{} request failed: {}", kind, e));
    assert_eq!(completion.provider, kind);
    assert!(completion.usage.output_tokens > 0, "{} reported no usage", kind);

    let parsed = LabeledCardParser::new().parse(&completion.text);
    assert!(
        !parsed.missing.contains(&CardField::Title) && !parsed.missing.contains(&CardField::Summary),
        "{} reply missing labels: {:?}\n{}",
        kind,
        parsed.missing,
        completion.text
    );
}

// ── Gemini ────────────────────────────────────────────────────────────────────

#[tokio::test]
#[ignore = "live: set INFOGEN_LIVE_TESTS=1"]
async fn live_gemini_card() {
    card_smoke(ProviderKind::Gemini).await;
}

// ── Anthropic ─────────────────────────────────────────────────────────────────

#[tokio::test]
#[ignore = "live: set INFOGEN_LIVE_TESTS=1"]
async fn live_anthropic_card() {
    card_smoke(ProviderKind::Anthropic).await;
}

// ── OpenAI ────────────────────────────────────────────────────────────────────

#[tokio::test]
#[ignore = "live: set INFOGEN_LIVE_TESTS=1"]
async fn live_openai_card() {
    card_smoke(ProviderKind::Openai).await;
}
