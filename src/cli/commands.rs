// Command handling

use anyhow::{bail, Context, Result};
use chrono::Utc;

use super::{Cli, Commands, CreatorCommands, ExtractArgs, GenerateArgs};
use crate::config;
use crate::content::{ContentCard, ContentSet, Creator};
use crate::generation::{BatchResult, TopicStatus};
use crate::logging::UsageSummary;
use crate::service::{ContentService, GeneratorStatus, ProviderSummary};

pub async fn run(cli: Cli) -> Result<()> {
    let config = config::load(cli.config.as_deref())?;
    let service = ContentService::new(config)?;

    match cli.command {
        Commands::Providers { cards } => {
            print!("{}", format_providers(&service.list_available_providers(), cards));
        }
        Commands::Status => {
            println!("{}", format_status(&service.status()));
        }
        Commands::Usage { date } => {
            let Some(logger) = service.usage_log() else {
                println!("Usage logging is disabled (usage_log = false)");
                return Ok(());
            };
            let date = date.unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string());
            let summary = logger.summary_for(&date)?;
            print!("{}", format_usage(&date, &summary));
        }
        Commands::Creators(CreatorCommands::Add {
            name,
            description,
            categories,
            platform,
            handle,
            links,
        }) => {
            let mut creator = Creator::new(&name, &description, categories)?;
            if let (Some(platform), Some(handle)) = (platform, handle) {
                creator = creator.with_platform(&platform, &handle);
            }
            for (network, url) in links {
                creator = creator.with_social_link(&network, &url);
            }
            if !service.register_creator(&creator)? {
                bail!("Creator id '{}' already exists", creator.creator_id);
            }
            println!("Created creator {} ({})", creator.display_name, creator.creator_id);
        }
        Commands::Creators(CreatorCommands::List) => {
            print!("{}", format_creators(&service.list_creators()?));
        }
        Commands::Sets { creator } => {
            let Some(creator) = service.find_creator(&creator)? else {
                bail!("Unknown creator: {}", creator);
            };
            print!("{}", format_sets(&service.content_sets(&creator.creator_id)?));
        }
        Commands::Cards { set_id } => {
            print!("{}", format_cards(&service.cards_for_set(&set_id)?));
        }
        Commands::Extract(args) => extract(&service, args).await?,
        Commands::Validate { topics } => match service.validate_topic_batch(&topics) {
            Ok(()) => println!("OK: {} topics ready for generation", topics.len()),
            Err(reason) => bail!(reason),
        },
        Commands::Generate(args) => generate(&service, args).await?,
    }

    Ok(())
}

async fn extract(service: &ContentService, args: ExtractArgs) -> Result<()> {
    let content = match (&args.file, args.text) {
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, Some(text)) => text,
        (None, None) => bail!("Provide --file or --text"),
    };

    let topics = service
        .extract_topics(&content, &args.guidance, &args.creator, args.provider)
        .await;
    if topics.is_empty() {
        bail!("No topics extracted (content too short, no provider, or provider failure; see log)");
    }
    for topic in topics {
        println!("{}", topic);
    }
    Ok(())
}

async fn generate(service: &ContentService, args: GenerateArgs) -> Result<()> {
    let result = service
        .generate_cards(&args.creator, &args.guidance, &args.topics, args.provider)
        .await?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialize batch result")?
        );
    } else {
        print!("{}", format_batch(&result));
    }

    if result.is_total_failure() {
        bail!("All {} topics failed", result.requested());
    }
    if let Some(error) = &result.storage_error {
        bail!("{} cards generated but not stored: {}", result.cards.len(), error);
    }
    Ok(())
}

pub fn format_providers(providers: &[ProviderSummary], cards: u32) -> String {
    if providers.is_empty() {
        return "No providers configured. Set GOOGLE_API_KEY, ANTHROPIC_API_KEY or OPENAI_API_KEY.\n"
            .to_string();
    }

    let mut output = format!("Available providers (estimate for {} cards):\n", cards);
    for provider in providers {
        let mut tags = Vec::new();
        if provider.is_default {
            tags.push("default");
        }
        if provider.is_cheapest {
            tags.push("cheapest");
        }
        let tags = if tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", tags.join(", "))
        };
        output.push_str(&format!(
            "  {} - {} ({}): ${:.4}/card, ${:.4} total{}\n",
            provider.kind,
            provider.display_name,
            provider.model,
            provider.cost_per_card,
            provider.cost_per_card * f64::from(cards),
            tags
        ));
    }
    output
}

pub fn format_status(status: &GeneratorStatus) -> String {
    match status.default_provider {
        Some(default) => format!("{} (default: {})", status.message(), default),
        None => status.message(),
    }
}

pub fn format_usage(date: &str, summary: &UsageSummary) -> String {
    let mut output = format!(
        "Usage for {}:\n\
        Calls: {}\n\
        Input tokens: {}\n\
        Output tokens: {}\n\
        Estimated cost: ${:.4}\n",
        date, summary.calls, summary.input_tokens, summary.output_tokens, summary.cost
    );

    if !summary.calls_by_provider.is_empty() {
        output.push_str("\nBy provider:\n");
        for (provider, calls) in &summary.calls_by_provider {
            output.push_str(&format!("  {}: {} calls\n", provider, calls));
        }
    }
    output
}

pub fn format_creators(creators: &[Creator]) -> String {
    if creators.is_empty() {
        return "No creators registered.\n".to_string();
    }
    let mut output = String::from("Creators:\n");
    for (i, creator) in creators.iter().enumerate() {
        output.push_str(&format!(
            "  {}. {} ({}) - {}\n",
            i + 1,
            creator.display_name,
            creator.creator_id,
            creator.primary_category()
        ));
    }
    output
}

pub fn format_sets(sets: &[ContentSet]) -> String {
    if sets.is_empty() {
        return "No content sets.\n".to_string();
    }
    let mut output = String::from("Content sets:\n");
    for set in sets {
        output.push_str(&format!(
            "  {} - {} ({} cards, ~{} min)\n",
            set.set_id, set.title, set.card_count, set.estimated_time_minutes
        ));
    }
    output
}

pub fn format_cards(cards: &[ContentCard]) -> String {
    if cards.is_empty() {
        return "No cards in this set.\n".to_string();
    }
    let mut output = String::new();
    for card in cards {
        output.push_str(&format!(
            "{}. {} [{}]\n   {}\n",
            card.order_index, card.title, card.difficulty, card.summary
        ));
    }
    output
}

pub fn format_batch(result: &BatchResult) -> String {
    let mut output = format!(
        "Generated {}/{} cards via {} (est. ${:.4})\n",
        result.succeeded(),
        result.requested(),
        result.provider_used,
        result.total_cost()
    );
    match (&result.stored_set_id, &result.storage_error) {
        (Some(set_id), _) => output.push_str(&format!("Content set: {}\n", set_id)),
        (None, Some(error)) => output.push_str(&format!("NOT STORED: {}\n", error)),
        (None, None) => {}
    }

    for outcome in &result.ledger {
        match &outcome.status {
            TopicStatus::Succeeded { card_id } => {
                output.push_str(&format!("  {}. {} -> {}\n", outcome.index, outcome.topic, card_id));
            }
            TopicStatus::Failed { reason, timed_out } => {
                let label = if *timed_out { "TIMEOUT" } else { "FAILED" };
                output.push_str(&format!(
                    "  {}. {} -> {}: {}\n",
                    outcome.index, outcome.topic, label, reason
                ));
            }
        }
    }
    output
}
