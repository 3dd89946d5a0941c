// CLI module
// Argument definitions and command handlers for the infogen binary

mod commands;

pub use commands::{
    format_batch, format_cards, format_creators, format_providers, format_sets, format_status,
    format_usage, run,
};

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ProviderKind;
use crate::content::ContentCategory;

#[derive(Debug, Parser)]
#[command(
    name = "infogen",
    version,
    about = "Generate educational content cards with LLM providers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug-level logging for infogen
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ~/.infogen/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List live providers with cost estimates
    Providers {
        /// Number of cards to estimate for
        #[arg(long, default_value_t = 10)]
        cards: u32,
    },

    /// Show whether any provider is configured
    Status,

    /// Show token usage and cost for a day
    Usage {
        /// Day to summarise (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Manage creators
    #[command(subcommand)]
    Creators(CreatorCommands),

    /// List a creator's content sets
    Sets {
        /// Creator id or display name
        #[arg(long)]
        creator: String,
    },

    /// Show the cards stored in a content set
    Cards {
        set_id: String,
    },

    /// Extract candidate topics from a text
    Extract(ExtractArgs),

    /// Check a topic batch before generation
    Validate {
        /// Topics, one per argument
        #[arg(required = true)]
        topics: Vec<String>,
    },

    /// Generate one card per topic for a creator
    Generate(GenerateArgs),
}

#[derive(Debug, Subcommand)]
pub enum CreatorCommands {
    /// Register a new creator
    Add {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Content category (repeatable; the first one is primary)
        #[arg(long = "category")]
        categories: Vec<ContentCategory>,

        /// Platform name, e.g. instagram
        #[arg(long, requires = "handle")]
        platform: Option<String>,

        /// Platform handle; the creator id is derived from it
        #[arg(long, requires = "platform")]
        handle: Option<String>,

        /// Social link as network=url (repeatable)
        #[arg(long = "link", value_name = "NETWORK=URL", value_parser = parse_link)]
        links: Vec<(String, String)>,
    },

    /// List registered creators
    List,
}

fn parse_link(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((network, url)) if !network.trim().is_empty() && !url.trim().is_empty() => {
            Ok((network.to_string(), url.to_string()))
        }
        _ => Err(format!("expected NETWORK=URL, got '{}'", value)),
    }
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Read the text from a file
    #[arg(long, conflicts_with = "text", required_unless_present = "text")]
    pub file: Option<PathBuf>,

    /// Text passed inline
    #[arg(long)]
    pub text: Option<String>,

    /// Focus hint for the model
    #[arg(long, default_value = "")]
    pub guidance: String,

    /// Creator id or display name
    #[arg(long, default_value = "")]
    pub creator: String,

    #[arg(long)]
    pub provider: Option<ProviderKind>,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Creator id or display name
    #[arg(long)]
    pub creator: String,

    /// Context added to every card prompt; also titles the content set
    #[arg(long, default_value = "")]
    pub guidance: String,

    #[arg(long)]
    pub provider: Option<ProviderKind>,

    /// Print the batch result as JSON
    #[arg(long)]
    pub json: bool,

    /// Topics, one per argument
    #[arg(required = true)]
    pub topics: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate() {
        let cli = Cli::parse_from([
            "infogen",
            "generate",
            "--creator",
            "Ana",
            "--provider",
            "claude",
            "Sono profundo",
            "Meditação guiada",
            "Respiração",
        ]);
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.creator, "Ana");
                assert_eq!(args.provider, Some(ProviderKind::Anthropic));
                assert_eq!(args.topics.len(), 3);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_creator_categories() {
        let cli = Cli::parse_from([
            "infogen",
            "-v",
            "creators",
            "add",
            "--name",
            "Ana",
            "--category",
            "wellness",
            "--category",
            "space exploration",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Creators(CreatorCommands::Add { categories, .. }) => {
                assert_eq!(
                    categories,
                    vec![ContentCategory::Wellness, ContentCategory::SpaceExploration]
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_category_and_provider() {
        assert!(Cli::try_parse_from(["infogen", "creators", "add", "--name", "Ana", "--category", "astrology"]).is_err());
        assert!(Cli::try_parse_from(["infogen", "extract", "--text", "x", "--provider", "mistral"]).is_err());
    }

    #[test]
    fn test_parse_creator_links() {
        let cli = Cli::parse_from([
            "infogen",
            "creators",
            "add",
            "--name",
            "Ana",
            "--link",
            "YouTube=https://youtube.com/@ana",
            "--link",
            "site=https://ana.example",
        ]);
        match cli.command {
            Commands::Creators(CreatorCommands::Add { links, .. }) => {
                assert_eq!(links.len(), 2);
                assert_eq!(links[0], ("YouTube".to_string(), "https://youtube.com/@ana".to_string()));
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(Cli::try_parse_from(["infogen", "creators", "add", "--name", "Ana", "--link", "youtube"]).is_err());
    }

    #[test]
    fn test_parse_sets_and_cards() {
        let cli = Cli::parse_from(["infogen", "sets", "--creator", "Ana Souza"]);
        assert!(matches!(cli.command, Commands::Sets { ref creator } if creator == "Ana Souza"));
        let cli = Cli::parse_from(["infogen", "cards", "ana_1_sono_abcd1234"]);
        assert!(matches!(cli.command, Commands::Cards { ref set_id } if set_id == "ana_1_sono_abcd1234"));
    }

    #[test]
    fn test_extract_needs_input() {
        assert!(Cli::try_parse_from(["infogen", "extract"]).is_err());
        assert!(Cli::try_parse_from(["infogen", "extract", "--file", "a.txt", "--text", "b"]).is_err());
    }
}
