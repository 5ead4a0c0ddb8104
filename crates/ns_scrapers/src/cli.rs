use clap::{Args, Subcommand};
use ns_core::{ExtractionResult, Result};

use crate::extractor::ContentExtractor;
use crate::paywall::{is_likely_paywalled, PAYWALL_DOMAINS};

#[derive(Args, Debug)]
pub struct ScraperArgs {
    #[command(subcommand)]
    pub command: ScraperCommands,
}

#[derive(Subcommand, Debug)]
pub enum ScraperCommands {
    /// Extract the article text behind a URL
    Url {
        url: String,
        /// Print the full extraction result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which publication a URL belongs to
    Publication { url: String },
    /// Check a URL against the paywall list, or list the known paywalled domains
    Paywall { url: Option<String> },
}

pub async fn handle_command(args: ScraperArgs, extractor: &ContentExtractor) -> Result<()> {
    match args.command {
        ScraperCommands::Url { url, json } => {
            let result = extractor.extract(&url).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(&result);
            }
        }
        ScraperCommands::Publication { url } => {
            let name = extractor.resolver().resolve(&url);
            if name.is_empty() {
                eprintln!("No publication could be derived from {}", url);
            } else {
                println!("{}", name);
            }
        }
        ScraperCommands::Paywall { url: Some(url) } => {
            let verdict = if is_likely_paywalled(&url) { "likely paywalled" } else { "not on the paywall list" };
            println!("{}: {}", url, verdict);
        }
        ScraperCommands::Paywall { url: None } => {
            println!("Known paywalled domains:");
            for domain in PAYWALL_DOMAINS {
                println!("  {}", domain);
            }
        }
    }
    Ok(())
}

fn print_result(result: &ExtractionResult) {
    if !result.success {
        eprintln!("❌ {}", result.status_message());
        return;
    }

    println!("{}", result.status_message());
    println!("📰 {}", result.publication);
    if let Some(title) = &result.title {
        println!("📝 {}", title);
    }
    if let Some(author) = &result.author {
        println!("✍️ {}", author);
    }
    if let Some(text) = &result.text {
        println!("\n{}", text);
    }
}
