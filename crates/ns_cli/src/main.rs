use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use ns_core::mentions::mention_summary;
use ns_core::{count_mentions, ArticleType, FormContext, SummaryForm, TextStats, DEFAULT_SENTENCES};
use ns_inference::{Backend, Config, SummaryOrchestrator};
use ns_scrapers::logging::init_logging;
use ns_scrapers::{handle_command, ScraperArgs, ScraperCommands};
use ns_web::AppState;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Summarise news articles for press cuttings", long_about = None)]
pub struct Cli {
    /// Completion backend: anthropic (default) or dummy
    #[arg(long, global = true)]
    model: Option<Backend>,
    /// Domain to publication-name table
    #[arg(long, global = true)]
    publications: Option<PathBuf>,
    /// Skip the credential check at startup
    #[arg(long, global = true)]
    no_validate_key: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Extraction tools
    Scrape {
        #[command(subcommand)]
        command: ScraperCommands,
    },
    /// Detect the language an article is written in
    DetectLanguage {
        #[command(flatten)]
        input: TextInput,
    },
    /// Ask the model which type of article a text is
    DetectType {
        #[command(flatten)]
        input: TextInput,
    },
    /// Count how often a client is mentioned
    Mentions {
        #[arg(long)]
        name: String,
        #[command(flatten)]
        input: TextInput,
    },
    /// Write a summary of an article
    Summarise {
        /// Scrape the article from this URL
        #[arg(long, conflicts_with_all = ["text", "file"])]
        url: Option<String>,
        #[command(flatten)]
        input: TextInput,
        #[arg(long)]
        publication: Option<String>,
        #[arg(long = "type", default_value = "news")]
        article_type: ArticleType,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        instructions: Option<String>,
        #[arg(long, default_value_t = DEFAULT_SENTENCES)]
        sentences: u8,
        /// Client whose mentions shape the summary
        #[arg(long)]
        client: Option<String>,
        /// Let the model pick the article type
        #[arg(long)]
        detect_type: bool,
        /// Print the summary without its publication attribution
        #[arg(long)]
        clean: bool,
    },
    /// Run the HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
}

#[derive(clap::Args, Debug)]
struct TextInput {
    /// Article text; read from stdin when neither --text nor --file is given
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,
    #[arg(long)]
    file: Option<PathBuf>,
}

impl TextInput {
    fn read(&self) -> anyhow::Result<String> {
        if let Some(text) = &self.text {
            return Ok(text.clone());
        }
        if let Some(path) = &self.file {
            return std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()));
        }
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).context("reading article text from stdin")?;
        Ok(text)
    }
}

fn config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::from_env()?;
    if let Some(backend) = cli.model {
        config = config.with_backend(backend);
    }
    if let Some(path) = &cli.publications {
        config.publications_file = path.clone();
    }
    if cli.no_validate_key {
        config.validate_key = false;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logger = init_logging().with_prefix("ns".to_string());
    let cli = Cli::parse();
    let config = config(&cli)?;

    let orchestrator = SummaryOrchestrator::from_config(&config).await?;
    logger.info(&format!("🧠 Completion service ready (using {})", orchestrator.service_name()));

    match cli.command {
        Commands::Scrape { command } => {
            handle_command(ScraperArgs { command }, orchestrator.extractor()).await?;
        }
        Commands::DetectLanguage { input } => {
            let info = orchestrator.detect_language(&input.read()?).await;
            println!("{}", info.caption());
        }
        Commands::DetectType { input } => {
            let detection = orchestrator.detect_type(&input.read()?).await?;
            println!("{} ({})", detection.article_type.title(), detection.explanation);
        }
        Commands::Mentions { name, input } => {
            let text = input.read()?;
            let count = count_mentions(&text, name.trim());
            if count == 0 {
                println!("✗ '{}' was not found in the article text", name.trim());
            } else {
                println!("{}", mention_summary(name.trim(), count));
            }
            println!("{}", TextStats::of(&text).caption());
        }
        Commands::Summarise {
            url,
            input,
            publication,
            article_type,
            author,
            instructions,
            sentences,
            client,
            detect_type,
            clean,
        } => {
            let mut ctx = FormContext::with_form(SummaryForm {
                article_type,
                use_ai_detection: detect_type,
                sentence_count: sentences,
                author: author.unwrap_or_default(),
                specific_instructions: instructions.unwrap_or_default(),
                client_name: client.unwrap_or_default(),
                ..SummaryForm::default()
            });

            if let Some(url) = url {
                ctx.form.url = url.clone();
                let scrape = orchestrator.scrape(&url).await;
                info!("{}", scrape.status);
                let success = scrape.result.success;
                ctx.apply_scrape(scrape.result);
                if !success {
                    bail!(ctx.error_message.unwrap_or_else(|| "Extraction failed".to_string()));
                }
                ctx.detected_language = scrape.language;
            } else {
                ctx.form.article_text = input.read()?;
            }

            if let Some(publication) = publication {
                ctx.form.publication = publication;
            }

            if detect_type {
                ctx.detected_type = Some(orchestrator.detect_type(&ctx.form.article_text).await?);
            }

            let outcome = orchestrator.summarise_form(&mut ctx).await?;
            if !outcome.language.is_english {
                info!("{}", outcome.language.caption());
            }
            if clean {
                println!("{}", outcome.clean_summary);
            } else {
                println!("{}", outcome.summary);
            }
        }
        Commands::Serve { addr } => {
            logger.info(&format!("🌐 Starting API on {}", addr));
            ns_web::serve(AppState::new(orchestrator), addr).await?;
        }
    }

    Ok(())
}
