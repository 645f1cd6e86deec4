//! Batch scrape command.

use std::path::PathBuf;

use anyhow::Context;
use console::style;

use super::read_input;
use crate::cli::icons::{dim_arrow, success, warn};
use crate::cli::progress::BatchProgress;
use crate::config::Settings;
use crate::models::BatchError;
use crate::prompt::PromptAssembler;
use crate::utils::parse_url_list;

pub struct ScrapeArgs {
    pub urls: Vec<String>,
    pub file: Option<PathBuf>,
    pub topic: Option<String>,
    pub use_browser: bool,
    pub json: bool,
    pub output: Option<PathBuf>,
}

impl ScrapeArgs {
    /// Positional URLs followed by those read from `--file`.
    fn collect_urls(&self) -> anyhow::Result<Vec<String>> {
        let mut urls: Vec<String> = self
            .urls
            .iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();
        if let Some(ref file) = self.file {
            urls.extend(parse_url_list(&read_input(file)?));
        }
        Ok(urls)
    }
}

pub async fn cmd_scrape(settings: &Settings, args: ScrapeArgs) -> anyhow::Result<()> {
    let urls = args.collect_urls()?;
    if urls.is_empty() {
        anyhow::bail!("No URLs given. Pass them as arguments or with --file.");
    }

    let assembler = settings
        .prompt_assembler()
        .context("Failed to load prompt templates")?;
    let coordinator = settings
        .batch_coordinator(args.use_browser)
        .context("Failed to build HTTP client")?;

    if !args.json {
        let tiers = if coordinator.orchestrator().active_dynamic_tier().is_some() {
            "browser, then static"
        } else {
            "static only"
        };
        eprintln!(
            "{} Fetching {} URL(s) ({})",
            style("→").cyan(),
            urls.len(),
            tiers
        );
    }

    let progress = if args.json {
        BatchProgress::hidden()
    } else {
        BatchProgress::new(urls.len())
    };
    let result = coordinator.run(urls.as_slice(), |update| progress.update(update)).await;
    progress.finish();

    if args.json {
        let json = serde_json::to_string_pretty(&result)?;
        return emit(&json, args.output.as_ref(), None);
    }

    eprintln!(
        "{} {} of {} URL(s) produced a structure",
        success(),
        result.success_count(),
        result.len()
    );

    let topic = args.topic.as_deref();
    let prompt = match result.structures() {
        Ok(structures) => {
            println!("{}", style("Competitor structures").bold());
            println!("{}\n", PromptAssembler::render_competitors(&structures));
            assembler.assemble(&structures, topic)
        }
        Err(e @ BatchError::NoUsableStructure { .. }) => {
            eprintln!("{} {}", warn(), e);
            eprintln!("  {} Falling back to the default prompt", dim_arrow());
            assembler.default_prompt(topic)
        }
    };

    emit(&prompt, args.output.as_ref(), Some("Prompt"))
}

/// Write the primary artifact to `output`, or print it under an optional title.
fn emit(text: &str, output: Option<&PathBuf>, title: Option<&str>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("{} Wrote {}", success(), path.display());
        }
        None => {
            if let Some(title) = title {
                println!("{}", style(title).bold());
            }
            println!("{}", text);
        }
    }
    Ok(())
}
