//! Prompt assembly from collected competitor structures.

mod templates;

pub use templates::{DEFAULT_PROMPT, DEFAULT_TOPIC, STRUCTURE_PROMPT};

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::CompetitorStructure;
use crate::utils::expand_path;

/// Errors loading a custom template.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("failed to read template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("template {path} has no {{competitors}} placeholder")]
    MissingCompetitors { path: PathBuf },
}

/// Renders structures into the final prompt text.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    template: String,
    default_template: String,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self {
            template: STRUCTURE_PROMPT.to_string(),
            default_template: DEFAULT_PROMPT.to_string(),
        }
    }
}

impl PromptAssembler {
    pub fn new(template: impl Into<String>, default_template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            default_template: default_template.into(),
        }
    }

    /// Built-in templates, optionally replaced from files.
    pub fn from_files(
        template_file: Option<&Path>,
        default_template_file: Option<&Path>,
    ) -> Result<Self, PromptError> {
        let mut assembler = Self::default();
        if let Some(path) = template_file {
            let template = read_template(path)?;
            if !template.contains("{competitors}") {
                return Err(PromptError::MissingCompetitors {
                    path: path.to_path_buf(),
                });
            }
            assembler.template = template;
        }
        if let Some(path) = default_template_file {
            assembler.default_template = read_template(path)?;
        }
        Ok(assembler)
    }

    /// Numbered competitor blocks, e.g. `Competitor 1:\n<H2>Intro`, separated
    /// by blank lines.
    pub fn render_competitors(structures: &[&CompetitorStructure]) -> String {
        structures
            .iter()
            .enumerate()
            .map(|(i, structure)| format!("Competitor {}:\n{}", i + 1, structure))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Full prompt for the successful structures, in input order.
    pub fn assemble(&self, structures: &[&CompetitorStructure], topic: Option<&str>) -> String {
        let competitors = Self::render_competitors(structures);
        fill(&self.template, &competitors, topic)
    }

    /// Fallback prompt for a batch with no usable structure.
    pub fn default_prompt(&self, topic: Option<&str>) -> String {
        fill(&self.default_template, "", topic)
    }
}

fn read_template(path: &Path) -> Result<String, PromptError> {
    let path = expand_path(path);
    std::fs::read_to_string(&path).map_err(|source| PromptError::Read { path, source })
}

// `{topic}` goes last so competitor headings containing the literal text
// "{topic}" are left alone.
fn fill(template: &str, competitors: &str, topic: Option<&str>) -> String {
    let topic = topic
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TOPIC);
    let (before, after) = match template.split_once("{competitors}") {
        Some(parts) => parts,
        None => return template.replace("{topic}", topic),
    };
    format!(
        "{}{}{}",
        before.replace("{topic}", topic),
        competitors,
        after.replace("{topic}", topic)
    )
}
