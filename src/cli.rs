use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::config::{DEFAULT_CONFIG_PATH, Overrides};
use crate::extract::Source;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("You must provide either a URL or a PDF file to summarize, but not both.")]
    MissingSource,
}

/// Summarize a webpage or PDF using the OpenAI chat completion API
#[derive(Parser, Debug)]
#[command(name = "summurai")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// URL of the webpage to summarize
    #[arg(value_name = "URL", conflicts_with_all = ["url", "pdf"])]
    pub target: Option<String>,

    /// URL of the webpage to summarize
    #[arg(short = 'u', long = "url", value_name = "URL", conflicts_with = "pdf")]
    pub url: Option<String>,

    /// Path to a PDF file to summarize
    #[arg(short = 'p', long = "pdf", value_name = "PATH")]
    pub pdf: Option<PathBuf>,

    /// OpenAI API key
    #[arg(short = 'a', long = "api-key")]
    pub api_key: Option<String>,

    /// Chat model to use for summarization
    #[arg(short = 'm', long = "model")]
    pub model: Option<String>,

    /// Keep chatting about the document after the summary
    #[arg(short = 'i', long = "interactive")]
    pub interactive: bool,

    /// Skip printing the summary and go straight to interactive mode
    #[arg(short = 's', long = "skip-summary")]
    pub skip_summary: bool,

    /// Settings file with openai_api_key / openai_chat_model lines
    #[arg(long = "config", value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Use the fetched markup as-is instead of rendering the page in a headless browser
    #[arg(long = "no-render")]
    pub no_render: bool,
}

impl Cli {
    pub fn source(&self) -> Result<Source, UsageError> {
        if let Some(path) = &self.pdf {
            return Ok(Source::Pdf(path.clone()));
        }
        self.target
            .as_ref()
            .or(self.url.as_ref())
            .map(|url| Source::Url(url.clone()))
            .ok_or(UsageError::MissingSource)
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
        }
    }

    /// The summary is shown unless interactive mode was asked to skip it.
    pub fn show_summary(&self) -> bool {
        !(self.interactive && self.skip_summary)
    }
}
