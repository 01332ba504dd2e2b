//! Turns a webpage or a PDF file into the plain text that gets summarized.

pub mod pdf;
pub mod render;
pub mod web;

use std::fmt;
use std::path::PathBuf;

use reqwest::Client;
use thiserror::Error;

use render::RenderStep;

/// Where the content to summarize comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    Pdf(PathBuf),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "Webpage URL: {url}"),
            Self::Pdf(path) => write!(f, "PDF file: {}", path.display()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Could not find PDF file: {}", .0.display())]
    MissingPdf(PathBuf),

    #[error("Could not read PDF file '{}': {message}", path.display())]
    Pdf { path: PathBuf, message: String },

    #[error("Could not retrieve webpage '{url}'")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Could not retrieve webpage. It appears to use a CAPTCHA.")]
    Captcha,

    #[error("Could not retrieve webpage. Is there a paywall?")]
    PossiblePaywall,
}

/// Produces the text for `source`. `render` is only consulted for URLs.
pub async fn extract(
    client: &Client,
    source: &Source,
    render: Option<&RenderStep>,
) -> Result<String, ExtractError> {
    match source {
        Source::Pdf(path) => pdf::pdf_text(path),
        Source::Url(url) => web::fetch_article(client, url, render).await,
    }
}
