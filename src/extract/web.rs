use reqwest::Client;
use reqwest::header::USER_AGENT;
use scraper::{ElementRef, Html};
use tracing::{debug, warn};

use super::ExtractError;
use super::render::RenderStep;

const TITLE_TAG: &str = "h1";
const PARAGRAPH_TAG: &str = "p";
const CAPTCHA_MARKER: &str = "captcha";

/// Sites that turn away non-browser agents serve empty shells that would read as a paywall.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_12_6) \
AppleWebKit/603.3.8 (KHTML, like Gecko) Version/10.1.2 Safari/603.3.8";

/// Fetches `url`, optionally lets `render` replace the markup, and extracts the article text.
pub async fn fetch_article(
    client: &Client,
    url: &str,
    render: Option<&RenderStep>,
) -> Result<String, ExtractError> {
    let fetched = fetch_markup(client, url).await?;
    let markup = match render {
        Some(step) => step.render_or(url, fetched).await,
        None => fetched,
    };
    article_text(&markup)
}

async fn fetch_markup(client: &Client, url: &str) -> Result<String, ExtractError> {
    let fetch_error = |source: reqwest::Error| ExtractError::Fetch {
        url: url.to_string(),
        source,
    };

    let response = client
        .get(url)
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .send()
        .await
        .map_err(fetch_error)?;
    let status = response.status();
    if !status.is_success() {
        // Challenge pages usually arrive as 403; their body still feeds the CAPTCHA check.
        warn!(url = %url, status = %status, "webpage returned non-success status");
    }

    let markup = response.text().await.map_err(fetch_error)?;
    debug!(url = %url, status = %status, markup_len = markup.len(), "fetched webpage");
    Ok(markup)
}

/// Builds `title + "\n\n"` followed by every non-empty paragraph and a blank line.
///
/// The title is the first `h1` with visible text, or empty. When no paragraph
/// has text the markup is checked for a CAPTCHA marker to pick the error.
pub fn article_text(markup: &str) -> Result<String, ExtractError> {
    let document = Html::parse_document(markup);

    let title = elements_named(&document, TITLE_TAG)
        .map(element_text)
        .find(|text| !text.is_empty())
        .unwrap_or_default();

    let mut body = String::new();
    for text in elements_named(&document, PARAGRAPH_TAG)
        .map(element_text)
        .filter(|text| !text.is_empty())
    {
        body.push_str(&text);
        body.push_str("\n\n");
    }

    if body.trim().is_empty() {
        return Err(if markup.to_ascii_lowercase().contains(CAPTCHA_MARKER) {
            ExtractError::Captcha
        } else {
            ExtractError::PossiblePaywall
        });
    }

    Ok(format!("{title}\n\n{body}"))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Elements with tag `name`, in document order.
fn elements_named<'a>(
    document: &'a Html,
    name: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(move |element| element.value().name() == name)
}
