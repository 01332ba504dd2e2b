//! Best-effort headless rendering so client-side scripts can fill in the page.

use std::sync::Arc;
use std::time::{Duration, Instant};

use headless_chrome::{Browser, LaunchOptions};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("headless browser failed: {0}")]
    Browser(String),

    #[error("render deadline passed")]
    DeadlineExceeded,
}

impl RenderError {
    fn browser(err: impl std::fmt::Display) -> Self {
        Self::Browser(err.to_string())
    }
}

/// Time left before `deadline`, or [`RenderError::DeadlineExceeded`] once it has passed.
pub fn remaining(deadline: Instant) -> Result<Duration, RenderError> {
    deadline
        .checked_duration_since(Instant::now())
        .filter(|left| !left.is_zero())
        .ok_or(RenderError::DeadlineExceeded)
}

/// Loads `url` in a browser and returns the resulting DOM as markup.
///
/// Implementations must give up once `deadline` passes; the caller stops
/// waiting at that point.
pub trait PageRenderer: Send + Sync {
    fn render(&self, url: &str, deadline: Instant) -> Result<String, RenderError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessChrome;

impl PageRenderer for HeadlessChrome {
    fn render(&self, url: &str, deadline: Instant) -> Result<String, RenderError> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .idle_browser_timeout(remaining(deadline)?)
            .build()
            .map_err(RenderError::browser)?;
        // Dropping `browser` kills the Chrome process on every return path.
        let browser = Browser::new(options).map_err(RenderError::browser)?;
        let tab = browser.new_tab().map_err(RenderError::browser)?;
        tab.set_default_timeout(remaining(deadline)?);
        tab.navigate_to(url)
            .map_err(RenderError::browser)?
            .wait_until_navigated()
            .map_err(|err| match remaining(deadline) {
                Ok(_) => RenderError::browser(err),
                Err(passed) => passed,
            })?;
        remaining(deadline)?;
        tab.get_content().map_err(RenderError::browser)
    }
}

/// A renderer paired with the wait ceiling it runs under.
#[derive(Clone)]
pub struct RenderStep {
    renderer: Arc<dyn PageRenderer>,
    timeout: Duration,
}

impl RenderStep {
    pub fn new(renderer: Arc<dyn PageRenderer>, timeout: Duration) -> Self {
        Self { renderer, timeout }
    }

    pub fn headless(timeout: Duration) -> Self {
        Self::new(Arc::new(HeadlessChrome), timeout)
    }

    /// Returns the rendered markup, or `fetched` when rendering fails or exceeds the timeout.
    pub async fn render_or(&self, url: &str, fetched: String) -> String {
        let renderer = Arc::clone(&self.renderer);
        let target = url.to_string();
        let timeout = self.timeout;
        let deadline = Instant::now() + timeout;
        let task = tokio::task::spawn_blocking(move || renderer.render(&target, deadline));

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(Ok(markup))) => {
                debug!(url = %url, markup_len = markup.len(), "rendered page");
                markup
            }
            Ok(Ok(Err(RenderError::DeadlineExceeded))) | Err(_) => {
                debug!(
                    url = %url,
                    timeout_secs = timeout.as_secs_f64(),
                    "page render timed out, using fetched markup"
                );
                fetched
            }
            Ok(Ok(Err(err))) => {
                warn!(url = %url, error = %err, "page render failed, using fetched markup");
                fetched
            }
            Ok(Err(err)) => {
                warn!(url = %url, error = %err, "page render task aborted, using fetched markup");
                fetched
            }
        }
    }
}
