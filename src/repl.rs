use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::debug;

use crate::ansi;
use crate::display::{terminal_width, write_wrapped};
use crate::model::Conversation;
use crate::model_gateway::ModelGateway;

pub const EXIT_KEYWORD: &str = "exit";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Input closed before \"exit\" was entered")]
    InputClosed,
}

/// Runs the follow-up chat on stdin/stdout until the user types `exit`.
pub async fn run_repl<G: ModelGateway + ?Sized>(
    gateway: &G,
    conversation: &mut Conversation,
) -> Result<()> {
    eprintln!(
        "\n__\n{}Interactive mode. Type \"{}\" to quit.{}",
        ansi::YELLOW,
        EXIT_KEYWORD,
        ansi::RESET
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    run_session(
        gateway,
        conversation,
        &mut stdin.lock(),
        &mut stdout.lock(),
        terminal_width(),
    )
    .await
}

/// Reads one line per turn from `input`, sends the whole conversation, and writes
/// each wrapped reply to `out`.
///
/// Returns `Ok` on the exit keyword (any case) and [`SessionError::InputClosed`]
/// when `input` ends first. Blank lines re-prompt without a request.
pub async fn run_session<G, R, W>(
    gateway: &G,
    conversation: &mut Conversation,
    input: &mut R,
    out: &mut W,
    width: usize,
) -> Result<()>
where
    G: ModelGateway + ?Sized,
    R: BufRead,
    W: Write,
{
    loop {
        write!(out, "{}You: ", ansi::BOLD).context("Failed to write prompt")?;
        out.flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        let read = input.read_line(&mut line).context("Failed to read stdin")?;
        write!(out, "{}", ansi::RESET).context("Failed to write prompt")?;
        if read == 0 {
            return Err(SessionError::InputClosed.into());
        }

        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }
        if prompt.eq_ignore_ascii_case(EXIT_KEYWORD) {
            debug!(messages = conversation.messages().len(), "leaving interactive session");
            return Ok(());
        }

        let request = conversation.with_pending_user(prompt);
        let reply = gateway
            .chat(&request)
            .await
            .context("Failed to get a reply")?;
        conversation.commit(prompt, reply.as_str());

        let rendered = format!(
            "{}{}summurai: {}{}\n",
            ansi::BOLD,
            ansi::CYAN,
            ansi::RESET,
            reply
        );
        write_wrapped(out, &rendered, width).context("Failed to write reply")?;
    }
}
