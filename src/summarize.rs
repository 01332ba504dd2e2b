use anyhow::{Context, Result};
use tracing::info;

use crate::model::Conversation;
use crate::model_gateway::ModelGateway;

pub const SUMMARY_INSTRUCTION: &str = "Produce a summary of the following article. Sections \
should include the article headline, a brief summary of the article, and a bulleted list of 3-4 \
key points. Following the summary, include an \"in closing\" section that includes some \
afterthoughts on the content of the article, including sentiment and its impact on society. Do \
not prompt the user for any additional information. IMPORTANT: After summarizing the article, \
return to a conversational tone. Provide SHORT and SIMPLE responses to questions.";

/// Result of the first exchange: the summary text and the history that produced it.
#[derive(Debug, Clone)]
pub struct Summary {
    pub text: String,
    pub conversation: Conversation,
}

/// Sends the extracted `content` under the summary instruction and seeds a conversation.
///
/// On success the conversation holds exactly system, user and assistant messages.
pub async fn summarize<G: ModelGateway + ?Sized>(gateway: &G, content: String) -> Result<Summary> {
    let mut conversation = Conversation::new(SUMMARY_INSTRUCTION);
    let request = conversation.with_pending_user(&content);
    info!(content_len = content.len(), "requesting summary");

    let text = gateway
        .chat(&request)
        .await
        .context("Failed to summarize content")?;
    conversation.commit(content, text.clone());

    Ok(Summary { text, conversation })
}
