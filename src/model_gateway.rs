use anyhow::Result;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;

use crate::config::Config;
use crate::model::Message;
use crate::providers;

pub type ModelGatewayFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + 'a>>;

/// One chat completion: the full message list in, the assistant reply out.
pub trait ModelGateway {
    fn chat<'a>(&'a self, messages: &'a [Message]) -> ModelGatewayFuture<'a>;
}

pub struct HostModelGateway<'a> {
    client: &'a Client,
    cfg: &'a Config,
}

impl<'a> HostModelGateway<'a> {
    pub fn new(client: &'a Client, cfg: &'a Config) -> Self {
        Self { client, cfg }
    }
}

impl ModelGateway for HostModelGateway<'_> {
    fn chat<'b>(&'b self, messages: &'b [Message]) -> ModelGatewayFuture<'b> {
        Box::pin(providers::openai::chat(self.client, self.cfg, messages))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::{ModelGateway, ModelGatewayFuture};
    use crate::model::Message;

    /// Replays scripted replies in order and records every request.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedGateway {
        replies: RefCell<VecDeque<Result<String, String>>>,
        pub(crate) calls: RefCell<Vec<Vec<Message>>>,
    }

    impl ScriptedGateway {
        pub(crate) fn new(replies: impl IntoIterator<Item = Result<&'static str, &'static str>>) -> Self {
            Self {
                replies: RefCell::new(
                    replies
                        .into_iter()
                        .map(|reply| reply.map(str::to_string).map_err(str::to_string))
                        .collect(),
                ),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl ModelGateway for ScriptedGateway {
        fn chat<'a>(&'a self, messages: &'a [Message]) -> ModelGatewayFuture<'a> {
            self.calls.borrow_mut().push(messages.to_vec());
            let result = match self.replies.borrow_mut().pop_front() {
                Some(Ok(content)) => Ok(content),
                Some(Err(message)) => Err(anyhow!(message)),
                None => Err(anyhow!("no scripted reply left")),
            };
            Box::pin(async move { result })
        }
    }
}
