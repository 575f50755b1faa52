use std::time::Duration;

use ureq::{Agent, RequestBuilder, typestate::WithoutBody};

/// HTTP settings shared by the upstream clients.
#[must_use]
#[derive(Clone, Debug)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

/// Blocking HTTP client carrying its own configuration.
pub struct Client {
    agent: Agent,
    user_agent: String,
}

impl Client {
    pub fn new(config: &HttpConfig) -> Self {
        let agent = Agent::config_builder().timeout_global(Some(config.timeout)).build().into();
        Self { agent, user_agent: config.user_agent.clone() }
    }

    pub fn get(&self, url: &str) -> RequestBuilder<WithoutBody> {
        self.agent.get(url).header("User-Agent", &self.user_agent)
    }
}
