use clap::Parser;

use crate::api::HttpConfig;

#[derive(Parser)]
pub struct HttpArgs {
    /// Timeout of a single HTTP request.
    #[clap(long = "http-timeout", env = "HTTP_TIMEOUT", default_value = "10s")]
    timeout: humantime::Duration,

    /// User agent sent to the upstream services.
    #[clap(long = "user-agent", env = "USER_AGENT", default_value = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))]
    user_agent: String,
}

impl From<&HttpArgs> for HttpConfig {
    fn from(args: &HttpArgs) -> Self {
        Self { timeout: args.timeout.into(), user_agent: args.user_agent.clone() }
    }
}
