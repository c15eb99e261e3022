use std::sync::Arc;

use {dailybot_cron::service::CronService, dailybot_line::LineOutbound, secrecy::Secret};

/// Shared state behind every request handler.
pub struct GatewayState {
    /// HMAC key for `X-Line-Signature`.
    pub channel_secret: Secret<String>,
    pub outbound: Arc<dyn LineOutbound>,
    pub cron: Arc<CronService>,
    pub version: String,
}

impl GatewayState {
    pub fn new(
        channel_secret: Secret<String>,
        outbound: Arc<dyn LineOutbound>,
        cron: Arc<CronService>,
    ) -> Arc<Self> {
        Arc::new(Self {
            channel_secret,
            outbound,
            cron,
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}
