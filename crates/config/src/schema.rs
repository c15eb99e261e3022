use {chrono_tz::Tz, secrecy::Secret};

/// Base URLs of every external API the bot talks to.
///
/// Production values are the public endpoints; tests point them at a local
/// mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub line_api: String,
    pub weather_api: String,
    pub quote_api: String,
    pub news_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            line_api: "https://api.line.me".into(),
            weather_api: "https://api.openweathermap.org".into(),
            quote_api: "https://query1.finance.yahoo.com".into(),
            news_api: "https://newsapi.org".into(),
        }
    }
}

/// Fully resolved bot configuration, held for the process lifetime.
#[derive(Clone)]
pub struct BotConfig {
    /// LINE channel secret, the HMAC key for webhook signatures.
    pub channel_secret: Secret<String>,

    /// LINE channel access token for the Messaging API.
    pub channel_access_token: Secret<String>,

    /// The single recipient of scheduled pushes.
    pub user_id: String,

    /// OpenWeatherMap API key.
    pub weather_api_key: Secret<String>,

    /// NewsAPI key.
    pub news_api_key: Secret<String>,

    /// Address the HTTP server binds to.
    pub bind: String,

    pub port: u16,

    /// Wall-clock zone the schedule is evaluated in.
    pub timezone: Tz,

    pub endpoints: Endpoints,
}

impl BotConfig {
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("channel_secret", &"[REDACTED]")
            .field("channel_access_token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("weather_api_key", &"[REDACTED]")
            .field("news_api_key", &"[REDACTED]")
            .field("bind", &self.bind)
            .field("port", &self.port)
            .field("timezone", &self.timezone)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}
