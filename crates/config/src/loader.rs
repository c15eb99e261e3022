use {chrono_tz::Tz, secrecy::Secret, tracing::debug};

use crate::{
    Error, Result,
    schema::{BotConfig, Endpoints},
};

/// Keys that must be present (and non-blank) for the bot to start.
pub const REQUIRED_KEYS: &[&str] = &[
    "LINE_CHANNEL_SECRET",
    "LINE_CHANNEL_ACCESS_TOKEN",
    "LINE_USER_ID",
    "WEATHER_API_KEY",
    "NEWS_API_KEY",
];

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_TIMEZONE: &str = "Asia/Taipei";

impl BotConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration using a custom lookup function.
    ///
    /// All missing required keys are reported together.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let missing: Vec<String> = REQUIRED_KEYS
            .iter()
            .filter(|key| get(**key).is_none())
            .map(|key| (*key).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingKeys { keys: missing });
        }
        let required = |name: &str| get(name).unwrap_or_default();

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| Error::invalid_value("PORT", e))?,
            None => DEFAULT_PORT,
        };

        let tz_name = get("BOT_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone: Tz = tz_name
            .parse()
            .map_err(|_| Error::unknown_timezone(&tz_name))?;

        let defaults = Endpoints::default();
        let endpoints = Endpoints {
            line_api: get("LINE_API_BASE").unwrap_or(defaults.line_api),
            weather_api: get("WEATHER_API_BASE").unwrap_or(defaults.weather_api),
            quote_api: get("QUOTE_API_BASE").unwrap_or(defaults.quote_api),
            news_api: get("NEWS_API_BASE").unwrap_or(defaults.news_api),
        };

        let config = Self {
            channel_secret: Secret::new(required("LINE_CHANNEL_SECRET")),
            channel_access_token: Secret::new(required("LINE_CHANNEL_ACCESS_TOKEN")),
            user_id: required("LINE_USER_ID"),
            weather_api_key: Secret::new(required("WEATHER_API_KEY")),
            news_api_key: Secret::new(required("NEWS_API_KEY")),
            bind: get("BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            port,
            timezone,
            endpoints,
        };
        debug!(?config, "loaded configuration");
        Ok(config)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {rstest::rstest, secrecy::ExposeSecret, std::collections::HashMap};

    use super::*;

    fn full_env() -> HashMap<&'static str, String> {
        HashMap::from([
            ("LINE_CHANNEL_SECRET", "secret".to_string()),
            ("LINE_CHANNEL_ACCESS_TOKEN", "access-token".to_string()),
            ("LINE_USER_ID", "U123".to_string()),
            ("WEATHER_API_KEY", "weather-key".to_string()),
            ("NEWS_API_KEY", "news-key".to_string()),
        ])
    }

    fn load(env: &HashMap<&'static str, String>) -> Result<BotConfig> {
        BotConfig::from_lookup(|name| env.get(name).cloned())
    }

    #[test]
    fn loads_required_keys_with_defaults() {
        let cfg = load(&full_env()).unwrap();
        assert_eq!(cfg.channel_secret.expose_secret(), "secret");
        assert_eq!(cfg.channel_access_token.expose_secret(), "access-token");
        assert_eq!(cfg.user_id, "U123");
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:5000");
        assert_eq!(cfg.timezone, chrono_tz::Asia::Taipei);
        assert_eq!(cfg.endpoints, Endpoints::default());
    }

    #[rstest]
    #[case("LINE_CHANNEL_SECRET")]
    #[case("LINE_CHANNEL_ACCESS_TOKEN")]
    #[case("LINE_USER_ID")]
    #[case("WEATHER_API_KEY")]
    #[case("NEWS_API_KEY")]
    fn missing_required_key_fails(#[case] key: &str) {
        let mut env = full_env();
        env.remove(key);
        match load(&env) {
            Err(Error::MissingKeys { keys }) => assert_eq!(keys, vec![key.to_string()]),
            other => panic!("expected MissingKeys, got {other:?}"),
        }
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let mut env = full_env();
        env.insert("LINE_USER_ID", "   ".into());
        assert!(matches!(load(&env), Err(Error::MissingKeys { .. })));
    }

    #[test]
    fn reports_every_missing_key_at_once() {
        let err = load(&HashMap::new()).unwrap_err();
        let msg = err.to_string();
        for key in REQUIRED_KEYS {
            assert!(msg.contains(key), "{msg} should mention {key}");
        }
    }

    #[test]
    fn port_override() {
        let mut env = full_env();
        env.insert("PORT", "8080".into());
        assert_eq!(load(&env).unwrap().port, 8080);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut env = full_env();
        env.insert("PORT", "eighty".into());
        assert!(matches!(load(&env), Err(Error::InvalidValue { .. })));
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let mut env = full_env();
        env.insert("BOT_TIMEZONE", "Mars/Olympus".into());
        assert!(matches!(load(&env), Err(Error::UnknownTimezone { .. })));
    }

    #[test]
    fn endpoint_overrides() {
        let mut env = full_env();
        env.insert("LINE_API_BASE", "http://127.0.0.1:9999".into());
        let cfg = load(&env).unwrap();
        assert_eq!(cfg.endpoints.line_api, "http://127.0.0.1:9999");
        assert_eq!(cfg.endpoints.news_api, "https://newsapi.org");
    }

    #[test]
    fn debug_redacts_secrets() {
        let cfg = load(&full_env()).unwrap();
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("weather-key"));
        assert!(!dbg.contains("access-token"));
        assert!(dbg.contains("[REDACTED]"));
    }
}
