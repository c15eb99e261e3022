//! Top headlines from NewsAPI.

use {
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
};

use crate::{Result, http::get_json};

const SOURCE: &str = "news API";
const COUNTRY: &str = "tw";

/// Shown when the provider has nothing for today.
pub const NO_NEWS: &str = "📰 暫無新聞";

/// One ranked headline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub source_name: String,
}

#[derive(Debug, Deserialize)]
struct HeadlinesResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    source: Option<RawSource>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Clone)]
pub struct NewsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Secret<String>,
}

impl NewsClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: Secret<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Fetch up to `limit` headlines in the provider's ranking order.
    /// Articles without a title are dropped.
    pub async fn top_headlines(&self, limit: usize) -> Result<Vec<Article>> {
        let url = format!("{}/v2/top-headlines", self.base_url.trim_end_matches('/'));
        let page_size = limit.to_string();
        let request = self.http.get(url).query(&[
            ("country", COUNTRY),
            ("pageSize", page_size.as_str()),
            ("apiKey", self.api_key.expose_secret().as_str()),
        ]);
        let resp: HeadlinesResponse = get_json(request, SOURCE).await?;

        Ok(resp
            .articles
            .into_iter()
            .filter_map(|raw| {
                let title = raw.title.filter(|t| !t.trim().is_empty())?;
                let source_name = raw
                    .source
                    .and_then(|s| s.name)
                    .unwrap_or_else(|| "未知來源".into());
                Some(Article { title, source_name })
            })
            .take(limit)
            .collect())
    }
}

/// Numbered digest, or [`NO_NEWS`] when there is nothing to show.
pub fn news_digest(articles: &[Article]) -> String {
    if articles.is_empty() {
        return NO_NEWS.to_string();
    }
    let mut out = String::from("📰 今日新聞");
    for (rank, article) in articles.iter().enumerate() {
        out.push_str(&format!(
            "\n{}. {}（{}）",
            rank + 1,
            article.title,
            article.source_name
        ));
    }
    out
}
