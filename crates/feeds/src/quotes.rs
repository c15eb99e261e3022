//! Daily closes for a handful of market indices.

use serde::Deserialize;

use crate::{Error, Result, http::get_json};

const SOURCE: &str = "quote API";

/// A tracked index and its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSymbol {
    pub symbol: &'static str,
    pub label: &'static str,
}

pub const DEFAULT_INDICES: &[IndexSymbol] = &[
    IndexSymbol {
        symbol: "^TWII",
        label: "台股加權",
    },
    IndexSymbol {
        symbol: "^DJI",
        label: "道瓊",
    },
    IndexSymbol {
        symbol: "^IXIC",
        label: "那斯達克",
    },
    IndexSymbol {
        symbol: "^GSPC",
        label: "標普500",
    },
];

/// Last close against the one before it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexMove {
    pub previous: f64,
    pub last: f64,
}

impl IndexMove {
    pub fn from_closes(previous: f64, last: f64) -> Result<Self> {
        if previous == 0.0 || !previous.is_finite() || !last.is_finite() {
            return Err(Error::malformed(
                SOURCE,
                format!("unusable closes {previous} -> {last}"),
            ));
        }
        Ok(Self { previous, last })
    }

    pub fn change_pct(&self) -> f64 {
        (self.last - self.previous) / self.previous * 100.0
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Clone)]
pub struct QuoteClient {
    http: reqwest::Client,
    base_url: String,
}

impl QuoteClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetch the two most recent daily closes for `symbol`.
    ///
    /// Days without a close (holidays, the current unfinished session) are
    /// skipped.
    pub async fn last_two_closes(&self, symbol: &str) -> Result<IndexMove> {
        let url = format!(
            "{}/v8/finance/chart/{symbol}",
            self.base_url.trim_end_matches('/')
        );
        let request = self
            .http
            .get(url)
            .query(&[("range", "5d"), ("interval", "1d")]);
        let resp: ChartResponse = get_json(request, SOURCE).await?;

        let closes: Vec<f64> = resp
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .and_then(|r| r.indicators.quote.into_iter().next())
            .map(|q| q.close.into_iter().flatten().collect())
            .unwrap_or_default();

        match closes.as_slice() {
            [.., previous, last] => IndexMove::from_closes(*previous, *last),
            _ => Err(Error::malformed(
                SOURCE,
                format!("fewer than two closes for {symbol}"),
            )),
        }
    }

    /// Fetch every index in order. Any failure fails the whole summary.
    pub async fn moves(&self, indices: &[IndexSymbol]) -> Result<Vec<(IndexSymbol, IndexMove)>> {
        let mut out = Vec::with_capacity(indices.len());
        for index in indices {
            out.push((*index, self.last_two_closes(index.symbol).await?));
        }
        Ok(out)
    }
}

/// `🔺 台股加權 23456.78 (+1.23%)`
///
/// The marker follows the percentage as printed, so a move that rounds to
/// zero is flat.
pub fn stock_line(label: &str, movement: &IndexMove) -> String {
    let mut pct = (movement.change_pct() * 100.0).round() / 100.0;
    if pct == 0.0 {
        // Drop the sign of -0.0.
        pct = 0.0;
    }
    let marker = if pct > 0.0 {
        "🔺"
    } else if pct < 0.0 {
        "🔻"
    } else {
        "➖"
    };
    format!("{marker} {label} {:.2} ({pct:+.2}%)", movement.last)
}

/// Header plus one line per index.
pub fn stock_summary(moves: &[(IndexSymbol, IndexMove)]) -> String {
    let mut out = String::from("📊 股市收盤");
    for (index, movement) in moves {
        out.push('\n');
        out.push_str(&stock_line(index.label, movement));
    }
    out
}
