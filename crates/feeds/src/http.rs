use {reqwest::RequestBuilder, serde::de::DeserializeOwned, tracing::debug};

use crate::{Error, Result};

pub(crate) const USER_AGENT: &str = concat!("dailybot/", env!("CARGO_PKG_VERSION"));

/// Send a GET request and decode the JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    source_name: &'static str,
) -> Result<T> {
    let resp = request
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .map_err(|source| Error::external(format!("{source_name} request failed"), source))?;

    let status = resp.status();
    debug!(source_name, %status, "upstream responded");
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Status {
            source_name,
            status: status.as_u16(),
            body,
        });
    }

    resp.json()
        .await
        .map_err(|source| Error::external(format!("failed to decode {source_name} response"), source))
}
