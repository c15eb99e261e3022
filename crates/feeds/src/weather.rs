//! Current conditions from OpenWeatherMap.

use {
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
};

use crate::{Error, Result, http::get_json};

const SOURCE: &str = "weather API";

/// Current conditions for one city.
#[derive(Debug, Clone, PartialEq)]
pub struct Weather {
    pub description: String,
    pub temp_c: f64,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    #[serde(default)]
    weather: Vec<Condition>,
    main: Option<MainReadings>,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
}

impl TryFrom<CurrentResponse> for Weather {
    type Error = Error;

    fn try_from(resp: CurrentResponse) -> Result<Self> {
        let description = resp
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .ok_or_else(|| Error::malformed(SOURCE, "empty weather array"))?;
        let temp_c = resp
            .main
            .map(|m| m.temp)
            .ok_or_else(|| Error::malformed(SOURCE, "missing main.temp"))?;
        Ok(Self {
            description,
            temp_c,
        })
    }
}

#[derive(Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Secret<String>,
}

impl WeatherClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: Secret<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Fetch current conditions in metric units with Traditional Chinese
    /// descriptions.
    pub async fn current(&self, city_query: &str) -> Result<Weather> {
        let url = format!("{}/data/2.5/weather", self.base_url.trim_end_matches('/'));
        let request = self.http.get(url).query(&[
            ("q", city_query),
            ("appid", self.api_key.expose_secret().as_str()),
            ("units", "metric"),
            ("lang", "zh_tw"),
        ]);
        let resp: CurrentResponse = get_json(request, SOURCE).await?;
        Weather::try_from(resp)
    }
}

/// Render a temperature the way a float prints by default: keep one decimal
/// for whole numbers (`23.0`), otherwise the shortest exact form (`23.4`).
fn format_temp(temp: f64) -> String {
    if temp.is_finite() && temp.fract() == 0.0 {
        format!("{temp:.1}")
    } else {
        format!("{temp}")
    }
}

/// `📍 台北天氣：多雲，23.4°C`
pub fn weather_line(city_label: &str, weather: &Weather) -> String {
    format!(
        "📍 {city_label}天氣：{}，{}°C",
        weather.description,
        format_temp(weather.temp_c)
    )
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, mockito::Matcher, rstest::rstest};

    fn client(server: &mockito::Server) -> WeatherClient {
        WeatherClient::new(reqwest::Client::new(), server.url(), Secret::new("wkey".into()))
    }

    #[tokio::test]
    async fn renders_mocked_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/data/2.5/weather")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "Taipei".into()),
                Matcher::UrlEncoded("appid".into(), "wkey".into()),
                Matcher::UrlEncoded("units".into(), "metric".into()),
                Matcher::UrlEncoded("lang".into(), "zh_tw".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"weather":[{"description":"多雲"}],"main":{"temp":23.4}}"#)
            .create_async()
            .await;

        let weather = client(&server).current("Taipei").await.unwrap();
        assert_eq!(weather_line("台北", &weather), "📍 台北天氣：多雲，23.4°C");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_weather_array_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/data/2.5/weather")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"weather":[],"main":{"temp":20.0}}"#)
            .create_async()
            .await;

        let err = client(&server).current("Taipei").await.unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[tokio::test]
    async fn unauthorized_surfaces_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/data/2.5/weather")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"cod":401,"message":"Invalid API key"}"#)
            .create_async()
            .await;

        let err = client(&server).current("Taipei").await.unwrap_err();
        assert!(matches!(err, Error::Status { status: 401, .. }));
    }

    #[rstest]
    #[case(23.4, "23.4")]
    #[case(23.0, "23.0")]
    #[case(-1.5, "-1.5")]
    #[case(30.12, "30.12")]
    fn temperature_formatting(#[case] temp: f64, #[case] expected: &str) {
        assert_eq!(format_temp(temp), expected);
    }
}
