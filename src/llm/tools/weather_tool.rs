use crate::config::ToolSettings;
use crate::error::{ConciergeError, Result};
use crate::llm::tools::{LlmTool, ToolArguments, ToolDescriptor, ToolName};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_LOCATION: &str = "Napa, CA";

// The winery itself; skips a geocoding round trip for the most common question.
const NAPA_COORDINATES: (f64, f64) = (38.2975, -122.2869);

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    main: Option<MainReading>,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct MainReading {
    temp: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: Option<String>,
}

/// A normalized current-conditions reading.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    pub temperature_c: f64,
    pub description: String,
    pub humidity: f64,
}

impl TryFrom<CurrentWeather> for WeatherReading {
    type Error = ConciergeError;

    fn try_from(raw: CurrentWeather) -> Result<Self> {
        let main = raw
            .main
            .ok_or_else(|| ConciergeError::ParseError("weather response has no 'main' block".into()))?;
        let temperature_c = main
            .temp
            .ok_or_else(|| ConciergeError::ParseError("weather response has no temperature".into()))?;
        let humidity = main
            .humidity
            .ok_or_else(|| ConciergeError::ParseError("weather response has no humidity".into()))?;
        let description = raw
            .weather
            .into_iter()
            .next()
            .and_then(|c| c.description)
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| {
                ConciergeError::ParseError("weather response has no condition description".into())
            })?;

        Ok(Self {
            temperature_c,
            description: capitalize(&description),
            humidity,
        })
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn parse_coordinates(location: &str) -> Option<(f64, f64)> {
    let (lat, lon) = location.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)).then_some((lat, lon))
}

/// Tool for current weather conditions from OpenWeather.
///
/// Without an API key the tool answers with a clearly labelled mock reading instead of
/// failing, so weather questions still get an answer offline.
#[derive(Clone)]
pub struct WeatherTool {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherTool {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &ToolSettings) -> Result<Self> {
        Self::new(
            settings.weather_api_key.clone(),
            settings.weather_base_url.clone(),
            settings.provider_timeout,
        )
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    async fn resolve_coordinates(&self, api_key: &str, location: &str) -> Result<(f64, f64)> {
        if location.trim().eq_ignore_ascii_case(DEFAULT_LOCATION) {
            return Ok(NAPA_COORDINATES);
        }
        if let Some(coordinates) = parse_coordinates(location) {
            return Ok(coordinates);
        }

        let url = format!("{}/geo/1.0/direct", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", location), ("limit", "1"), ("appid", api_key)])
            .send()
            .await
            .map_err(http_failure)?;

        if !response.status().is_success() {
            return Err(ConciergeError::ApiError(format!(
                "geocoding request failed with status {}",
                response.status()
            )));
        }

        let results: Vec<GeocodingResult> = response
            .json()
            .await
            .map_err(|e| ConciergeError::ParseError(format!("invalid geocoding response: {}", e)))?;

        results.first().map(|r| (r.lat, r.lon)).ok_or_else(|| {
            ConciergeError::ToolError(format!(
                "couldn't find the coordinates for {}; try a nearby city",
                location
            ))
        })
    }

    async fn fetch_reading(&self, api_key: &str, location: &str) -> Result<WeatherReading> {
        let (lat, lon) = self.resolve_coordinates(api_key, location).await?;
        debug!(location = location, lat = lat, lon = lon, "Fetching current weather");

        let url = format!("{}/data/2.5/weather", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", api_key.to_string()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .map_err(http_failure)?;

        if !response.status().is_success() {
            return Err(ConciergeError::ApiError(format!(
                "weather request failed with status {}",
                response.status()
            )));
        }

        let raw: CurrentWeather = response
            .json()
            .await
            .map_err(|e| ConciergeError::ParseError(format!("invalid weather response: {}", e)))?;

        WeatherReading::try_from(raw)
    }

    /// Current conditions for `location`, formatted for the model.
    pub async fn current_weather(&self, location: &str) -> Result<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            info!(location = location, "No weather credentials, returning mock reading");
            return Ok(mock_reading(location));
        };

        let reading = self.fetch_reading(api_key, location).await?;
        Ok(format!(
            "Current weather in {}: {}°C, {}. Humidity: {}%",
            location, reading.temperature_c, reading.description, reading.humidity
        ))
    }
}

fn http_failure(e: reqwest::Error) -> ConciergeError {
    if e.is_timeout() {
        ConciergeError::TimeoutError(format!("weather provider did not answer in time: {}", e))
    } else {
        ConciergeError::HttpError(e)
    }
}

fn mock_reading(location: &str) -> String {
    format!(
        "[MOCK DATA - live weather is not configured] Current weather in {}: 22°C, Sunny. Humidity: 55%",
        location
    )
}

#[async_trait]
impl LlmTool for WeatherTool {
    fn name(&self) -> ToolName {
        ToolName::WeatherLookup
    }

    async fn run(&self, args: &ToolArguments) -> Result<String> {
        let location = args
            .get("location")
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LOCATION);

        self.current_weather(location).await
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::function(
            self.name(),
            "Get the current weather for a location. Defaults to the winery in Napa, CA.",
            json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "City name such as 'Sonoma, CA', or 'lat,lon'"
                    }
                },
                "required": []
            }),
        )
    }
}
