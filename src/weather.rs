//! Open-Meteo client: city geocoding plus current weather.
//!
//! Open-Meteo needs no API key, so the client is always available. Network
//! failures bubble up as `reqwest::Error` and the chat router turns them
//! into a friendly message.

use std::time::Duration;

use serde::Deserialize;
use tracing::{info, instrument};

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Clone, Debug, PartialEq)]
pub struct GeoResult {
  pub name: String,
  pub country: String,
  pub latitude: f64,
  pub longitude: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeatherNow {
  pub temperature_c: f64,
  pub wind_kmh: f64,
  pub weather_code: i64,
}

#[derive(Deserialize)]
struct GeoResponse {
  #[serde(default)]
  results: Vec<GeoItem>,
}

#[derive(Deserialize)]
struct GeoItem {
  name: String,
  #[serde(default)]
  country: String,
  latitude: f64,
  longitude: f64,
}

#[derive(Deserialize)]
struct ForecastResponse {
  current_weather: Option<CurrentWeather>,
}

#[derive(Deserialize)]
struct CurrentWeather {
  #[serde(default)]
  temperature: f64,
  #[serde(default)]
  windspeed: f64,
  #[serde(default = "unknown_code")]
  weathercode: i64,
}

fn unknown_code() -> i64 {
  -1
}

#[derive(Clone)]
pub struct WeatherClient {
  client: reqwest::Client,
}

impl WeatherClient {
  pub fn new(timeout: Duration) -> Self {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .unwrap_or_default();
    Self { client }
  }

  /// Resolve a city name to coordinates; None when Open-Meteo knows no match.
  #[instrument(level = "info", skip(self))]
  pub async fn geocode_city(&self, city: &str) -> Result<Option<GeoResult>, reqwest::Error> {
    let city = city.trim();
    if city.is_empty() {
      return Ok(None);
    }

    let res = self
      .client
      .get(GEOCODING_URL)
      .query(&[("name", city), ("count", "1"), ("language", "ru"), ("format", "json")])
      .send()
      .await?
      .error_for_status()?;

    let body: GeoResponse = res.json().await?;
    let Some(item) = body.results.into_iter().next() else {
      return Ok(None);
    };
    info!(target: "student_helper", city = %item.name, country = %item.country, "Geocoded city");
    Ok(Some(GeoResult {
      name: item.name,
      country: item.country,
      latitude: item.latitude,
      longitude: item.longitude,
    }))
  }

  #[instrument(level = "info", skip(self))]
  pub async fn current_weather(&self, lat: f64, lon: f64) -> Result<WeatherNow, reqwest::Error> {
    let res = self
      .client
      .get(FORECAST_URL)
      .query(&[
        ("latitude", lat.to_string()),
        ("longitude", lon.to_string()),
        ("current_weather", "true".into()),
        ("wind_speed_unit", "kmh".into()),
        ("temperature_unit", "celsius".into()),
      ])
      .send()
      .await?
      .error_for_status()?;

    let body: ForecastResponse = res.json().await?;
    let cw = body.current_weather.unwrap_or(CurrentWeather {
      temperature: 0.0,
      windspeed: 0.0,
      weathercode: -1,
    });
    Ok(WeatherNow {
      temperature_c: cw.temperature,
      wind_kmh: cw.windspeed,
      weather_code: cw.weathercode,
    })
  }
}

/// Human-readable hint for a WMO weather code.
pub fn describe_weather_code(code: i64) -> String {
  let hint = match code {
    0 => "Ясно",
    1 => "Преимущественно ясно",
    2 => "Переменная облачность",
    3 => "Пасмурно",
    45 => "Туман",
    48 => "Туман (изморось)",
    51 => "Морось (слабая)",
    53 => "Морось (умеренная)",
    55 => "Морось (сильная)",
    61 => "Дождь (слабый)",
    63 => "Дождь (умеренный)",
    65 => "Дождь (сильный)",
    71 => "Снег (слабый)",
    73 => "Снег (умеренный)",
    75 => "Снег (сильный)",
    80 => "Ливень (слабый)",
    81 => "Ливень (умеренный)",
    82 => "Ливень (сильный)",
    95 => "Гроза",
    other => return format!("Код погоды: {}", other),
  };
  hint.to_string()
}
