//! FRED API integration for the retail-market series registry.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::data::cache::{FetchKey, SeriesCache};
use crate::domain::{FetchFailure, Series};

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const OBS_LIMIT: usize = 10000;

pub struct FredClient {
    client: Client,
    api_key: String,
    cache: SeriesCache,
}

impl FredClient {
    /// Build a client from the `FRED_API_KEY` environment variable (`.env`
    /// supported). Returns `None` when no key is configured; callers surface
    /// that as the "awaiting configuration" state rather than an error.
    pub fn from_env() -> Option<Self> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("FRED_API_KEY").ok()?;
        let api_key = api_key.trim().to_string();
        if api_key.is_empty() {
            return None;
        }
        Some(Self::new(api_key))
    }

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            cache: SeriesCache::new(),
        }
    }

    /// Fetch one series over an inclusive date range.
    ///
    /// Failures are per-series and non-fatal upstream, so the error type is a
    /// labeled `FetchFailure` rather than an `AppError`. Results are memoized
    /// by (code, start, end); a repeated call with unchanged parameters skips
    /// the network entirely.
    pub fn fetch_series(
        &mut self,
        label: &str,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Series, FetchFailure> {
        let key = FetchKey {
            code: code.to_string(),
            start,
            end,
        };
        if let Some(series) = self.cache.get(&key) {
            let mut out = series.clone();
            out.label = label.to_string();
            return Ok(out);
        }

        let series = self.fetch_uncached(label, code, start, end)?;
        self.cache.insert(key, series.clone());
        Ok(series)
    }

    fn fetch_uncached(
        &self,
        label: &str,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Series, FetchFailure> {
        let fail = |cause: String| FetchFailure {
            label: label.to_string(),
            cause,
        };

        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("series_id", code),
                ("api_key", &self.api_key),
                ("file_type", "json"),
                ("sort_order", "asc"),
                ("limit", &OBS_LIMIT.to_string()),
                ("observation_start", &start.to_string()),
                ("observation_end", &end.to_string()),
            ])
            .send()
            .map_err(|e| fail(format!("FRED request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(fail(format!(
                "FRED request failed with status {}.",
                resp.status()
            )));
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| fail(format!("Failed to parse FRED response: {e}")))?;

        let mut series = Series::new(label, code);
        for obs in body.observations {
            // FRED encodes missing observations as ".". Skip them here; they
            // reappear as explicit gaps once the series is aligned.
            let value = match parse_value(&obs.value) {
                Some(v) => v,
                None => continue,
            };
            let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d")
                .map_err(|e| fail(format!("Invalid FRED date '{}': {e}", obs.date)))?;
            series.insert(date, value);
        }

        Ok(series)
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() {
        Some(v)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_value_handles_missing_marker() {
        assert_eq!(parse_value("."), None);
        assert_eq!(parse_value("  "), None);
        assert_eq!(parse_value("NaN"), None);
        assert_eq!(parse_value("1234.5"), Some(1234.5));
        assert_eq!(parse_value(" 7 "), Some(7.0));
    }

    #[test]
    fn observations_payload_deserializes() {
        let json = r#"{
            "observations": [
                {"date": "2020-01-01", "value": "523462.0"},
                {"date": "2020-02-01", "value": "."}
            ]
        }"#;
        let body: ObservationsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.observations.len(), 2);
        assert_eq!(body.observations[1].value, ".");
    }
}
