use std::time::Duration;

use log::{error, info};
use reqwest::{header::ACCEPT, Client, StatusCode};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::config::Config;

use super::datasets::{Dataset, Series, TimeWindow};

#[derive(Error, Debug)]
pub enum FingridError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request for dataset {dataset} failed: {source}")]
    Transport {
        dataset: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid payload for dataset {dataset}: {source}")]
    Decode {
        dataset: u32,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct DataResponse {
    data: Vec<DataPoint>,
}

#[derive(Debug, Deserialize)]
struct DataPoint {
    #[serde(deserialize_with = "truncated_int")]
    value: i64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(serde_json::Number),
    Text(String),
}

/// Accept a json number or a numeric string.  Fractional values are
/// truncated toward zero.
fn truncated_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match RawValue::deserialize(deserializer)? {
        RawValue::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|x| x.trunc() as i64)),
        RawValue::Text(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|x| x.is_finite()).map(|x| x.trunc() as i64))
        }
    };
    value.ok_or_else(|| serde::de::Error::custom("value is not an integer"))
}

/// Parse the body of a successful response into the series of values.
pub fn parse_series(body: &str) -> Result<Series, serde_json::Error> {
    let response: DataResponse = serde_json::from_str(body)?;
    Ok(response.data.into_iter().map(|p| p.value).collect())
}

#[derive(Debug, Clone)]
pub struct FingridClient {
    http: Client,
    base_url: String,
    api_key: String,
    pub window: TimeWindow,
}

impl FingridClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        window: TimeWindow,
        timeout: Duration,
    ) -> Result<FingridClient, FingridError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FingridError::Client)?;
        Ok(FingridClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            window,
        })
    }

    pub fn from_config(config: &Config) -> Result<FingridClient, FingridError> {
        FingridClient::new(
            &config.fingrid_base_url,
            &config.fingrid_api_key,
            config.window,
            config.timeout,
        )
    }

    pub fn url(&self, dataset: Dataset) -> String {
        format!("{}/api/datasets/{}/data", self.base_url, dataset.id())
    }

    /// Get all the values of a dataset inside the time window, sorted by start time.
    ///
    /// A response with a status other than 200 is logged and yields an empty
    /// series.  Transport failures and malformed payloads are errors.
    pub async fn fetch(&self, dataset: Dataset) -> Result<Series, FingridError> {
        let start = self.window.start.to_string();
        let end = self.window.end.to_string();
        let response = self
            .http
            .get(self.url(dataset))
            .query(&[
                ("startTime", start.as_str()),
                ("endTime", end.as_str()),
                ("format", "json"),
                ("locale", "fi"),
                ("sortBy", "startTime"),
                ("sortOrder", "asc"),
            ])
            .header("x-api-key", &self.api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| FingridError::Transport {
                dataset: dataset.id(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            error!("Error: {} for {} dataset {}", status.as_u16(), dataset, dataset.id());
            return Ok(Vec::new());
        }

        let body = response
            .text()
            .await
            .map_err(|source| FingridError::Transport {
                dataset: dataset.id(),
                source,
            })?;
        let series = parse_series(&body).map_err(|source| FingridError::Decode {
            dataset: dataset.id(),
            source,
        })?;
        info!("fetched {} values for {} dataset {}", series.len(), dataset, dataset.id());
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use std::{error::Error, path::Path};

    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn client(server: &MockServer, timeout: Duration) -> FingridClient {
        FingridClient::new(&server.base_url(), "secret", TimeWindow::default(), timeout).unwrap()
    }

    #[test]
    fn parse_values_in_order() -> Result<(), Box<dyn Error>> {
        let body = r#"{"data": [
            {"datasetId": 124, "startTime": "2023-01-28T12:15:00.000Z", "endTime": "2023-01-28T12:18:00.000Z", "value": 9876},
            {"datasetId": 124, "startTime": "2023-01-28T12:18:00.000Z", "endTime": "2023-01-28T12:21:00.000Z", "value": 9801},
            {"datasetId": 124, "startTime": "2023-01-28T12:21:00.000Z", "endTime": "2023-01-28T12:24:00.000Z", "value": -3}
        ], "pagination": {"currentPage": 1}}"#;
        assert_eq!(parse_series(body)?, vec![9876, 9801, -3]);
        assert_eq!(parse_series(r#"{"data": []}"#)?, Vec::<i64>::new());
        Ok(())
    }

    #[test]
    fn parse_truncates_fractional_values() -> Result<(), Box<dyn Error>> {
        assert_eq!(parse_series(r#"{"data": [{"value": 12.9}, {"value": -1.5}]}"#)?, vec![12, -1]);
        Ok(())
    }

    #[test]
    fn parse_accepts_numeric_strings() -> Result<(), Box<dyn Error>> {
        assert_eq!(parse_series(r#"{"data": [{"value": "12"}, {"value": " 7.8 "}]}"#)?, vec![12, 7]);
        Ok(())
    }

    #[test]
    fn parse_rejects_malformed_payloads() {
        assert!(parse_series(r#"{"items": []}"#).is_err());
        assert!(parse_series(r#"{"data": [{"value": 1}, {"other": 2}]}"#).is_err());
        assert!(parse_series(r#"{"data": [{"value": "twelve"}]}"#).is_err());
        assert!(parse_series(r#"{"data": [{"value": true}]}"#).is_err());
        assert!(parse_series(r#"{"data": [{"value": null}]}"#).is_err());
        assert!(parse_series("<html>").is_err());
    }

    #[tokio::test]
    async fn fetch_sends_the_expected_request() -> Result<(), Box<dyn Error>> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/datasets/124/data")
                    .query_param("startTime", "2023-01-28T12:15:00Z")
                    .query_param("endTime", "2023-06-28T12:30:00Z")
                    .query_param("format", "json")
                    .query_param("locale", "fi")
                    .query_param("sortBy", "startTime")
                    .query_param("sortOrder", "asc")
                    .header("x-api-key", "secret")
                    .header("accept", "application/json");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({"data": [{"value": 1}, {"value": 2}, {"value": 3}]}));
            })
            .await;

        let series = client(&server, Duration::from_secs(5))
            .fetch(Dataset::Consumption)
            .await?;
        assert_eq!(series, vec![1, 2, 3]);
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn fetch_non_200_is_empty() -> Result<(), Box<dyn Error>> {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Info)
            .is_test(true)
            .try_init();
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/datasets/74/data");
                then.status(403).body("forbidden");
            })
            .await;

        let series = client(&server, Duration::from_secs(5))
            .fetch(Dataset::Production)
            .await?;
        assert!(series.is_empty());
        mock.assert_hits_async(1).await;
        Ok(())
    }

    #[tokio::test]
    async fn fetch_malformed_payload_is_an_error() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/datasets/181/data");
                then.status(200).json_body(json!({"data": [{"val": 1}]}));
            })
            .await;

        let res = client(&server, Duration::from_secs(5)).fetch(Dataset::Wind).await;
        assert!(matches!(res, Err(FingridError::Decode { dataset: 181, .. })));
        mock.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn fetch_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/datasets/188/data");
                then.status(200)
                    .delay(Duration::from_millis(1500))
                    .json_body(json!({"data": []}));
            })
            .await;

        let res = client(&server, Duration::from_millis(100))
            .fetch(Dataset::Nuclear)
            .await;
        match res {
            Err(FingridError::Transport { dataset, source }) => {
                assert_eq!(dataset, 188);
                assert!(source.is_timeout());
            }
            other => panic!("expected a timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn fetch_connection_refused() {
        let client = FingridClient::new(
            "http://127.0.0.1:1",
            "secret",
            TimeWindow::default(),
            Duration::from_secs(5),
        )
        .unwrap();
        let res = client.fetch(Dataset::Water).await;
        assert!(matches!(res, Err(FingridError::Transport { dataset: 191, .. })));
    }

    /// Needs a real api key in .env/test.env
    #[ignore]
    #[tokio::test]
    async fn fetch_live() -> Result<(), Box<dyn Error>> {
        dotenvy::from_path(Path::new(".env/test.env"))?;
        let config = Config::from_lookup(|name| std::env::var(name).ok())?;
        let client = FingridClient::from_config(&config)?;
        let series = client.fetch(Dataset::Nuclear).await?;
        println!("{:?}", &series[..series.len().min(10)]);
        assert!(!series.is_empty());
        Ok(())
    }
}
