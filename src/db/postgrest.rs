// Minimal client for a PostgREST endpoint, e.g. the REST api of a Supabase project.
// https://postgrest.org/en/stable/references/api/tables_views.html

use log::info;
use reqwest::{
    header::{ACCEPT, AUTHORIZATION},
    Client, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::config::PostgrestConfig;

#[derive(Error, Debug)]
pub enum PostgrestError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {table} failed: {source}")]
    Transport {
        table: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("query on {table} returned {status}: {body}")]
    Status {
        table: String,
        status: StatusCode,
        body: String,
    },
}

/// A row of the `notes` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct PostgrestClient {
    http: Client,
    rest_url: String,
    key: String,
}

/// Raw payload of a query.
#[derive(Debug, Clone, PartialEq)]
pub struct PostgrestResponse {
    pub status: StatusCode,
    pub data: String,
}

impl PostgrestResponse {
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Vec<T>, serde_json::Error> {
        serde_json::from_str(&self.data)
    }
}

pub struct TableQuery<'a> {
    client: &'a PostgrestClient,
    table: String,
}

impl PostgrestClient {
    pub fn new(config: &PostgrestConfig) -> Result<PostgrestClient, PostgrestError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(PostgrestError::Client)?;
        Ok(PostgrestClient {
            http,
            rest_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
            key: config.key.clone(),
        })
    }

    pub fn table(&self, table: &str) -> TableQuery<'_> {
        TableQuery {
            client: self,
            table: table.to_string(),
        }
    }
}

impl TableQuery<'_> {
    /// Select the given columns (e.g. `*`) of every row the key is allowed to read.
    pub async fn select(&self, columns: &str) -> Result<PostgrestResponse, PostgrestError> {
        let url = format!("{}/{}", self.client.rest_url, self.table);
        info!("select {} from {}", columns, self.table);
        let response = self
            .client
            .http
            .get(url)
            .query(&[("select", columns)])
            .header("apikey", &self.client.key)
            .header(AUTHORIZATION, format!("Bearer {}", self.client.key))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| PostgrestError::Transport {
                table: self.table.clone(),
                source,
            })?;

        let status = response.status();
        let data = response
            .text()
            .await
            .map_err(|source| PostgrestError::Transport {
                table: self.table.clone(),
                source,
            })?;
        if !status.is_success() {
            return Err(PostgrestError::Status {
                table: self.table.clone(),
                status,
                body: data,
            });
        }
        Ok(PostgrestResponse { status, data })
    }
}
