//! Thin client for the hosted account backend.
//!
//! The backend is an opaque third-party service speaking JSON over HTTPS
//! with bearer-token auth. Only the four operations the maintenance tools
//! need are wrapped: sign-in, table read, table insert, table delete.
//! Credentials come from [`crate::config::Remote`], never from source.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Remote;

/// Result of a successful sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
}

pub struct RemoteClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl RemoteClient {
    /// Build a client from resolved configuration. Fails fast when the base
    /// URL or api key is missing so a tool never gets halfway through a run
    /// before noticing.
    pub fn from_config(remote: &Remote) -> Result<Self> {
        if remote.base_url.is_empty() {
            return Err(anyhow!("REMOTE_BASE_URL is not configured"));
        }
        let api_key = remote
            .api_key
            .clone()
            .ok_or_else(|| anyhow!("REMOTE_API_KEY is not configured"))?;

        Ok(Self {
            base_url: remote.base_url.trim_end_matches('/').to_string(),
            api_key,
            http: reqwest::Client::new(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Exchange operator credentials for a bearer token
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&SignInRequest { email, password })
            .send()
            .await
            .context("Failed to reach the account backend for sign-in")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("sign-in failed with status {}: {}", status, body));
        }

        let session: Session = response
            .json()
            .await
            .context("Failed to parse sign-in response")?;
        Ok(session)
    }

    /// Read all rows of a table as opaque JSON
    pub async fn list_rows(&self, session: &Session, table: &str) -> Result<Vec<Value>> {
        let response = self
            .http
            .get(self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .with_context(|| format!("Failed to read remote table '{}'", table))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "reading table '{}' failed with status {}: {}",
                table,
                status,
                body
            ));
        }

        let rows: Vec<Value> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse rows of table '{}'", table))?;
        Ok(rows)
    }

    /// Insert one row into a table
    pub async fn insert_row(&self, session: &Session, table: &str, row: &Value) -> Result<()> {
        let response = self
            .http
            .post(self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .json(row)
            .send()
            .await
            .with_context(|| format!("Failed to insert into remote table '{}'", table))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "insert into table '{}' failed with status {}: {}",
                table,
                status,
                body
            ));
        }
        Ok(())
    }

    /// Delete rows of a table matching `id`
    pub async fn delete_row(&self, session: &Session, table: &str, id: &str) -> Result<()> {
        let url = format!("{}?id=eq.{}", self.table_url(table), id);
        let response = self
            .http
            .delete(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .with_context(|| format!("Failed to delete from remote table '{}'", table))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "delete from table '{}' failed with status {}: {}",
                table,
                status,
                body
            ));
        }
        Ok(())
    }
}
