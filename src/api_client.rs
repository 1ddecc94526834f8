use crate::config::Config;
use crate::error::{Error, Result};
use crate::rate_limiter::BackendRateLimiter;
use reqwest::{header::HeaderMap, Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Client for the hosted relational backend's REST surface.
///
/// Requests name a table, filter predicates (`column=eq.value`) and a JSON
/// payload; the backend owns all transactional guarantees. Updates ask for
/// the affected rows back (`Prefer: return=representation`), which is what
/// makes the compare-and-swap helpers able to report whether they won.
pub struct BackendApiClient {
    client: Client,
    config: Arc<Config>,
    rate_limiter: BackendRateLimiter,
}

/// A `column = value` equality predicate.
pub type Filter<'a> = (&'a str, String);

pub fn eq(column: &str, value: impl ToString) -> Filter<'_> {
    (column, format!("eq.{}", value.to_string()))
}

impl BackendApiClient {
    pub fn new(config: Config) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
            rate_limiter: BackendRateLimiter::new(),
        }
    }

    pub fn operator(&self) -> &str {
        &self.config.backend.operator
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.backend.url.trim_end_matches('/'), table)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let api_key = &self.config.backend.api_key;
        let mut headers = HeaderMap::with_capacity(5);
        headers.insert(
            "apikey",
            api_key.parse().map_err(|_| Error::Config("invalid api key".to_string()))?,
        );
        headers.insert(
            "Authorization",
            format!("Bearer {api_key}")
                .parse()
                .map_err(|_| Error::Config("invalid api key".to_string()))?,
        );
        headers.insert(
            "Accept-Profile",
            self.config
                .backend
                .schema
                .parse()
                .map_err(|_| Error::Config("invalid schema name".to_string()))?,
        );
        headers.insert("Content-Type", "application/json".parse().expect("static header"));
        headers.insert(
            "Prefer",
            "return=representation".parse().expect("static header"),
        );
        Ok(headers)
    }

    async fn request(
        &self,
        method: Method,
        table: &str,
        filters: &[Filter<'_>],
        body: Option<Value>,
    ) -> Result<Value> {
        let url = self.table_url(table);
        let mut request = self
            .client
            .request(method.clone(), &url)
            .headers(self.headers()?)
            .query(filters);
        if let Some(body) = &body {
            request = request.json(body);
        }

        debug!("Backend request: {} {} {:?}", method, url, filters);

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!("Backend response ({}): {}", status, text);

        if !status.is_success() {
            return Err(Error::Backend {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.is_empty() {
            // DELETE and minimal-return responses carry no body.
            return Ok(Value::Array(Vec::new()));
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Fetch rows of `table` matching every filter.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter<'_>],
    ) -> Result<Vec<T>> {
        self.rate_limiter.acquire_for_read().await.map_err(backend_err)?;
        let value = self.request(Method::GET, table, filters, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Fetch the single row of `table` with the given id.
    pub async fn select_by_id<T: DeserializeOwned>(&self, table: &str, id: i64) -> Result<T> {
        let mut rows: Vec<T> = self.select(table, &[eq("id", id)]).await?;
        match rows.len() {
            0 => Err(Error::NotFound(format!("{table} id {id}"))),
            _ => Ok(rows.swap_remove(0)),
        }
    }

    /// Insert one row and return the stored representation.
    pub async fn insert<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        row: &T,
    ) -> Result<R> {
        self.rate_limiter.acquire_for_write().await.map_err(backend_err)?;
        let body = serde_json::to_value(row)?;
        let value = self.request(Method::POST, table, &[], Some(body)).await?;
        // The representation comes back as a one-element array.
        let mut rows: Vec<R> = serde_json::from_value(value)?;
        match rows.len() {
            0 => Err(Error::Backend {
                status: StatusCode::OK.as_u16(),
                body: "insert returned no representation".to_string(),
            }),
            _ => Ok(rows.swap_remove(0)),
        }
    }

    /// Patch every row matching the filters; returns the affected rows so
    /// callers can count them.
    pub async fn update<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter<'_>],
        patch: &T,
    ) -> Result<Vec<R>> {
        self.rate_limiter.acquire_for_write().await.map_err(backend_err)?;
        let body = serde_json::to_value(patch)?;
        let value = self.request(Method::PATCH, table, filters, Some(body)).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Compare-and-swap on a status column: patch the row only while its
    /// status still equals `from`. `Ok(false)` means another client already
    /// transitioned the row; nothing was written.
    ///
    /// This is the only cross-client coordination primitive in the crate.
    pub async fn compare_and_swap_status(
        &self,
        table: &str,
        id: i64,
        from: &str,
        patch: Value,
    ) -> Result<bool> {
        let filters = [eq("id", id), eq("status", from)];
        let affected: Vec<Value> = self.update(table, &filters, &patch).await?;
        Ok(!affected.is_empty())
    }

    /// Compare-and-swap on a version column: the patch must carry the bumped
    /// `versao`; the write only lands while the stored version still equals
    /// `expected`.
    pub async fn compare_and_swap_version(
        &self,
        table: &str,
        id: i64,
        expected: i64,
        patch: Value,
    ) -> Result<bool> {
        let filters = [eq("id", id), eq("versao", expected)];
        let affected: Vec<Value> = self.update(table, &filters, &patch).await?;
        Ok(!affected.is_empty())
    }
}

fn backend_err(err: anyhow::Error) -> Error {
    Error::Backend {
        status: 0,
        body: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq_filter_format() {
        let f = eq("status", "PENDENTE");
        assert_eq!(f.0, "status");
        assert_eq!(f.1, "eq.PENDENTE");

        let f = eq("id", 42);
        assert_eq!(f.1, "eq.42");
    }
}
