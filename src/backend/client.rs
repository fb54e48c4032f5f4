//! HTTP client for document database requests.
//!
//! This module provides a low-level HTTP client wrapper for making requests
//! to the backend REST API, handling authentication headers, pagination, and
//! response parsing.

use super::error::BackendError;
use super::query::Query;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Largest page the backend will return in one request.
///
const PAGE_LIMIT: usize = 100;

/// Envelope returned by list endpoints.
///
#[derive(Deserialize)]
struct DocumentList<T> {
    total: usize,
    documents: Vec<T>,
}

/// Shape of an error body.
///
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Makes requests to the backend and tries to conform response data to the
/// requested type.
///
pub struct Client {
    pub(crate) base_url: String,
    project_id: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl Client {
    /// Returns a new instance for the given endpoint and credentials.
    ///
    pub fn new(base_url: &str, project_id: &str, api_key: Option<&str>) -> Self {
        Client {
            base_url: base_url.trim_end_matches('/').to_owned(),
            project_id: project_id.to_owned(),
            api_key: api_key.map(str::to_owned),
            http_client: reqwest::Client::new(),
        }
    }

    /// Return the deserialized body at path or error.
    ///
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let response = self.call(Method::GET, path, &[], None).await?;
        Ok(response.json().await?)
    }

    /// Return every document matching queries, following offset pagination
    /// until the reported total is reached.
    ///
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        queries: &[Query],
    ) -> Result<Vec<T>, BackendError> {
        let mut all_documents = Vec::new();
        let mut page = 0;

        loop {
            let mut page_queries = queries.to_vec();
            page_queries.push(Query::limit(PAGE_LIMIT));
            page_queries.push(Query::offset(all_documents.len()));

            let response = self.call(Method::GET, path, &page_queries, None).await?;
            let bytes = response.bytes().await?;
            let list: DocumentList<T> = serde_json::from_slice(&bytes).map_err(|e| {
                log::error!(
                    "Failed to deserialize document list: {}. Response body: {}",
                    e,
                    String::from_utf8_lossy(&bytes)
                );
                e
            })?;

            let page_size = list.documents.len();
            all_documents.extend(list.documents);
            log::debug!(
                "Fetched page {}: {} documents (total so far: {} of {})",
                page,
                page_size,
                all_documents.len(),
                list.total
            );

            if page_size < PAGE_LIMIT || all_documents.len() >= list.total {
                break;
            }
            page += 1;
        }

        Ok(all_documents)
    }

    /// Send body with method to path and return the deserialized response.
    ///
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, BackendError> {
        let response = self.call(method, path, &[], Some(body)).await?;
        Ok(response.json().await?)
    }

    /// Delete the resource at path.
    ///
    pub async fn delete(&self, path: &str) -> Result<(), BackendError> {
        self.call(Method::DELETE, path, &[], None).await?;
        Ok(())
    }

    /// Make request and return the response, or an API error for any
    /// non-success status.
    ///
    async fn call(
        &self,
        method: Method,
        path: &str,
        queries: &[Query],
        body: Option<serde_json::Value>,
    ) -> Result<Response, BackendError> {
        let request_url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let params: Vec<(&str, String)> = queries
            .iter()
            .map(|query| ("queries[]", query.encode()))
            .collect();

        let mut request = self
            .http_client
            .request(method, &request_url)
            .header("X-Appwrite-Project", &self.project_id)
            .header("Content-Type", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("X-Appwrite-Key", key);
        }
        if !params.is_empty() {
            request = request.query(&params);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("Unable to read response"));
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or(text);
        log::error!("API request failed with status {}: {}", status, message);
        Err(BackendError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
