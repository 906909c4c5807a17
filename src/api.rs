//! Contacts service client.
//!
//! This module provides:
//! - `ContactsApi` trait for the two endpoints the list view consumes
//! - `HttpContactsApi` implementation over reqwest's blocking client
//! - `ApiError`, whose `Display` text is what the view shows to the user

use anyhow::Context;
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use thiserror::Error;
use tracing::debug;

use crate::config::ApiConfig;
use crate::contact::{Contact, ContactId};

#[derive(Debug, Error)]
pub enum ApiError {
    /// `GET /contacts` answered with a non-success status
    #[error("Error: {status} {reason}")]
    Fetch { status: u16, reason: String },
    /// `DELETE /contacts/{id}` answered with a non-success status
    #[error("Delete failed: {status} {reason}")]
    Delete { status: u16, reason: String },
    /// The request never produced a response
    #[error("Network error: {0}")]
    Transport(String),
    /// The response body was not a JSON array
    #[error("Failed to parse contacts: {0}")]
    Decode(String),
}

impl ApiError {
    fn fetch(status: StatusCode) -> Self {
        Self::Fetch {
            status: status.as_u16(),
            reason: reason_phrase(status),
        }
    }

    fn delete(status: StatusCode) -> Self {
        Self::Delete {
            status: status.as_u16(),
            reason: reason_phrase(status),
        }
    }
}

fn reason_phrase(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("").to_string()
}

/// The contacts service as seen by the list view.
///
/// Implementations are moved onto the request worker thread, so they must be `Send`.
pub trait ContactsApi: Send + 'static {
    /// `GET /contacts`
    fn list_contacts(&self) -> Result<Vec<Contact>, ApiError>;

    /// `DELETE /contacts/{id}`
    fn delete_contact(&self, id: &ContactId) -> Result<(), ApiError>;
}

pub struct HttpContactsApi {
    client: Client,
    base_url: Url,
}

impl HttpContactsApi {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("invalid contacts API URL: {}", config.base_url))?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, base_url })
    }

    /// `{base}/contacts` or `{base}/contacts/{id}`, with the id percent-encoded.
    fn endpoint(&self, id: Option<&ContactId>) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ApiError::Transport(format!("{} cannot be used as a base URL", self.base_url))
            })?;
            segments.pop_if_empty().push("contacts");
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        Ok(url)
    }
}

impl ContactsApi for HttpContactsApi {
    fn list_contacts(&self) -> Result<Vec<Contact>, ApiError> {
        let url = self.endpoint(None)?;
        debug!(%url, "GET contacts");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::fetch(status));
        }

        response
            .json::<Vec<Contact>>()
            .map_err(|err| ApiError::Decode(err.to_string()))
    }

    fn delete_contact(&self, id: &ContactId) -> Result<(), ApiError> {
        let url = self.endpoint(Some(id))?;
        debug!(%url, "DELETE contact");

        let response = self
            .client
            .delete(url)
            .send()
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::delete(status));
        }
        Ok(())
    }
}
