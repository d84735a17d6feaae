use crate::api::models::{CrmUpdateResult, TagUpdate};
use crate::config::CrmConfig;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use std::sync::Arc;
use url::Url;

/// Anything that can push a tag set onto a CRM contact.
///
/// Implementations report failures through [`CrmUpdateResult`] and never
/// return an error, so a CRM outage cannot abort event processing.
#[async_trait]
pub trait TagPublisher: Send + Sync {
    async fn publish_tags(&self, contact_id: &str, update: &TagUpdate) -> CrmUpdateResult;
}

#[async_trait]
impl<T: TagPublisher + ?Sized> TagPublisher for Arc<T> {
    async fn publish_tags(&self, contact_id: &str, update: &TagUpdate) -> CrmUpdateResult {
        (**self).publish_tags(contact_id, update).await
    }
}

/// Follow Up Boss REST client.
pub struct FubClient {
    http: HttpClient,
    base_url: String,
    api_token: String,
}

impl FubClient {
    pub fn new(config: &CrmConfig) -> Result<Self> {
        let http = HttpClient::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    // Contact ids go in as a single path segment so they can't escape it.
    fn tags_endpoint(&self, contact_id: &str) -> std::result::Result<Url, String> {
        let mut url = Url::parse(&self.base_url).map_err(|e| format!("invalid CRM base URL: {}", e))?;
        url.path_segments_mut()
            .map_err(|_| "CRM base URL cannot take a path".to_string())?
            .pop_if_empty()
            .extend(["people", contact_id, "tags"]);
        Ok(url)
    }
}

#[async_trait]
impl TagPublisher for FubClient {
    async fn publish_tags(&self, contact_id: &str, update: &TagUpdate) -> CrmUpdateResult {
        if contact_id.trim().is_empty() {
            return CrmUpdateResult::failed("missing contact id");
        }
        let endpoint = match self.tags_endpoint(contact_id) {
            Ok(url) => url,
            Err(e) => return CrmUpdateResult::failed(e),
        };
        // FUB takes the API key as the basic-auth username with no password.
        let req = self
            .http
            .post(endpoint)
            .basic_auth(&self.api_token, Some(""))
            .json(update);
        match req.send().await {
            Ok(resp) if resp.status().is_success() => CrmUpdateResult::updated(update.tags.clone()),
            Ok(resp) => CrmUpdateResult::failed(format!("CRM API error: {}", resp.status())),
            Err(e) => CrmUpdateResult::failed(e.to_string()),
        }
    }
}
