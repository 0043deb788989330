use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

use super::{MetadataApi, SearchParams, MUSIC_CATEGORY_ID};
use crate::config::Config;
use crate::error::UpstreamQueryError;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Cliente mínimo de YouTube Data API v3 que devuelve el JSON crudo.
pub struct YouTubeApiClient {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl YouTubeApiClient {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, UpstreamQueryError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, UpstreamQueryError> {
        Self::new(config.youtube_api_key.clone(), config.http_timeout)
    }

    /// Cambia la URL base (proxies o pruebas)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn search_query(params: &SearchParams) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("part", "snippet".to_string()),
            ("type", "video".to_string()),
            ("videoCategoryId", MUSIC_CATEGORY_ID.to_string()),
            ("order", params.order.as_str().to_string()),
            ("maxResults", params.max_results.to_string()),
        ];
        if let Some(q) = &params.query {
            query.push(("q", q.clone()));
        }
        if let Some(channel_id) = &params.channel_id {
            query.push(("channelId", channel_id.clone()));
        }
        if let Some(region) = &params.region_code {
            query.push(("regionCode", region.clone()));
        }
        query
    }

    async fn get_json(
        &self,
        endpoint: &str,
        query: Vec<(&'static str, String)>,
    ) -> Result<Value, UpstreamQueryError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamQueryError::MissingApiKey)?;

        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("🔍 YouTube API v3: {}", endpoint);

        // La key va en cabecera: los errores de reqwest incluyen la URL
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, api_key)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("❌ YouTube API error: {} - {}", status, body);
            return Err(UpstreamQueryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl MetadataApi for YouTubeApiClient {
    async fn search(&self, params: &SearchParams) -> Result<Value, UpstreamQueryError> {
        self.get_json("search", Self::search_query(params)).await
    }

    async fn details(&self, video_ids: &[String]) -> Result<Value, UpstreamQueryError> {
        self.get_json(
            "videos",
            vec![
                ("part", "contentDetails".to_string()),
                ("id", video_ids.join(",")),
            ],
        )
        .await
    }

    async fn video(&self, video_id: &str) -> Result<Value, UpstreamQueryError> {
        self.get_json(
            "videos",
            vec![("part", "snippet".to_string()), ("id", video_id.to_string())],
        )
        .await
    }

    async fn most_popular(
        &self,
        region_code: &str,
        max_results: u32,
    ) -> Result<Value, UpstreamQueryError> {
        self.get_json(
            "videos",
            vec![
                ("part", "snippet".to_string()),
                ("chart", "mostPopular".to_string()),
                ("videoCategoryId", MUSIC_CATEGORY_ID.to_string()),
                ("regionCode", region_code.to_string()),
                ("maxResults", max_results.to_string()),
            ],
        )
        .await
    }
}
