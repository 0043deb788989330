//! Normalización de respuestas de YouTube Data API v3 a
//! [`SearchResultSummary`].
//!
//! Cada búsqueda son dos llamadas: `search` (o `videos?chart=...`) devuelve
//! los snippets y `videos?part=contentDetails` las duraciones. Los items se
//! decodifican uno a uno para que un item roto no descarte el lote.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::UpstreamQueryError;
use crate::format::{format_duration, parse_iso8601_duration};
use crate::models::SearchResultSummary;
use crate::sources::{MetadataApi, SearchParams};

/// Videos más cortos que esto no son canciones (shorts, intros, ...)
pub const MIN_TRACK_DURATION: Duration = Duration::from_secs(120);

/// `search` devuelve `{"id": {"videoId": ".."}}`, `videos` devuelve `{"id": ".."}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ItemId {
    Bare(String),
    Nested {
        #[serde(rename = "videoId")]
        video_id: Option<String>,
    },
}

impl ItemId {
    fn into_video_id(self) -> Option<String> {
        match self {
            ItemId::Bare(id) => Some(id),
            ItemId::Nested { video_id } => video_id,
        }
        .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: Option<ItemId>,
    snippet: Option<VideoSnippet>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoSnippet {
    pub title: Option<String>,
    pub channel_title: Option<String>,
    pub channel_id: Option<String>,
    pub thumbnails: Option<Thumbnails>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Thumbnails {
    pub medium: Option<Thumbnail>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Thumbnail {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailsItem {
    id: Option<String>,
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

fn items(raw: &Value) -> &[Value] {
    raw.get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn item_video_id(item: &Value) -> Option<String> {
    let id = item.get("id")?;
    ItemId::deserialize(id).ok()?.into_video_id()
}

/// IDs de video de una respuesta de `search` o `videos`, en orden.
pub fn extract_video_ids(raw_search: &Value) -> Vec<String> {
    items(raw_search).iter().filter_map(item_video_id).collect()
}

fn durations_by_id(raw_details: &Value) -> HashMap<String, Option<String>> {
    items(raw_details)
        .iter()
        .filter_map(|item| DetailsItem::deserialize(item).ok())
        .filter_map(|details| {
            let duration = details.content_details.and_then(|c| c.duration);
            details.id.map(|id| (id, duration))
        })
        .collect()
}

/// Combina la respuesta de búsqueda con la de detalles.
///
/// Se descartan los items sin ID, con duración ilegible, de menos de
/// [`MIN_TRACK_DURATION`] o sin título / miniatura / canal.
pub fn normalize(raw_search: &Value, raw_details: &Value) -> Vec<SearchResultSummary> {
    let durations = durations_by_id(raw_details);

    items(raw_search)
        .iter()
        .filter_map(|item| {
            let search_item = match SearchItem::deserialize(item) {
                Ok(search_item) => search_item,
                Err(e) => {
                    warn!("⚠️ Item de búsqueda con formato inválido: {}", e);
                    return None;
                }
            };
            let video_id = search_item.id.and_then(ItemId::into_video_id)?;

            let duration_iso = durations
                .get(&video_id)
                .cloned()
                .flatten()
                .unwrap_or_else(|| "PT0S".to_string());
            let duration = match parse_iso8601_duration(&duration_iso) {
                Ok(duration) => duration,
                Err(e) => {
                    debug!("⏭️ {} descartado: {}", video_id, e);
                    return None;
                }
            };
            if duration < MIN_TRACK_DURATION {
                debug!("⏭️ {} descartado: dura {:?}", video_id, duration);
                return None;
            }

            let snippet = search_item.snippet.unwrap_or_default();
            let thumbnail = snippet
                .thumbnails
                .and_then(|t| t.medium)
                .and_then(|t| t.url);
            match (snippet.title, thumbnail, snippet.channel_title) {
                (Some(title), Some(thumbnail), Some(channel)) => Some(SearchResultSummary {
                    id: video_id,
                    title,
                    duration: format_duration(duration),
                    thumbnail,
                    channel,
                }),
                _ => {
                    warn!("⚠️ {} sin título, miniatura o canal; se omite", video_id);
                    None
                }
            }
        })
        .collect()
}

/// Ejecuta búsquedas contra la API de metadata y normaliza el resultado.
#[derive(Clone)]
pub struct SearchAdapter {
    api: Arc<dyn MetadataApi>,
}

impl SearchAdapter {
    pub fn new(api: Arc<dyn MetadataApi>) -> Self {
        Self { api }
    }

    /// `search` + `videos?part=contentDetails` + [`normalize`]
    pub async fn search(
        &self,
        params: &SearchParams,
    ) -> Result<Vec<SearchResultSummary>, UpstreamQueryError> {
        let raw = self.api.search(params).await?;
        self.hydrate(&raw).await
    }

    /// Completa una respuesta cruda con las duraciones y la normaliza.
    pub async fn hydrate(
        &self,
        raw_search: &Value,
    ) -> Result<Vec<SearchResultSummary>, UpstreamQueryError> {
        let ids = extract_video_ids(raw_search);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let details = self.api.details(&ids).await?;
        let results = normalize(raw_search, &details);
        info!("✅ {} de {} resultados utilizables", results.len(), ids.len());
        Ok(results)
    }
}
