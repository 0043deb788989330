use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use super::search::{SearchAdapter, VideoSnippet};
use crate::error::UpstreamQueryError;
use crate::models::SearchResultSummary;
use crate::sources::{MetadataApi, SearchParams};

/// Máximo de tags del video semilla usados en la búsqueda por tags
const MAX_SEED_TAGS: usize = 3;

/// Lo que necesitamos del video semilla.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedVideo {
    pub channel_id: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SeedItem {
    snippet: Option<VideoSnippet>,
}

/// Recomendaciones a partir de un video: mismo canal + mismos tags.
pub struct RecommendationAggregator {
    api: Arc<dyn MetadataApi>,
    search: SearchAdapter,
    page_size: u32,
}

impl RecommendationAggregator {
    pub fn new(api: Arc<dyn MetadataApi>, page_size: u32) -> Self {
        Self {
            search: SearchAdapter::new(api.clone()),
            api,
            page_size,
        }
    }

    /// Nunca falla: una fuente con error aporta cero resultados. El propio
    /// video semilla puede aparecer entre los resultados de su canal.
    pub async fn recommend(&self, seed_id: &str) -> Vec<SearchResultSummary> {
        let seed = match self.seed(seed_id).await {
            Ok(Some(seed)) => seed,
            Ok(None) => {
                info!("🔍 Video semilla {} no encontrado, sin recomendaciones", seed_id);
                return Vec::new();
            }
            Err(e) => {
                warn!("❌ No se pudo obtener el video semilla {}: {}", seed_id, e);
                return Vec::new();
            }
        };

        let by_channel = async {
            match &seed.channel_id {
                Some(channel_id) => {
                    self.search
                        .search(&SearchParams::channel(channel_id.as_str(), self.page_size))
                        .await
                }
                None => Ok(Vec::new()),
            }
        };
        let by_tags = async {
            match tag_query(&seed.tags) {
                Some(query) => self.search.search(&SearchParams::text(query, self.page_size)).await,
                None => Ok(Vec::new()),
            }
        };
        let (by_channel, by_tags) = futures::join!(by_channel, by_tags);

        let by_channel = degrade("canal", seed_id, by_channel);
        let by_tags = degrade("tags", seed_id, by_tags);
        let merged = merge_unique(by_channel, by_tags);

        info!("🎶 {} recomendaciones para {}", merged.len(), seed_id);
        merged
    }

    /// Tags y canal del video; `None` si la API no lo devuelve.
    pub async fn seed(&self, seed_id: &str) -> Result<Option<SeedVideo>, UpstreamQueryError> {
        let raw = self.api.video(seed_id).await?;

        let first = raw
            .get("items")
            .and_then(|items| items.as_array())
            .and_then(|items| items.first());
        let Some(item) = first else {
            return Ok(None);
        };

        let snippet = match SeedItem::deserialize(item) {
            Ok(SeedItem { snippet }) => snippet.unwrap_or_default(),
            Err(e) => {
                warn!("⚠️ Snippet inválido para {}: {}", seed_id, e);
                return Ok(None);
            }
        };

        Ok(Some(SeedVideo {
            channel_id: snippet.channel_id.filter(|id| !id.is_empty()),
            tags: snippet.tags.unwrap_or_default(),
        }))
    }
}

fn degrade(
    source: &str,
    seed_id: &str,
    result: Result<Vec<SearchResultSummary>, UpstreamQueryError>,
) -> Vec<SearchResultSummary> {
    result.unwrap_or_else(|e| {
        warn!("⚠️ Búsqueda por {} falló para {}: {}", source, seed_id, e);
        Vec::new()
    })
}

/// `rock|indie+rock|guitar`: los tres primeros tags, espacios como `+`,
/// unidos por `|`. Un tag en blanco ocupa su lugar entre los tres y luego
/// se omite.
pub fn tag_query(tags: &[String]) -> Option<String> {
    let query = tags
        .iter()
        .take(MAX_SEED_TAGS)
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(|tag| tag.replace(' ', "+"))
        .collect::<Vec<_>>()
        .join("|");

    (!query.is_empty()).then_some(query)
}

/// Concatena y deduplica por ID manteniendo la primera aparición.
pub fn merge_unique(
    first: Vec<SearchResultSummary>,
    second: Vec<SearchResultSummary>,
) -> Vec<SearchResultSummary> {
    let mut seen = HashSet::new();
    first
        .into_iter()
        .chain(second)
        .filter(|result| seen.insert(result.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MockMetadataApi;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn summary(id: &str, channel: &str) -> SearchResultSummary {
        SearchResultSummary {
            id: id.to_string(),
            title: format!("Song {}", id),
            duration: "3:00".to_string(),
            thumbnail: format!("https://i.ytimg.com/vi/{}/mqdefault.jpg", id),
            channel: channel.to_string(),
        }
    }

    fn search_response(ids: &[&str], channel: &str) -> Value {
        let items: Vec<Value> = ids
            .iter()
            .map(|id| {
                json!({
                    "id": {"videoId": id},
                    "snippet": {
                        "title": format!("Song {}", id),
                        "channelTitle": channel,
                        "thumbnails": {"medium": {"url": format!("https://i.ytimg.com/vi/{}/mqdefault.jpg", id)}}
                    }
                })
            })
            .collect();
        json!({ "items": items })
    }

    fn details_for(ids: &[String]) -> Value {
        let items: Vec<Value> = ids
            .iter()
            .map(|id| json!({"id": id, "contentDetails": {"duration": "PT3M"}}))
            .collect();
        json!({ "items": items })
    }

    fn seed_response(tags: &[&str]) -> Value {
        json!({"items": [{
            "id": "seed",
            "snippet": {"title": "Seed", "channelId": "UCseed", "channelTitle": "Seed Channel", "tags": tags}
        }]})
    }

    fn is_channel_search(params: &SearchParams) -> bool {
        params.channel_id.as_deref() == Some("UCseed") && params.query.is_none()
    }

    #[test]
    fn test_merge_unique_keeps_first_seen_order() {
        let merged = merge_unique(
            vec![summary("A", "chan"), summary("B", "chan"), summary("C", "chan")],
            vec![summary("B", "tags"), summary("D", "tags")],
        );
        let ids: Vec<&str> = merged.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C", "D"]);
        assert_eq!(merged[1].channel, "chan");
    }

    #[test]
    fn test_tag_query() {
        let tags: Vec<String> = ["lofi hip hop", "chill", "study beats", "relax"]
            .iter()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(tag_query(&tags).as_deref(), Some("lofi+hip+hop|chill|study+beats"));
        assert_eq!(tag_query(&[]), None);
        assert_eq!(tag_query(&["  ".to_string()]), None);
    }

    #[test]
    fn test_tag_query_takes_first_three_as_given() {
        let tags: Vec<String> = ["rock", " ", "pop", "jazz"]
            .iter()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(tag_query(&tags).as_deref(), Some("rock|pop"));
    }

    #[tokio::test]
    async fn test_recommend_merges_channel_then_tags() {
        let mut api = MockMetadataApi::new();
        api.expect_video()
            .times(1)
            .returning(|_| Ok(seed_response(&["rock", "indie rock", "guitar", "live"])));
        api.expect_search()
            .withf(|params| is_channel_search(params))
            .times(1)
            .returning(|_| Ok(search_response(&["A", "B", "C"], "Seed Channel")));
        api.expect_search()
            .withf(|params| params.query.as_deref() == Some("rock|indie+rock|guitar"))
            .times(1)
            .returning(|_| Ok(search_response(&["B", "D"], "Other")));
        api.expect_details()
            .returning(|ids| Ok(details_for(ids)));

        let aggregator = RecommendationAggregator::new(Arc::new(api), 20);
        let results = aggregator.recommend("seed").await;

        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C", "D"]);
        assert_eq!(results[1].channel, "Seed Channel");
    }

    #[tokio::test]
    async fn test_tag_search_failure_keeps_channel_results() {
        let mut api = MockMetadataApi::new();
        api.expect_video()
            .returning(|_| Ok(seed_response(&["rock"])));
        api.expect_search()
            .withf(|params| is_channel_search(params))
            .returning(|_| Ok(search_response(&["A", "B"], "Seed Channel")));
        api.expect_search()
            .withf(|params| params.query.is_some())
            .returning(|_| {
                Err(UpstreamQueryError::Status {
                    status: 403,
                    body: "quotaExceeded".to_string(),
                })
            });
        api.expect_details()
            .returning(|ids| Ok(details_for(ids)));

        let aggregator = RecommendationAggregator::new(Arc::new(api), 20);
        let results = aggregator.recommend("seed").await;

        assert_eq!(results, vec![summary("A", "Seed Channel"), summary("B", "Seed Channel")]);
    }

    #[tokio::test]
    async fn test_seed_without_tags_skips_tag_search() {
        let mut api = MockMetadataApi::new();
        api.expect_video().returning(|_| Ok(seed_response(&[])));
        api.expect_search()
            .withf(|params| is_channel_search(params))
            .times(1)
            .returning(|_| Ok(search_response(&["seed", "A"], "Seed Channel")));
        api.expect_details()
            .returning(|ids| Ok(details_for(ids)));

        let aggregator = RecommendationAggregator::new(Arc::new(api), 20);
        let results = aggregator.recommend("seed").await;

        // El video semilla no se filtra
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["seed", "A"]);
    }

    #[tokio::test]
    async fn test_seed_lookup_failure_returns_empty() {
        let mut api = MockMetadataApi::new();
        api.expect_video()
            .returning(|_| Err(UpstreamQueryError::MissingApiKey));
        api.expect_search().never();

        let aggregator = RecommendationAggregator::new(Arc::new(api), 20);
        assert!(aggregator.recommend("seed").await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_seed_returns_empty() {
        let mut api = MockMetadataApi::new();
        api.expect_video().returning(|_| Ok(json!({"items": []})));
        api.expect_search().never();

        let aggregator = RecommendationAggregator::new(Arc::new(api), 20);
        assert!(aggregator.recommend("nope").await.is_empty());
    }

    #[tokio::test]
    async fn test_channel_failure_keeps_tag_results() {
        let mut api = MockMetadataApi::new();
        api.expect_video()
            .returning(|_| Ok(seed_response(&["jazz"])));
        api.expect_search()
            .withf(|params| is_channel_search(params))
            .returning(|_| Err(UpstreamQueryError::MissingApiKey));
        api.expect_search()
            .withf(|params| params.query.as_deref() == Some("jazz"))
            .returning(|_| Ok(search_response(&["J"], "Jazz")));
        api.expect_details()
            .returning(|ids| Ok(details_for(ids)));

        let aggregator = RecommendationAggregator::new(Arc::new(api), 20);
        let results = aggregator.recommend("seed").await;
        assert_eq!(results, vec![summary("J", "Jazz")]);
    }
}
