pub mod recommend;
pub mod resolver;
pub mod search;

use std::sync::Arc;
use tracing::info;

use crate::cache::{CacheStats, Clock, ResolutionCache, SystemClock};
use crate::config::Config;
use crate::error::{ResolveError, UpstreamQueryError};
use crate::models::{AudioDescriptor, SearchResultSummary};
use crate::sources::{
    AudioExtractor, MetadataApi, SearchOrder, SearchParams, YouTubeApiClient, YtDlpExtractor,
};

pub use recommend::RecommendationAggregator;
pub use resolver::AudioResolver;
pub use search::SearchAdapter;

/// Punto de entrada para la capa de rutas: audio, búsqueda, listados y
/// recomendaciones sobre un mismo conjunto de colaboradores.
pub struct MusicService {
    api: Arc<dyn MetadataApi>,
    resolver: AudioResolver,
    search: SearchAdapter,
    recommendations: RecommendationAggregator,
    region_code: String,
    search_max_results: u32,
}

impl MusicService {
    pub fn new(
        config: &Config,
        extractor: Arc<dyn AudioExtractor>,
        api: Arc<dyn MetadataApi>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = Arc::new(ResolutionCache::new(clock));
        let resolver = AudioResolver::new(extractor, cache);
        let resolver = if config.coalesce_extractions {
            resolver.with_coalescing()
        } else {
            resolver
        };

        Self {
            search: SearchAdapter::new(api.clone()),
            recommendations: RecommendationAggregator::new(
                api.clone(),
                config.recommendation_page_size,
            ),
            api,
            resolver,
            region_code: config.region_code.clone(),
            search_max_results: config.search_max_results,
        }
    }

    /// Servicio con yt-dlp, YouTube Data API v3 y el reloj del sistema.
    pub fn from_config(config: &Config) -> Result<Self, UpstreamQueryError> {
        let extractor = Arc::new(YtDlpExtractor::from_config(config));
        let api = Arc::new(YouTubeApiClient::from_config(config)?);
        info!("🎼 Servicio de música listo (región {})", config.region_code);
        Ok(Self::new(config, extractor, api, Arc::new(SystemClock)))
    }

    /// Stream de audio del video (caché de 6h)
    pub async fn audio_info(&self, video_id: &str) -> Result<AudioDescriptor, ResolveError> {
        self.resolver.resolve(video_id).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchResultSummary>, UpstreamQueryError> {
        info!("🔍 Buscando: {}", query);
        self.search
            .search(&SearchParams::text(query, self.search_max_results))
            .await
    }

    /// Chart `mostPopular` de la categoría música
    pub async fn trending(&self) -> Result<Vec<SearchResultSummary>, UpstreamQueryError> {
        let raw = self
            .api
            .most_popular(&self.region_code, self.search_max_results)
            .await?;
        self.search.hydrate(&raw).await
    }

    pub async fn most_viewed(&self) -> Result<Vec<SearchResultSummary>, UpstreamQueryError> {
        let params = SearchParams::text("music", self.search_max_results)
            .with_order(SearchOrder::ViewCount)
            .with_region(self.region_code.as_str());
        self.search.search(&params).await
    }

    pub async fn recommendations(&self, video_id: &str) -> Vec<SearchResultSummary> {
        self.recommendations.recommend(video_id).await
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.resolver.cache().stats()
    }
}
