pub mod youtube_api_v3;
pub mod ytdlp;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ExtractionError, UpstreamQueryError};

pub use youtube_api_v3::YouTubeApiClient;
pub use ytdlp::YtDlpExtractor;

/// Categoría "Music" de YouTube
pub const MUSIC_CATEGORY_ID: &str = "10";

/// Extracción de streams de un video (yt-dlp en producción).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Extrae metadata y todos los formatos disponibles del video
    async fn extract(&self, video_id: &str) -> Result<ExtractedVideo, ExtractionError>;
}

/// Resultado crudo de una extracción.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedVideo {
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub channel: Option<String>,
    pub duration_secs: Option<f64>,
    pub formats: Vec<ExtractedFormat>,
}

/// Un formato ofrecido por el extractor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFormat {
    pub url: Option<String>,
    pub audio_codec: Option<String>,
    pub video_codec: Option<String>,
    /// Extensión del contenedor (`webm`, `m4a`)
    pub container: Option<String>,
    /// Bitrate de audio en kbps
    pub bitrate: Option<f64>,
    /// Transporte por segmentos (HLS/DASH) que requiere un manifest
    pub segmented: bool,
}

impl ExtractedFormat {
    pub fn has_audio(&self) -> bool {
        matches!(self.audio_codec.as_deref(), Some(codec) if codec != "none")
    }

    pub fn has_video(&self) -> bool {
        matches!(self.video_codec.as_deref(), Some(codec) if codec != "none")
    }
}

/// Orden de resultados del endpoint `search`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchOrder {
    #[default]
    Relevance,
    ViewCount,
}

impl SearchOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOrder::Relevance => "relevance",
            SearchOrder::ViewCount => "viewCount",
        }
    }
}

/// Parámetros de una búsqueda de videos musicales.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchParams {
    pub query: Option<String>,
    pub channel_id: Option<String>,
    pub order: SearchOrder,
    pub max_results: u32,
    pub region_code: Option<String>,
}

impl SearchParams {
    pub fn text(query: impl Into<String>, max_results: u32) -> Self {
        Self {
            query: Some(query.into()),
            max_results,
            ..Default::default()
        }
    }

    pub fn channel(channel_id: impl Into<String>, max_results: u32) -> Self {
        Self {
            channel_id: Some(channel_id.into()),
            max_results,
            ..Default::default()
        }
    }

    pub fn with_order(mut self, order: SearchOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_region(mut self, region_code: impl Into<String>) -> Self {
        self.region_code = Some(region_code.into());
        self
    }
}

/// API de metadata (YouTube Data API v3). Devuelve las respuestas JSON sin
/// transformar; la normalización vive en `services::search`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataApi: Send + Sync {
    /// `search?part=snippet&type=video&videoCategoryId=10`
    async fn search(&self, params: &SearchParams) -> Result<Value, UpstreamQueryError>;

    /// `videos?part=contentDetails&id=...`
    async fn details(&self, video_ids: &[String]) -> Result<Value, UpstreamQueryError>;

    /// `videos?part=snippet&id=...` para un único video
    async fn video(&self, video_id: &str) -> Result<Value, UpstreamQueryError>;

    /// `videos?chart=mostPopular&videoCategoryId=10`
    async fn most_popular(
        &self,
        region_code: &str,
        max_results: u32,
    ) -> Result<Value, UpstreamQueryError>;
}
