use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::{ResolutionCache, STREAM_URL_TTL};
use crate::error::ResolveError;
use crate::format::format_seconds;
use crate::models::AudioDescriptor;
use crate::sources::{AudioExtractor, ExtractedFormat};

const UNKNOWN_CHANNEL: &str = "Unknown channel";

/// Resuelve un video a un stream de audio reproducible, pasando por la caché.
pub struct AudioResolver {
    extractor: Arc<dyn AudioExtractor>,
    cache: Arc<ResolutionCache>,
    // Un mutex por video en curso; solo con `coalesce_extractions`
    inflight: Option<InflightMap>,
}

impl AudioResolver {
    pub fn new(extractor: Arc<dyn AudioExtractor>, cache: Arc<ResolutionCache>) -> Self {
        Self {
            extractor,
            cache,
            inflight: None,
        }
    }

    /// Las resoluciones concurrentes de un mismo video esperan a una única
    /// extracción en vez de lanzar una cada una.
    pub fn with_coalescing(mut self) -> Self {
        self.inflight = Some(DashMap::new());
        self
    }

    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    pub async fn resolve(&self, video_id: &str) -> Result<AudioDescriptor, ResolveError> {
        if let Some(cached) = self.cache.get(video_id) {
            return Ok(cached);
        }

        let Some(inflight) = &self.inflight else {
            return self.extract_and_store(video_id).await;
        };

        let entry = InflightEntry::register(inflight, video_id);
        let _turn = entry.lock.lock().await;
        match self.cache.get(video_id) {
            Some(cached) => Ok(cached),
            None => self.extract_and_store(video_id).await,
        }
    }

    async fn extract_and_store(&self, video_id: &str) -> Result<AudioDescriptor, ResolveError> {
        let video = self.extractor.extract(video_id).await?;

        let best = select_best_audio(&video.formats).ok_or_else(|| {
            ResolveError::NoSuitableFormat {
                video_id: video_id.to_string(),
            }
        })?;

        let descriptor = AudioDescriptor {
            video_id: video_id.to_string(),
            stream_url: best.url.clone().unwrap_or_default(),
            title: video.title.unwrap_or_default(),
            thumbnail: video.thumbnail.unwrap_or_default(),
            channel: video
                .channel
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| UNKNOWN_CHANNEL.to_string()),
            duration: format_seconds(video.duration_secs),
            format: format_tag(best),
            quality: quality_label(best.bitrate),
            expires_at: self.cache.clock().now() + STREAM_URL_TTL,
        };

        info!(
            "🎯 Audio resuelto para {}: {} {}",
            video_id, descriptor.format, descriptor.quality
        );
        self.cache.put(video_id, descriptor.clone());
        Ok(descriptor)
    }
}

type InflightMap = DashMap<String, Arc<tokio::sync::Mutex<()>>>;

/// Turno de un `resolve` en el registro de extracciones en curso. Se
/// limpia al soltarse, también si el future se cancela a mitad.
struct InflightEntry<'a> {
    inflight: &'a InflightMap,
    video_id: &'a str,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl<'a> InflightEntry<'a> {
    fn register(inflight: &'a InflightMap, video_id: &'a str) -> Self {
        let lock = inflight.entry(video_id.to_string()).or_default().clone();
        Self {
            inflight,
            video_id,
            lock,
        }
    }
}

impl Drop for InflightEntry<'_> {
    fn drop(&mut self) {
        // Solo quedan la copia del mapa y la nuestra: nadie más espera
        self.inflight
            .remove_if(self.video_id, |_, lock| Arc::strong_count(lock) <= 2);
    }
}

fn is_direct_audio(format: &ExtractedFormat) -> bool {
    format.has_audio()
        && !format.has_video()
        && !format.segmented
        && format.url.as_deref().is_some_and(|url| !url.is_empty())
}

/// Formato de solo audio, no segmentado, con el mayor bitrate. Un bitrate
/// ausente cuenta como el más bajo.
pub fn select_best_audio(formats: &[ExtractedFormat]) -> Option<&ExtractedFormat> {
    let candidates: Vec<&ExtractedFormat> =
        formats.iter().filter(|f| is_direct_audio(f)).collect();
    debug!(
        "🎚️ {} de {} formatos son audio directo",
        candidates.len(),
        formats.len()
    );

    candidates.into_iter().max_by(|a, b| {
        let rate = |f: &ExtractedFormat| f.bitrate.filter(|r| r.is_finite()).unwrap_or(0.0);
        rate(a).total_cmp(&rate(b))
    })
}

fn format_tag(format: &ExtractedFormat) -> String {
    format
        .audio_codec
        .clone()
        .or_else(|| format.container.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

/// `128kbps`, o `Unknownkbps` si no hay bitrate
pub fn quality_label(bitrate: Option<f64>) -> String {
    match bitrate.filter(|b| b.is_finite() && *b >= 0.0) {
        Some(kbps) => format!("{}kbps", kbps.round() as u64),
        None => "Unknownkbps".to_string(),
    }
}
