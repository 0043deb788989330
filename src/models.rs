use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stream de audio resuelto para un video, válido hasta `expires_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioDescriptor {
    pub video_id: String,
    /// URL directa (no segmentada) del stream de audio
    pub stream_url: String,
    pub title: String,
    pub thumbnail: String,
    pub channel: String,
    /// Duración formateada (`M:SS` o `H:MM:SS`)
    pub duration: String,
    /// Codec o contenedor del formato elegido (`opus`, `mp4a.40.2`, ...)
    pub format: String,
    /// Etiqueta de bitrate, p.ej. `128kbps`
    pub quality: String,
    pub expires_at: DateTime<Utc>,
}

impl AudioDescriptor {
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Resumen de un video para listados (búsqueda, trending, recomendaciones).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultSummary {
    pub id: String,
    pub title: String,
    pub duration: String,
    pub thumbnail: String,
    pub channel: String,
}
