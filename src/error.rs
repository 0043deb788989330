use thiserror::Error;

/// Fallos del extractor de audio (yt-dlp).
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no se pudo ejecutar yt-dlp: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("yt-dlp terminó con estado {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("respuesta de yt-dlp inválida: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("el worker de extracción falló: {0}")]
    Worker(String),

    #[error("yt-dlp excedió {timeout:?} para {video_id}")]
    Timeout {
        video_id: String,
        timeout: std::time::Duration,
    },

    #[error("yt-dlp no devolvió formatos para {video_id}")]
    NoFormats { video_id: String },
}

/// Errores de `AudioResolver::resolve`.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("ningún formato de audio utilizable para {video_id}")]
    NoSuitableFormat { video_id: String },
}

/// Fallos de las llamadas a la API de metadata (search / videos).
#[derive(Debug, Error)]
pub enum UpstreamQueryError {
    #[error("YOUTUBE_API_KEY no configurada")]
    MissingApiKey,

    #[error("error de red con YouTube API: {0}")]
    Request(#[from] reqwest::Error),

    #[error("YouTube API respondió {status}: {body}")]
    Status { status: u16, body: String },

    #[error("respuesta de YouTube API inválida: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Duración ISO-8601 que no se pudo interpretar. Local y recuperable:
/// el item afectado se descarta.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("duración ISO-8601 inválida: {input:?}")]
pub struct MalformedDurationError {
    pub input: String,
}
