use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::{AudioExtractor, ExtractedFormat, ExtractedVideo};
use crate::config::Config;
use crate::error::ExtractionError;

/// Extractor basado en el binario `yt-dlp`.
///
/// Cada extracción es un proceso hijo limitado por un semáforo de `workers`
/// permisos y por `timeout` de reloj. El proceso muere si se cancela la
/// extracción o se agota el tiempo.
pub struct YtDlpExtractor {
    binary: PathBuf,
    socket_timeout: Duration,
    timeout: Duration,
    cookies: Option<PathBuf>,
    workers: Arc<Semaphore>,
}

/// Información extraída de yt-dlp (`--dump-single-json`)
#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    title: Option<String>,
    thumbnail: Option<String>,
    channel: Option<String>,
    uploader: Option<String>,
    duration: Option<f64>,
    #[serde(default)]
    formats: Vec<YtDlpFormat>,
}

#[derive(Debug, Deserialize)]
struct YtDlpFormat {
    url: Option<String>,
    acodec: Option<String>,
    vcodec: Option<String>,
    ext: Option<String>,
    abr: Option<f64>,
    protocol: Option<String>,
    fragments: Option<serde_json::Value>,
}

impl YtDlpExtractor {
    pub fn new(
        binary: impl Into<PathBuf>,
        socket_timeout: Duration,
        timeout: Duration,
        workers: usize,
    ) -> Self {
        Self {
            binary: binary.into(),
            socket_timeout,
            timeout,
            cookies: None,
            workers: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let extractor = Self::new(
            config.ytdlp_path.clone(),
            config.extraction_socket_timeout,
            config.extraction_timeout,
            config.extraction_workers,
        );
        match &config.ytdlp_cookies {
            Some(cookies) => extractor.with_cookies(cookies.clone()),
            None => extractor,
        }
    }

    pub fn with_cookies(mut self, cookies: PathBuf) -> Self {
        info!("🍪 Usando cookies de yt-dlp en: {}", cookies.display());
        self.cookies = Some(cookies);
        self
    }

    pub fn watch_url(video_id: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(video_id.as_bytes()).collect();
        format!("https://www.youtube.com/watch?v={}", encoded)
    }

    fn build_command(&self, video_id: &str) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.stdin(Stdio::null());
        cmd.args([
            "--dump-single-json",
            "--skip-download",
            "--no-playlist",
            "--no-warnings",
            "--quiet",
            "--retries",
            "0",
            "--socket-timeout",
        ]);
        cmd.arg(self.socket_timeout.as_secs().max(1).to_string());

        if let Some(cookies) = &self.cookies {
            cmd.arg("--cookies").arg(cookies);
        }

        cmd.arg(Self::watch_url(video_id));
        cmd
    }

    /// Convierte la salida JSON de yt-dlp en un [`ExtractedVideo`].
    fn parse_info(stdout: &[u8], video_id: &str) -> Result<ExtractedVideo, ExtractionError> {
        let info: YtDlpInfo = serde_json::from_slice(stdout)?;

        if info.formats.is_empty() {
            return Err(ExtractionError::NoFormats {
                video_id: video_id.to_string(),
            });
        }

        let formats = info
            .formats
            .into_iter()
            .map(|f| {
                let segmented = f.fragments.is_some()
                    || f.protocol.as_deref().is_some_and(is_segmented_protocol);
                ExtractedFormat {
                    url: f.url,
                    audio_codec: f.acodec,
                    video_codec: f.vcodec,
                    container: f.ext,
                    bitrate: f.abr,
                    segmented,
                }
            })
            .collect();

        Ok(ExtractedVideo {
            title: info.title,
            thumbnail: info.thumbnail,
            channel: info.channel.or(info.uploader),
            duration_secs: info.duration,
            formats,
        })
    }
}

/// Ejecuta el comando con un límite de tiempo total. Al cancelarse el
/// future (timeout o caller) el proceso se mata.
async fn run_bounded(
    mut cmd: Command,
    video_id: &str,
    limit: Duration,
) -> Result<Output, ExtractionError> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(limit, cmd.output()).await {
        Ok(output) => Ok(output?),
        Err(_) => {
            warn!("⏱️ yt-dlp excedió {:?} para {}", limit, video_id);
            Err(ExtractionError::Timeout {
                video_id: video_id.to_string(),
                timeout: limit,
            })
        }
    }
}

/// Protocolos de streaming por segmentos (HLS, DASH, ...)
fn is_segmented_protocol(protocol: &str) -> bool {
    ["m3u8", "http_dash_segments", "dash", "f4m", "ism"]
        .iter()
        .any(|prefix| protocol.starts_with(prefix))
}

#[async_trait]
impl AudioExtractor for YtDlpExtractor {
    async fn extract(&self, video_id: &str) -> Result<ExtractedVideo, ExtractionError> {
        let _permit = self
            .workers
            .acquire()
            .await
            .map_err(|e| ExtractionError::Worker(e.to_string()))?;

        info!("🎵 Extrayendo audio con yt-dlp: {}", video_id);

        let cmd = self.build_command(video_id);
        let output = run_bounded(cmd, video_id, self.timeout).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("❌ yt-dlp falló para {}: {}", video_id, stderr);
            return Err(ExtractionError::Failed {
                status: output.status.to_string(),
                stderr,
            });
        }

        let video = Self::parse_info(&output.stdout, video_id)?;
        debug!(
            "📋 yt-dlp devolvió {} formatos para {}",
            video.formats.len(),
            video_id
        );
        Ok(video)
    }
}
