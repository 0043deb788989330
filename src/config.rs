use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // YouTube API
    pub youtube_api_key: Option<String>,
    pub region_code: String,
    pub search_max_results: u32,
    pub recommendation_page_size: u32,
    pub http_timeout: Duration,

    // yt-dlp
    pub ytdlp_path: PathBuf,
    pub ytdlp_cookies: Option<PathBuf>,
    pub extraction_socket_timeout: Duration,
    pub extraction_timeout: Duration,
    pub extraction_workers: usize,
    pub coalesce_extractions: bool,
}

fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(val) if !val.trim().is_empty() => val.trim().to_string(),
        _ => default.to_string(),
    }
}

fn env_duration(key: &str, default: &str) -> Result<Duration> {
    let raw = env_or(key, default);
    humantime::parse_duration(&raw).with_context(|| format!("{} inválido: {:?}", key, raw))
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            // YouTube API
            youtube_api_key: std::env::var("YOUTUBE_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            region_code: env_or("REGION_CODE", "US"),
            search_max_results: env_or("SEARCH_MAX_RESULTS", "25")
                .parse()
                .context("SEARCH_MAX_RESULTS inválido")?,
            recommendation_page_size: env_or("RECOMMENDATION_PAGE_SIZE", "20")
                .parse()
                .context("RECOMMENDATION_PAGE_SIZE inválido")?,
            http_timeout: env_duration("HTTP_TIMEOUT", "30s")?,

            // yt-dlp
            ytdlp_path: env_or("YTDLP_PATH", "yt-dlp").into(),
            ytdlp_cookies: std::env::var("YTDLP_COOKIES")
                .ok()
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            extraction_socket_timeout: env_duration("EXTRACTION_SOCKET_TIMEOUT", "5s")?,
            extraction_timeout: env_duration("EXTRACTION_TIMEOUT", "60s")?,
            extraction_workers: env_or("EXTRACTION_WORKERS", "4")
                .parse()
                .context("EXTRACTION_WORKERS inválido")?,
            coalesce_extractions: env_or("COALESCE_EXTRACTIONS", "false")
                .parse()
                .context("COALESCE_EXTRACTIONS debe ser true o false")?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validates configuration values for correctness.
    ///
    /// # Validation Rules
    ///
    /// - Page sizes must be between 1 and 50 (YouTube API `maxResults` limit)
    /// - At least one extraction worker
    /// - Timeouts must be non-zero
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("SEARCH_MAX_RESULTS", self.search_max_results),
            ("RECOMMENDATION_PAGE_SIZE", self.recommendation_page_size),
        ] {
            if !(1..=50).contains(&value) {
                anyhow::bail!("{} must be between 1 and 50, got: {}", name, value);
            }
        }

        if self.extraction_workers == 0 {
            anyhow::bail!("EXTRACTION_WORKERS must be greater than 0");
        }

        if self.http_timeout.is_zero()
            || self.extraction_socket_timeout.is_zero()
            || self.extraction_timeout.is_zero()
        {
            anyhow::bail!("Timeouts must be greater than 0");
        }

        if self.region_code.len() != 2 {
            anyhow::bail!("REGION_CODE must be an ISO 3166-1 alpha-2 code, got: {}", self.region_code);
        }

        Ok(())
    }

    /// Returns a summary of the current configuration for logging, without
    /// the API key.
    pub fn summary(&self) -> String {
        format!(
            "Config Summary:\n  \
            YouTube API: key={}, region {}, search {} / recommendations {} results, timeout {}\n  \
            yt-dlp: {} ({} workers, socket timeout {}, timeout {}, cookies={}, coalesce={})",
            if self.youtube_api_key.is_some() { "set" } else { "missing" },
            self.region_code,
            self.search_max_results,
            self.recommendation_page_size,
            humantime::format_duration(self.http_timeout),
            self.ytdlp_path.display(),
            self.extraction_workers,
            humantime::format_duration(self.extraction_socket_timeout),
            humantime::format_duration(self.extraction_timeout),
            self.ytdlp_cookies.is_some(),
            self.coalesce_extractions,
        )
    }
}

/// Default configuration values.
///
/// Used as fallbacks when environment variables are not provided.
impl Default for Config {
    fn default() -> Self {
        Self {
            youtube_api_key: None,
            region_code: "US".to_string(),
            search_max_results: 25,
            recommendation_page_size: 20,
            http_timeout: Duration::from_secs(30),

            ytdlp_path: "yt-dlp".into(),
            ytdlp_cookies: None,
            extraction_socket_timeout: Duration::from_secs(5),
            extraction_timeout: Duration::from_secs(60),
            extraction_workers: 4,
            coalesce_extractions: false,
        }
    }
}
