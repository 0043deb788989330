//! # SabBeats
//!
//! Núcleo del backend de música: resuelve videos de YouTube a streams de
//! audio (yt-dlp, caché de 6 horas) y agrega búsquedas de YouTube Data API v3
//! en listados y recomendaciones.

pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod services;
pub mod sources;

pub use config::Config;
pub use error::{ExtractionError, MalformedDurationError, ResolveError, UpstreamQueryError};
pub use models::{AudioDescriptor, SearchResultSummary};
pub use services::MusicService;
