//! # Cache Module
//!
//! In-memory cache for resolved audio streams.
//!
//! yt-dlp extraction is the most expensive call in the system (several seconds
//! per video), and the stream URLs it returns are signed by the platform and
//! stop working after roughly six hours. The [`ResolutionCache`] stores each
//! resolved [`AudioDescriptor`](crate::models::AudioDescriptor) keyed by video
//! identifier together with its absolute expiry instant.
//!
//! ## Behaviour
//!
//! - **Lazy expiry**: staleness is checked on read; there is no background
//!   eviction task and stale entries are only replaced by the next successful
//!   resolution.
//! - **Last write wins**: one entry per identifier, `put` always overwrites.
//! - **Thread safety**: backed by [`dashmap::DashMap`], so concurrent access to
//!   different identifiers never contends on a global lock.
//! - **Injected clock**: time comes from a [`Clock`], which lets tests move
//!   time forward with [`ManualClock`].
//!
//! ## Example Usage
//!
//! ```rust
//! use sabbeats::cache::{ResolutionCache, SystemClock};
//! use std::sync::Arc;
//!
//! let cache = ResolutionCache::new(Arc::new(SystemClock));
//! assert!(cache.get("dQw4w9WgXcQ").is_none());
//! ```

pub mod clock;
pub mod resolution_cache;

use chrono::TimeDelta;

pub use clock::{Clock, ManualClock, SystemClock};
pub use resolution_cache::{CacheStats, ResolutionCache};

/// Validity window of a resolved stream URL (yt-dlp links expire after 6h).
pub const STREAM_URL_TTL: TimeDelta = TimeDelta::hours(6);
