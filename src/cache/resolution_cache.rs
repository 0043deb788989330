use dashmap::DashMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tracing::debug;

use super::clock::Clock;
use crate::models::AudioDescriptor;

/// Caché en memoria `video_id -> AudioDescriptor`.
///
/// La expiración se evalúa al leer; las entradas vencidas se quedan en el
/// mapa hasta que una nueva resolución las sobrescribe.
pub struct ResolutionCache {
    data: DashMap<String, AudioDescriptor>,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResolutionCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            data: DashMap::new(),
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Devuelve el descriptor solo si todavía no expiró.
    pub fn get(&self, video_id: &str) -> Option<AudioDescriptor> {
        let now = self.clock.now();
        let fresh = self
            .data
            .get(video_id)
            .filter(|entry| entry.is_fresh_at(now))
            .map(|entry| entry.value().clone());

        match fresh {
            Some(descriptor) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("✅ Cache hit para {}", video_id);
                Some(descriptor)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("❌ Cache miss para {}", video_id);
                None
            }
        }
    }

    /// Sobrescribe sin condiciones la entrada de `video_id`.
    pub fn put(&self, video_id: impl Into<String>, descriptor: AudioDescriptor) {
        self.data.insert(video_id.into(), descriptor);
    }

    /// Entradas almacenadas, incluidas las vencidas.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.data.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for ResolutionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionCache")
            .field("entries", &self.data.len())
            .finish_non_exhaustive()
    }
}

/// Métricas básicas de la caché
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            self.hits as f64 / (self.hits + self.misses) as f64
        }
    }
}
