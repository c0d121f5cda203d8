//! Chunk persistence for the plugin's CLAP state
//!
//! AAX asks for state as numbered, tagged chunks. A CLAP plugin has one
//! opaque blob, so the adapter exposes exactly one chunk: index 0, tag
//! `'clap'`.

use crate::aax::{PlugInChunk, TypeId};
use crate::error::{AaxError, AaxResult};
use clap_aax_host::PluginState;
use parking_lot::Mutex;

pub const CHUNK_ID: TypeId = u32::from_be_bytes(*b"clap");
pub const CHUNK_VERSION: i32 = 1;
pub const CHUNK_NAME: &str = "CLAP state";

/// Identity written into every chunk header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkIds {
    pub manufacturer: TypeId,
    pub product: TypeId,
    pub plugin: TypeId,
}

/// Holds the last captured or restored state blob.
#[derive(Debug, Default)]
pub struct StateBridge {
    blob: Mutex<Vec<u8>>,
}

impl StateBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn chunk_count() -> i32 {
        1
    }

    pub fn chunk_id_from_index(index: i32) -> AaxResult<TypeId> {
        if index == 0 {
            Ok(CHUNK_ID)
        } else {
            Err(AaxError::InvalidChunkIndex(index))
        }
    }

    pub fn check_id(chunk_id: TypeId) -> AaxResult<()> {
        if chunk_id == CHUNK_ID {
            Ok(())
        } else {
            Err(AaxError::InvalidChunkId(chunk_id))
        }
    }

    /// Replace the held blob with a fresh save of the plugin state.
    ///
    /// On failure the held blob is left empty.
    pub fn capture(&self, state: Option<&mut dyn PluginState>) -> AaxResult<usize> {
        let mut blob = self.blob.lock();
        blob.clear();

        let state = state.ok_or(AaxError::IncorrectChunkSize)?;
        if let Err(e) = state.save(&mut blob) {
            tracing::warn!("state capture failed: {}", e);
            blob.clear();
            return Err(AaxError::IncorrectChunkSize);
        }

        tracing::debug!(bytes = blob.len(), "captured plugin state");
        Ok(blob.len())
    }

    /// Hand `data` to the plugin and keep it as the held blob.
    ///
    /// A rejected blob is not kept; the held blob is left empty.
    pub fn restore(&self, state: Option<&mut dyn PluginState>, data: &[u8]) -> AaxResult<()> {
        let mut blob = self.blob.lock();
        blob.clear();

        let state = state.ok_or_else(|| AaxError::MalformedChunk("plugin has no state".into()))?;
        if let Err(e) = state.load(data) {
            tracing::warn!("state restore failed: {}", e);
            return Err(AaxError::MalformedChunk(e.to_string()));
        }

        blob.extend_from_slice(data);
        tracing::debug!(bytes = blob.len(), "restored plugin state");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.blob.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blob.lock().is_empty()
    }

    /// Chunk carrying a copy of the held blob.
    pub fn chunk(&self, ids: ChunkIds) -> PlugInChunk {
        PlugInChunk::new(CHUNK_ID, CHUNK_VERSION)
            .ids(ids.manufacturer, ids.product, ids.plugin)
            .name(CHUNK_NAME)
            .data(self.blob.lock().clone())
    }
}
