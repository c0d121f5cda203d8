//! Persisted plug-in chunk

use serde::{Deserialize, Serialize};

/// Four-byte AAX type identifier.
pub type TypeId = u32;

pub const CHUNK_NAME_MAX_BYTES: usize = 31;

/// Unit of plug-in state the host stores in sessions and presets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlugInChunk {
    pub id: TypeId,
    pub version: i32,
    pub manufacturer_id: TypeId,
    pub product_id: TypeId,
    pub plugin_id: TypeId,
    pub name: String,
    pub data: Vec<u8>,
}

impl PlugInChunk {
    pub fn new(id: TypeId, version: i32) -> Self {
        Self {
            id,
            version,
            ..Default::default()
        }
    }

    pub fn ids(mut self, manufacturer: TypeId, product: TypeId, plugin: TypeId) -> Self {
        self.manufacturer_id = manufacturer;
        self.product_id = product;
        self.plugin_id = plugin;
        self
    }

    /// Cut to at most 31 bytes on a character boundary.
    pub fn name(mut self, name: &str) -> Self {
        let mut end = name.len().min(CHUNK_NAME_MAX_BYTES);
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        self.name = name[..end].to_string();
        self
    }

    pub fn data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}
