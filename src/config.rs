//! Adapter configuration.

use crate::error::{AaxError, AaxResult};
use clap_aax_host::{clap_path_env, default_search_paths, ModuleLocation};
use std::path::PathBuf;

pub const DEFAULT_HOST_NAME: &str = "CLAP-as-AAX wrapper";

/// Configuration for discovery and instance setup.
#[derive(Debug, Clone)]
pub struct WrapperConfig {
    /// Roots searched for `<binary name>.clap`, after `CLAP_PATH`
    pub search_paths: Vec<PathBuf>,
    pub use_clap_path: bool,
    /// Overrides the adapter binary name used to pick the `.clap` file
    pub binary_name: Option<String>,
    pub parent_folder: Option<String>,
    /// Appended to the AAX host name reported to the plugin
    pub host_name_suffix: String,
    /// Editor size reported when the plugin cannot tell
    pub default_view_size: (u32, u32),
    pub max_block_size: u32,
    /// Used when the host does not report a sample rate
    pub fallback_sample_rate: f64,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            use_clap_path: false,
            binary_name: None,
            parent_folder: None,
            host_name_suffix: " (CLAP-as-AAX)".to_string(),
            default_view_size: (400, 300),
            max_block_size: 4096,
            fallback_sample_rate: 48000.0,
        }
    }
}

impl WrapperConfig {
    /// `CLAP_PATH` followed by the platform CLAP folders.
    pub fn from_env() -> Self {
        Self {
            search_paths: default_search_paths(),
            use_clap_path: true,
            ..Self::default()
        }
    }

    pub fn search_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.search_paths = paths.into_iter().collect();
        self
    }

    pub fn binary_name(mut self, name: impl Into<String>) -> Self {
        self.binary_name = Some(name.into());
        self
    }

    pub fn parent_folder(mut self, folder: impl Into<String>) -> Self {
        self.parent_folder = Some(folder.into());
        self
    }

    pub fn max_block_size(mut self, frames: u32) -> Self {
        self.max_block_size = frames;
        self
    }

    pub fn fallback_sample_rate(mut self, sample_rate: f64) -> Self {
        self.fallback_sample_rate = sample_rate;
        self
    }

    pub fn validate(&self) -> AaxResult<()> {
        if self.max_block_size == 0 || self.max_block_size > 65536 {
            return Err(AaxError::InvalidConfig(format!(
                "max_block_size {} out of range (1-65536)",
                self.max_block_size
            )));
        }
        if self.fallback_sample_rate < 8000.0 || self.fallback_sample_rate > 384000.0 {
            return Err(AaxError::InvalidConfig(format!(
                "fallback_sample_rate {} out of range (8000-384000 Hz)",
                self.fallback_sample_rate
            )));
        }
        if self.default_view_size.0 == 0 || self.default_view_size.1 == 0 {
            return Err(AaxError::InvalidConfig("default_view_size must not be empty".into()));
        }
        if matches!(&self.binary_name, Some(name) if name.is_empty()) {
            return Err(AaxError::InvalidConfig("binary_name must not be empty".into()));
        }
        Ok(())
    }

    /// Search roots in order, without duplicates.
    pub fn search_roots(&self) -> Vec<PathBuf> {
        let mut roots = if self.use_clap_path {
            clap_path_env()
        } else {
            Vec::new()
        };
        for path in &self.search_paths {
            if !roots.contains(path) {
                roots.push(path.clone());
            }
        }
        roots
    }

    /// Binary name and parent folder used for discovery, overrides first.
    pub fn module_location(&self) -> Option<ModuleLocation> {
        let current = ModuleLocation::current();
        let binary_name = self
            .binary_name
            .clone()
            .or_else(|| current.as_ref().map(|l| l.binary_name.clone()))?;
        let parent_folder = self
            .parent_folder
            .clone()
            .or_else(|| current.and_then(|l| l.parent_folder));
        Some(ModuleLocation {
            binary_name,
            parent_folder,
        })
    }

    /// Name reported to the plugin as its host.
    pub fn host_name(&self, aax_host: Option<&str>) -> String {
        match aax_host {
            Some(name) if !name.is_empty() => format!("{}{}", name, self.host_name_suffix),
            _ => DEFAULT_HOST_NAME.to_string(),
        }
    }
}
