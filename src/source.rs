//! Where plugin instances come from

use clap_aax_host::{
    AaxPluginInfo, ClapLibrary, HostCallbacks, NullHost, PackageInfo, PluginDescriptor,
    Result as HostResult, SourcePlugin,
};
use std::sync::Arc;

/// What a scan learns from a live instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanInfo {
    /// MIDI channels on the main note port, 1..=16
    pub midi_channels: u32,
    /// Channel count of the main output port
    pub main_channels: Option<u32>,
}

impl Default for ScanInfo {
    fn default() -> Self {
        Self {
            midi_channels: 1,
            main_channels: None,
        }
    }
}

impl ScanInfo {
    pub fn of(plugin: &dyn SourcePlugin) -> Self {
        let outputs = plugin.audio_ports(false);
        let main_channels = outputs
            .iter()
            .find(|port| port.is_main)
            .or_else(|| outputs.first())
            .map(|port| port.channel_count);
        Self {
            midi_channels: plugin.midi_channel_count(0),
            main_channels,
        }
    }
}

/// A bound set of CLAP plugins that can be described and instantiated.
///
/// [`ClapLibrary`] is the real implementation; tests substitute their own.
pub trait PluginSource: Send + Sync {
    fn plugins(&self) -> &[PluginDescriptor];

    fn package_info(&self) -> PackageInfo {
        PackageInfo::default()
    }

    fn aax_plugin_info(&self, _index: usize) -> AaxPluginInfo {
        AaxPluginInfo::default()
    }

    fn create(
        self: Arc<Self>,
        id: &str,
        host: Arc<dyn HostCallbacks>,
    ) -> HostResult<Box<dyn SourcePlugin>>;

    /// Inspect plugin `id` through a throwaway instance.
    fn inspect(self: Arc<Self>, id: &str) -> ScanInfo {
        match self.create(id, Arc::new(NullHost)) {
            Ok(plugin) => ScanInfo::of(plugin.as_ref()),
            Err(e) => {
                tracing::debug!("cannot inspect {}: {}", id, e);
                ScanInfo::default()
            }
        }
    }

    fn find(&self, id: &str) -> Option<(usize, &PluginDescriptor)> {
        self.plugins().iter().enumerate().find(|(_, p)| p.id == id)
    }
}

impl PluginSource for ClapLibrary {
    fn plugins(&self) -> &[PluginDescriptor] {
        ClapLibrary::plugins(self)
    }

    fn package_info(&self) -> PackageInfo {
        ClapLibrary::package_info(self)
    }

    fn aax_plugin_info(&self, index: usize) -> AaxPluginInfo {
        ClapLibrary::aax_plugin_info(self, index)
    }

    fn create(
        self: Arc<Self>,
        id: &str,
        host: Arc<dyn HostCallbacks>,
    ) -> HostResult<Box<dyn SourcePlugin>> {
        let plugin = self.create_plugin(id, host)?;
        Ok(Box::new(plugin))
    }
}
