//! Source plugin interface.
//!
//! [`SourcePlugin`] is the surface the wrapper drives. Optional CLAP
//! extensions are separate capability traits reached through explicit
//! getters, so a plugin without a state or GUI extension simply returns
//! `None` there.

use crate::metadata::{AudioPortInfo, ParamInfo, PluginDescriptor};
use crate::Result;
use std::sync::Arc;

/// Audio for one processing block. Channel slices are `frames` long.
pub struct AudioBlock<'a, 'b> {
    pub inputs: &'a [&'b [f32]],
    pub outputs: &'a mut [&'b mut [f32]],
    pub frames: u32,
}

/// Parameter change queued for delivery to the plugin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamChange {
    pub id: u32,
    /// Plain (not normalized) value
    pub value: f64,
}

pub trait SourcePlugin: Send {
    fn descriptor(&self) -> &PluginDescriptor;

    fn activate(&mut self, sample_rate: f64, max_frames: u32) -> Result<()>;

    fn deactivate(&mut self);

    fn is_active(&self) -> bool;

    /// Process one block, delivering `changes` before the audio.
    ///
    /// Returns `false` when the plugin reported a processing error.
    fn process(&mut self, block: AudioBlock<'_, '_>, changes: &[ParamChange]) -> bool;

    /// Deliver parameter changes outside of processing.
    fn flush_params(&mut self, changes: &[ParamChange]);

    /// Main-thread callback requested through the host.
    fn on_main_thread(&mut self) {}

    fn latency(&self) -> u32 {
        0
    }

    fn audio_ports(&self, _is_input: bool) -> Vec<AudioPortInfo> {
        Vec::new()
    }

    /// MIDI channels on the given note port, 1..=16.
    fn midi_channel_count(&self, _note_port: u32) -> u32 {
        1
    }

    /// Shared handle to the parameter extension.
    ///
    /// The handle is usable while the instance processes on another thread.
    fn params(&self) -> Option<Arc<dyn PluginParams>>;

    fn state(&mut self) -> Option<&mut dyn PluginState>;

    fn gui(&mut self) -> Option<&mut dyn PluginGui>;
}

/// `clap.params`
///
/// All calls are main-thread calls that CLAP requires to be safe against a
/// concurrent `process`.
pub trait PluginParams: Send + Sync {
    fn count(&self) -> u32;

    fn info(&self, index: u32) -> Option<ParamInfo>;

    fn value(&self, id: u32) -> Option<f64>;

    fn value_to_text(&self, id: u32, value: f64) -> Option<String>;

    fn text_to_value(&self, id: u32, text: &str) -> Option<f64>;

    fn infos(&self) -> Vec<ParamInfo> {
        (0..self.count()).filter_map(|index| self.info(index)).collect()
    }
}

/// `clap.state`
pub trait PluginState {
    /// Append the plugin's state to `sink`.
    fn save(&mut self, sink: &mut Vec<u8>) -> Result<()>;

    fn load(&mut self, data: &[u8]) -> Result<()>;
}

/// Windowing API for embedded editors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowApi {
    Win32,
    Cocoa,
    X11,
}

impl WindowApi {
    pub fn native() -> Self {
        if cfg!(target_os = "windows") {
            WindowApi::Win32
        } else if cfg!(target_os = "macos") {
            WindowApi::Cocoa
        } else {
            WindowApi::X11
        }
    }
}

/// `clap.gui`
pub trait PluginGui {
    fn is_api_supported(&self, api: WindowApi) -> bool;

    fn create(&mut self, api: WindowApi) -> Result<()>;

    fn destroy(&mut self);

    /// # Safety
    /// `parent` must be a live native view of the kind `api` names.
    unsafe fn set_parent(&mut self, api: WindowApi, parent: *mut std::ffi::c_void) -> Result<()>;

    fn set_scale(&mut self, scale: f64) -> bool;

    fn size(&self) -> Option<(u32, u32)>;

    fn can_resize(&self) -> bool;

    fn set_size(&mut self, width: u32, height: u32) -> bool;

    fn show(&mut self) -> bool;

    fn hide(&mut self) -> bool;
}

/// Host services the plugin calls back into.
///
/// Every method has a no-op default. Callbacks may arrive on any thread,
/// including the audio thread during processing.
pub trait HostCallbacks: Send + Sync {
    /// Name reported to the plugin as `clap_host.name`.
    fn host_name(&self) -> String {
        "CLAP host".to_string()
    }

    fn request_restart(&self) {}

    fn request_process(&self) {}

    fn request_callback(&self) {}

    fn mark_dirty(&self) {}

    fn latency_changed(&self) {}

    fn params_rescan(&self, _flags: u32) {}

    fn params_clear(&self, _id: u32, _flags: u32) {}

    fn params_request_flush(&self) {}

    fn begin_edit(&self, _id: u32) {}

    fn perform_edit(&self, _id: u32, _value: f64) {}

    fn end_edit(&self, _id: u32) {}

    fn gui_request_resize(&self, _width: u32, _height: u32) -> bool {
        false
    }

    fn gui_request_show(&self) -> bool {
        false
    }

    fn gui_request_hide(&self) -> bool {
        false
    }

    fn gui_closed(&self, _was_destroyed: bool) {}

    fn gui_resize_hints_changed(&self) {}
}

/// Host that ignores every callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl HostCallbacks for NullHost {}
