//! CLAP plugin instance
//!
//! Wraps a `clap_plugin` created from a [`ClapLibrary`] factory and exposes it
//! through [`SourcePlugin`] and the capability traits.

use crate::error::{HostError, LoadStage, Result};
use crate::events::{InputEventList, OutputEventList};
use crate::ext::{clap_plugin_as_aax, CLAP_PLUGIN_AS_AAX};
use crate::host::HostShim;
use crate::instance::{
    AudioBlock, HostCallbacks, ParamChange, PluginGui, PluginParams, PluginState, SourcePlugin,
    WindowApi,
};
use crate::library::{c_string, ClapLibrary};
use crate::metadata::{AudioPortInfo, ParamFlags, ParamInfo, PluginDescriptor};
use crate::stream::{InputStream, OutputStream};
use clap_sys::audio_buffer::clap_audio_buffer;
use clap_sys::ext::audio_ports::{
    clap_audio_port_info, clap_plugin_audio_ports, CLAP_AUDIO_PORT_IS_MAIN, CLAP_EXT_AUDIO_PORTS,
};
use clap_sys::ext::gui::{
    clap_plugin_gui, clap_window, clap_window_handle, CLAP_EXT_GUI, CLAP_WINDOW_API_COCOA,
    CLAP_WINDOW_API_WIN32, CLAP_WINDOW_API_X11,
};
use clap_sys::ext::latency::{clap_plugin_latency, CLAP_EXT_LATENCY};
use clap_sys::ext::params::{clap_param_info, clap_plugin_params, CLAP_EXT_PARAMS};
use clap_sys::ext::state::{clap_plugin_state, CLAP_EXT_STATE};
use clap_sys::plugin::clap_plugin;
use clap_sys::process::{clap_process, CLAP_PROCESS_ERROR};
use parking_lot::RwLock;
use std::ffi::{c_char, c_void, CStr, CString};
use std::path::PathBuf;
use std::ptr;
use std::sync::Arc;

const TEXT_BUFFER_SIZE: usize = 256;

/// Extension tables queried once after `init`.
struct Extensions {
    params: *const clap_plugin_params,
    state: *const clap_plugin_state,
    gui: *const clap_plugin_gui,
    latency: *const clap_plugin_latency,
    audio_ports: *const clap_plugin_audio_ports,
    as_aax: *const clap_plugin_as_aax,
}

impl Extensions {
    const fn empty() -> Self {
        Self {
            params: ptr::null(),
            state: ptr::null(),
            gui: ptr::null(),
            latency: ptr::null(),
            audio_ports: ptr::null(),
            as_aax: ptr::null(),
        }
    }
}

/// `clap.params` of one instance, callable without the instance itself.
pub struct ClapParams {
    plugin: *const clap_plugin,
    ext: *const clap_plugin_params,
    /// False once the instance is destroyed
    live: RwLock<bool>,
}

// Safety: CLAP makes the params main-thread calls safe against `process`, and
// `live` keeps them from racing `destroy`.
unsafe impl Send for ClapParams {}
unsafe impl Sync for ClapParams {}

impl ClapParams {
    fn with_ext<T>(&self, f: impl FnOnce(&clap_plugin_params) -> Option<T>) -> Option<T> {
        let live = self.live.read();
        if !*live {
            return None;
        }
        unsafe { self.ext.as_ref() }.and_then(f)
    }

    fn retire(&self) {
        *self.live.write() = false;
    }
}

impl PluginParams for ClapParams {
    fn count(&self) -> u32 {
        self.with_ext(|p| p.count.map(|count| unsafe { count(self.plugin) }))
            .unwrap_or(0)
    }

    fn info(&self, index: u32) -> Option<ParamInfo> {
        self.with_ext(|p| {
            let get_info = p.get_info?;
            let mut info: clap_param_info = unsafe { std::mem::zeroed() };
            if !unsafe { get_info(self.plugin, index, &mut info) } {
                return None;
            }
            Some(ParamInfo {
                id: info.id,
                name: c_array_to_string(&info.name),
                module: c_array_to_string(&info.module),
                min_value: info.min_value,
                max_value: info.max_value,
                default_value: info.default_value,
                flags: ParamFlags::from_clap(info.flags),
            })
        })
    }

    fn value(&self, id: u32) -> Option<f64> {
        self.with_ext(|p| {
            let get_value = p.get_value?;
            let mut value = 0.0;
            unsafe { get_value(self.plugin, id, &mut value) }.then_some(value)
        })
    }

    fn value_to_text(&self, id: u32, value: f64) -> Option<String> {
        self.with_ext(|p| {
            let to_text = p.value_to_text?;
            let mut buffer: [c_char; TEXT_BUFFER_SIZE] = [0; TEXT_BUFFER_SIZE];
            if !unsafe {
                to_text(self.plugin, id, value, buffer.as_mut_ptr(), TEXT_BUFFER_SIZE as u32)
            } {
                return None;
            }
            Some(c_array_to_string(&buffer))
        })
    }

    fn text_to_value(&self, id: u32, text: &str) -> Option<f64> {
        let text_c = CString::new(text).ok()?;
        self.with_ext(|p| {
            let to_value = p.text_to_value?;
            let mut value = 0.0;
            unsafe { to_value(self.plugin, id, text_c.as_ptr(), &mut value) }.then_some(value)
        })
    }
}

/// CLAP plugin instance wrapper
pub struct ClapPlugin {
    plugin: *const clap_plugin,
    descriptor: PluginDescriptor,
    ext: Extensions,
    params: Option<Arc<ClapParams>>,
    host: Box<HostShim>,
    output_events: OutputEventList,
    steady_time: i64,
    is_active: bool,
    is_processing: bool,
    gui_created: bool,
    // Dropped last so the library outlives the instance.
    library: Arc<ClapLibrary>,
}

// Safety: CLAP instances may be moved between threads; the wrapper serializes
// access through `&mut self` and a mutex on the owning side.
unsafe impl Send for ClapPlugin {}

impl ClapPlugin {
    pub(crate) fn create(
        library: Arc<ClapLibrary>,
        id: &str,
        callbacks: Arc<dyn HostCallbacks>,
    ) -> Result<Self> {
        let descriptor = library
            .plugin(id)
            .cloned()
            .ok_or_else(|| HostError::UnknownPlugin(id.to_string()))?;
        let path = library.path().to_path_buf();

        let factory_ptr = library.factory();
        let factory = unsafe { &*factory_ptr };
        let create_fn = factory.create_plugin.ok_or_else(|| {
            HostError::load(&path, LoadStage::Instantiation, "No create_plugin function")
        })?;
        let id_c = CString::new(id).map_err(|e| {
            HostError::load(
                &path,
                LoadStage::Instantiation,
                format!("Invalid plugin ID (contains null byte): {}", e),
            )
        })?;

        let host = HostShim::new(callbacks);
        let plugin = unsafe { create_fn(factory_ptr, host.as_ptr(), id_c.as_ptr()) };
        if plugin.is_null() {
            return Err(HostError::load(
                &path,
                LoadStage::Instantiation,
                "Failed to create plugin instance",
            ));
        }

        // From here on Drop calls destroy.
        let mut instance = Self {
            plugin,
            descriptor,
            ext: Extensions::empty(),
            params: None,
            host,
            output_events: OutputEventList::with_capacity(64),
            steady_time: 0,
            is_active: false,
            is_processing: false,
            gui_created: false,
            library,
        };

        let init_fn = instance
            .plugin_ref()
            .init
            .ok_or_else(|| HostError::load(&path, LoadStage::Initialization, "No plugin init function"))?;
        if !unsafe { init_fn(plugin) } {
            return Err(HostError::load(&path, LoadStage::Initialization, "Plugin init failed"));
        }

        instance.ext = Extensions {
            params: instance.extension(CLAP_EXT_PARAMS),
            state: instance.extension(CLAP_EXT_STATE),
            gui: instance.extension(CLAP_EXT_GUI),
            latency: instance.extension(CLAP_EXT_LATENCY),
            audio_ports: instance.extension(CLAP_EXT_AUDIO_PORTS),
            as_aax: instance.extension(CLAP_PLUGIN_AS_AAX),
        };
        if !instance.ext.params.is_null() {
            instance.params = Some(Arc::new(ClapParams {
                plugin,
                ext: instance.ext.params,
                live: RwLock::new(true),
            }));
        }

        tracing::debug!(plugin = %instance.descriptor.id, "created CLAP instance");
        Ok(instance)
    }

    fn plugin_ref(&self) -> &clap_plugin {
        unsafe { &*self.plugin }
    }

    fn extension<T>(&self, id: &CStr) -> *const T {
        match self.plugin_ref().get_extension {
            Some(get_ext) => unsafe { get_ext(self.plugin, id.as_ptr()) as *const T },
            None => ptr::null(),
        }
    }

    fn params_ext(&self) -> Option<&clap_plugin_params> {
        unsafe { self.ext.params.as_ref() }
    }

    fn state_ext(&self) -> Option<&clap_plugin_state> {
        unsafe { self.ext.state.as_ref() }
    }

    fn gui_ext(&self) -> Option<&clap_plugin_gui> {
        unsafe { self.ext.gui.as_ref() }
    }

    pub fn library(&self) -> &Arc<ClapLibrary> {
        &self.library
    }

    fn load_error(&self, stage: LoadStage, reason: &str) -> HostError {
        HostError::load(PathBuf::from(self.library.path()), stage, reason)
    }

    fn stop_processing(&mut self) {
        if self.is_processing {
            if let Some(stop_fn) = self.plugin_ref().stop_processing {
                unsafe { stop_fn(self.plugin) };
            }
            self.is_processing = false;
        }
    }

    fn dispatch_output_events(&self) {
        self.output_events.dispatch(self.host.callbacks());
    }
}

impl SourcePlugin for ClapPlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn activate(&mut self, sample_rate: f64, max_frames: u32) -> Result<()> {
        if self.is_active {
            self.deactivate();
        }

        let activate_fn = self
            .plugin_ref()
            .activate
            .ok_or_else(|| self.load_error(LoadStage::Activation, "No activate function"))?;
        if !unsafe { activate_fn(self.plugin, sample_rate, 1, max_frames) } {
            return Err(self.load_error(LoadStage::Activation, "Activate failed"));
        }

        self.is_active = true;
        tracing::debug!(sample_rate, max_frames, "activated CLAP instance");
        Ok(())
    }

    fn deactivate(&mut self) {
        self.stop_processing();
        if self.is_active {
            if let Some(deactivate_fn) = self.plugin_ref().deactivate {
                unsafe { deactivate_fn(self.plugin) };
            }
            self.is_active = false;
        }
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn process(&mut self, block: AudioBlock<'_, '_>, changes: &[ParamChange]) -> bool {
        if !self.is_active {
            return false;
        }
        let Some(process_fn) = self.plugin_ref().process else {
            return false;
        };

        if !self.is_processing {
            if let Some(start_fn) = self.plugin_ref().start_processing {
                if !unsafe { start_fn(self.plugin) } {
                    return false;
                }
            }
            self.is_processing = true;
        }

        let mut input_ptrs: Vec<*mut f32> = block
            .inputs
            .iter()
            .map(|channel| channel.as_ptr() as *mut f32)
            .collect();
        let mut output_ptrs: Vec<*mut f32> = block
            .outputs
            .iter_mut()
            .map(|channel| channel.as_mut_ptr())
            .collect();

        let audio_inputs = clap_audio_buffer {
            data32: input_ptrs.as_mut_ptr(),
            data64: ptr::null_mut(),
            channel_count: input_ptrs.len() as u32,
            latency: 0,
            constant_mask: 0,
        };
        let mut audio_outputs = clap_audio_buffer {
            data32: output_ptrs.as_mut_ptr(),
            data64: ptr::null_mut(),
            channel_count: output_ptrs.len() as u32,
            latency: 0,
            constant_mask: 0,
        };

        let in_events = InputEventList::new(changes);
        let in_list = in_events.as_clap();
        self.output_events.clear();
        let out_list = self.output_events.as_clap();

        let process = clap_process {
            steady_time: self.steady_time,
            frames_count: block.frames,
            transport: ptr::null(),
            audio_inputs: &audio_inputs,
            audio_outputs: &mut audio_outputs,
            audio_inputs_count: u32::from(!input_ptrs.is_empty()),
            audio_outputs_count: u32::from(!output_ptrs.is_empty()),
            in_events: &in_list,
            out_events: &out_list,
        };

        let status = unsafe { process_fn(self.plugin, &process) };
        self.steady_time += i64::from(block.frames);
        self.dispatch_output_events();
        status != CLAP_PROCESS_ERROR
    }

    fn flush_params(&mut self, changes: &[ParamChange]) {
        let Some(flush_fn) = self.params_ext().and_then(|p| p.flush) else {
            return;
        };
        let in_events = InputEventList::new(changes);
        let in_list = in_events.as_clap();
        self.output_events.clear();
        let out_list = self.output_events.as_clap();
        unsafe { flush_fn(self.plugin, &in_list, &out_list) };
        self.dispatch_output_events();
    }

    fn on_main_thread(&mut self) {
        if let Some(callback) = self.plugin_ref().on_main_thread {
            unsafe { callback(self.plugin) };
        }
    }

    fn latency(&self) -> u32 {
        unsafe { self.ext.latency.as_ref() }
            .and_then(|latency| latency.get)
            .map_or(0, |get| unsafe { get(self.plugin) })
    }

    fn audio_ports(&self, is_input: bool) -> Vec<AudioPortInfo> {
        let Some(ports) = (unsafe { self.ext.audio_ports.as_ref() }) else {
            return Vec::new();
        };
        let (Some(count_fn), Some(get_fn)) = (ports.count, ports.get) else {
            return Vec::new();
        };

        let count = unsafe { count_fn(self.plugin, is_input) };
        (0..count)
            .filter_map(|index| {
                let mut info: clap_audio_port_info = unsafe { std::mem::zeroed() };
                if !unsafe { get_fn(self.plugin, index, is_input, &mut info) } {
                    return None;
                }
                Some(AudioPortInfo {
                    id: info.id,
                    name: c_array_to_string(&info.name),
                    channel_count: info.channel_count,
                    is_main: info.flags & CLAP_AUDIO_PORT_IS_MAIN != 0,
                    port_type: unsafe { c_string(info.port_type) },
                })
            })
            .collect()
    }

    fn midi_channel_count(&self, note_port: u32) -> u32 {
        unsafe { self.ext.as_aax.as_ref() }
            .and_then(|ext| ext.get_num_midi_channels)
            .map_or(1, |get| unsafe { get(self.plugin, note_port) }.clamp(1, 16))
    }

    fn params(&self) -> Option<Arc<dyn PluginParams>> {
        self.params
            .as_ref()
            .map(|params| Arc::clone(params) as Arc<dyn PluginParams>)
    }

    fn state(&mut self) -> Option<&mut dyn PluginState> {
        if self.state_ext().is_some() {
            Some(self)
        } else {
            None
        }
    }

    fn gui(&mut self) -> Option<&mut dyn PluginGui> {
        if self.gui_ext().is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl PluginState for ClapPlugin {
    fn save(&mut self, sink: &mut Vec<u8>) -> Result<()> {
        let save_fn = self
            .state_ext()
            .and_then(|s| s.save)
            .ok_or(HostError::MissingExtension("clap.state"))?;
        let stream = OutputStream::new(sink);
        if unsafe { save_fn(self.plugin, stream.as_raw()) } {
            Ok(())
        } else {
            Err(HostError::StateSave("plugin rejected save".to_string()))
        }
    }

    fn load(&mut self, data: &[u8]) -> Result<()> {
        let load_fn = self
            .state_ext()
            .and_then(|s| s.load)
            .ok_or(HostError::MissingExtension("clap.state"))?;
        let stream = InputStream::new(data);
        if unsafe { load_fn(self.plugin, stream.as_raw()) } {
            Ok(())
        } else {
            Err(HostError::StateRestore(format!(
                "plugin rejected {} byte state",
                data.len()
            )))
        }
    }
}

fn window_api_name(api: WindowApi) -> &'static CStr {
    match api {
        WindowApi::Win32 => CLAP_WINDOW_API_WIN32,
        WindowApi::Cocoa => CLAP_WINDOW_API_COCOA,
        WindowApi::X11 => CLAP_WINDOW_API_X11,
    }
}

impl PluginGui for ClapPlugin {
    fn is_api_supported(&self, api: WindowApi) -> bool {
        self.gui_ext()
            .and_then(|gui| gui.is_api_supported)
            .is_some_and(|supported| unsafe {
                supported(self.plugin, window_api_name(api).as_ptr(), false)
            })
    }

    fn create(&mut self, api: WindowApi) -> Result<()> {
        if self.gui_created {
            return Ok(());
        }
        let create_fn = self
            .gui_ext()
            .and_then(|gui| gui.create)
            .ok_or(HostError::MissingExtension("clap.gui"))?;
        if !unsafe { create_fn(self.plugin, window_api_name(api).as_ptr(), false) } {
            return Err(HostError::Editor("GUI create failed".to_string()));
        }
        self.gui_created = true;
        Ok(())
    }

    fn destroy(&mut self) {
        if !self.gui_created {
            return;
        }
        if let Some(destroy_fn) = self.gui_ext().and_then(|gui| gui.destroy) {
            unsafe { destroy_fn(self.plugin) };
        }
        self.gui_created = false;
    }

    unsafe fn set_parent(&mut self, api: WindowApi, parent: *mut c_void) -> Result<()> {
        let set_parent_fn = self
            .gui_ext()
            .and_then(|gui| gui.set_parent)
            .ok_or(HostError::MissingExtension("clap.gui"))?;

        let specific = match api {
            WindowApi::X11 => clap_window_handle {
                x11: parent as usize as std::ffi::c_ulong,
            },
            WindowApi::Cocoa => clap_window_handle { cocoa: parent },
            WindowApi::Win32 => clap_window_handle { win32: parent },
        };
        let window = clap_window {
            api: window_api_name(api).as_ptr(),
            specific,
        };

        if set_parent_fn(self.plugin, &window) {
            Ok(())
        } else {
            Err(HostError::Editor("GUI set_parent failed".to_string()))
        }
    }

    fn set_scale(&mut self, scale: f64) -> bool {
        self.gui_ext()
            .and_then(|gui| gui.set_scale)
            .is_some_and(|set_scale| unsafe { set_scale(self.plugin, scale) })
    }

    fn size(&self) -> Option<(u32, u32)> {
        let get_size = self.gui_ext()?.get_size?;
        let mut width = 0;
        let mut height = 0;
        unsafe { get_size(self.plugin, &mut width, &mut height) }.then_some((width, height))
    }

    fn can_resize(&self) -> bool {
        self.gui_ext()
            .and_then(|gui| gui.can_resize)
            .is_some_and(|can_resize| unsafe { can_resize(self.plugin) })
    }

    fn set_size(&mut self, width: u32, height: u32) -> bool {
        self.gui_ext()
            .and_then(|gui| gui.set_size)
            .is_some_and(|set_size| unsafe { set_size(self.plugin, width, height) })
    }

    fn show(&mut self) -> bool {
        self.gui_ext()
            .and_then(|gui| gui.show)
            .is_some_and(|show| unsafe { show(self.plugin) })
    }

    fn hide(&mut self) -> bool {
        self.gui_ext()
            .and_then(|gui| gui.hide)
            .is_some_and(|hide| unsafe { hide(self.plugin) })
    }
}

impl Drop for ClapPlugin {
    fn drop(&mut self) {
        PluginGui::destroy(self);
        SourcePlugin::deactivate(self);
        if let Some(params) = &self.params {
            params.retire();
        }
        if let Some(destroy_fn) = self.plugin_ref().destroy {
            unsafe { destroy_fn(self.plugin) };
        }
        tracing::debug!(plugin = %self.descriptor.id, "destroyed CLAP instance");
    }
}

/// Copy a fixed-size, NUL-padded C char array.
fn c_array_to_string(chars: &[c_char]) -> String {
    let bytes: Vec<u8> = chars
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}
