//! Instance controller
//!
//! [`ClapAsAax`] is one AAX effect instance. It owns the CLAP plugin it
//! wraps, the parameter table built from it and the state blob, and answers
//! every per-instance call the host makes through [`EffectParameters`].
//!
//! Threading: the host calls everything except [`ClapAsAax::render`] from its
//! main thread. `render` only ever `try_lock`s the plugin and outputs silence
//! when the main thread holds it, so parameter queries go through a separate
//! `clap.params` handle and the timer only takes the plugin lock when the
//! plugin asked for something.

use crate::aax::result::{AAX_ERROR_NULL_OBJECT, AAX_SUCCESS};
use crate::aax::{
    AutomationDelegate, Controller, EffectParameters, FieldIndex, NativeResult, PlugInChunk,
    StemFormat, TypeId,
};
use crate::config::WrapperConfig;
use crate::describe::synthesized_ids;
use crate::error::{AaxError, AaxResult};
use crate::factory;
use crate::host::HostBridge;
use crate::parameter::ParameterTable;
use crate::process::{field, PrivateData, PRIVATE_DATA_TAG};
use crate::source::PluginSource;
use crate::state::{ChunkIds, StateBridge};
use clap_aax_host::{
    AudioBlock, HostCallbacks, ParamChange, PluginGui, PluginParams, SourcePlugin,
};
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::ffi::c_void;
use std::mem::size_of;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// One wrapped CLAP plugin instance.
pub struct ClapAsAax {
    config: WrapperConfig,
    source: Mutex<Option<Arc<dyn PluginSource>>>,
    plugin: Mutex<Option<Box<dyn SourcePlugin>>>,
    params: RwLock<Option<Arc<dyn PluginParams>>>,
    /// Mirrors `plugin.is_active()` for callers that must not lock the plugin
    active: AtomicBool,
    host: Arc<HostBridge>,
    controller: RwLock<Option<Arc<dyn Controller>>>,
    effect_id: RwLock<Option<String>>,
    ids: RwLock<ChunkIds>,
    input_channels: AtomicUsize,
    output_channels: AtomicUsize,
    state: StateBridge,
    pending: Mutex<Vec<ParamChange>>,
    /// Sample rate and block size of the last activation
    activation: Mutex<Option<(f64, u32)>>,
    posted_revision: AtomicU64,
}

impl ClapAsAax {
    /// Instance that binds the process-wide CLAP library on initialize.
    pub fn new(config: WrapperConfig) -> Self {
        Self {
            config,
            source: Mutex::new(None),
            plugin: Mutex::new(None),
            params: RwLock::new(None),
            active: AtomicBool::new(false),
            host: Arc::new(HostBridge::new()),
            controller: RwLock::new(None),
            effect_id: RwLock::new(None),
            ids: RwLock::new(ChunkIds::default()),
            input_channels: AtomicUsize::new(0),
            output_channels: AtomicUsize::new(0),
            state: StateBridge::new(),
            pending: Mutex::new(Vec::new()),
            activation: Mutex::new(None),
            posted_revision: AtomicU64::new(0),
        }
    }

    /// Instance bound to an explicit plugin source.
    pub fn with_source(config: WrapperConfig, source: Arc<dyn PluginSource>) -> Self {
        let wrapper = Self::new(config);
        *wrapper.source.lock() = Some(source);
        wrapper
    }

    pub fn config(&self) -> &WrapperConfig {
        &self.config
    }

    pub(crate) fn host(&self) -> &Arc<HostBridge> {
        &self.host
    }

    pub fn is_initialized(&self) -> bool {
        self.plugin.lock().is_some()
    }

    /// CLAP plugin id this instance was created for.
    pub fn effect_id(&self) -> Option<String> {
        self.effect_id.read().clone()
    }

    pub fn chunk_ids(&self) -> ChunkIds {
        *self.ids.read()
    }

    pub fn parameters(&self) -> Option<Arc<ParameterTable>> {
        self.host.parameters()
    }

    /// Number of times the plugin marked its state dirty.
    pub fn state_revision(&self) -> u64 {
        self.host.state_revision()
    }

    /// Main bus channel counts, input then output.
    pub fn channel_counts(&self) -> (usize, usize) {
        (
            self.input_channels.load(Ordering::Acquire),
            self.output_channels.load(Ordering::Acquire),
        )
    }

    fn source(&self) -> AaxResult<Arc<dyn PluginSource>> {
        let mut source = self.source.lock();
        if let Some(source) = source.as_ref() {
            return Ok(Arc::clone(source));
        }
        let bound = factory::guarantee_clap(&self.config)?;
        *source = Some(Arc::clone(&bound));
        Ok(bound)
    }

    fn setup(
        &self,
        controller: Arc<dyn Controller>,
        automation: Option<Arc<dyn AutomationDelegate>>,
    ) -> AaxResult<()> {
        self.config.validate()?;
        self.teardown();

        let effect_id = controller.effect_id().ok_or(AaxError::NotInitialized)?;
        let source = self.source()?;
        let (index, descriptor) = source
            .find(&effect_id)
            .map(|(index, descriptor)| (index, descriptor.clone()))
            .ok_or(AaxError::NoComponents)?;

        let input = controller.input_stem_format();
        let output = controller.output_stem_format();
        let vendor = source
            .aax_plugin_info(index)
            .vendor
            .unwrap_or_else(|| descriptor.vendor.clone());
        *self.ids.write() = synthesized_ids(&vendor, &descriptor.id, output);

        self.host
            .set_host_name(self.config.host_name(controller.host_name().as_deref()));
        let host: Arc<dyn HostCallbacks> = self.host.clone();
        let mut plugin = Arc::clone(&source).create(&effect_id, host)?;

        let params = plugin.params();
        let table = params
            .as_deref()
            .map(|params| ParameterTable::from_plugin(params))
            .unwrap_or_default();
        *self.params.write() = params;
        self.host.publish(table);
        if let Some(delegate) = automation {
            self.host.attach_automation(delegate);
        }

        let sample_rate = controller
            .sample_rate()
            .unwrap_or(self.config.fallback_sample_rate);
        plugin.activate(sample_rate, self.config.max_block_size)?;
        self.active.store(plugin.is_active(), Ordering::Release);
        *self.activation.lock() = Some((sample_rate, self.config.max_block_size));

        let latency = plugin.latency();
        let code = controller.set_signal_latency(latency);
        if code != AAX_SUCCESS {
            tracing::warn!(latency, code, "host refused signal latency");
        }

        self.store_channels(input, output);
        self.posted_revision
            .store(self.host.state_revision(), Ordering::Release);
        *self.controller.write() = Some(controller);
        *self.effect_id.write() = Some(effect_id.clone());
        *self.plugin.lock() = Some(plugin);

        tracing::info!(
            id = %effect_id,
            name = %descriptor.name,
            sample_rate,
            "initialized wrapped CLAP plugin"
        );
        Ok(())
    }

    fn store_channels(&self, input: StemFormat, output: StemFormat) {
        self.input_channels
            .store(input.channel_count(), Ordering::Release);
        self.output_channels
            .store(output.channel_count(), Ordering::Release);
    }

    fn teardown(&self) {
        self.host.detach_view();
        self.host.detach_automation();
        self.host.clear_parameters();
        self.params.write().take();
        self.active.store(false, Ordering::Release);
        if let Some(mut plugin) = self.plugin.lock().take() {
            if plugin.is_active() {
                plugin.deactivate();
            }
            tracing::debug!(id = %plugin.descriptor().id, "released wrapped CLAP plugin");
        }
        self.pending.lock().clear();
        self.activation.lock().take();
        self.controller.write().take();
        self.input_channels.store(0, Ordering::Release);
        self.output_channels.store(0, Ordering::Release);
    }

    /// Render one block. Outputs silence whenever the plugin cannot run.
    pub fn render<'b>(&self, inputs: &[&'b [f32]], outputs: &mut [&'b mut [f32]], frames: u32) {
        let Some(mut guard) = self.plugin.try_lock() else {
            silence(outputs);
            return;
        };
        let Some(plugin) = guard.as_mut().filter(|plugin| plugin.is_active()) else {
            silence(outputs);
            return;
        };

        let changes = match self.pending.try_lock() {
            Some(mut pending) => std::mem::take(&mut *pending),
            None => Vec::new(),
        };
        let block = AudioBlock {
            inputs,
            outputs: &mut *outputs,
            frames,
        };
        if !plugin.process(block, &changes) {
            silence(outputs);
        }
    }

    /// Run `f` against the plugin's editor.
    pub fn with_gui<T>(
        &self,
        f: impl FnOnce(&mut dyn PluginGui) -> AaxResult<T>,
    ) -> AaxResult<T> {
        let mut guard = self.plugin.lock();
        let plugin = guard.as_mut().ok_or(AaxError::NotInitialized)?;
        let gui = plugin.gui().ok_or(AaxError::Unimplemented("clap.gui"))?;
        f(gui)
    }

    fn table(&self) -> AaxResult<Arc<ParameterTable>> {
        self.host.parameters().ok_or(AaxError::NotInitialized)
    }

    fn with_params<T>(
        &self,
        f: impl FnOnce(&dyn PluginParams) -> AaxResult<T>,
    ) -> AaxResult<T> {
        let params = self
            .params
            .read()
            .clone()
            .ok_or(AaxError::Unimplemented("clap.params"))?;
        f(&*params)
    }

    fn normalized_value(&self, id: &str) -> AaxResult<f64> {
        let table = self.table()?;
        let binding = table.get(id)?;
        let queued = self
            .pending
            .lock()
            .iter()
            .find(|change| change.id == binding.clap_id())
            .map(|change| change.value);
        if let Some(value) = queued {
            return Ok(binding.to_normalized(value));
        }
        self.with_params(|params| table.normalized_value(params, id))
    }

    fn value_string(&self, id: &str, max_length: i32) -> AaxResult<String> {
        let table = self.table()?;
        let binding = table.get(id)?;
        self.with_params(|params| {
            let value = params
                .value(binding.clap_id())
                .unwrap_or(binding.info().default_value);
            table.value_to_string(params, id, binding.to_normalized(value), budget(max_length))
        })
    }

    fn queue_change(&self, id: &str, normalized: f64) -> AaxResult<()> {
        let table = self.table()?;
        let binding = table.get(id)?;
        let change = ParamChange {
            id: binding.clap_id(),
            value: binding.from_normalized(normalized),
        };
        tracing::trace!(id, value = change.value, "queued parameter change");
        {
            let mut pending = self.pending.lock();
            match pending.iter_mut().find(|queued| queued.id == change.id) {
                Some(queued) => queued.value = change.value,
                None => pending.push(change),
            }
        }
        self.flush_if_idle();
        Ok(())
    }

    /// Deliver queued changes through a params flush when nothing processes.
    fn flush_if_idle(&self) {
        if self.active.load(Ordering::Acquire) {
            return;
        }
        let mut guard = self.plugin.lock();
        let Some(plugin) = guard.as_mut() else {
            return;
        };
        if plugin.is_active() {
            return;
        }
        let changes = std::mem::take(&mut *self.pending.lock());
        plugin.flush_params(&changes);
    }

    fn service(&self) -> AaxResult<()> {
        if self.host.take_rescan() {
            let table = self
                .params
                .read()
                .as_deref()
                .map(|params| ParameterTable::from_plugin(params))
                .unwrap_or_default();
            self.host.publish(table);
        }

        let latency = self.serve_plugin_requests()?;

        if let Some(controller) = self.controller.read().as_ref() {
            if let Some(latency) = latency {
                let code = controller.set_signal_latency(latency);
                if code != AAX_SUCCESS {
                    tracing::warn!(latency, code, "host refused signal latency");
                }
            }
            self.post_revision(controller.as_ref());
        }
        Ok(())
    }

    /// Run what the plugin requested through the host.
    ///
    /// Returns the latency to report when it may have changed. The plugin is
    /// only locked when there is something to do.
    fn serve_plugin_requests(&self) -> AaxResult<Option<u32>> {
        let callback = self.host.take_callback();
        let restart = self.host.take_restart();
        let flush = self.host.take_flush();
        let mut latency_changed = self.host.take_latency_changed();
        if !(callback || restart || flush || latency_changed) {
            return Ok(None);
        }

        let mut guard = self.plugin.lock();
        let Some(plugin) = guard.as_mut() else {
            return Ok(None);
        };

        if callback {
            plugin.on_main_thread();
        }

        if restart {
            if let Some((sample_rate, max_frames)) = *self.activation.lock() {
                tracing::debug!(sample_rate, max_frames, "restarting plugin");
                if plugin.is_active() {
                    plugin.deactivate();
                }
                self.active.store(false, Ordering::Release);
                plugin.activate(sample_rate, max_frames)?;
                self.active.store(plugin.is_active(), Ordering::Release);
                latency_changed = true;
            }
        }

        if flush && !plugin.is_active() {
            let changes = std::mem::take(&mut *self.pending.lock());
            plugin.flush_params(&changes);
        }

        Ok(latency_changed.then(|| plugin.latency()))
    }

    /// Tell the host about state changes since the last post.
    fn post_revision(&self, controller: &dyn Controller) {
        let revision = self.host.state_revision();
        if self.posted_revision.swap(revision, Ordering::AcqRel) == revision {
            return;
        }
        let payload = (revision as i64).to_le_bytes();
        let code = controller.post_packet(field::CURRENT_STATE_NUM, &payload);
        if code != AAX_SUCCESS {
            tracing::debug!(revision, code, "state revision packet refused");
        }
    }

    fn chunk_size_of(&self, chunk_id: TypeId) -> AaxResult<u32> {
        StateBridge::check_id(chunk_id)?;
        let size = self.capture()?;
        Ok(size as u32)
    }

    fn capture(&self) -> AaxResult<usize> {
        let mut guard = self.plugin.lock();
        let plugin = guard.as_mut().ok_or(AaxError::NotInitialized)?;
        self.state.capture(plugin.state())
    }

    fn chunk_of(&self, chunk_id: TypeId) -> AaxResult<PlugInChunk> {
        StateBridge::check_id(chunk_id)?;
        if self.state.is_empty() {
            self.capture()?;
        }
        Ok(self.state.chunk(self.chunk_ids()))
    }

    fn restore(&self, chunk_id: TypeId, chunk: &PlugInChunk) -> AaxResult<()> {
        StateBridge::check_id(chunk_id)?;
        StateBridge::check_id(chunk.id)?;
        let mut guard = self.plugin.lock();
        let plugin = guard.as_mut().ok_or(AaxError::NotInitialized)?;
        self.state.restore(plugin.state(), &chunk.data)
    }
}

impl Drop for ClapAsAax {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn silence(outputs: &mut [&mut [f32]]) {
    for channel in outputs.iter_mut() {
        channel.fill(0.0);
    }
}

fn budget(max_length: i32) -> Option<usize> {
    (max_length > 0).then_some(max_length as usize)
}

fn native<T>(result: AaxResult<T>) -> NativeResult<T> {
    result.map_err(|e| {
        tracing::debug!("{}", e);
        e.result_code()
    })
}

impl EffectParameters for ClapAsAax {
    fn initialize(
        &self,
        controller: Arc<dyn Controller>,
        automation: Option<Arc<dyn AutomationDelegate>>,
    ) -> NativeResult<()> {
        let result = self.setup(controller, automation);
        if result.is_err() {
            self.teardown();
        }
        native(result)
    }

    fn uninitialize(&self) -> NativeResult<()> {
        self.teardown();
        Ok(())
    }

    unsafe fn reset_field_data(
        &self,
        field: FieldIndex,
        data: *mut c_void,
        size: u32,
    ) -> NativeResult<()> {
        if data.is_null() {
            return Err(AAX_ERROR_NULL_OBJECT);
        }
        std::ptr::write_bytes(data as *mut u8, 0, size as usize);
        if field == field::PRIVATE_DATA {
            if (size as usize) < size_of::<PrivateData>() {
                return native(Err(AaxError::NullObject("private data block")));
            }
            (data as *mut PrivateData).write_unaligned(PrivateData {
                tag: PRIVATE_DATA_TAG,
                wrapper: self as *const ClapAsAax,
            });
        }
        Ok(())
    }

    fn timer_wakeup(&self) -> NativeResult<()> {
        native(self.service())
    }

    fn number_of_parameters(&self) -> i32 {
        self.host
            .parameters()
            .map(|table| table.len() as i32)
            .unwrap_or(0)
    }

    fn parameter_id_from_index(&self, index: i32) -> NativeResult<String> {
        native(self.table().and_then(|table| {
            usize::try_from(index)
                .ok()
                .and_then(|index| table.at(index))
                .map(|binding| binding.identifier().to_string())
                .ok_or_else(|| AaxError::InvalidParameterId(format!("#{}", index)))
        }))
    }

    fn parameter_index(&self, id: &str) -> NativeResult<i32> {
        native(self.table().and_then(|table| table.index_of(id)).map(|i| i as i32))
    }

    fn parameter_is_automatable(&self, id: &str) -> NativeResult<bool> {
        native(self.table().and_then(|table| Ok(table.get(id)?.is_automatable())))
    }

    fn parameter_number_of_steps(&self, id: &str) -> NativeResult<i32> {
        native(self.table().and_then(|table| Ok(table.get(id)?.step_count())))
    }

    fn parameter_name(&self, id: &str) -> NativeResult<String> {
        native(self.table().and_then(|table| Ok(table.get(id)?.name().to_string())))
    }

    fn parameter_name_of_length(&self, id: &str, length: i32) -> NativeResult<String> {
        native(self.table().and_then(|table| {
            let binding = table.get(id)?;
            Ok(binding.name_of_length(length.max(0) as usize).to_string())
        }))
    }

    fn parameter_value_string(&self, id: &str, max_length: i32) -> NativeResult<String> {
        native(self.value_string(id, max_length))
    }

    fn parameter_string_from_value(
        &self,
        id: &str,
        normalized: f64,
        max_length: i32,
    ) -> NativeResult<String> {
        native(self.table().and_then(|table| {
            table.get(id)?;
            self.with_params(|params| {
                table.value_to_string(params, id, normalized, budget(max_length))
            })
        }))
    }

    fn parameter_value_from_string(&self, id: &str, text: &str) -> NativeResult<f64> {
        native(self.table().and_then(|table| {
            table.get(id)?;
            self.with_params(|params| table.string_to_value(params, id, text))
        }))
    }

    fn parameter_normalized_value(&self, id: &str) -> NativeResult<f64> {
        native(self.normalized_value(id))
    }

    fn parameter_default_normalized_value(&self, id: &str) -> NativeResult<f64> {
        native(self.table().and_then(|table| Ok(table.get(id)?.default_normalized())))
    }

    fn set_parameter_normalized_value(&self, id: &str, normalized: f64) -> NativeResult<()> {
        native(self.queue_change(id, normalized))
    }

    fn number_of_chunks(&self) -> i32 {
        StateBridge::chunk_count()
    }

    fn chunk_id_from_index(&self, index: i32) -> NativeResult<TypeId> {
        native(StateBridge::chunk_id_from_index(index))
    }

    fn chunk_size(&self, chunk_id: TypeId) -> NativeResult<u32> {
        native(self.chunk_size_of(chunk_id))
    }

    fn chunk(&self, chunk_id: TypeId) -> NativeResult<PlugInChunk> {
        native(self.chunk_of(chunk_id))
    }

    fn set_chunk(&self, chunk_id: TypeId, chunk: &PlugInChunk) -> NativeResult<()> {
        native(self.restore(chunk_id, chunk))
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
