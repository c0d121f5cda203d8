//! Per-instance interfaces
//!
//! [`Controller`], [`AutomationDelegate`] and [`ViewContainer`] are host
//! services handed to an instance. [`EffectParameters`] and [`EffectGui`] are
//! what the adapter implements for the host to call.

use super::chunk::{PlugInChunk, TypeId};
use super::descriptor::{FieldIndex, StemFormat};
use super::result::ResultCode;
use std::any::Any;
use std::ffi::c_void;
use std::sync::Arc;

/// Value or native failure code.
pub type NativeResult<T> = std::result::Result<T, ResultCode>;

pub trait Controller: Send + Sync {
    /// Effect id the instance was registered under at scan time.
    fn effect_id(&self) -> Option<String>;

    fn input_stem_format(&self) -> StemFormat;

    fn output_stem_format(&self) -> StemFormat;

    fn sample_rate(&self) -> Option<f64>;

    fn host_name(&self) -> Option<String>;

    fn set_signal_latency(&self, samples: u32) -> ResultCode;

    /// Deliver `payload` to the data-in port registered at `field`.
    fn post_packet(&self, field: FieldIndex, payload: &[u8]) -> ResultCode;
}

/// Host automation system. Values are normalized to `0.0..=1.0`.
pub trait AutomationDelegate: Send + Sync {
    fn register_parameter(&self, id: &str) -> ResultCode;

    fn unregister_parameter(&self, id: &str) -> ResultCode;

    fn post_touch_request(&self, id: &str) -> ResultCode;

    fn post_set_value_request(&self, id: &str, normalized: f64) -> ResultCode;

    fn post_release_request(&self, id: &str) -> ResultCode;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewContainerKind {
    Hwnd,
    NsView,
    Unknown,
}

/// Native view the host gives an editor to attach to.
///
/// # Safety
/// `native_handle` must return a live view of the type `kind` names for as
/// long as the container is attached.
pub unsafe trait ViewContainer: Send + Sync {
    fn kind(&self) -> ViewContainerKind;

    fn native_handle(&self) -> *mut c_void;

    fn set_view_size(&self, width: f32, height: f32) -> ResultCode;
}

/// Parameter, chunk and lifecycle surface of one effect instance.
pub trait EffectParameters: Send + Sync {
    /// Bind the instance to its host services and create the plugin.
    fn initialize(
        &self,
        controller: Arc<dyn Controller>,
        automation: Option<Arc<dyn AutomationDelegate>>,
    ) -> NativeResult<()>;

    fn uninitialize(&self) -> NativeResult<()>;

    /// Fill the private field data the host allocated for `field`.
    ///
    /// # Safety
    /// `data` must be valid for writes of `size` bytes.
    unsafe fn reset_field_data(&self, field: FieldIndex, data: *mut c_void, size: u32)
        -> NativeResult<()>;

    fn timer_wakeup(&self) -> NativeResult<()>;

    fn number_of_parameters(&self) -> i32;

    fn parameter_id_from_index(&self, index: i32) -> NativeResult<String>;

    fn parameter_index(&self, id: &str) -> NativeResult<i32>;

    fn parameter_is_automatable(&self, id: &str) -> NativeResult<bool>;

    fn parameter_number_of_steps(&self, id: &str) -> NativeResult<i32>;

    fn parameter_name(&self, id: &str) -> NativeResult<String>;

    fn parameter_name_of_length(&self, id: &str, length: i32) -> NativeResult<String>;

    fn parameter_value_string(&self, id: &str, max_length: i32) -> NativeResult<String>;

    fn parameter_string_from_value(
        &self,
        id: &str,
        normalized: f64,
        max_length: i32,
    ) -> NativeResult<String>;

    fn parameter_value_from_string(&self, id: &str, text: &str) -> NativeResult<f64>;

    fn parameter_normalized_value(&self, id: &str) -> NativeResult<f64>;

    fn parameter_default_normalized_value(&self, id: &str) -> NativeResult<f64>;

    fn set_parameter_normalized_value(&self, id: &str, normalized: f64) -> NativeResult<()>;

    fn number_of_chunks(&self) -> i32;

    fn chunk_id_from_index(&self, index: i32) -> NativeResult<TypeId>;

    fn chunk_size(&self, chunk_id: TypeId) -> NativeResult<u32>;

    fn chunk(&self, chunk_id: TypeId) -> NativeResult<PlugInChunk>;

    fn set_chunk(&self, chunk_id: TypeId, chunk: &PlugInChunk) -> NativeResult<()>;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Editor surface of one effect instance.
pub trait EffectGui: Send {
    fn initialize(&mut self, parameters: Arc<dyn EffectParameters>) -> NativeResult<()>;

    /// Attach the plugin editor to `container`.
    fn create_view_container(&mut self, container: Arc<dyn ViewContainer>) -> NativeResult<()>;

    fn delete_view_container(&mut self);

    /// Editor size in points, as the host wants it.
    fn view_size(&self) -> (f32, f32);
}
