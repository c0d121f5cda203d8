//! Scan-time description interfaces
//!
//! All four traits are implemented by the host. The adapter only calls them
//! and never needs to read back what it wrote; `as_any` exists so host-side
//! implementations can recover their own types.

use super::instance::{EffectGui, EffectParameters};
use super::result::ResultCode;
use crate::process::AlgorithmContext;
use std::any::Any;
use std::ffi::c_void;
use std::sync::Arc;

/// Slot of a field in the algorithm context, in pointer-sized units.
pub type FieldIndex = u32;

/// Native render callback registered per component.
pub type ProcessProc =
    unsafe extern "C" fn(instances_begin: *const *mut AlgorithmContext, instances_end: *const c_void);

/// Channel layout of a component's main bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StemFormat {
    Mono,
    Stereo,
}

impl StemFormat {
    /// Encoded as `(layout index << 16) | channel count`.
    pub const fn code(self) -> i32 {
        match self {
            StemFormat::Mono => 1,
            StemFormat::Stereo => (1 << 16) | 2,
        }
    }

    pub const fn channel_count(self) -> usize {
        match self {
            StemFormat::Mono => 1,
            StemFormat::Stereo => 2,
        }
    }

    pub const fn suffix(self) -> &'static str {
        match self {
            StemFormat::Mono => "mono",
            StemFormat::Stereo => "stereo",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiNodeType {
    LocalInput,
    LocalOutput,
    Global,
    Transport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    ManufacturerId,
    ProductId,
    PlugInIdNative,
    CanBypass,
    UsesClientGui,
    InputStemFormat,
    OutputStemFormat,
}

/// Factory entry points registered on an effect.
#[derive(Clone, Copy)]
pub enum ProcPtr {
    CreateEffectParameters(fn() -> Arc<dyn EffectParameters>),
    CreateEffectGui(fn() -> Box<dyn EffectGui>),
}

impl std::fmt::Debug for ProcPtr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcPtr::CreateEffectParameters(_) => write!(f, "ProcPtr::CreateEffectParameters"),
            ProcPtr::CreateEffectGui(_) => write!(f, "ProcPtr::CreateEffectGui"),
        }
    }
}

pub trait PropertyMap {
    fn add_property(&mut self, property: Property, value: i32) -> ResultCode;

    fn as_any(&self) -> &dyn Any;
}

pub trait ComponentDescriptor {
    fn clear(&mut self) -> ResultCode;

    fn add_audio_in(&mut self, field: FieldIndex) -> ResultCode;

    fn add_audio_out(&mut self, field: FieldIndex) -> ResultCode;

    fn add_audio_buffer_length(&mut self, field: FieldIndex) -> ResultCode;

    fn add_clock(&mut self, field: FieldIndex) -> ResultCode;

    fn add_private_data(&mut self, field: FieldIndex, size: u32) -> ResultCode;

    fn add_midi_node(
        &mut self,
        field: FieldIndex,
        node_type: MidiNodeType,
        name: &str,
        channel_mask: u32,
    ) -> ResultCode;

    fn add_data_in_port(&mut self, field: FieldIndex, size: u32) -> ResultCode;

    fn new_property_map(&mut self) -> Option<Box<dyn PropertyMap>>;

    fn add_process_proc_native(
        &mut self,
        process: ProcessProc,
        properties: Box<dyn PropertyMap>,
    ) -> ResultCode;

    fn as_any(&self) -> &dyn Any;
}

pub trait EffectDescriptor {
    fn new_component_descriptor(&mut self) -> Option<Box<dyn ComponentDescriptor>>;

    fn add_name(&mut self, name: &str) -> ResultCode;

    /// `category` is a bitmask of AAX plug-in categories.
    fn add_category(&mut self, category: u32) -> ResultCode;

    fn add_component(&mut self, component: Box<dyn ComponentDescriptor>) -> ResultCode;

    fn add_proc_ptr(&mut self, proc_ptr: ProcPtr) -> ResultCode;

    fn as_any(&self) -> &dyn Any;
}

pub trait EffectCollection {
    fn new_descriptor(&mut self) -> Option<Box<dyn EffectDescriptor>>;

    /// Register `descriptor` under `effect_id`; the host hands the id back to
    /// the instance through [`Controller::effect_id`](super::Controller::effect_id).
    fn add_effect(&mut self, effect_id: &str, descriptor: Box<dyn EffectDescriptor>) -> ResultCode;

    fn set_manufacturer_name(&mut self, name: &str) -> ResultCode;

    fn add_package_name(&mut self, name: &str) -> ResultCode;

    fn set_package_version(&mut self, version: u32) -> ResultCode;
}
