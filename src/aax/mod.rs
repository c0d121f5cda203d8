//! AAX object model
//!
//! The host owns the real AAX objects. This module models the slice of the
//! interface the adapter talks to as Rust traits: scan-time descriptors
//! ([`EffectCollection`] down to [`PropertyMap`]), per-instance host services
//! ([`Controller`], [`AutomationDelegate`], [`ViewContainer`]) and the
//! surfaces the adapter exposes back ([`EffectParameters`], [`EffectGui`]).

pub mod chunk;
pub mod descriptor;
pub mod instance;
pub mod result;

pub use chunk::{PlugInChunk, TypeId, CHUNK_NAME_MAX_BYTES};
pub use descriptor::{
    ComponentDescriptor, EffectCollection, EffectDescriptor, FieldIndex, MidiNodeType,
    ProcPtr, ProcessProc, Property, PropertyMap, StemFormat,
};
pub use instance::{
    AutomationDelegate, Controller, EffectGui, EffectParameters, NativeResult, ViewContainer,
    ViewContainerKind,
};
pub use result::{CheckedResult, ResultCode};
