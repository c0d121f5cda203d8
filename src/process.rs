//! Native render callback
//!
//! The host lays out one [`AlgorithmContext`] per instance from the fields
//! the component description registered, and hands the render callback a
//! range of them. The private data field carries a tagged pointer back to the
//! owning [`ClapAsAax`].

use crate::aax::FieldIndex;
use crate::wrapper::ClapAsAax;
use std::ffi::c_void;
use std::mem::{offset_of, size_of};

/// Tag identifying a [`PrivateData`] block written by this adapter.
pub const PRIVATE_DATA_TAG: u32 = u32::from_be_bytes(*b"CaAx");

#[repr(C)]
#[derive(Debug)]
pub struct PrivateData {
    pub tag: u32,
    pub wrapper: *const ClapAsAax,
}

impl PrivateData {
    /// Wrapper behind a private data block, if the block is ours.
    ///
    /// # Safety
    /// `data` must be null or point to a readable `PrivateData`, and a tagged
    /// wrapper pointer must still be live.
    pub unsafe fn wrapper<'a>(data: *const PrivateData) -> Option<&'a ClapAsAax> {
        let data = data.as_ref()?;
        if data.tag != PRIVATE_DATA_TAG {
            return None;
        }
        data.wrapper.as_ref()
    }
}

/// Per-instance render context.
#[repr(C)]
pub struct AlgorithmContext {
    pub audio_inputs: *const *const f32,
    pub audio_outputs: *const *mut f32,
    pub num_samples: *const i32,
    pub clock: *const i64,
    pub input_node: *mut c_void,
    pub global_node: *mut c_void,
    pub transport_node: *mut c_void,
    pub private_data: *mut PrivateData,
    pub meters: *mut *mut f32,
    pub current_state_num: *const i64,
}

const fn field_index(offset: usize) -> FieldIndex {
    (offset / size_of::<*const c_void>()) as FieldIndex
}

pub mod field {
    use super::*;

    pub const AUDIO_INPUTS: FieldIndex = field_index(offset_of!(AlgorithmContext, audio_inputs));
    pub const AUDIO_OUTPUTS: FieldIndex = field_index(offset_of!(AlgorithmContext, audio_outputs));
    pub const NUM_SAMPLES: FieldIndex = field_index(offset_of!(AlgorithmContext, num_samples));
    pub const CLOCK: FieldIndex = field_index(offset_of!(AlgorithmContext, clock));
    pub const INPUT_NODE: FieldIndex = field_index(offset_of!(AlgorithmContext, input_node));
    pub const GLOBAL_NODE: FieldIndex = field_index(offset_of!(AlgorithmContext, global_node));
    pub const TRANSPORT_NODE: FieldIndex = field_index(offset_of!(AlgorithmContext, transport_node));
    pub const PRIVATE_DATA: FieldIndex = field_index(offset_of!(AlgorithmContext, private_data));
    pub const METERS: FieldIndex = field_index(offset_of!(AlgorithmContext, meters));
    pub const CURRENT_STATE_NUM: FieldIndex =
        field_index(offset_of!(AlgorithmContext, current_state_num));
}

/// Render every instance in `[instances_begin, instances_end)`.
///
/// # Safety
/// Called by the host with a valid range of contexts laid out as described.
pub unsafe extern "C" fn algorithm_process(
    instances_begin: *const *mut AlgorithmContext,
    instances_end: *const c_void,
) {
    let end = instances_end as *const *mut AlgorithmContext;
    let mut walk = instances_begin;
    while walk < end {
        if let Some(context) = (*walk).as_ref() {
            process_instance(context);
        }
        walk = walk.add(1);
    }
}

unsafe fn process_instance(context: &AlgorithmContext) {
    let Some(wrapper) = PrivateData::wrapper(context.private_data) else {
        return;
    };
    if context.num_samples.is_null() || context.audio_outputs.is_null() {
        return;
    }
    let frames = (*context.num_samples).max(0) as usize;
    let (in_channels, out_channels) = wrapper.channel_counts();

    let mut inputs: [&[f32]; 2] = [&[], &[]];
    let mut outputs: [&mut [f32]; 2] = [&mut [], &mut []];

    let in_channels = if context.audio_inputs.is_null() { 0 } else { in_channels.min(2) };
    for (channel, slot) in inputs.iter_mut().enumerate().take(in_channels) {
        let ptr = *context.audio_inputs.add(channel);
        if !ptr.is_null() {
            *slot = std::slice::from_raw_parts(ptr, frames);
        }
    }

    let out_channels = out_channels.min(2);
    for (channel, slot) in outputs.iter_mut().enumerate().take(out_channels) {
        let ptr = *context.audio_outputs.add(channel);
        if !ptr.is_null() {
            *slot = std::slice::from_raw_parts_mut(ptr, frames);
        }
    }

    wrapper.render(&inputs[..in_channels], &mut outputs[..out_channels], frames as u32);
}
