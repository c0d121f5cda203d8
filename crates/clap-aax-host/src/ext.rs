//! Wrapper-specific CLAP extensions.
//!
//! Some AAX identity fields cannot be derived from a plain CLAP descriptor.
//! Plugins that need stable values across releases can provide them through
//! these optional factory and plugin extensions. All members may be null.

#![allow(non_camel_case_types)]

use clap_sys::plugin::clap_plugin;
use std::ffi::{c_char, c_void, CStr};

/// Factory id passed to `clap_plugin_entry.get_factory`.
pub const CLAP_PLUGIN_FACTORY_INFO_AAX: &CStr = c"clap.plugin-factory-info-as-aax/0";

/// Plugin extension id passed to `clap_plugin.get_extension`.
pub const CLAP_PLUGIN_AS_AAX: &CStr = c"clap.plugin-info-as-aax/0";

#[repr(C)]
pub struct clap_plugin_info_as_aax {
    pub vendor: *const c_char,
    /// `|`-separated CLAP feature tags used for the AAX category
    pub features: *const c_char,
}

#[repr(C)]
pub struct clap_plugin_factory_as_aax {
    /// Package name, otherwise the first plugin's name is used
    pub package_name: *const c_char,
    pub package_version: u32,
    pub get_aax_info: Option<
        unsafe extern "C" fn(
            factory: *const clap_plugin_factory_as_aax,
            index: u32,
        ) -> *const clap_plugin_info_as_aax,
    >,
    pub can_apply_configuration: Option<
        unsafe extern "C" fn(plugin: *const clap_plugin, requests: *const c_void, count: u32) -> bool,
    >,
}

#[repr(C)]
pub struct clap_plugin_as_aax {
    /// MIDI channels on a note port, 1 to 16
    pub get_num_midi_channels:
        Option<unsafe extern "C" fn(plugin: *const clap_plugin, note_port: u32) -> u32>,
    pub supported_note_expressions: Option<unsafe extern "C" fn(plugin: *const clap_plugin) -> u32>,
}

/// Split an extension feature string into CLAP feature tags.
pub(crate) fn split_feature_string(features: &str) -> Vec<String> {
    features
        .split(|c: char| c == '|' || c == ';' || c.is_whitespace())
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
