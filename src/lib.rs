//! # CLAP-as-AAX
//!
//! Exposes a CLAP plugin to an AAX host.
//!
//! ## Architecture
//!
//! The adapter is an umbrella crate over two subsystem crates:
//! - **clap-aax-core** - identifier codec, short names, category translation
//! - **clap-aax-host** - finds and binds the CLAP library, drives plugin instances
//!
//! This crate is the AAX side:
//! - [`describe`] - turns CLAP descriptors into AAX effect descriptions at scan time
//! - [`ClapAsAax`] - one AAX effect instance wrapping one CLAP plugin
//! - [`parameter`] - the parameter proxy table
//! - [`state`] - the plugin state as a single `'clap'` chunk
//! - [`factory`] - the process-wide library and the host entry points
//!
//! The AAX interfaces themselves are modelled as traits in [`aax`]; a host
//! binding implements the host side of them and calls into this crate.
//!
//! ## Quick Start
//!
//! ```ignore
//! use clap_aax_wrapper::prelude::*;
//!
//! // scan time
//! let code = get_effect_descriptions(&mut collection);
//!
//! // per instance
//! let parameters = create_effect_parameters();
//! parameters.initialize(controller, Some(automation))?;
//! let name = parameters.parameter_name("00000001")?;
//! ```

/// Re-export of clap-aax-core for direct access
pub use clap_aax_core as core;

/// Re-export of clap-aax-host for direct access
pub use clap_aax_host as host_side;

pub mod aax;
pub mod config;
pub mod describe;
pub mod error;
pub mod factory;
pub mod gui;
mod host;
pub mod parameter;
pub mod process;
pub mod source;
pub mod state;
pub mod wrapper;

pub use config::WrapperConfig;
pub use error::{AaxError, AaxResult};
pub use gui::WrappedGui;
pub use host::HostBridge;
pub use parameter::{ParameterBinding, ParameterTable};
pub use source::{PluginSource, ScanInfo};
pub use state::{ChunkIds, StateBridge};
pub use wrapper::ClapAsAax;

pub use factory::{
    aax_shutdown, aax_startup, create_effect_gui, create_effect_parameters,
    get_effect_descriptions, guarantee_clap,
};

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::aax::{
        AutomationDelegate, ComponentDescriptor, Controller, EffectCollection, EffectDescriptor,
        EffectGui, EffectParameters, PlugInChunk, PropertyMap, ResultCode, StemFormat,
        ViewContainer,
    };
    pub use crate::factory::{create_effect_gui, create_effect_parameters, get_effect_descriptions};
    pub use crate::{ClapAsAax, PluginSource, WrapperConfig};
}
