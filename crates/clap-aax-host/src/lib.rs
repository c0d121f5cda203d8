//! CLAP side of the CLAP-as-AAX adapter
//!
//! Finds the CLAP library an adapter binary wraps, binds its entry point and
//! plugin factory, and creates plugin instances behind the [`SourcePlugin`]
//! trait.
//!
//! ## Usage
//!
//! ```ignore
//! use clap_aax_host::{ClapLibrary, Locator, ModuleLocation, NullHost};
//! use std::sync::Arc;
//!
//! let location = ModuleLocation::current().expect("adapter path");
//! let (_, library) = Locator::from_location(location)
//!     .roots(clap_aax_host::default_search_paths())
//!     .locate(ClapLibrary::load)?;
//! let library = Arc::new(library);
//!
//! let id = library.plugins()[0].id.clone();
//! let plugin = library.create_plugin(&id, Arc::new(NullHost))?;
//! ```

pub mod error;
pub use error::{HostError, LoadStage, Result};

mod metadata;
pub use metadata::{
    AaxPluginInfo, AbiVersion, AudioPortInfo, PackageInfo, ParamFlags, ParamInfo,
    PluginDescriptor,
};

mod instance;
pub use instance::{
    AudioBlock, HostCallbacks, NullHost, ParamChange, PluginGui, PluginParams, PluginState,
    SourcePlugin, WindowApi,
};

mod locator;
pub use locator::{
    bundle_binary, clap_path_env, default_search_paths, Locator, ModuleLocation,
    AAX_BUNDLE_EXTENSION, CLAP_EXTENSION,
};

mod library;
pub use library::ClapLibrary;

mod clap_loader;
pub use clap_loader::{ClapParams, ClapPlugin};

pub mod ext;

mod events;
mod host;
mod os;
mod stream;

pub use os::module_path;
