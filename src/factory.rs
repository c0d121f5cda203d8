//! Process-wide CLAP library and host entry points
//!
//! Every instance of the adapter wraps the same CLAP library. It is bound
//! once, on first need, and kept until [`aax_shutdown`]. A failed bind
//! leaves nothing behind, so the next caller searches again.

use crate::aax::result::AAX_SUCCESS;
use crate::aax::{EffectCollection, EffectGui, EffectParameters, ResultCode};
use crate::config::WrapperConfig;
use crate::describe::describe_collection;
use crate::error::{AaxError, AaxResult};
use crate::gui::WrappedGui;
use crate::source::PluginSource;
use crate::wrapper::ClapAsAax;
use clap_aax_host::{ClapLibrary, Locator};
use parking_lot::{const_mutex, Mutex};
use std::sync::Arc;

static LIBRARY: Mutex<Option<Arc<dyn PluginSource>>> = const_mutex(None);

/// The bound library, binding it with `config` if nothing is bound yet.
pub fn guarantee_clap(config: &WrapperConfig) -> AaxResult<Arc<dyn PluginSource>> {
    let mut library = LIBRARY.lock();
    if let Some(bound) = library.as_ref() {
        return Ok(Arc::clone(bound));
    }
    let bound = bind(config)?;
    *library = Some(Arc::clone(&bound));
    Ok(bound)
}

fn bind(config: &WrapperConfig) -> AaxResult<Arc<dyn PluginSource>> {
    config.validate()?;

    match ClapLibrary::embedded() {
        Ok(Some(library)) => {
            tracing::info!(path = %library.path().display(), "using embedded CLAP");
            return Ok(Arc::new(library));
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("embedded CLAP entry unusable: {}", e),
    }

    let location = config.module_location().ok_or_else(|| {
        tracing::warn!("cannot determine adapter binary name");
        AaxError::NoComponents
    })?;
    let (path, library) = Locator::from_location(location)
        .roots(config.search_roots())
        .locate(ClapLibrary::load)
        .map_err(|e| {
            tracing::warn!("{}", e);
            AaxError::from(e)
        })?;

    tracing::info!(
        path = %path.display(),
        plugins = library.plugins().len(),
        "bound CLAP library"
    );
    Ok(Arc::new(library))
}

/// Use `source` as the process-wide library. The first binding wins.
pub fn install(source: Arc<dyn PluginSource>) -> Arc<dyn PluginSource> {
    let mut library = LIBRARY.lock();
    match library.as_ref() {
        Some(bound) => Arc::clone(bound),
        None => {
            *library = Some(Arc::clone(&source));
            source
        }
    }
}

/// The bound library, without binding.
pub fn bound() -> Option<Arc<dyn PluginSource>> {
    LIBRARY.lock().clone()
}

/// Drop the process-wide library. Live instances keep their own reference.
pub fn shutdown() {
    if LIBRARY.lock().take().is_some() {
        tracing::debug!("released CLAP library");
    }
}

pub fn aax_startup() -> ResultCode {
    AAX_SUCCESS
}

pub fn aax_shutdown() -> ResultCode {
    shutdown();
    AAX_SUCCESS
}

/// Scan-time entry point: describe every plugin of the library.
pub fn get_effect_descriptions(collection: &mut dyn EffectCollection) -> ResultCode {
    get_effect_descriptions_with(collection, &WrapperConfig::from_env())
}

pub fn get_effect_descriptions_with(
    collection: &mut dyn EffectCollection,
    config: &WrapperConfig,
) -> ResultCode {
    match guarantee_clap(config) {
        Ok(source) => describe_collection(collection, source),
        Err(e) => {
            tracing::warn!("no CLAP plugins to describe: {}", e);
            e.result_code()
        }
    }
}

/// Registered as the effect parameters factory of every effect.
pub fn create_effect_parameters() -> Arc<dyn EffectParameters> {
    let config = WrapperConfig::from_env();
    match bound() {
        Some(source) => Arc::new(ClapAsAax::with_source(config, source)),
        None => Arc::new(ClapAsAax::new(config)),
    }
}

/// Registered as the GUI factory of every effect.
pub fn create_effect_gui() -> Box<dyn EffectGui> {
    Box::new(WrappedGui::new())
}
