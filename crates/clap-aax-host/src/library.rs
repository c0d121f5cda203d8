//! Bound CLAP library: entry point, plugin factory and descriptors

use crate::clap_loader::ClapPlugin;
use crate::error::{HostError, LoadStage, Result};
use crate::ext::{
    clap_plugin_factory_as_aax, split_feature_string, CLAP_PLUGIN_FACTORY_INFO_AAX,
};
use crate::instance::HostCallbacks;
use crate::locator::bundle_binary;
use crate::metadata::{AaxPluginInfo, AbiVersion, PackageInfo, PluginDescriptor};
use clap_sys::entry::clap_plugin_entry;
use clap_sys::factory::plugin_factory::{clap_plugin_factory, CLAP_PLUGIN_FACTORY_ID};
use clap_sys::plugin::clap_plugin_descriptor;
use std::ffi::{c_char, CStr, CString};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const ENTRY_SYMBOL: &[u8] = b"clap_entry\0";

/// A CLAP library whose entry point has been initialized.
///
/// Dropping it calls `deinit` on the entry and then unloads the library.
/// Plugin instances hold an `Arc` to the library they came from.
pub struct ClapLibrary {
    path: PathBuf,
    entry: *const clap_plugin_entry,
    factory: *const clap_plugin_factory,
    aax_factory: *const clap_plugin_factory_as_aax,
    plugins: Vec<PluginDescriptor>,
    _library: Option<libloading::Library>,
}

// Safety: the entry and factory are immutable tables that CLAP requires to be
// thread-safe; the descriptors are owned copies.
unsafe impl Send for ClapLibrary {}
unsafe impl Sync for ClapLibrary {}

impl ClapLibrary {
    /// Load a `.clap` file (or macOS bundle) from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let binary = bundle_binary(path);
        let library = unsafe {
            libloading::Library::new(&binary).map_err(|e| {
                HostError::load(path, LoadStage::Opening, format!("Failed to load library: {}", e))
            })?
        };

        let entry = unsafe {
            let symbol = library
                .get::<*const clap_plugin_entry>(ENTRY_SYMBOL)
                .map_err(|e| {
                    HostError::load(path, LoadStage::EntryPoint, format!("No clap_entry symbol: {}", e))
                })?;
            *symbol
        };

        unsafe { Self::bind(entry, path, Some(library)) }
    }

    /// Bind the `clap_entry` exported by the module containing this code.
    ///
    /// Returns `Ok(None)` when the adapter does not embed a CLAP.
    pub fn embedded() -> Result<Option<Self>> {
        let Some(path) = crate::os::module_path() else {
            return Ok(None);
        };
        let library = match unsafe { libloading::Library::new(&path) } {
            Ok(library) => library,
            Err(e) => {
                tracing::debug!("Cannot reopen own module {}: {}", path.display(), e);
                return Ok(None);
            }
        };
        let entry = match unsafe { library.get::<*const clap_plugin_entry>(ENTRY_SYMBOL) } {
            Ok(symbol) => *symbol,
            Err(_) => return Ok(None),
        };

        tracing::debug!("Using embedded clap_entry from {}", path.display());
        unsafe { Self::bind(entry, &path, Some(library)).map(Some) }
    }

    /// Bind an entry point that is already mapped in this process.
    ///
    /// # Safety
    /// `entry` must point to a valid `clap_plugin_entry` that outlives the
    /// returned library.
    pub unsafe fn from_entry(entry: *const clap_plugin_entry, path: &Path) -> Result<Self> {
        Self::bind(entry, path, None)
    }

    unsafe fn bind(
        entry: *const clap_plugin_entry,
        path: &Path,
        library: Option<libloading::Library>,
    ) -> Result<Self> {
        if entry.is_null() {
            return Err(HostError::load(path, LoadStage::EntryPoint, "clap_entry is null"));
        }
        let entry_ref = &*entry;

        let init_fn = entry_ref
            .init
            .ok_or_else(|| HostError::load(path, LoadStage::EntryPoint, "No init function"))?;
        let path_c = CString::new(path.to_string_lossy().as_bytes()).map_err(|e| {
            HostError::load(path, LoadStage::EntryPoint, format!("Path contains a null byte: {}", e))
        })?;
        if !init_fn(path_c.as_ptr()) {
            return Err(HostError::load(path, LoadStage::EntryPoint, "Entry init failed"));
        }

        // From here on Drop calls deinit.
        let mut bound = Self {
            path: path.to_path_buf(),
            entry,
            factory: std::ptr::null(),
            aax_factory: std::ptr::null(),
            plugins: Vec::new(),
            _library: library,
        };

        let get_factory_fn = entry_ref
            .get_factory
            .ok_or_else(|| HostError::load(path, LoadStage::Factory, "No get_factory function"))?;
        bound.factory = get_factory_fn(CLAP_PLUGIN_FACTORY_ID.as_ptr()) as *const clap_plugin_factory;
        if bound.factory.is_null() {
            return Err(HostError::load(path, LoadStage::Factory, "No plugin factory"));
        }
        bound.aax_factory =
            get_factory_fn(CLAP_PLUGIN_FACTORY_INFO_AAX.as_ptr()) as *const clap_plugin_factory_as_aax;

        bound.plugins = bound.enumerate()?;
        let first = bound.plugins.first().ok_or(HostError::NoPlugins)?;
        if !first.clap_version.is_compatible() {
            let AbiVersion {
                major,
                minor,
                revision,
            } = first.clap_version;
            return Err(HostError::IncompatibleVersion {
                major,
                minor,
                revision,
            });
        }

        tracing::info!(
            "CLAP library {} exposes {} plugin(s)",
            path.display(),
            bound.plugins.len()
        );
        Ok(bound)
    }

    unsafe fn enumerate(&self) -> Result<Vec<PluginDescriptor>> {
        let factory = &*self.factory;
        let count_fn = factory.get_plugin_count.ok_or_else(|| {
            HostError::load(&self.path, LoadStage::Factory, "No get_plugin_count function")
        })?;
        let desc_fn = factory.get_plugin_descriptor.ok_or_else(|| {
            HostError::load(&self.path, LoadStage::Factory, "No get_plugin_descriptor function")
        })?;

        let count = count_fn(self.factory);
        let mut plugins = Vec::with_capacity(count as usize);
        for index in 0..count {
            let desc = desc_fn(self.factory, index);
            if desc.is_null() {
                tracing::warn!("Factory returned no descriptor for index {}", index);
                continue;
            }
            plugins.push(read_descriptor(&*desc));
        }
        Ok(plugins)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn plugins(&self) -> &[PluginDescriptor] {
        &self.plugins
    }

    pub fn plugin(&self, id: &str) -> Option<&PluginDescriptor> {
        self.plugins.iter().find(|p| p.id == id)
    }

    /// Package name and version from the AAX factory extension, if present.
    pub fn package_info(&self) -> PackageInfo {
        if self.aax_factory.is_null() {
            return PackageInfo::default();
        }
        let factory = unsafe { &*self.aax_factory };
        PackageInfo {
            name: unsafe { optional_string(factory.package_name) },
            version: (factory.package_version != 0).then_some(factory.package_version),
        }
    }

    /// Per-plugin vendor and feature overrides from the AAX factory extension.
    pub fn aax_plugin_info(&self, index: usize) -> AaxPluginInfo {
        if self.aax_factory.is_null() {
            return AaxPluginInfo::default();
        }
        let factory = unsafe { &*self.aax_factory };
        let Some(get_info) = factory.get_aax_info else {
            return AaxPluginInfo::default();
        };
        let info = unsafe { get_info(self.aax_factory, index as u32) };
        if info.is_null() {
            return AaxPluginInfo::default();
        }
        let info = unsafe { &*info };
        AaxPluginInfo {
            vendor: unsafe { optional_string(info.vendor) },
            features: unsafe { optional_string(info.features) }.map(|f| split_feature_string(&f)),
        }
    }

    /// Create and initialize an instance of plugin `id`.
    pub fn create_plugin(
        self: &Arc<Self>,
        id: &str,
        host: Arc<dyn HostCallbacks>,
    ) -> Result<ClapPlugin> {
        ClapPlugin::create(Arc::clone(self), id, host)
    }

    pub(crate) fn factory(&self) -> *const clap_plugin_factory {
        self.factory
    }
}

impl Drop for ClapLibrary {
    fn drop(&mut self) {
        let entry = unsafe { &*self.entry };
        if let Some(deinit_fn) = entry.deinit {
            unsafe { deinit_fn() };
        }
        tracing::debug!("Released CLAP library {}", self.path.display());
    }
}

impl std::fmt::Debug for ClapLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClapLibrary")
            .field("path", &self.path)
            .field("plugins", &self.plugins)
            .finish()
    }
}

/// Lossy copy of a C string; null reads as empty.
pub(crate) unsafe fn c_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

unsafe fn optional_string(ptr: *const c_char) -> Option<String> {
    (!ptr.is_null()).then(|| c_string(ptr))
}

unsafe fn read_descriptor(desc: &clap_plugin_descriptor) -> PluginDescriptor {
    let mut features = Vec::new();
    if !desc.features.is_null() {
        let mut cursor = desc.features;
        while !(*cursor).is_null() {
            features.push(c_string(*cursor));
            cursor = cursor.add(1);
        }
    }

    PluginDescriptor::new(c_string(desc.id), c_string(desc.name))
        .vendor(c_string(desc.vendor))
        .version(c_string(desc.version))
        .description(c_string(desc.description))
        .url(c_string(desc.url))
        .features(features)
        .clap_version(AbiVersion::new(
            desc.clap_version.major,
            desc.clap_version.minor,
            desc.clap_version.revision,
        ))
}
