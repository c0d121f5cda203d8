//! CLAP library discovery
//!
//! The adapter binary is named after the CLAP it wraps: `Foo.aaxplugin`
//! loads `Foo.clap`. For every search root, in order:
//!
//! 1. `root/Foo.clap`
//! 2. `root/<parent folder of the adapter>/Foo.clap`
//! 3. `root/*/Foo.clap` (one level of subfolders, sorted by name)
//!
//! The first candidate that binds wins. A candidate that exists but fails to
//! bind is logged and skipped.

use crate::error::{HostError, Result};
use std::path::{Path, PathBuf};

pub const CLAP_EXTENSION: &str = "clap";

/// Bundle extension of the adapter itself.
pub const AAX_BUNDLE_EXTENSION: &str = "aaxplugin";

/// Where the adapter binary lives, as far as the search is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLocation {
    pub binary_name: String,
    pub parent_folder: Option<String>,
}

impl ModuleLocation {
    /// Derive the binary name and parent folder from the adapter's path.
    ///
    /// Inside an `.aaxplugin` bundle the bundle stem is the binary name and
    /// the folder holding the bundle is the parent folder.
    pub fn from_path(path: &Path) -> Option<Self> {
        let bundle = path
            .ancestors()
            .find(|p| p.extension().is_some_and(|ext| ext == AAX_BUNDLE_EXTENSION));

        let (anchor, mut binary_name) = match bundle {
            Some(bundle) => (bundle, bundle.file_stem()?.to_string_lossy().into_owned()),
            None => (path, path.file_stem()?.to_string_lossy().into_owned()),
        };

        // cdylib outputs are `libfoo.so` / `libfoo.dylib` outside of a bundle
        if bundle.is_none() && !cfg!(windows) {
            if let Some(stripped) = binary_name.strip_prefix("lib") {
                if !stripped.is_empty() {
                    binary_name = stripped.to_string();
                }
            }
        }

        let parent_folder = anchor
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned());

        Some(Self {
            binary_name,
            parent_folder,
        })
    }

    /// Location of the module containing the adapter code.
    pub fn current() -> Option<Self> {
        crate::os::module_path().and_then(|path| Self::from_path(&path))
    }
}

/// Layered search for `<binary_name>.clap`.
#[derive(Debug, Clone)]
pub struct Locator {
    binary_name: String,
    parent_folder: Option<String>,
    roots: Vec<PathBuf>,
}

impl Locator {
    pub fn new(binary_name: impl Into<String>) -> Self {
        Self {
            binary_name: binary_name.into(),
            parent_folder: None,
            roots: Vec::new(),
        }
    }

    pub fn from_location(location: ModuleLocation) -> Self {
        Self::new(location.binary_name).parent_folder(location.parent_folder)
    }

    pub fn parent_folder(mut self, folder: Option<String>) -> Self {
        self.parent_folder = folder;
        self
    }

    pub fn roots(mut self, roots: impl IntoIterator<Item = PathBuf>) -> Self {
        self.roots = roots.into_iter().collect();
        self
    }

    /// `<binary_name>.clap`
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.binary_name, CLAP_EXTENSION)
    }

    /// Existing candidate paths in search order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let file_name = self.file_name();
        let mut found: Vec<PathBuf> = Vec::new();
        let mut push = |path: PathBuf| {
            if path.exists() && !found.contains(&path) {
                found.push(path);
            }
        };

        for root in self.roots.iter().filter(|root| root.is_dir()) {
            tracing::trace!(root = %root.display(), "searching for {}", file_name);

            push(root.join(&file_name));

            if let Some(parent) = &self.parent_folder {
                push(root.join(parent).join(&file_name));
            }

            let mut subfolders: Vec<PathBuf> = match std::fs::read_dir(root) {
                Ok(entries) => entries
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.path())
                    .filter(|path| path.is_dir())
                    .collect(),
                Err(e) => {
                    tracing::warn!("Failed to scan {}: {}", root.display(), e);
                    continue;
                }
            };
            subfolders.sort();
            for folder in subfolders {
                push(folder.join(&file_name));
            }
        }

        found
    }

    /// Try candidates in order and return the first that binds.
    pub fn locate<T, F>(&self, mut bind: F) -> Result<(PathBuf, T)>
    where
        F: FnMut(&Path) -> Result<T>,
    {
        for candidate in self.candidates() {
            match bind(&candidate) {
                Ok(bound) => {
                    tracing::info!("Bound CLAP library {}", candidate.display());
                    return Ok((candidate, bound));
                }
                Err(e) => tracing::warn!("Skipping {}: {}", candidate.display(), e),
            }
        }

        Err(HostError::NotFound {
            name: self.file_name(),
            searched: self.roots.len(),
        })
    }
}

/// Search roots from the `CLAP_PATH` environment variable.
pub fn clap_path_env() -> Vec<PathBuf> {
    std::env::var_os("CLAP_PATH")
        .map(|paths| std::env::split_paths(&paths).collect())
        .unwrap_or_default()
}

/// Platform CLAP install locations.
pub fn default_search_paths() -> Vec<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        vec![
            PathBuf::from(format!(
                "{}/Library/Audio/Plug-Ins/CLAP",
                std::env::var("HOME").unwrap_or_default()
            )),
            PathBuf::from("/Library/Audio/Plug-Ins/CLAP"),
        ]
    }

    #[cfg(target_os = "windows")]
    {
        let mut paths = Vec::new();
        if let Ok(local) = std::env::var("LOCALAPPDATA") {
            paths.push(PathBuf::from(local).join("Programs").join("Common").join("CLAP"));
        }
        match std::env::var("COMMONPROGRAMFILES") {
            Ok(common) => paths.push(PathBuf::from(common).join("CLAP")),
            Err(_) => paths.push(PathBuf::from("C:\\Program Files\\Common Files\\CLAP")),
        }
        paths
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![
            PathBuf::from(format!(
                "{}/.clap",
                std::env::var("HOME").unwrap_or_default()
            )),
            PathBuf::from("/usr/lib/clap"),
            PathBuf::from("/usr/local/lib/clap"),
        ]
    }
}

/// Loadable binary for a `.clap` candidate.
///
/// On macOS a `.clap` is a bundle directory holding `Contents/MacOS/<stem>`.
pub fn bundle_binary(path: &Path) -> PathBuf {
    if cfg!(target_os = "macos") && path.is_dir() {
        if let Some(stem) = path.file_stem() {
            let inner = path.join("Contents").join("MacOS").join(stem);
            if inner.exists() {
                return inner;
            }
        }
    }
    path.to_path_buf()
}
