//! Error types for CLAP library binding and plugin instances

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Opening,
    EntryPoint,
    Factory,
    Instantiation,
    Initialization,
    Activation,
}

impl std::fmt::Display for LoadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadStage::Opening => write!(f, "opening library"),
            LoadStage::EntryPoint => write!(f, "initializing entry point"),
            LoadStage::Factory => write!(f, "getting factory"),
            LoadStage::Instantiation => write!(f, "creating instance"),
            LoadStage::Initialization => write!(f, "initializing plugin"),
            LoadStage::Activation => write!(f, "activating"),
        }
    }
}

#[derive(Error, Debug)]
pub enum HostError {
    #[error("No CLAP library named {name} found in {searched} search roots")]
    NotFound { name: String, searched: usize },

    #[error("CLAP load failed at {stage} stage: {path}\n  Reason: {reason}")]
    LoadFailed {
        path: PathBuf,
        stage: LoadStage,
        reason: String,
    },

    #[error("Incompatible CLAP version {major}.{minor}.{revision}")]
    IncompatibleVersion { major: u32, minor: u32, revision: u32 },

    #[error("CLAP factory exposes no plugins")]
    NoPlugins,

    #[error("Unknown plugin id: {0}")]
    UnknownPlugin(String),

    #[error("Plugin does not implement {0}")]
    MissingExtension(&'static str),

    #[error("Failed to save plugin state: {0}")]
    StateSave(String),

    #[error("Failed to restore plugin state: {0}")]
    StateRestore(String),

    #[error("Plugin editor error: {0}")]
    Editor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HostError {
    pub(crate) fn load(path: impl Into<PathBuf>, stage: LoadStage, reason: impl Into<String>) -> Self {
        HostError::LoadFailed {
            path: path.into(),
            stage,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HostError>;
