//! Error types for the AAX side of the adapter.
//!
//! Internals propagate [`AaxError`] with `?`; every variant maps to exactly one
//! native result code, which is all the host ever sees.

use crate::aax::result::{self as code, ResultCode};
use clap_aax_host::HostError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AaxError {
    #[error("Unknown parameter id: {0}")]
    InvalidParameterId(String),

    #[error("String conversion failed for parameter {0}")]
    InvalidStringConversion(String),

    #[error("Host returned a null object: {0}")]
    NullObject(&'static str),

    #[error("Invalid chunk index: {0}")]
    InvalidChunkIndex(i32),

    #[error("Invalid chunk id: {0:#010x}")]
    InvalidChunkId(u32),

    #[error("Plugin state could not be captured")]
    IncorrectChunkSize,

    #[error("Malformed chunk: {0}")]
    MalformedChunk(String),

    #[error("Not implemented: {0}")]
    Unimplemented(&'static str),

    #[error("Instance not initialized")]
    NotInitialized,

    #[error("No CLAP plugin available")]
    NoComponents,

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl AaxError {
    /// Native AAX result code for this error.
    pub fn result_code(&self) -> ResultCode {
        match self {
            AaxError::InvalidParameterId(_) => code::AAX_ERROR_INVALID_PARAMETER_ID,
            AaxError::InvalidStringConversion(_) => code::AAX_ERROR_INVALID_STRING_CONVERSION,
            AaxError::NullObject(_) => code::AAX_ERROR_NULL_OBJECT,
            AaxError::InvalidChunkIndex(_) => code::AAX_ERROR_INVALID_CHUNK_INDEX,
            AaxError::InvalidChunkId(_) => code::AAX_ERROR_INVALID_CHUNK_ID,
            AaxError::IncorrectChunkSize => code::AAX_ERROR_INCORRECT_CHUNK_SIZE,
            AaxError::MalformedChunk(_) => code::AAX_ERROR_MALFORMED_CHUNK,
            AaxError::Unimplemented(_) => code::AAX_ERROR_UNIMPLEMENTED,
            AaxError::NotInitialized => code::AAX_ERROR_NOT_INITIALIZED,
            AaxError::NoComponents => code::AAX_ERROR_NO_COMPONENTS,
            AaxError::InvalidConfig(_) => code::AAX_ERROR_NOT_INITIALIZED,
        }
    }
}

impl From<HostError> for AaxError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::StateSave(_) => AaxError::IncorrectChunkSize,
            HostError::StateRestore(reason) => AaxError::MalformedChunk(reason),
            HostError::MissingExtension(name) => AaxError::Unimplemented(name),
            HostError::Editor(_) => AaxError::NullObject("plugin editor"),
            HostError::NotFound { .. }
            | HostError::LoadFailed { .. }
            | HostError::IncompatibleVersion { .. }
            | HostError::NoPlugins
            | HostError::UnknownPlugin(_)
            | HostError::Io(_) => AaxError::NoComponents,
        }
    }
}

pub type AaxResult<T> = std::result::Result<T, AaxError>;
