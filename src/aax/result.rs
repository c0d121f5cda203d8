//! Native result codes and best-effort accumulation

use crate::error::AaxError;

pub type ResultCode = i32;

pub const AAX_SUCCESS: ResultCode = 0;
pub const AAX_ERROR_INVALID_PARAMETER_ID: ResultCode = -20001;
pub const AAX_ERROR_INVALID_STRING_CONVERSION: ResultCode = -20002;
pub const AAX_ERROR_NULL_OBJECT: ResultCode = -20004;
pub const AAX_ERROR_INVALID_CHUNK_INDEX: ResultCode = -20006;
pub const AAX_ERROR_INVALID_CHUNK_ID: ResultCode = -20007;
pub const AAX_ERROR_INCORRECT_CHUNK_SIZE: ResultCode = -20008;
pub const AAX_ERROR_UNIMPLEMENTED: ResultCode = -20009;
pub const AAX_ERROR_NOT_INITIALIZED: ResultCode = -20011;
pub const AAX_ERROR_MALFORMED_CHUNK: ResultCode = -20026;
pub const AAX_ERROR_NO_COMPONENTS: ResultCode = -20034;

/// Keeps the first failure of a sequence of calls.
///
/// Every step still runs; callers that describe to the host want as much of
/// the description as possible even when one piece is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckedResult {
    first: ResultCode,
}

impl Default for CheckedResult {
    fn default() -> Self {
        Self { first: AAX_SUCCESS }
    }
}

impl CheckedResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, code: ResultCode) {
        if code != AAX_SUCCESS && self.first == AAX_SUCCESS {
            self.first = code;
        }
    }

    pub fn fail(&mut self, err: &AaxError) {
        tracing::warn!("{}", err);
        self.check(err.result_code());
    }

    pub fn code(&self) -> ResultCode {
        self.first
    }

    pub fn is_ok(&self) -> bool {
        self.first == AAX_SUCCESS
    }
}
