//! Pure translation primitives for the CLAP-as-AAX adapter
//!
//! Everything in this crate is deterministic and free of FFI:
//!
//! - [`ids`] - fixed-length parameter identifiers and host 4-byte codes
//! - [`names`] - progressively shorter display-name variants
//! - [`category`] - CLAP feature tags to AAX category bitmask

pub mod category;
pub mod ids;
pub mod names;

pub use category::{translate_features, AaxCategory, BASE_CATEGORY, CATEGORY_TABLE};
pub use ids::{
    four_char_code, four_char_code_to_string, hash_identifier, param_identifier,
    parse_param_identifier, PARAM_IDENTIFIER_LEN,
};
pub use names::{fit_name, short_names};
