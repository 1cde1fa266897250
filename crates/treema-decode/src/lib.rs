//! The streaming decoder: a push-down automaton of small state
//! machines driven by a generic token stream, building runtime
//! entities whose shape is looked up in a resolved meta-model.

pub mod decoder;
pub mod options;
pub mod sink;

pub(crate) mod frame;


use thiserror::Error as ThisError;
use treema_schema::resolved::SchemaError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        DecodeError,
        decoder::{Decoded, Decoder},
        options::{DecodeOptions, Policy},
        sink::TokenSink,
    };
    pub use treema_schema::prelude::*;
}

///
/// DecodeError
///
/// Fatal decode faults. Policy-skipped issues and coercion failures
/// accumulate as diagnostics instead; a fatal fault means the caller
/// discards the partial model.
///

#[derive(Debug, ThisError)]
pub enum DecodeError {
    #[error("unexpected {token} {context}")]
    UnexpectedToken {
        token: &'static str,
        context: String,
    },

    #[error("duplicate key tuple in set '{path}'")]
    DuplicateKeys { path: String },

    #[error("missing key fields in '{path}': {detail}")]
    MissingKeys { path: String, detail: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
