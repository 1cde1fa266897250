//! Meta-model vocabulary, the multi-pass resolver, the immutable
//! resolved layer, and the hand-built meta-meta-model bootstrap.

pub mod bootstrap;
pub mod diag;
pub(crate) mod meta;
pub mod resolved;
pub mod types;
pub mod validate;

#[cfg(test)]
pub(crate) mod testing;

use crate::resolved::SchemaError;
use thiserror::Error as ThisError;

/// Field numbers follow a proto3-like range.
pub const FIELD_NUMBER_MIN: u32 = 1;
pub const FIELD_NUMBER_MAX: u32 = 536_870_911;

/// Reserved field-number band; nothing may be declared inside it.
pub const RESERVED_NUMBER_MIN: u32 = 19_000;
pub const RESERVED_NUMBER_MAX: u32 = 19_999;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        bootstrap::meta_schema,
        diag::Diagnostics,
        resolved::{
            ExistsIf, ResolvedEntity, ResolvedEnum, ResolvedField, ResolvedModel, Services, Unique,
        },
        types::{FieldKind, Granularity, Multiplicity},
        validate::resolve,
    };
    pub use treema_model::prelude::*;
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Model(#[from] treema_model::Error),
}
