//! Facade over the treema crates: the generic runtime model, the
//! meta-model resolver and the streaming decoder.
//!
//! The usual pipeline: decode a meta-model document against
//! [`schema::bootstrap::meta_schema`], [`schema::validate::resolve`]
//! it, then decode data documents against the resolved model.

pub use treema_decode as decode;
pub use treema_model as model;
pub use treema_schema as schema;

///
/// Prelude
///

pub mod prelude {
    pub use treema_decode::prelude::*;
}
