//! Generic runtime entity model: typed scalar values, reflective entities,
//! field containers, key identity, and password values.

pub mod entity;
pub mod field;
pub mod key;
pub mod password;
pub mod primitive;
pub mod scalar;
pub mod value;

use crate::{key::KeyError, password::PasswordError, primitive::CoerceError};
use thiserror::Error as ThisError;

/// Reserved separator between a field name and a side-channel name in
/// decoded keys. Declared names can never contain it.
pub const AUX_SEPARATOR: char = '@';

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        entity::Entity,
        field::{Field, SetField},
        key::{KeySource, KeyTuple},
        password::{Cipher, Hasher, Password1way, Password2way},
        primitive::Primitive,
        scalar::Scalar,
        value::{EnumValue, Value},
    };
    pub use serde::{Deserialize, Serialize};
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Coerce(#[from] CoerceError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}
