use crate::scalar::Scalar;
use derive_more::{Display, FromStr};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use uuid::Uuid;

///
/// CoerceError
///
/// A literal could not be converted to a primitive representation.
/// Always recoverable; callers fold it into their diagnostic list.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("value '{literal}' is not assignable to {primitive}")]
pub struct CoerceError {
    pub primitive: Primitive,
    pub literal: String,
}

impl CoerceError {
    fn new(primitive: Primitive, literal: impl Into<String>) -> Self {
        Self {
            primitive,
            literal: literal.into(),
        }
    }
}

///
/// Primitive
///
/// Closed registry of primitive field kinds. `Int` is the unbounded
/// signed integer; `Timestamp` is a 64-bit instant carried as text so
/// numeric-limited consumers never lose precision.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, Hash, PartialEq, Serialize,
)]
#[remain::sorted]
pub enum Primitive {
    Blob,
    Bool,
    Decimal,
    Float32,
    Float64,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Nat8,
    Nat16,
    Nat32,
    Nat64,
    Text,
    Timestamp,
    Uuid,
}

impl Primitive {
    #[must_use]
    pub const fn is_signed_int(self) -> bool {
        matches!(
            self,
            Self::Int | Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64
        )
    }

    #[must_use]
    pub const fn is_unsigned_int(self) -> bool {
        matches!(self, Self::Nat8 | Self::Nat16 | Self::Nat32 | Self::Nat64)
    }

    #[must_use]
    pub const fn is_int(self) -> bool {
        self.is_signed_int() || self.is_unsigned_int()
    }

    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        self.is_int() || self.is_float() || matches!(self, Self::Decimal)
    }

    ///
    /// COERCION
    ///
    /// The single routine mapping textual literals to scalar payloads.
    /// Both the decoder and `exists_if` literal validation route through
    /// here so the two surfaces can never disagree.
    ///

    pub fn coerce_text(self, literal: &str) -> Result<Scalar, CoerceError> {
        let fail = || CoerceError::new(self, literal);

        let scalar = match self {
            Self::Blob => {
                use base64::Engine;
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(literal)
                    .map_err(|_| fail())?;
                Scalar::Blob(bytes)
            }
            Self::Bool => match literal {
                "true" => Scalar::Bool(true),
                "false" => Scalar::Bool(false),
                _ => return Err(fail()),
            },
            Self::Decimal => Scalar::Decimal(literal.parse::<Decimal>().map_err(|_| fail())?),
            Self::Float32 => Scalar::Float32(literal.parse::<f32>().map_err(|_| fail())?),
            Self::Float64 => Scalar::Float64(literal.parse::<f64>().map_err(|_| fail())?),
            Self::Int => Scalar::Int(literal.parse::<BigInt>().map_err(|_| fail())?),
            Self::Int8 => Scalar::Int8(literal.parse::<i8>().map_err(|_| fail())?),
            Self::Int16 => Scalar::Int16(literal.parse::<i16>().map_err(|_| fail())?),
            Self::Int32 => Scalar::Int32(literal.parse::<i32>().map_err(|_| fail())?),
            Self::Int64 => Scalar::Int64(literal.parse::<i64>().map_err(|_| fail())?),
            Self::Nat8 => Scalar::Nat8(literal.parse::<u8>().map_err(|_| fail())?),
            Self::Nat16 => Scalar::Nat16(literal.parse::<u16>().map_err(|_| fail())?),
            Self::Nat32 => Scalar::Nat32(literal.parse::<u32>().map_err(|_| fail())?),
            Self::Nat64 => Scalar::Nat64(literal.parse::<u64>().map_err(|_| fail())?),
            Self::Text => Scalar::Text(literal.to_string()),
            Self::Timestamp => {
                // stored as text; must still be a valid 64-bit instant
                literal.parse::<i64>().map_err(|_| fail())?;
                Scalar::Timestamp(literal.to_string())
            }
            Self::Uuid => Scalar::Uuid(Uuid::parse_str(literal).map_err(|_| fail())?),
        };

        Ok(scalar)
    }

    pub fn coerce_bool(self, value: bool) -> Result<Scalar, CoerceError> {
        if matches!(self, Self::Bool) {
            Ok(Scalar::Bool(value))
        } else {
            Err(CoerceError::new(self, value.to_string()))
        }
    }
}

///
/// TESTS
///
