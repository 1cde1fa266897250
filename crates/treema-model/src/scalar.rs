use crate::primitive::Primitive;
use num_bigint::BigInt;
use rust_decimal::Decimal;
use std::fmt;
use uuid::Uuid;

///
/// Scalar
///
/// A coerced primitive payload. Variants mirror the [`Primitive`]
/// registry one-to-one.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Blob(Vec<u8>),
    Bool(bool),
    Decimal(Decimal),
    Float32(f32),
    Float64(f64),
    Int(BigInt),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Nat8(u8),
    Nat16(u16),
    Nat32(u32),
    Nat64(u64),
    Text(String),
    Timestamp(String),
    Uuid(Uuid),
}

impl Scalar {
    #[must_use]
    pub const fn primitive(&self) -> Primitive {
        match self {
            Self::Blob(_) => Primitive::Blob,
            Self::Bool(_) => Primitive::Bool,
            Self::Decimal(_) => Primitive::Decimal,
            Self::Float32(_) => Primitive::Float32,
            Self::Float64(_) => Primitive::Float64,
            Self::Int(_) => Primitive::Int,
            Self::Int8(_) => Primitive::Int8,
            Self::Int16(_) => Primitive::Int16,
            Self::Int32(_) => Primitive::Int32,
            Self::Int64(_) => Primitive::Int64,
            Self::Nat8(_) => Primitive::Nat8,
            Self::Nat16(_) => Primitive::Nat16,
            Self::Nat32(_) => Primitive::Nat32,
            Self::Nat64(_) => Primitive::Nat64,
            Self::Text(_) => Primitive::Text,
            Self::Timestamp(_) => Primitive::Timestamp,
            Self::Uuid(_) => Primitive::Uuid,
        }
    }

    #[must_use]
    pub const fn as_text(&self) -> Option<&str> {
        if let Self::Text(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        if let Self::Bool(b) = self { Some(*b) } else { None }
    }

    #[must_use]
    pub fn as_nat32(&self) -> Option<u32> {
        if let Self::Nat32(n) = self { Some(*n) } else { None }
    }

    /// Append the canonical key encoding of this scalar.
    ///
    /// A one-byte variant tag followed by a length-delimited payload.
    /// Two scalars are key-equal iff their encodings are byte-equal;
    /// floats encode as raw bits so NaN payloads stay distinguishable.
    pub fn write_key_bytes(&self, buf: &mut Vec<u8>) {
        fn delimited(buf: &mut Vec<u8>, tag: u8, bytes: &[u8]) {
            buf.push(tag);
            buf.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
            buf.extend_from_slice(bytes);
        }

        match self {
            Self::Blob(b) => delimited(buf, 0, b),
            Self::Bool(b) => delimited(buf, 1, &[u8::from(*b)]),
            Self::Decimal(d) => delimited(buf, 2, &d.serialize()),
            Self::Float32(f) => delimited(buf, 3, &f.to_bits().to_be_bytes()),
            Self::Float64(f) => delimited(buf, 4, &f.to_bits().to_be_bytes()),
            Self::Int(i) => delimited(buf, 5, &i.to_signed_bytes_be()),
            Self::Int8(i) => delimited(buf, 6, &i.to_be_bytes()),
            Self::Int16(i) => delimited(buf, 7, &i.to_be_bytes()),
            Self::Int32(i) => delimited(buf, 8, &i.to_be_bytes()),
            Self::Int64(i) => delimited(buf, 9, &i.to_be_bytes()),
            Self::Nat8(n) => delimited(buf, 10, &n.to_be_bytes()),
            Self::Nat16(n) => delimited(buf, 11, &n.to_be_bytes()),
            Self::Nat32(n) => delimited(buf, 12, &n.to_be_bytes()),
            Self::Nat64(n) => delimited(buf, 13, &n.to_be_bytes()),
            Self::Text(s) => delimited(buf, 14, s.as_bytes()),
            Self::Timestamp(s) => delimited(buf, 15, s.as_bytes()),
            Self::Uuid(u) => delimited(buf, 16, u.as_bytes()),
        }
    }

    /// Key equality via the canonical encoding.
    #[must_use]
    pub fn key_eq(&self, other: &Self) -> bool {
        let (mut a, mut b) = (Vec::new(), Vec::new());
        self.write_key_bytes(&mut a);
        other.write_key_bytes(&mut b);
        a == b
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blob(b) => write!(f, "<blob:{}>", b.len()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Float32(x) => write!(f, "{x}"),
            Self::Float64(x) => write!(f, "{x}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Int8(i) => write!(f, "{i}"),
            Self::Int16(i) => write!(f, "{i}"),
            Self::Int32(i) => write!(f, "{i}"),
            Self::Int64(i) => write!(f, "{i}"),
            Self::Nat8(n) => write!(f, "{n}"),
            Self::Nat16(n) => write!(f, "{n}"),
            Self::Nat32(n) => write!(f, "{n}"),
            Self::Nat64(n) => write!(f, "{n}"),
            Self::Text(s) | Self::Timestamp(s) => write!(f, "{s}"),
            Self::Uuid(u) => write!(f, "{u}"),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_encoding_distinguishes_variants() {
        // same logical payload, different primitive kind
        assert!(!Scalar::Int32(1).key_eq(&Scalar::Nat32(1)));
        assert!(Scalar::Int32(1).key_eq(&Scalar::Int32(1)));
    }

    #[test]
    fn key_encoding_is_unambiguous_across_lengths() {
        assert!(!Scalar::Text("ab".into()).key_eq(&Scalar::Text("a".into())));
        assert!(!Scalar::Text("a".into()).key_eq(&Scalar::Timestamp("a".into())));
    }

    proptest::proptest! {
        #[test]
        fn text_key_encoding_is_injective(a in ".*", b in ".*") {
            proptest::prop_assume!(a != b);
            proptest::prop_assert!(!Scalar::Text(a).key_eq(&Scalar::Text(b)));
        }

        #[test]
        fn int_key_encoding_is_stable(n in proptest::prelude::any::<i64>()) {
            let mut first = Vec::new();
            let mut second = Vec::new();
            Scalar::Int64(n).write_key_bytes(&mut first);
            Scalar::Int64(n).write_key_bytes(&mut second);
            proptest::prop_assert_eq!(first, second);
        }
    }
}
