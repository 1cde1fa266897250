use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};
use std::str::FromStr as _;
use treema_model::prelude::*;

///
/// Multiplicity
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, FromStr, PartialEq, Serialize,
)]
pub enum Multiplicity {
    #[default]
    Required,
    Optional,
    List,
    Set,
}

impl Multiplicity {
    #[must_use]
    pub const fn is_collection(self) -> bool {
        matches!(self, Self::List | Self::Set)
    }

    #[must_use]
    pub const fn is_single(self) -> bool {
        !self.is_collection()
    }
}

///
/// FieldKind
///
/// Closed registry of field type kinds; the non-primitive variants
/// carry their resolved target alongside in `ResolvedField`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldKind {
    Primitive(Primitive),
    Enumeration,
    Association,
    Composition,
    Password1way,
    Password2way,
}

impl FieldKind {
    /// Parse a meta-document `type` literal.
    #[must_use]
    pub fn parse(literal: &str) -> Option<Self> {
        let kind = match literal {
            "enumeration" => Self::Enumeration,
            "association" => Self::Association,
            "composition" => Self::Composition,
            "password1way" => Self::Password1way,
            "password2way" => Self::Password2way,
            other => Self::Primitive(Primitive::from_str(other).ok()?),
        };

        Some(kind)
    }

    #[must_use]
    pub const fn is_primitive(self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    #[must_use]
    pub const fn is_password(self) -> bool {
        matches!(self, Self::Password1way | Self::Password2way)
    }

    /// Kinds that resolve a `{package, name}` target.
    #[must_use]
    pub const fn target_slot(self) -> Option<&'static str> {
        match self {
            Self::Enumeration => Some("enumeration"),
            Self::Association => Some("association"),
            Self::Composition => Some("composition"),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Enumeration => write!(f, "enumeration"),
            Self::Association => write!(f, "association"),
            Self::Composition => write!(f, "composition"),
            Self::Password1way => write!(f, "password1way"),
            Self::Password2way => write!(f, "password2way"),
        }
    }
}

///
/// ExistsIfOp
///

#[derive(Clone, Copy, Debug, Display, Eq, FromStr, PartialEq)]
pub enum ExistsIfOp {
    Equals,
    And,
    Or,
    Not,
}

///
/// Granularity
///
/// Per-field observation level. Validated, carried, not otherwise
/// interpreted by this core.
///

#[derive(Clone, Copy, Debug, Display, Eq, FromStr, PartialEq)]
pub enum Granularity {
    Entity,
    Subtree,
    Field,
}

///
/// TESTS
///
