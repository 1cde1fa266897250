use crate::{
    entity::Entity,
    password::{Password1way, Password2way},
    scalar::Scalar,
};

///
/// EnumValue
///
/// A declared enumeration value plus its resolved ordinal.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnumValue {
    pub variant: String,
    pub ordinal: u32,
}

impl EnumValue {
    #[must_use]
    pub fn new(variant: impl Into<String>, ordinal: u32) -> Self {
        Self {
            variant: variant.into(),
            ordinal,
        }
    }
}

///
/// Value
///
/// Closed hierarchy of runtime values. `Entity` is an owning
/// composition edge; `Reference` is an association carrying only the
/// target's key fields.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Entity(Box<Entity>),
    Enum(EnumValue),
    Password1way(Password1way),
    Password2way(Password2way),
    Reference(Box<Entity>),
    Scalar(Scalar),
}

impl Value {
    #[must_use]
    pub const fn as_scalar(&self) -> Option<&Scalar> {
        if let Self::Scalar(s) = self { Some(s) } else { None }
    }

    #[must_use]
    pub const fn as_entity(&self) -> Option<&Entity> {
        if let Self::Entity(e) = self { Some(e) } else { None }
    }

    #[must_use]
    pub const fn as_reference(&self) -> Option<&Entity> {
        if let Self::Reference(e) = self {
            Some(e)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_enum(&self) -> Option<&EnumValue> {
        if let Self::Enum(e) = self { Some(e) } else { None }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

impl From<EnumValue> for Value {
    fn from(value: EnumValue) -> Self {
        Self::Enum(value)
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        Self::Entity(Box::new(entity))
    }
}
