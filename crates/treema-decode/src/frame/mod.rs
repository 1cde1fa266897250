//! The frame stack: one small state machine per nesting construct.
//! The top frame receives every token; frames push children for nested
//! constructs and pop themselves with an outcome the parent absorbs.

pub(crate) mod collection;
pub(crate) mod entity;
pub(crate) mod scalar;
pub(crate) mod skip;

use crate::{DecodeError, options::DecodeOptions};
use std::sync::Arc;
use treema_model::{
    entity::Entity,
    field::Field,
    password::{Cipher, Hasher},
    value::Value,
};
use treema_schema::{
    diag::Diagnostics,
    resolved::{ResolvedField, ResolvedModel, SchemaError},
    types::{FieldKind, Multiplicity},
};

///
/// Token
///
/// Internal form of one `TokenSink` call.
///

#[derive(Clone, Copy, Debug)]
pub(crate) enum Token<'a> {
    ObjectStart,
    ObjectEnd,
    ListStart,
    ListEnd,
    Key(&'a str),
    Null,
    Text(&'a str),
    Number(&'a str),
    Boolean(bool),
}

impl Token<'_> {
    pub(crate) const fn describe(self) -> &'static str {
        match self {
            Self::ObjectStart => "object start",
            Self::ObjectEnd => "object end",
            Self::ListStart => "list start",
            Self::ListEnd => "list end",
            Self::Key(_) => "key",
            Self::Null => "null",
            Self::Text(_) => "string",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
        }
    }

    pub(crate) fn unexpected(self, context: impl Into<String>) -> DecodeError {
        DecodeError::UnexpectedToken {
            token: self.describe(),
            context: context.into(),
        }
    }
}

///
/// Step
///
/// What the top frame wants done after seeing a token.
///

pub(crate) enum Step {
    /// Token consumed; same frame stays on top.
    Stay,
    /// Token consumed; child goes on top.
    Push(Frame),
    /// Child goes on top and the same token is replayed to it, so every
    /// frame consumes its own opening token.
    PushReplay(Frame),
    /// Token consumed; frame pops and the parent absorbs the outcome.
    Done(Outcome),
}

///
/// Outcome
///
/// What a popped frame hands to its parent.
///

pub(crate) enum Outcome {
    /// Explicit null; the slot stays empty.
    Missing,
    /// A diagnostic was recorded; the slot stays untouched.
    Failed,
    /// Unknown structure discarded by the skip frame.
    Skipped,
    /// One finished value.
    One(Value),
    /// A finished collection slot.
    Collection(Field),
}

///
/// DecodeCx
///
/// Shared decode state threaded to every frame: the resolved schema,
/// the policy options, the diagnostic accumulator and the entity pool.
///

pub(crate) struct DecodeCx<'m> {
    pub model: &'m ResolvedModel,
    pub options: DecodeOptions,
    pub diags: Diagnostics,
    pool: Vec<Entity>,
}

impl<'m> DecodeCx<'m> {
    pub(crate) fn new(model: &'m ResolvedModel, options: DecodeOptions) -> Self {
        Self {
            model,
            options,
            diags: Diagnostics::new(),
            pool: Vec::new(),
        }
    }

    /// A blank entity shell for `path`, reusing a pooled one if any.
    pub(crate) fn take_entity(&mut self, path: &str) -> Entity {
        match self.pool.pop() {
            Some(mut entity) => {
                entity.reset(path);
                entity
            }
            None => Entity::new(path),
        }
    }

    /// Return a discarded shell to the pool.
    pub(crate) fn recycle(&mut self, entity: Entity) {
        self.pool.push(entity);
    }
}

///
/// Slot
///
/// The per-field facts a frame needs, detached from the resolved model
/// so frames carry no borrows.
///

#[derive(Clone)]
pub(crate) struct Slot {
    pub path: String,
    pub name: String,
    pub kind: FieldKind,
    pub multiplicity: Multiplicity,
    pub target: Option<String>,
    pub hasher: Option<Arc<dyn Hasher>>,
    pub cipher: Option<Arc<dyn Cipher>>,
}

impl Slot {
    pub(crate) fn of(field: &ResolvedField) -> Self {
        Self {
            path: field.path.clone(),
            name: field.name.clone(),
            kind: field.kind,
            multiplicity: field.multiplicity,
            target: field.target.clone(),
            hasher: field.hasher.clone(),
            cipher: field.cipher.clone(),
        }
    }

    pub(crate) fn target(&self) -> Result<&str, DecodeError> {
        self.target
            .as_deref()
            .ok_or_else(|| {
                SchemaError::MissingResolvedEntity {
                    path: self.path.clone(),
                }
                .into()
            })
    }
}

///
/// Frame
///

pub(crate) enum Frame {
    Entity(Box<entity::EntityFrame>),
    Scalar(scalar::ScalarFrame),
    Collection(Box<collection::CollectionFrame>),
    Skip(skip::SkipFrame),
}

impl Frame {
    pub(crate) fn on_token(
        &mut self,
        token: Token<'_>,
        cx: &mut DecodeCx<'_>,
    ) -> Result<Step, DecodeError> {
        match self {
            Self::Entity(frame) => frame.on_token(token, cx),
            Self::Scalar(frame) => frame.on_token(token, cx),
            Self::Collection(frame) => frame.on_token(token, cx),
            Self::Skip(frame) => Ok(frame.on_token(token)),
        }
    }

    /// Take back a popped child together with its outcome. Collection
    /// frames stow the child and run it again for the next element.
    pub(crate) fn absorb(
        &mut self,
        child: Frame,
        outcome: Outcome,
        cx: &mut DecodeCx<'_>,
    ) -> Result<(), DecodeError> {
        match self {
            Self::Entity(frame) => {
                frame.absorb(outcome, cx);
                Ok(())
            }
            Self::Collection(frame) => frame.absorb(child, outcome, cx),
            // scalar and skip frames never have children
            Self::Scalar(_) | Self::Skip(_) => Ok(()),
        }
    }

    /// Restore a finished frame to its pre-first-token state.
    pub(crate) fn reset(&mut self) {
        match self {
            Self::Entity(frame) => frame.reset(),
            // scalar frames hold no progress and a finished skip frame
            // is already back at depth zero
            Self::Scalar(_) | Self::Collection(_) | Self::Skip(_) => {}
        }
    }
}

/// The value machine for one single-valued slot.
pub(crate) fn single_frame(
    slot: &Slot,
    keys_only: bool,
    cx: &mut DecodeCx<'_>,
) -> Result<Frame, DecodeError> {
    let frame = match slot.kind {
        FieldKind::Primitive(primitive) => {
            Frame::Scalar(scalar::ScalarFrame::primitive(&slot.path, primitive))
        }
        FieldKind::Enumeration => Frame::Scalar(scalar::ScalarFrame::enumeration(
            &slot.path,
            slot.target()?,
        )),
        FieldKind::Password1way => Frame::Scalar(scalar::ScalarFrame::password1(
            &slot.path,
            slot.hasher.clone(),
        )),
        FieldKind::Password2way => Frame::Scalar(scalar::ScalarFrame::password2(
            &slot.path,
            slot.cipher.clone(),
        )),
        FieldKind::Composition => {
            let target = slot.target()?.to_string();
            let shell = cx.take_entity(&target);
            Frame::Entity(Box::new(entity::EntityFrame::new(target, shell, keys_only)))
        }
        FieldKind::Association => {
            let target = slot.target()?.to_string();
            let shell = cx.take_entity(&target);
            Frame::Entity(Box::new(entity::EntityFrame::reference(target, shell)))
        }
    };

    Ok(frame)
}
