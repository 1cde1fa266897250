use crate::{
    DecodeError,
    frame::{DecodeCx, Frame, Outcome, Slot, Step, Token, collection, single_frame, skip},
};
use treema_model::{AUX_SEPARATOR, entity::Entity, field::Field, value::Value};
use treema_schema::diag;

///
/// Pending
///
/// Where the next child outcome lands.
///

enum Pending {
    None,
    Field(String),
    Aux { field: String, name: String },
}

///
/// EntityFrame
///
/// Builds one entity instance. Consumes its own object-start token; a
/// null before the start is the absent composition. In reference mode
/// only key fields are kept, everything else is skipped.
///

pub(crate) struct EntityFrame {
    path: String,
    entity: Entity,
    started: bool,
    keys_only: bool,
    pending: Pending,
}

impl EntityFrame {
    pub(crate) const fn new(path: String, shell: Entity, keys_only: bool) -> Self {
        Self {
            path,
            entity: shell,
            started: false,
            keys_only,
            pending: Pending::None,
        }
    }

    pub(crate) const fn reference(path: String, shell: Entity) -> Self {
        Self::new(path, shell, true)
    }

    /// Re-arm a finished frame so it can build the next element.
    pub(crate) fn reset(&mut self) {
        self.started = false;
        self.pending = Pending::None;
        self.entity.reset(self.path.as_str());
    }

    pub(crate) fn on_token(
        &mut self,
        token: Token<'_>,
        cx: &mut DecodeCx<'_>,
    ) -> Result<Step, DecodeError> {
        if !self.started {
            return match token {
                Token::ObjectStart => {
                    self.started = true;
                    Ok(Step::Stay)
                }
                Token::Null => Ok(Step::Done(Outcome::Missing)),
                other => Err(other.unexpected(format!("at the start of '{}'", self.path))),
            };
        }

        match token {
            Token::Key(name) => self.on_key(name, cx),
            Token::ObjectEnd => {
                let value = if self.keys_only {
                    Value::Reference(Box::new(std::mem::replace(
                        &mut self.entity,
                        Entity::new(""),
                    )))
                } else {
                    Value::Entity(Box::new(std::mem::replace(
                        &mut self.entity,
                        Entity::new(""),
                    )))
                };

                Ok(Step::Done(Outcome::One(value)))
            }
            other => Err(other.unexpected(format!("inside '{}'", self.path))),
        }
    }

    fn on_key(&mut self, name: &str, cx: &mut DecodeCx<'_>) -> Result<Step, DecodeError> {
        let resolved = cx.model.entity(&self.path)?;

        // `name@aux` routes a side-channel scalar to the field's aux list
        if let Some((field_name, aux_name)) = name.split_once(AUX_SEPARATOR) {
            // aux on fields this frame does not keep rides the same
            // schema-evolution path as the field itself
            let kept = resolved
                .field(field_name)
                .is_some_and(|field| !self.keys_only || field.is_key);
            if !kept {
                self.pending = Pending::None;
                return Ok(Step::Push(Frame::Skip(skip::SkipFrame::new())));
            }

            self.pending = Pending::Aux {
                field: field_name.to_string(),
                name: aux_name.to_string(),
            };

            return Ok(Step::Push(Frame::Scalar(super::scalar::ScalarFrame::raw(
                format!("{}/{field_name}", self.path),
            ))));
        }

        let Some(field) = resolved.field(name) else {
            // unknown keys are schema evolution, not errors
            self.pending = Pending::None;
            return Ok(Step::Push(Frame::Skip(skip::SkipFrame::new())));
        };
        let slot = Slot::of(field);

        if self.keys_only && !field.is_key {
            self.pending = Pending::None;
            return Ok(Step::Push(Frame::Skip(skip::SkipFrame::new())));
        }

        self.pending = Pending::Field(slot.name.clone());

        if slot.multiplicity.is_collection() {
            return Ok(Step::Push(Frame::Collection(Box::new(
                collection::CollectionFrame::new(slot),
            ))));
        }

        Ok(Step::Push(single_frame(&slot, self.keys_only, cx)?))
    }

    pub(crate) fn absorb(&mut self, outcome: Outcome, cx: &mut DecodeCx<'_>) {
        let pending = std::mem::replace(&mut self.pending, Pending::None);

        match (pending, outcome) {
            (Pending::Field(name), Outcome::One(value)) => {
                self.place(name, Field::single(value));
            }
            (Pending::Field(name), Outcome::Collection(field)) => {
                self.place(name, field);
            }
            (Pending::Field(name), Outcome::Missing) => {
                self.place(name, Field::empty_single());
            }
            (Pending::Aux { field, name }, Outcome::One(Value::Scalar(scalar))) => {
                self.entity
                    .fields_mut()
                    .get_or_insert_with(&field, Field::empty_single)
                    .aux_mut()
                    .push(name, scalar);
            }
            (Pending::Aux { field, name }, Outcome::One(_)) => {
                diag!(
                    cx.diags,
                    "aux '{name}' on '{}/{field}' must be a scalar",
                    self.path
                );
            }
            // failed or skipped children leave the slot untouched
            _ => {}
        }
    }

    // A side channel may land before the value it annotates; freshly
    // built fields carry no aux yet, so the earlier list moves over.
    fn place(&mut self, name: String, mut field: Field) {
        if let Some(earlier) = self.entity.field_mut(&name) {
            std::mem::swap(earlier.aux_mut(), field.aux_mut());
        }

        self.entity.set(name, field);
    }
}
