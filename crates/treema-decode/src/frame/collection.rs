use crate::{
    DecodeError,
    frame::{DecodeCx, Frame, Outcome, Slot, Step, Token, single_frame},
    options::Policy,
};
use treema_model::{
    field::{Field, ListField, SetField, SetInsertError},
    key::{KeyError, KeyTuple},
    value::Value,
};
use treema_schema::{diag, types::Multiplicity};

///
/// CollectionFrame
///
/// Wraps a list or set slot. A collection is always an explicit
/// list-start/list-end pair, never null; set elements are placed by
/// their flattened key tuple, with the duplicate/missing-key policies
/// deciding between aborting and skip-with-diagnostic. One element
/// machine serves every element, reset between runs.
///

pub(crate) struct CollectionFrame {
    slot: Slot,
    started: bool,
    out: Field,
    element: Option<Frame>,
}

impl CollectionFrame {
    pub(crate) fn new(slot: Slot) -> Self {
        let out = if slot.multiplicity == Multiplicity::Set {
            Field::set(SetField::new())
        } else {
            Field::List(ListField::default())
        };

        Self {
            slot,
            started: false,
            out,
            element: None,
        }
    }

    pub(crate) fn on_token(
        &mut self,
        token: Token<'_>,
        cx: &mut DecodeCx<'_>,
    ) -> Result<Step, DecodeError> {
        if !self.started {
            return match token {
                Token::ListStart => {
                    self.started = true;
                    Ok(Step::Stay)
                }
                Token::Null => {
                    diag!(
                        cx.diags,
                        "field '{}' must be an explicit collection, not null",
                        self.slot.path
                    );
                    Ok(Step::Done(Outcome::Skipped))
                }
                other => Err(other.unexpected(format!("at collection '{}'", self.slot.path))),
            };
        }

        match token {
            Token::ListEnd => Ok(Step::Done(Outcome::Collection(std::mem::replace(
                &mut self.out,
                Field::List(ListField::default()),
            )))),
            // the element machine consumes its own opening token
            _ => {
                let element = match self.element.take() {
                    Some(mut element) => {
                        element.reset();
                        element
                    }
                    None => single_frame(&self.slot, false, cx)?,
                };

                Ok(Step::PushReplay(element))
            }
        }
    }

    pub(crate) fn absorb(
        &mut self,
        element: Frame,
        outcome: Outcome,
        cx: &mut DecodeCx<'_>,
    ) -> Result<(), DecodeError> {
        self.element = Some(element);

        match outcome {
            Outcome::One(value) => self.accept(value, cx),
            Outcome::Missing => {
                diag!(
                    cx.diags,
                    "field '{}' holds a null element",
                    self.slot.path
                );
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn accept(&mut self, value: Value, cx: &mut DecodeCx<'_>) -> Result<(), DecodeError> {
        let Field::Set(set) = &mut self.out else {
            if let Field::List(list) = &mut self.out {
                list.values.push(value);
            }
            return Ok(());
        };

        let Value::Entity(entity) = value else {
            diag!(cx.diags, "field '{}' set elements must be entities", self.slot.path);
            return Ok(());
        };

        let key = match KeyTuple::of(&entity, cx.model) {
            Ok(key) => key,
            Err(err @ (KeyError::MissingKeyField { .. } | KeyError::UnknownEntity { .. })) => {
                return match cx.options.missing_keys {
                    Policy::Fail => Err(DecodeError::MissingKeys {
                        path: self.slot.path.clone(),
                        detail: err.to_string(),
                    }),
                    Policy::SkipWithErrors => {
                        diag!(cx.diags, "field '{}': {err}", self.slot.path);
                        cx.recycle(*entity);
                        Ok(())
                    }
                };
            }
            Err(err) => {
                diag!(cx.diags, "field '{}': {err}", self.slot.path);
                cx.recycle(*entity);
                return Ok(());
            }
        };

        match set.insert(key, Value::Entity(entity)) {
            Ok(()) => Ok(()),
            Err(SetInsertError::DuplicateKey) => match cx.options.duplicate_keys {
                Policy::Fail => Err(DecodeError::DuplicateKeys {
                    path: self.slot.path.clone(),
                }),
                Policy::SkipWithErrors => {
                    diag!(
                        cx.diags,
                        "field '{}' received a duplicate key tuple",
                        self.slot.path
                    );
                    Ok(())
                }
            },
            Err(SetInsertError::EmptyKey) => match cx.options.missing_keys {
                Policy::Fail => Err(DecodeError::MissingKeys {
                    path: self.slot.path.clone(),
                    detail: "element key tuple is empty".to_string(),
                }),
                Policy::SkipWithErrors => {
                    diag!(
                        cx.diags,
                        "field '{}' received an element with an empty key tuple",
                        self.slot.path
                    );
                    Ok(())
                }
            },
        }
    }
}
