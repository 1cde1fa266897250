use crate::{
    DecodeError,
    frame::{DecodeCx, Outcome, Step, Token},
};
use std::sync::Arc;
use treema_model::{
    password::{Cipher, Hasher, Password1way, Password2way},
    primitive::Primitive,
    scalar::Scalar,
    value::{EnumValue, Value},
};
use treema_schema::diag;

///
/// ScalarMode
///

enum ScalarMode {
    Primitive(Primitive),
    Enumeration { target: String },
    Password1 { hasher: Option<Arc<dyn Hasher>> },
    Password2 { cipher: Option<Arc<dyn Cipher>> },
    /// Untyped side-channel values.
    Raw,
}

///
/// ScalarFrame
///
/// Consumes exactly one value token and coerces it per its mode.
/// Coercion failures are diagnostics, never fatal, so a decode keeps
/// going past a single bad value.
///

pub(crate) struct ScalarFrame {
    path: String,
    mode: ScalarMode,
}

impl ScalarFrame {
    pub(crate) fn primitive(path: &str, primitive: Primitive) -> Self {
        Self {
            path: path.to_string(),
            mode: ScalarMode::Primitive(primitive),
        }
    }

    pub(crate) fn enumeration(path: &str, target: &str) -> Self {
        Self {
            path: path.to_string(),
            mode: ScalarMode::Enumeration {
                target: target.to_string(),
            },
        }
    }

    pub(crate) fn password1(path: &str, hasher: Option<Arc<dyn Hasher>>) -> Self {
        Self {
            path: path.to_string(),
            mode: ScalarMode::Password1 { hasher },
        }
    }

    pub(crate) fn password2(path: &str, cipher: Option<Arc<dyn Cipher>>) -> Self {
        Self {
            path: path.to_string(),
            mode: ScalarMode::Password2 { cipher },
        }
    }

    pub(crate) const fn raw(path: String) -> Self {
        Self {
            path,
            mode: ScalarMode::Raw,
        }
    }

    pub(crate) fn on_token(
        &mut self,
        token: Token<'_>,
        cx: &mut DecodeCx<'_>,
    ) -> Result<Step, DecodeError> {
        let outcome = match token {
            Token::Null => Outcome::Missing,
            Token::Text(text) | Token::Number(text) => self.from_text(text, cx)?,
            Token::Boolean(value) => self.from_bool(value, cx),
            other => return Err(other.unexpected(format!("in scalar slot '{}'", self.path))),
        };

        Ok(Step::Done(outcome))
    }

    fn from_text(&self, text: &str, cx: &mut DecodeCx<'_>) -> Result<Outcome, DecodeError> {
        let outcome = match &self.mode {
            ScalarMode::Primitive(primitive) => match primitive.coerce_text(text) {
                Ok(scalar) => Outcome::One(Value::Scalar(scalar)),
                Err(err) => {
                    diag!(cx.diags, "field '{}': {err}", self.path);
                    Outcome::Failed
                }
            },
            ScalarMode::Enumeration { target } => {
                let enumeration = cx.model.enumeration(target)?;
                match enumeration.ordinal(text) {
                    Some(ordinal) => Outcome::One(Value::Enum(EnumValue::new(text, ordinal))),
                    None => {
                        diag!(
                            cx.diags,
                            "field '{}': '{text}' is not a value of '{target}'",
                            self.path
                        );
                        Outcome::Failed
                    }
                }
            }
            ScalarMode::Password1 { hasher } => {
                let mut password = Password1way::new(hasher.clone());
                password.set_unhashed(text);
                Outcome::One(Value::Password1way(password))
            }
            ScalarMode::Password2 { cipher } => {
                let mut password = Password2way::new(cipher.clone());
                password.set_plain(text);
                Outcome::One(Value::Password2way(password))
            }
            ScalarMode::Raw => Outcome::One(Value::Scalar(Scalar::Text(text.to_string()))),
        };

        Ok(outcome)
    }

    fn from_bool(&self, value: bool, cx: &mut DecodeCx<'_>) -> Outcome {
        match &self.mode {
            ScalarMode::Primitive(primitive) => match primitive.coerce_bool(value) {
                Ok(scalar) => Outcome::One(Value::Scalar(scalar)),
                Err(err) => {
                    diag!(cx.diags, "field '{}': {err}", self.path);
                    Outcome::Failed
                }
            },
            ScalarMode::Raw => Outcome::One(Value::Scalar(Scalar::Bool(value))),
            _ => {
                diag!(
                    cx.diags,
                    "field '{}': boolean is not assignable here",
                    self.path
                );
                Outcome::Failed
            }
        }
    }
}
