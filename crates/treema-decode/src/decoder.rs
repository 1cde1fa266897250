use crate::{
    DecodeError,
    frame::{DecodeCx, Frame, Outcome, Step, Token, entity::EntityFrame},
    options::DecodeOptions,
    sink::TokenSink,
};
use log::debug;
use treema_model::{entity::Entity, value::Value};
use treema_schema::{diag, diag::Diagnostics, resolved::ResolvedModel};

///
/// Decoded
///
/// The result of one finished decode: the built root entity (absent if
/// the document was null or every attempt failed) plus the ordered
/// diagnostics gathered along the way.
///

#[derive(Debug)]
pub struct Decoded {
    pub root: Option<Entity>,
    pub diagnostics: Diagnostics,
}

impl Decoded {
    /// A usable root with no recorded problems.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.root.is_some() && self.diagnostics.is_empty()
    }
}

///
/// Decoder
///
/// One decode pass over one document. The frame stack mirrors the
/// document's nesting; the host call stack never recurses. A fatal
/// `DecodeError` from any sink call leaves the partial model behind;
/// there is no rollback.
///

pub struct Decoder<'m> {
    stack: Vec<Frame>,
    cx: DecodeCx<'m>,
    root: Option<Entity>,
    finished: bool,
}

impl<'m> Decoder<'m> {
    pub fn new(model: &'m ResolvedModel, options: DecodeOptions) -> Result<Self, DecodeError> {
        // surface a bad root before the first token arrives
        model.entity(model.root())?;

        let mut cx = DecodeCx::new(model, options);
        let root_path = model.root().to_string();
        let shell = cx.take_entity(&root_path);

        Ok(Self {
            stack: vec![Frame::Entity(Box::new(EntityFrame::new(
                root_path, shell, false,
            )))],
            cx,
            root: None,
            finished: false,
        })
    }

    /// Finish the decode and take the result.
    pub fn finish(mut self) -> Decoded {
        if !self.finished {
            diag!(
                self.cx.diags,
                "token stream ended inside an open construct"
            );
        }

        debug!(
            "decode finished with {} diagnostics",
            self.cx.diags.len()
        );

        Decoded {
            root: self.root,
            diagnostics: self.cx.diags,
        }
    }

    fn push(&mut self, token: Token<'_>) -> Result<(), DecodeError> {
        let mut replay = true;
        while replay {
            let Some(top) = self.stack.last_mut() else {
                return Err(token.unexpected("after the document ended"));
            };

            replay = false;
            match top.on_token(token, &mut self.cx)? {
                Step::Stay => {}
                Step::Push(frame) => self.stack.push(frame),
                Step::PushReplay(frame) => {
                    self.stack.push(frame);
                    replay = true;
                }
                Step::Done(outcome) => {
                    if let Some(child) = self.stack.pop() {
                        match self.stack.last_mut() {
                            Some(parent) => parent.absorb(child, outcome, &mut self.cx)?,
                            None => self.complete(outcome),
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn complete(&mut self, outcome: Outcome) {
        self.finished = true;
        if let Outcome::One(Value::Entity(entity)) = outcome {
            self.root = Some(*entity);
        }
    }
}

impl TokenSink for Decoder<'_> {
    fn object_start(&mut self) -> Result<(), DecodeError> {
        self.push(Token::ObjectStart)
    }

    fn object_end(&mut self) -> Result<(), DecodeError> {
        self.push(Token::ObjectEnd)
    }

    fn list_start(&mut self) -> Result<(), DecodeError> {
        self.push(Token::ListStart)
    }

    fn list_end(&mut self) -> Result<(), DecodeError> {
        self.push(Token::ListEnd)
    }

    fn key(&mut self, name: &str) -> Result<(), DecodeError> {
        self.push(Token::Key(name))
    }

    fn null_value(&mut self) -> Result<(), DecodeError> {
        self.push(Token::Null)
    }

    fn string_value(&mut self, text: &str) -> Result<(), DecodeError> {
        self.push(Token::Text(text))
    }

    fn number_value(&mut self, text: &str) -> Result<(), DecodeError> {
        self.push(Token::Number(text))
    }

    fn boolean_value(&mut self, value: bool) -> Result<(), DecodeError> {
        self.push(Token::Boolean(value))
    }
}
