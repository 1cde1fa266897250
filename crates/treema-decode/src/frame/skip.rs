use crate::frame::{Outcome, Step, Token};

///
/// SkipFrame
///
/// Discards one value of any shape by tracking nesting depth. Unknown
/// keys route here so newer documents decode against older schemas.
///

pub(crate) struct SkipFrame {
    depth: u32,
}

impl SkipFrame {
    pub(crate) const fn new() -> Self {
        Self { depth: 0 }
    }

    pub(crate) const fn on_token(&mut self, token: Token<'_>) -> Step {
        match token {
            Token::ObjectStart | Token::ListStart => {
                self.depth += 1;
                Step::Stay
            }
            Token::ObjectEnd | Token::ListEnd => {
                self.depth = self.depth.saturating_sub(1);
                if self.depth == 0 {
                    Step::Done(Outcome::Skipped)
                } else {
                    Step::Stay
                }
            }
            Token::Null | Token::Text(_) | Token::Number(_) | Token::Boolean(_) => {
                if self.depth == 0 {
                    Step::Done(Outcome::Skipped)
                } else {
                    Step::Stay
                }
            }
            Token::Key(_) => Step::Stay,
        }
    }
}
