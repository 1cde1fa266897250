use crate::DecodeError;

///
/// TokenSink
///
/// The contract a tokenizer drives. One call per token, in document
/// order; each call returns before the next is accepted. Scalar tokens
/// carry text so numeric precision survives consumers with narrow
/// number types.
///

pub trait TokenSink {
    fn object_start(&mut self) -> Result<(), DecodeError>;
    fn object_end(&mut self) -> Result<(), DecodeError>;
    fn list_start(&mut self) -> Result<(), DecodeError>;
    fn list_end(&mut self) -> Result<(), DecodeError>;
    fn key(&mut self, name: &str) -> Result<(), DecodeError>;
    fn null_value(&mut self) -> Result<(), DecodeError>;
    fn string_value(&mut self, text: &str) -> Result<(), DecodeError>;
    fn number_value(&mut self, text: &str) -> Result<(), DecodeError>;
    fn boolean_value(&mut self, value: bool) -> Result<(), DecodeError>;
}
