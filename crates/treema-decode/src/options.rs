///
/// Policy
///
/// What to do when a set element arrives with a duplicate or missing
/// key: abort the decode, or drop the element, record a diagnostic and
/// keep going.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Policy {
    #[default]
    Fail,
    SkipWithErrors,
}

///
/// DecodeOptions
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DecodeOptions {
    pub duplicate_keys: Policy,
    pub missing_keys: Policy,
}

impl DecodeOptions {
    /// Record every key problem as a diagnostic and keep decoding.
    #[must_use]
    pub const fn lenient() -> Self {
        Self {
            duplicate_keys: Policy::SkipWithErrors,
            missing_keys: Policy::SkipWithErrors,
        }
    }
}
