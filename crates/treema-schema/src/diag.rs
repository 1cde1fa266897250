use std::fmt;

///
/// Diagnostics
///
/// Ordered accumulator of plain diagnostic strings. Validation and
/// decode problems are collected here and reported together; only
/// internal-consistency faults are real errors.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Diagnostics(Vec<String>);

impl Diagnostics {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    pub fn append(&mut self, other: &mut Self) {
        self.0.append(&mut other.0);
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn into_messages(self) -> Vec<String> {
        self.0
    }

    /// Test-friendly lookup: any message containing the fragment.
    #[must_use]
    pub fn any_contains(&self, fragment: &str) -> bool {
        self.0.iter().any(|m| m.contains(fragment))
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, message) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{message}")?;
        }

        Ok(())
    }
}

impl From<Diagnostics> for Vec<String> {
    fn from(diags: Diagnostics) -> Self {
        diags.0
    }
}

/// Push a formatted diagnostic.
#[macro_export]
macro_rules! diag {
    ($diags:expr, $($arg:tt)*) => {
        $diags.push(format!($($arg)*))
    };
}
