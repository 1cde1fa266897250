use sha2::{Digest, Sha256};
use std::{fmt, sync::Arc};
use thiserror::Error as ThisError;

///
/// PasswordError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PasswordError {
    #[error("password slot is empty")]
    Empty,

    #[error("no cipher is wired for an encrypted password")]
    NoCipher,

    #[error("stored version {stored} does not match service version {current}")]
    VersionMismatch { stored: u32, current: u32 },

    #[error("decryption failed")]
    DecryptFailed,
}

///
/// Hasher
///
/// One-way password service. Supplied once at meta-model validation time
/// and attached only to password fields.
///

pub trait Hasher: Send + Sync {
    fn version(&self) -> u32;
    fn hash(&self, plaintext: &str) -> String;
    fn verify(&self, plaintext: &str, digest: &str) -> bool;
}

///
/// Cipher
///
/// Reversible password service.
///

pub trait Cipher: Send + Sync {
    fn version(&self) -> u32;
    fn encrypt(&self, plaintext: &str) -> String;
    fn decrypt(&self, ciphertext: &str) -> Result<String, PasswordError>;
}

///
/// Sha256Hasher
///
/// Stock hasher; hex-encoded SHA-256 digests.
///

#[derive(Clone, Copy, Debug)]
pub struct Sha256Hasher {
    pub version: u32,
}

impl Sha256Hasher {
    #[must_use]
    pub const fn new(version: u32) -> Self {
        Self { version }
    }
}

impl Hasher for Sha256Hasher {
    fn version(&self) -> u32 {
        self.version
    }

    fn hash(&self, plaintext: &str) -> String {
        let digest = Sha256::digest(plaintext.as_bytes());
        let mut out = String::with_capacity(digest.len() * 2);
        for byte in digest {
            out.push_str(&format!("{byte:02x}"));
        }

        out
    }

    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        self.hash(plaintext) == digest
    }
}

///
/// OneWaySlot
///
/// Holds exactly one of plaintext or digest+version, never both.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
enum OneWaySlot {
    #[default]
    Empty,
    Plain(String),
    Hashed {
        digest: String,
        version: u32,
    },
}

///
/// Password1way
///

#[derive(Clone, Default)]
pub struct Password1way {
    hasher: Option<Arc<dyn Hasher>>,
    slot: OneWaySlot,
}

impl Password1way {
    #[must_use]
    pub const fn new(hasher: Option<Arc<dyn Hasher>>) -> Self {
        Self {
            hasher,
            slot: OneWaySlot::Empty,
        }
    }

    /// Store a plaintext password.
    ///
    /// When a hasher is wired the plaintext is hashed immediately and
    /// discarded; the slot then carries digest + hasher version.
    pub fn set_unhashed(&mut self, plaintext: &str) {
        self.slot = match &self.hasher {
            Some(hasher) => OneWaySlot::Hashed {
                digest: hasher.hash(plaintext),
                version: hasher.version(),
            },
            None => OneWaySlot::Plain(plaintext.to_string()),
        };
    }

    /// Store an already-hashed digest as-is.
    pub fn set_hashed(&mut self, digest: impl Into<String>, version: u32) {
        self.slot = OneWaySlot::Hashed {
            digest: digest.into(),
            version,
        };
    }

    /// Verify a candidate against the stored digest.
    ///
    /// Succeeds only when a hasher is wired, the stored version equals
    /// the hasher's current version, and the hasher accepts the
    /// candidate.
    #[must_use]
    pub fn verify(&self, candidate: &str) -> bool {
        match (&self.hasher, &self.slot) {
            (Some(hasher), OneWaySlot::Hashed { digest, version }) => {
                *version == hasher.version() && hasher.verify(candidate, digest)
            }
            _ => false,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.slot, OneWaySlot::Empty)
    }

    #[must_use]
    pub const fn plaintext(&self) -> Option<&String> {
        if let OneWaySlot::Plain(p) = &self.slot {
            Some(p)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn digest(&self) -> Option<(&String, u32)> {
        if let OneWaySlot::Hashed { digest, version } = &self.slot {
            Some((digest, *version))
        } else {
            None
        }
    }
}

impl fmt::Debug for Password1way {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Password1way")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Password1way {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot
    }
}

///
/// TwoWaySlot
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
enum TwoWaySlot {
    #[default]
    Empty,
    Plain(String),
    Encrypted {
        ciphertext: String,
        version: u32,
    },
}

///
/// Password2way
///

#[derive(Clone, Default)]
pub struct Password2way {
    cipher: Option<Arc<dyn Cipher>>,
    slot: TwoWaySlot,
}

impl Password2way {
    #[must_use]
    pub const fn new(cipher: Option<Arc<dyn Cipher>>) -> Self {
        Self {
            cipher,
            slot: TwoWaySlot::Empty,
        }
    }

    /// Store a plaintext password, encrypting immediately when a cipher
    /// is wired.
    pub fn set_plain(&mut self, plaintext: &str) {
        self.slot = match &self.cipher {
            Some(cipher) => TwoWaySlot::Encrypted {
                ciphertext: cipher.encrypt(plaintext),
                version: cipher.version(),
            },
            None => TwoWaySlot::Plain(plaintext.to_string()),
        };
    }

    /// Store already-encrypted ciphertext as-is.
    pub fn set_encrypted(&mut self, ciphertext: impl Into<String>, version: u32) {
        self.slot = TwoWaySlot::Encrypted {
            ciphertext: ciphertext.into(),
            version,
        };
    }

    /// Recover the plaintext.
    ///
    /// Plaintext slots return directly; encrypted slots decrypt only if
    /// the stored version matches the wired cipher's current version.
    pub fn decrypt(&self) -> Result<String, PasswordError> {
        match &self.slot {
            TwoWaySlot::Empty => Err(PasswordError::Empty),
            TwoWaySlot::Plain(p) => Ok(p.clone()),
            TwoWaySlot::Encrypted {
                ciphertext,
                version,
            } => {
                let cipher = self.cipher.as_ref().ok_or(PasswordError::NoCipher)?;
                if *version != cipher.version() {
                    return Err(PasswordError::VersionMismatch {
                        stored: *version,
                        current: cipher.version(),
                    });
                }

                cipher.decrypt(ciphertext)
            }
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.slot, TwoWaySlot::Empty)
    }

    #[must_use]
    pub const fn ciphertext(&self) -> Option<(&String, u32)> {
        if let TwoWaySlot::Encrypted {
            ciphertext,
            version,
        } = &self.slot
        {
            Some((ciphertext, *version))
        } else {
            None
        }
    }
}

impl fmt::Debug for Password2way {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Password2way")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Password2way {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot
    }
}

///
/// TESTS
///
