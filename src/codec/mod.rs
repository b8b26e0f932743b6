//! Reversible, alphabet-obfuscated integer codec.
//!
//! Maps an ordered sequence of `u64` values to a short printable string and
//! back, using [Sqids](https://sqids.org) over the configured alphabet with
//! Sqids' default blocklist of offensive words.
//!
//! Decoding re-encodes the result and rejects anything that is not the exact
//! canonical output. This is what makes a code issued under another alphabet
//! or minimum length fail instead of yielding a plausible wrong value.
//!
//! # Example
//!
//! ```
//! use shorten_api::codec::{Alphabet, Codec};
//!
//! let codec = Codec::new(Alphabet::default(), 6).unwrap();
//! let code = codec.encode(&[23, 42]).unwrap();
//! assert!(code.len() >= 6);
//! assert_eq!(codec.decode(&code), Some(vec![23, 42]));
//! ```

mod alphabet;

use std::collections::HashSet;

use sqids::Sqids;

pub use alphabet::{Alphabet, DEFAULT_ALPHABET, MIN_ALPHABET_LENGTH};

/// Default minimum code length.
pub const DEFAULT_MIN_LENGTH: u8 = 6;

/// Errors raised while configuring the codec or encoding.
///
/// Decoding never errors; it returns `None`.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("alphabet must contain at least {min} characters, got {len}")]
    AlphabetTooShort { len: usize, min: usize },

    #[error("alphabet contains duplicate character '{0}'")]
    DuplicateCharacter(char),

    #[error("alphabet contains unsupported character {0:?}")]
    InvalidCharacter(char),

    #[error("minimum length must be at most {max}, got {len}")]
    MinLengthTooLarge { len: usize, max: usize },

    #[error("reached max attempts to generate a code outside the blocklist")]
    BlocklistExhausted,

    #[error("invalid codec configuration: {0}")]
    Config(sqids::Error),
}

impl From<sqids::Error> for CodecError {
    fn from(err: sqids::Error) -> Self {
        match err {
            sqids::Error::BlocklistMaxAttempts => Self::BlocklistExhausted,
            other => Self::Config(other),
        }
    }
}

/// Encoder/decoder bound to one alphabet and minimum length.
///
/// Pure and immutable: share it behind an `Arc` across request workers.
#[derive(Debug, Clone)]
pub struct Codec {
    sqids: Sqids,
    alphabet: Alphabet,
    min_length: u8,
}

impl Codec {
    /// Creates a codec with Sqids' default blocklist.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Config`] if Sqids rejects the alphabet.
    pub fn new(alphabet: Alphabet, min_length: u8) -> Result<Self, CodecError> {
        let sqids = Sqids::builder()
            .alphabet(alphabet.chars())
            .min_length(min_length)
            .build()?;

        Ok(Self {
            sqids,
            alphabet,
            min_length,
        })
    }

    /// Builds a codec from raw configuration values.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if the alphabet is invalid or `min_length`
    /// exceeds 255.
    pub fn from_config(alphabet: &str, min_length: usize) -> Result<Self, CodecError> {
        let alphabet = Alphabet::new(alphabet)?;
        let min_length = u8::try_from(min_length).map_err(|_| CodecError::MinLengthTooLarge {
            len: min_length,
            max: usize::from(u8::MAX),
        })?;

        Self::new(alphabet, min_length)
    }

    /// Replaces the default blocklist with `words`.
    ///
    /// Words shorter than three characters, or using characters outside the
    /// alphabet, can never match and are dropped. Matching is
    /// case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Config`] if Sqids rejects the configuration.
    pub fn with_blocklist<I, S>(self, words: I) -> Result<Self, CodecError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let blocklist: HashSet<String> = words
            .into_iter()
            .map(|w| w.as_ref().to_string())
            .collect();

        let sqids = Sqids::builder()
            .alphabet(self.alphabet.chars())
            .min_length(self.min_length)
            .blocklist(blocklist)
            .build()?;

        Ok(Self { sqids, ..self })
    }

    pub fn min_length(&self) -> u8 {
        self.min_length
    }

    /// Encodes `numbers` into a code.
    ///
    /// An empty slice encodes to an empty string.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::BlocklistExhausted`] when every candidate
    /// contains a blocked word.
    pub fn encode(&self, numbers: &[u64]) -> Result<String, CodecError> {
        Ok(self.sqids.encode(numbers)?)
    }

    /// Decodes `code` back into the numbers it was produced from.
    ///
    /// Returns `None` for an empty code, a character outside the alphabet,
    /// an overflowing numeral, or any string this codec would not have
    /// produced itself.
    pub fn decode(&self, code: &str) -> Option<Vec<u64>> {
        let numbers = self.sqids.decode(code);
        if numbers.is_empty() {
            return None;
        }

        // Sqids skips overflowing chunks and accepts padding variants.
        match self.encode(&numbers) {
            Ok(canonical) if canonical == code => Some(numbers),
            _ => None,
        }
    }
}
