//! Validated character set used as the numeral system for short codes.

use std::collections::HashSet;

use super::CodecError;

/// Alphabet used when `SECRET_ALPHABET` is not configured.
pub const DEFAULT_ALPHABET: &str = "k3G7QAe51FCsPW92uEOyq4B";

/// Smallest accepted alphabet size.
pub const MIN_ALPHABET_LENGTH: usize = 4;

/// An ordered set of unique URL-safe characters.
///
/// Only ASCII letters, digits and `-._~` are accepted. Codes travel as the
/// last path segment of a URL and must survive it without percent-encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<u8>,
}

impl Alphabet {
    /// Validates `input` and builds an alphabet from it.
    ///
    /// # Errors
    ///
    /// - [`CodecError::InvalidCharacter`] for anything outside
    ///   `A-Za-z0-9-._~`
    /// - [`CodecError::AlphabetTooShort`] for fewer than
    ///   [`MIN_ALPHABET_LENGTH`] characters
    /// - [`CodecError::DuplicateCharacter`] if any character repeats
    pub fn new(input: &str) -> Result<Self, CodecError> {
        if let Some(c) = input.chars().find(|&c| !is_unreserved(c)) {
            return Err(CodecError::InvalidCharacter(c));
        }

        let chars = input.as_bytes().to_vec();
        if chars.len() < MIN_ALPHABET_LENGTH {
            return Err(CodecError::AlphabetTooShort {
                len: chars.len(),
                min: MIN_ALPHABET_LENGTH,
            });
        }

        let mut seen = HashSet::with_capacity(chars.len());
        if let Some(&dup) = chars.iter().find(|&&b| !seen.insert(b)) {
            return Err(CodecError::DuplicateCharacter(char::from(dup)));
        }

        Ok(Self { chars })
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> Vec<char> {
        self.chars.iter().copied().map(char::from).collect()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self {
            chars: DEFAULT_ALPHABET.as_bytes().to_vec(),
        }
    }
}

/// RFC 3986 unreserved characters.
fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_alphabet_is_valid() {
        let alphabet = Alphabet::new(DEFAULT_ALPHABET).unwrap();
        assert_eq!(alphabet.len(), 23);
        assert_eq!(alphabet, Alphabet::default());
    }

    #[test]
    fn test_rejects_short_alphabet() {
        let result = Alphabet::new("abc");
        assert!(matches!(
            result,
            Err(CodecError::AlphabetTooShort { len: 3, min: 4 })
        ));
    }

    #[test]
    fn test_rejects_duplicates() {
        let result = Alphabet::new("abcdefa");
        assert!(matches!(result, Err(CodecError::DuplicateCharacter('a'))));
    }

    #[test]
    fn test_rejects_slash_and_whitespace() {
        assert!(matches!(
            Alphabet::new("abc/def"),
            Err(CodecError::InvalidCharacter('/'))
        ));
        assert!(matches!(
            Alphabet::new("abc def"),
            Err(CodecError::InvalidCharacter(' '))
        ));
    }

    #[test]
    fn test_rejects_multibyte() {
        assert!(matches!(
            Alphabet::new("abcdé"),
            Err(CodecError::InvalidCharacter('é'))
        ));
    }

    #[test]
    fn test_rejects_url_reserved_characters() {
        for c in ['?', '#', '"', '%', '&', '+', '=', ':', '@'] {
            let input = format!("abcdefgh{c}ijk");
            assert!(
                matches!(Alphabet::new(&input), Err(CodecError::InvalidCharacter(found)) if found == c),
                "{c} accepted"
            );
        }
    }

    #[test]
    fn test_accepts_unreserved_punctuation() {
        let alphabet = Alphabet::new("abcdefgh-._~").unwrap();
        assert_eq!(alphabet.chars().len(), 12);
        assert_eq!(alphabet.chars()[8], '-');
    }
}
