use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_SYMBOL_LEN: usize = 10;

/// Ticker symbol extracted from a `company` entity, upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_uppercase();
        let mut chars = normalized.chars();

        let Some(first) = chars.next() else {
            return Err(ValidationError::EmptySymbol);
        };
        if !first.is_ascii_alphabetic() {
            return Err(ValidationError::SymbolInvalidStart { ch: first });
        }

        let len = normalized.chars().count();
        if len > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_SYMBOL_LEN,
            });
        }

        if let Some((index, ch)) = normalized
            .char_indices()
            .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-')))
        {
            return Err(ValidationError::SymbolInvalidChar { ch, index });
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_company_token() {
        assert_eq!(Symbol::parse(" aapl ").expect("valid").as_str(), "AAPL");
        assert_eq!(Symbol::parse("brk.b").expect("valid").as_str(), "BRK.B");
    }

    #[test]
    fn rejects_blank_and_malformed_tokens() {
        assert_eq!(Symbol::parse("   "), Err(ValidationError::EmptySymbol));
        assert!(matches!(
            Symbol::parse("3M"),
            Err(ValidationError::SymbolInvalidStart { ch: '3' })
        ));
        assert!(matches!(
            Symbol::parse("AAPL INC"),
            Err(ValidationError::SymbolInvalidChar { ch: ' ', index: 4 })
        ));
        assert!(matches!(
            Symbol::parse("ABCDEFGHIJK"),
            Err(ValidationError::SymbolTooLong { len: 11, .. })
        ));
    }
}
