//! Converter option strings.
//!
//! Options are supplied as a single shell-style string and tokenized once,
//! when the job is built, so malformed quoting is reported before any
//! directory is touched.

use std::fmt;
use std::str::FromStr;

use crate::error::ConversionError;

/// Options passed to `dcm2niix` when the caller does not provide any:
/// BIDS sidecars, anonymised sidecars, gzip output and the
/// `series_folder_protocol_time` file name pattern.
pub const DEFAULT_OPTIONS: &str = "-b y -ba y -z y -f '%3s_%f_%p_%t'";

/// A validated, tokenized converter option string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterOptions {
    raw: String,
    tokens: Vec<String>,
}

impl ConverterOptions {
    /// Tokenize `raw` following POSIX shell quoting rules.
    ///
    /// A `#` is an ordinary character, not the start of a comment, so
    /// `-f #%s` keeps both tokens.
    pub fn parse(raw: &str) -> Result<Self, ConversionError> {
        let tokens = shell_words::split(&escape_comment_marks(raw)).map_err(|source| {
            ConversionError::InvalidOptions {
                options: raw.to_string(),
                source,
            }
        })?;
        Ok(Self {
            raw: raw.to_string(),
            tokens,
        })
    }

    /// The string as originally supplied.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

/// Backslash-escape every unquoted `#` that starts a word, so the tokenizer
/// keeps it literally instead of dropping the rest of the line.
fn escape_comment_marks(raw: &str) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum Quote {
        None,
        Single,
        Double,
    }

    let mut escaped = String::with_capacity(raw.len());
    let mut quote = Quote::None;
    let mut word_start = true;
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match (quote, c) {
            (Quote::None, '#') if word_start => escaped.push_str("\\#"),
            (Quote::None | Quote::Double, '\\') => {
                escaped.push(c);
                if let Some(next) = chars.next() {
                    escaped.push(next);
                }
            }
            (Quote::None, '\'') => {
                quote = Quote::Single;
                escaped.push(c);
            }
            (Quote::None, '"') => {
                quote = Quote::Double;
                escaped.push(c);
            }
            (Quote::Single, '\'') | (Quote::Double, '"') => {
                quote = Quote::None;
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
        word_start = quote == Quote::None && c.is_whitespace();
    }
    escaped
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            raw: DEFAULT_OPTIONS.to_string(),
            tokens: ["-b", "y", "-ba", "y", "-z", "y", "-f", "%3s_%f_%p_%t"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl FromStr for ConverterOptions {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ConverterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn default_matches_parsed_constant() {
        let parsed = ConverterOptions::parse(DEFAULT_OPTIONS).expect("default must parse");
        assert_eq!(parsed, ConverterOptions::default());
    }

    #[test]
    fn quoted_argument_stays_single_token() {
        let opts = ConverterOptions::parse(r#"-z y -f "%p %s""#).expect("parse");
        assert_eq!(opts.tokens(), ["-z", "y", "-f", "%p %s"]);
    }

    #[test]
    fn empty_string_yields_no_tokens() {
        let opts = ConverterOptions::parse("   ").expect("parse");
        assert!(opts.tokens().is_empty());
        assert_eq!(opts.as_str(), "   ");
    }

    #[test]
    fn unterminated_quote_is_rejected() {
        let result = ConverterOptions::parse("-f '%p_%s");
        assert_matches!(
            result,
            Err(ConversionError::InvalidOptions { ref options, .. }) if options == "-f '%p_%s"
        );
    }

    #[test]
    fn hash_is_kept_as_a_literal_character() {
        let opts = ConverterOptions::parse("-f a #b -z y").expect("parse");
        assert_eq!(opts.tokens(), ["-f", "a", "#b", "-z", "y"]);
        assert_eq!(opts.as_str(), "-f a #b -z y");
    }

    #[test]
    fn hash_inside_quotes_and_words_is_untouched() {
        let opts = ConverterOptions::parse(r#"-f '#%p' -x "a #b" c#d \#e"#).expect("parse");
        assert_eq!(opts.tokens(), ["-f", "#%p", "-x", "a #b", "c#d", "#e"]);
    }

    #[test]
    fn from_str_delegates_to_parse() {
        let opts: ConverterOptions = "-z n".parse().expect("parse");
        assert_eq!(opts.tokens(), ["-z", "n"]);
        assert_eq!(opts.to_string(), "-z n");
    }
}
