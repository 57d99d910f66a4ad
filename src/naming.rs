//! Naming pattern engine for cached files.
//!
//! A pattern is literal text with `%` tokens:
//!
//! | Token | Value |
//! |---|---|
//! | `%n` | artifact id |
//! | `%c` | classifier |
//! | `%s` | symbolic name (artifact id when unknown) |
//! | `%v` | version |
//! | `%e` | extension |
//! | `%%` | a literal `%` |
//!
//! Patterns are parsed once into segments and applied in a single pass, so a value that itself
//! contains `%v` is never substituted again and token order does not matter.
//!
//! When there is no classifier, the separator in front of `%c` is dropped along with it:
//! `%n-%c-%v.%e` gives `foo-1.0.jar`, not `foo--1.0.jar`. The separator is the last character
//! of the literal directly before `%c` when that character is not alphanumeric. A pattern
//! starting with `%c` drops the first character of the literal after it instead. Nothing is
//! dropped when `%c` directly follows another token or an escaped `%%`.
//!
//! Snapshot versions are rewritten separately by [`normalize_version`], which is impure by
//! nature (it reads the clock). Callers normalize once per artifact and feed the result to the
//! pure [`NamingPattern::apply`].

use crate::constants::{DEFAULT_NAMING_PATTERN, SNAPSHOT_TIMESTAMP_FORMAT};
use crate::core::BundleCacheError;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Name,
    Classifier,
    SymbolicName,
    Version,
    Extension,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Token(Token),
    /// `%%`, never taken for a classifier separator
    Percent,
}

/// Values substituted into a pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamingFields<'a> {
    /// `%n`
    pub name: &'a str,
    /// `%c`
    pub classifier: Option<&'a str>,
    /// `%s`
    pub symbolic_name: Option<&'a str>,
    /// `%v`, already normalized
    pub version: &'a str,
    /// `%e`, without the dot
    pub extension: &'a str,
}

/// A parsed naming pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingPattern {
    source: String,
    segments: Vec<Segment>,
}

impl NamingPattern {
    /// Parse `pattern`, rejecting unknown tokens and a trailing `%`.
    ///
    /// ```rust
    /// use bundle_cache::naming::{NamingFields, NamingPattern};
    ///
    /// let pattern = NamingPattern::parse("%n-%c-%v.%e").unwrap();
    /// let name = pattern.apply(&NamingFields {
    ///     name: "foo",
    ///     version: "1.0",
    ///     extension: "jar",
    ///     ..NamingFields::default()
    /// });
    /// assert_eq!(name, "foo-1.0.jar");
    ///
    /// assert!(NamingPattern::parse("%n-%x").is_err());
    /// ```
    pub fn parse(pattern: &str) -> Result<Self, BundleCacheError> {
        let invalid = |reason: String| BundleCacheError::InvalidNamingPattern {
            pattern: pattern.to_string(),
            reason,
        };

        if pattern.is_empty() {
            return Err(invalid("pattern is empty".to_string()));
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            let token = match chars.next() {
                Some('n') => Some(Token::Name),
                Some('c') => Some(Token::Classifier),
                Some('s') => Some(Token::SymbolicName),
                Some('v') => Some(Token::Version),
                Some('e') => Some(Token::Extension),
                Some('%') => None,
                Some(other) => return Err(invalid(format!("unknown token %{other}"))),
                None => return Err(invalid("pattern ends with a lone %".to_string())),
            };
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(token.map_or(Segment::Percent, Segment::Token));
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    /// The pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Substitute `fields` into the pattern.
    #[must_use]
    pub fn apply(&self, fields: &NamingFields<'_>) -> String {
        let mut out = String::new();
        let mut previous_was_literal = false;
        let mut strip_next_separator = false;

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(text) => {
                    let mut text = text.as_str();
                    if strip_next_separator {
                        if let Some(first) = text.chars().next().filter(|c| !c.is_alphanumeric()) {
                            text = &text[first.len_utf8()..];
                        }
                        strip_next_separator = false;
                    }
                    out.push_str(text);
                    previous_was_literal = true;
                }
                Segment::Percent => {
                    out.push('%');
                    previous_was_literal = false;
                    strip_next_separator = false;
                }
                Segment::Token(Token::Classifier) => {
                    match fields.classifier.filter(|c| !c.is_empty()) {
                        Some(classifier) => out.push_str(classifier),
                        None if index == 0 => strip_next_separator = true,
                        None if previous_was_literal => {
                            if out.chars().last().is_some_and(|c| !c.is_alphanumeric()) {
                                out.pop();
                            }
                        }
                        None => {}
                    }
                    previous_was_literal = false;
                }
                Segment::Token(token) => {
                    out.push_str(match token {
                        Token::Name => fields.name,
                        Token::SymbolicName => fields.symbolic_name.unwrap_or(fields.name),
                        Token::Version => fields.version,
                        Token::Extension => fields.extension,
                        Token::Classifier => unreachable!("classifier handled above"),
                    });
                    previous_was_literal = false;
                }
            }
        }
        out
    }
}

impl Default for NamingPattern {
    fn default() -> Self {
        Self {
            source: DEFAULT_NAMING_PATTERN.to_string(),
            segments: vec![
                Segment::Token(Token::Name),
                Segment::Literal("-".to_string()),
                Segment::Token(Token::Classifier),
                Segment::Literal("-".to_string()),
                Segment::Token(Token::Version),
                Segment::Literal(".".to_string()),
                Segment::Token(Token::Extension),
            ],
        }
    }
}

impl FromStr for NamingPattern {
    type Err = BundleCacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NamingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

static LAST_SNAPSHOT_TIMESTAMP: AtomicU64 = AtomicU64::new(0);

/// Next snapshot timestamp, strictly greater than every previous one in this process.
fn next_snapshot_timestamp() -> u64 {
    let now = chrono::Utc::now()
        .format(SNAPSHOT_TIMESTAMP_FORMAT)
        .to_string()
        .parse::<u64>()
        .unwrap_or(0);

    let mut last = LAST_SNAPSHOT_TIMESTAMP.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_SNAPSHOT_TIMESTAMP.compare_exchange_weak(
            last,
            next,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

/// Replace the `-SNAPSHOT` suffix of `base-SNAPSHOT` with a dotted timestamp.
#[must_use]
pub fn qualify_snapshot(base: &str) -> String {
    format!("{base}.{}", next_snapshot_timestamp())
}

/// Version to use in file names: `1.2.3-SNAPSHOT` becomes `1.2.3.<timestamp>`, anything else is
/// returned unchanged.
#[must_use]
pub fn normalize_version(version: &str) -> String {
    match version.strip_suffix(SNAPSHOT_SUFFIX) {
        Some(base) => qualify_snapshot(base),
        None => version.to_string(),
    }
}
