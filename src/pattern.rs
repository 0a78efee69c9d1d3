// src/pattern.rs

//! Match expression parsing and line matching.
//!
//! A matchexpr is the textual form `/body/flags`, e.g. `/complete/gi` or
//! `/^error:/`. The body compiles with the `regex` crate; flags map onto
//! `RegexBuilder` options. Rust's regex engine keeps no cursor state between
//! calls, so the JS-style `g` flag is accepted and ignored; repeated
//! `is_match` calls on independent lines are order-independent by
//! construction.

use regex::RegexBuilder;

use crate::errors::{OutwatchError, Result};

/// Flags applied when the matchexpr carries none, e.g. `/error/`.
const DEFAULT_FLAGS: &str = "gi";

/// A compiled match expression. Immutable once built.
#[derive(Debug, Clone)]
pub struct MatchExpr {
    regex: regex::Regex,
    source: String,
    flags: String,
}

impl MatchExpr {
    /// Parse a `/body/flags` string into a compiled expression.
    ///
    /// Fails with [`OutwatchError::InvalidPattern`] when the string is not of
    /// the two-slash shape, carries an unknown flag character, or the body
    /// does not compile.
    pub fn parse(matchexpr: &str) -> Result<Self> {
        let invalid = || OutwatchError::InvalidPattern(matchexpr.to_string());

        let rest = matchexpr.strip_prefix('/').ok_or_else(invalid)?;
        // Flags cannot contain '/', so split on the last slash: everything
        // before is the body (which may itself contain escaped slashes).
        let split = rest.rfind('/').ok_or_else(invalid)?;
        let (body, flags) = (&rest[..split], &rest[split + 1..]);

        let flags = if flags.is_empty() { DEFAULT_FLAGS } else { flags };

        let mut builder = RegexBuilder::new(body);
        for flag in flags.chars() {
            match flag {
                // Stateless engine; nothing to carry between calls.
                'g' => {}
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'x' => {
                    builder.ignore_whitespace(true);
                }
                'u' => {
                    builder.unicode(true);
                }
                _ => return Err(invalid()),
            }
        }

        let regex = builder.build().map_err(|_| invalid())?;

        Ok(Self {
            regex,
            source: body.to_string(),
            flags: flags.to_string(),
        })
    }

    /// Test a single line. Pure; no state is carried between calls.
    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }

    /// The pattern body as written between the slashes.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The effective flags (after defaulting).
    pub fn flags(&self) -> &str {
        &self.flags
    }
}

impl std::fmt::Display for MatchExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}
