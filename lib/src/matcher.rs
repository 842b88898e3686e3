//! Ordered subsequence matching of regex tokens over output lines.

use crate::cursor::{Cursor, LineMatch};
use crate::Error;
use regex::Regex;

/// An expected token compiled for matching
///
/// Tokens match anywhere in a line, so `stlr` is found in `stlr  R1, [R10]\t# ptr`.
#[derive(Debug, Clone)]
pub struct TokenPattern {
    token: String,
    regex: Regex,
}

impl TokenPattern {
    pub fn new(token: &str) -> Result<TokenPattern, Error> {
        Ok(TokenPattern {
            token: token.to_owned(),
            regex: Regex::new(token)?,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }
}

/// Scan forward for the next line matching the pattern
pub fn skip_to<'a>(
    lines: &[&'a str],
    cursor: &mut Cursor,
    pattern: &TokenPattern,
) -> Option<LineMatch<'a>> {
    cursor.skip_to(lines, |line| pattern.is_match(line))
}

/// Match every pattern, strictly in order, starting from the cursor
///
/// On success, returns the matched lines. On failure, returns the first pattern that could not
/// be found (later patterns are never looked at).
pub fn match_in_order<'a, 'p>(
    lines: &[&'a str],
    cursor: &mut Cursor,
    patterns: &'p [TokenPattern],
) -> Result<Vec<LineMatch<'a>>, &'p TokenPattern> {
    let mut matched = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        match skip_to(lines, cursor, pattern) {
            Some(line_match) => {
                log::trace!("Matched {:?} at line {}", pattern.token(), line_match.index);
                matched.push(line_match);
            }
            None => return Err(pattern),
        }
    }
    Ok(matched)
}
