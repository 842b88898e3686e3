//! Locating a compiled method's block in `PrintOptoAssembly` output.

use crate::cursor::{Cursor, LineMatch};

/// Marker of the start of an opto assembly block
pub const BLOCK_START: &str = "{method}";

/// Marker of the line naming the compiled method
pub const METHOD_NAME: &str = "- name:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockMismatch {
    /// No `{method}` block remains
    MissingBlock,

    /// The block has no `- name:` line
    MissingName,

    /// The block is for another method (holds the offending name line)
    WrongMethod(String),
}

/// Find the next block compiled for `method` and leave the cursor just after its name line
///
/// The name check applies to the block most recently found: the cursor is never rewound
/// between finding the block start and finding the name.
pub fn find_method_block<'a>(
    lines: &[&'a str],
    cursor: &mut Cursor,
    method: &str,
) -> Result<LineMatch<'a>, BlockMismatch> {
    cursor
        .skip_to(lines, |line| line.contains(BLOCK_START))
        .ok_or(BlockMismatch::MissingBlock)?;

    let name_line = cursor
        .skip_to(lines, |line| line.contains(METHOD_NAME))
        .ok_or(BlockMismatch::MissingName)?;

    if declares_method(name_line.line, method) {
        Ok(name_line)
    } else {
        Err(BlockMismatch::WrongMethod(name_line.line.trim().to_owned()))
    }
}

/// Does a `- name:` line declare exactly this method?
///
/// The name may be quoted (`- name: 'testInt'`) and may have a trailing signature.
fn declares_method(name_line: &str, method: &str) -> bool {
    let declared = match name_line.split_once(METHOD_NAME) {
        Some((_, rest)) => rest,
        None => return false,
    };
    declared
        .split(|c: char| c.is_whitespace() || c == '\'' || c == '"' || c == '(')
        .find(|word| !word.is_empty())
        .map_or(false, |word| word == method)
}
