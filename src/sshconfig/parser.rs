//! Line scanner for SSH config host blocks
//!
//! Locates the managed alias block without pulling in a full ssh_config
//! parser: a block is the `Host <alias>` header line plus the maximal
//! contiguous run of immediately-following indented lines. Blank lines and
//! unindented lines end the block.

use std::ops::Range;

use super::types::{HostBlock, CONTROLLED_KEYS};

/// Scanner states for a single pass over the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Looking for the header line
    SeekHeader,
    /// Inside the matched block, extending over indented lines
    InBlock,
    /// Block complete, remaining lines are untouched
    Done,
}

/// Byte span and parsed settings of one matched block
#[derive(Debug)]
pub struct BlockMatch {
    /// Span of the block within the scanned content, header included
    pub span: Range<usize>,

    /// Settings parsed from the block's indented lines
    pub block: HostBlock,
}

/// Find the first block registered under `alias`
///
/// The header must be exactly `Host <alias>` with no leading whitespace;
/// trailing whitespace is ignored. Wildcard patterns never match.
pub fn find_block(content: &str, alias: &str) -> Option<BlockMatch> {
    let header = format!("Host {}", alias);
    let mut state = ScanState::SeekHeader;
    let mut block = HostBlock::new(alias);
    let mut span = 0..0;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let text = line.trim_end();
        match state {
            ScanState::SeekHeader => {
                if text == header {
                    span = offset..offset + line.len();
                    state = ScanState::InBlock;
                }
            }
            ScanState::InBlock => {
                if line.starts_with([' ', '\t']) && !text.is_empty() {
                    if let Some((key, value)) = split_setting(text) {
                        block.insert(key, value);
                    }
                    span.end = offset + line.len();
                } else {
                    state = ScanState::Done;
                }
            }
            ScanState::Done => break,
        }
        offset += line.len();
    }

    match state {
        ScanState::SeekHeader => None,
        _ => Some(BlockMatch { span, block }),
    }
}

/// Remove every block registered under `alias` from the content
///
/// Returns the settings carried over from the first matching block (the
/// tool-controlled keys are dropped) and the content with all matched
/// spans removed. Without a match the content comes back unchanged.
pub fn extract_and_remove_block(content: &str, alias: &str) -> (HostBlock, String) {
    let mut preserved = HostBlock::new(alias);
    let mut remaining = content.to_string();
    let mut first = true;

    while let Some(found) = find_block(&remaining, alias) {
        if first {
            for (key, value) in found.block.iter() {
                if !CONTROLLED_KEYS.contains(&key) {
                    preserved.insert(key, value);
                }
            }
            first = false;
        }
        remaining.replace_range(found.span, "");
    }

    (preserved, remaining)
}

/// Split a setting line into key and value on the first whitespace run
///
/// Expects the line to be pre-trimmed. Lines without any whitespace carry
/// no value and are skipped by the caller.
fn split_setting(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim();
    let (key, rest) = trimmed.split_once(char::is_whitespace)?;
    Some((key, rest.trim_start()))
}
