// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Multiline argument attached to a step invocation.

use crate::data_table::DataTable;

/// Fence delimiting an embedded doc string block.
const FENCE: &str = "\"\"\"";

/// Block argument following a step's text.
///
/// Influences both invocation arity (a present block counts as one extra
/// argument) and snippet rendering.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum MultilineArgument {
    /// No block attached.
    #[default]
    None,

    /// A `|`-delimited data table.
    DataTable(DataTable),

    /// A `"""`-fenced doc string.
    DocString(String),
}

impl MultilineArgument {
    /// Whether no block is attached.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The attached table, if any.
    #[must_use]
    pub fn table(&self) -> Option<&DataTable> {
        match self {
            Self::DataTable(t) => Some(t),
            Self::None | Self::DocString(_) => None,
        }
    }

    /// The attached doc string, if any.
    #[must_use]
    pub fn doc_string(&self) -> Option<&str> {
        match self {
            Self::DocString(s) => Some(s),
            Self::None | Self::DataTable(_) => None,
        }
    }
}

impl From<DataTable> for MultilineArgument {
    fn from(table: DataTable) -> Self {
        Self::DataTable(table)
    }
}

/// Splits a dynamically requested step text into the step line and any
/// embedded block following it.
///
/// A block is either a `"""`-fenced doc string or a run of `|`-prefixed
/// table rows; anything else leaves the text untouched with no block.
/// Search for the step then proceeds on the remaining text exactly as for a
/// top-level step.
#[must_use]
pub fn extract_block(text: &str) -> (String, MultilineArgument) {
    let text = text.trim();
    let Some((line, rest)) = text.split_once('\n') else {
        return (text.to_owned(), MultilineArgument::None);
    };

    if let Some(doc) = parse_doc_string(rest) {
        return (line.trim().to_owned(), MultilineArgument::DocString(doc));
    }
    if let Some(table) = parse_table(rest) {
        return (line.trim().to_owned(), MultilineArgument::DataTable(table));
    }

    (text.to_owned(), MultilineArgument::None)
}

/// Parses a `"""`-fenced block, stripping the opening fence's indentation
/// from every content line.
fn parse_doc_string(block: &str) -> Option<String> {
    let mut lines = block.lines();
    let fence = lines.next()?;
    if !fence.trim_start().starts_with(FENCE) {
        return None;
    }
    let indent = fence.len() - fence.trim_start().len();

    let mut content = Vec::new();
    for line in lines {
        if line.trim() == FENCE {
            return Some(content.join("\n"));
        }
        // Strip at most the fence's indentation, and only whitespace.
        let leading = line.len() - line.trim_start().len();
        content.push(&line[leading.min(indent)..]);
    }

    // Unterminated fence is not a doc string.
    None
}

/// Parses a run of `|`-delimited rows. Every non-blank line must be a row.
fn parse_table(block: &str) -> Option<DataTable> {
    let mut rows = Vec::new();
    for line in block.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let cells = line.strip_prefix('|')?;
        let cells = cells.strip_suffix('|').unwrap_or(cells);
        rows.push(
            cells.split('|').map(|cell| cell.trim().to_owned()).collect(),
        );
    }

    (!rows.is_empty()).then(|| DataTable::new(rows))
}
