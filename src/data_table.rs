// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tabular multiline argument attached to a step.

use std::collections::HashMap;

/// Data table attached to a step invocation.
///
/// Row-oriented: the first row is conventionally a header, and the accessor
/// methods below interpret it that way where it matters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataTable {
    rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Creates a [`DataTable`] from its rows.
    #[must_use]
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// All rows, header included.
    #[must_use]
    pub fn raw(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Rows without the header row.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// Interprets the first row as keys and every following row as a map of
    /// header to cell.
    #[must_use]
    pub fn hashes(&self) -> Vec<HashMap<String, String>> {
        let Some((header, body)) = self.rows.split_first() else {
            return Vec::new();
        };

        body.iter()
            .map(|row| header.iter().cloned().zip(row.iter().cloned()).collect())
            .collect()
    }

    /// Interprets a two-column table as a key-to-value map.
    ///
    /// Returns [`None`] if any row doesn't have exactly two cells.
    #[must_use]
    pub fn rows_hash(&self) -> Option<HashMap<String, String>> {
        self.rows
            .iter()
            .map(|row| match row.as_slice() {
                [key, value] => Some((key.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }

    /// Rows turned into columns and columns into rows.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let width = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = (0..width)
            .map(|col| {
                self.rows
                    .iter()
                    .map(|row| row.get(col).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// Whether the table has no rows at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<S: Into<String>> From<Vec<Vec<S>>> for DataTable {
    fn from(rows: Vec<Vec<S>>) -> Self {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }
}
