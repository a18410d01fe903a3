// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Source location of a step definition.

use derive_more::Display;

/// Location a [`StepDefinition`] was registered at, fixed at registration
/// time and reported in arity and undefined-step errors.
///
/// [`StepDefinition`]: crate::step::StepDefinition
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{path}:{line}:{column}")]
pub struct Location {
    /// Path to the file the definition lives in.
    pub path: &'static str,

    /// Line within the file.
    pub line: u32,

    /// Column within the line.
    pub column: u32,
}

impl Location {
    /// Creates a new [`Location`].
    #[must_use]
    pub const fn new(path: &'static str, line: u32, column: u32) -> Self {
        Self { path, line, column }
    }

    /// Last path component, for compact reporting.
    #[must_use]
    pub fn filename(&self) -> &str {
        self.path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.path)
    }
}

/// Captures the caller's [`Location`].
#[macro_export]
macro_rules! here {
    () => {
        $crate::step::Location::new(file!(), line!(), column!())
    };
}
