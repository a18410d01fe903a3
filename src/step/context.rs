// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Invocation context handed to inline step callbacks.

use std::fmt::Display;

use crate::{
    data_table::DataTable,
    error::StepError,
    multiline::{self, MultilineArgument},
    registry::Registry,
    step::{Location, StepArgument, StepDefinition, Value},
    world::World,
};

/// Per-invocation view of a running step: its bound arguments, multiline
/// argument, and the entry points for dynamic steps and report logging.
///
/// Arguments are owned by this single invocation; they were cloned out of
/// the [`Match`] right before the callback ran, so mutating them is never
/// observable from a later search.
///
/// [`Match`]: crate::step::Match
pub struct StepContext<'c, W: World> {
    registry: &'c Registry<W>,
    definition: &'c StepDefinition<W>,
    arguments: Vec<StepArgument>,
    multiline: MultilineArgument,
}

impl<'c, W: World> StepContext<'c, W> {
    pub(crate) fn new(
        registry: &'c Registry<W>,
        definition: &'c StepDefinition<W>,
        arguments: Vec<StepArgument>,
        multiline: MultilineArgument,
    ) -> Self {
        Self { registry, definition, arguments, multiline }
    }

    /// Bound arguments in capture order.
    #[must_use]
    pub fn arguments(&self) -> &[StepArgument] {
        &self.arguments
    }

    /// Mutable access to the bound arguments.
    pub fn arguments_mut(&mut self) -> &mut [StepArgument] {
        &mut self.arguments
    }

    /// Transformed value of the `index`th argument.
    #[must_use]
    pub fn argument(&self, index: usize) -> Option<&Value> {
        self.arguments.get(index).map(StepArgument::value)
    }

    /// The attached multiline argument.
    #[must_use]
    pub fn multiline(&self) -> &MultilineArgument {
        &self.multiline
    }

    /// The attached data table, if any.
    #[must_use]
    pub fn table(&self) -> Option<&DataTable> {
        self.multiline.table()
    }

    /// The attached doc string, if any.
    #[must_use]
    pub fn doc_string(&self) -> Option<&str> {
        self.multiline.doc_string()
    }

    /// Location of the definition this invocation belongs to.
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        self.definition.location()
    }

    /// Runs another step by text against the same registry.
    ///
    /// The text may carry an embedded `"""`-fenced doc string or
    /// `|`-delimited table block; the block is parsed out first and search
    /// proceeds on the remaining text exactly as for a top-level step.
    ///
    /// # Errors
    ///
    /// [`StepError::UndefinedDynamicStep`] if nothing matches; otherwise
    /// whatever the nested invocation produces. Self-recursion is bounded
    /// only by the call stack.
    pub fn step(&self, world: &mut W, text: &str) -> Result<(), StepError> {
        let (line, block) = multiline::extract_block(text);
        tracing::trace!(text = %line, "running dynamic step");

        let matched = self
            .registry
            .find_matches(&line)?
            .into_iter()
            .next()
            .ok_or_else(|| StepError::UndefinedDynamicStep {
                text: line.clone(),
                location: self.definition.location(),
            })?;
        self.registry.invoke_bound(world, &matched, block)
    }

    /// Attaches a message to the reporting surface.
    ///
    /// Non-text payloads are converted to their display representation; the
    /// attachment carries the fixed log media type.
    pub fn log(&self, message: impl Display) {
        self.registry.attach(message.to_string());
    }
}
