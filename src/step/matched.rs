// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A [`StepDefinition`] paired with the arguments extracted from a specific
//! text.

use std::rc::Rc;

use derive_more::Display;

use crate::{step::StepDefinition, world::World};

/// Value produced by a parameter type transformer.
///
/// Regex captures that didn't participate in a match produce [`Value::Nil`].
#[derive(Clone, Debug, Display, PartialEq)]
pub enum Value {
    /// Absent capture (unmatched optional group).
    #[display("nil")]
    Nil,

    /// Untransformed or textual capture.
    #[display("{_0}")]
    String(String),

    /// Integer capture, e.g. from the built-in `{int}` parameter.
    #[display("{_0}")]
    Int(i64),

    /// Floating-point capture, e.g. from the built-in `{float}` parameter.
    #[display("{_0}")]
    Float(f64),
}

impl Value {
    /// Textual content, if this is a [`Value::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Nil | Self::Int(_) | Self::Float(_) => None,
        }
    }

    /// Integer content, if this is a [`Value::Int`].
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Nil | Self::String(_) | Self::Float(_) => None,
        }
    }

    /// Whether this is [`Value::Nil`].
    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }
}

/// Single bound argument of a [`Match`]: the raw captured substring plus its
/// transformed [`Value`].
#[derive(Clone, Debug, PartialEq)]
pub struct StepArgument {
    raw: Option<String>,
    value: Value,
}

impl StepArgument {
    /// Creates an argument from a raw capture and its transformed value.
    #[must_use]
    pub fn new(raw: Option<String>, value: Value) -> Self {
        Self { raw, value }
    }

    /// Raw captured substring, [`None`] for an unmatched optional group.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Transformed value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Mutable access to the transformed value.
    ///
    /// Arguments are owned by a single invocation, so mutating one is never
    /// observable from another search over the same text.
    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }
}

/// Pairing of a [`StepDefinition`] with arguments extracted from a specific
/// text.
///
/// Owned exclusively by the search that produced it: two independent
/// searches over the same text yield [`Match`]es that are equal in value but
/// share no argument storage.
#[derive(Debug)]
pub struct Match<W: World> {
    definition: Rc<StepDefinition<W>>,
    arguments: Vec<StepArgument>,
}

// Implemented manually to omit the redundant `W: Clone` bound a derive
// would impose.
impl<W: World> Clone for Match<W> {
    fn clone(&self) -> Self {
        Self {
            definition: Rc::clone(&self.definition),
            arguments: self.arguments.clone(),
        }
    }
}

impl<W: World> Match<W> {
    pub(crate) fn new(
        definition: Rc<StepDefinition<W>>,
        arguments: Vec<StepArgument>,
    ) -> Self {
        Self { definition, arguments }
    }

    /// The matched definition.
    #[must_use]
    pub fn definition(&self) -> &StepDefinition<W> {
        &self.definition
    }

    /// Bound arguments in capture order.
    #[must_use]
    pub fn arguments(&self) -> &[StepArgument] {
        &self.arguments
    }
}
