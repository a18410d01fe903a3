// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Step-definition matching, invocation and snippet synthesis for
//! behaviour-driven test runners.
//!
//! A host runner feeds free-text step lines into a [`Registry`], which finds
//! the [`StepDefinition`]s accepting the text and binds their captured,
//! type-transformed arguments. Matched definitions are invoked with an
//! optional [`MultilineArgument`]; implementations may run further steps
//! dynamically, mark themselves [pending], or attach messages to the
//! reporting surface. For text nothing matches, a [`Snippet`] proposes a
//! ready-to-paste definition skeleton in one of four styles.
//!
//! Execution is single-threaded and synchronous: one step runs to
//! completion (nested dynamic steps included) before control returns. A
//! host wanting parallel scenarios gives each one its own [`Registry`].
//!
//! ```rust
//! use stepglue::{MultilineArgument, Options, Registry, StepBody, Value};
//!
//! #[derive(Default)]
//! struct World {
//!     cucumbers: i64,
//! }
//!
//! impl stepglue::World for World {}
//!
//! let mut registry = Registry::new();
//! registry.register(
//!     "I have {int} cucumbers",
//!     Options::default(),
//!     StepBody::func(1, |world: &mut World, ctx| {
//!         if let Some(Value::Int(n)) = ctx.argument(0) {
//!             world.cucumbers = *n;
//!         }
//!         Ok(())
//!     }),
//! );
//!
//! registry.begin_scenario(World::default());
//! let matches = registry.find_matches("I have 5 cucumbers")?;
//! registry.invoke(&matches[0], MultilineArgument::None)?;
//!
//! assert_eq!(registry.with_world(|w| w.cucumbers), Some(5));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [pending]: StepError::Pending

pub mod data_table;
pub mod error;
pub mod multiline;
pub mod parameter;
pub mod registry;
pub mod snippet;
pub mod step;
pub mod world;

pub use self::{
    data_table::DataTable,
    error::{DispatchError, PatternError, StepError},
    multiline::MultilineArgument,
    parameter::{GeneratedExpression, ParameterType, ParameterTypeRegistry},
    registry::{Attachment, Registry, LOG_MEDIA_TYPE},
    snippet::{Snippet, SnippetStyle, PLACEHOLDER},
    step::{
        Location, Match, Options, StepArgument, StepBody, StepContext,
        StepDefinition, StepFn, StepPattern, Target, Value,
    },
    world::{MethodCall, World},
};
