// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Step definitions and everything bound to a single invocation of one:
//!
//! - [`definition`]: patterns, bodies, dispatch targets
//! - [`matched`]: a definition paired with extracted arguments
//! - [`context`]: the view handed to running callbacks
//! - [`location`]: registration source locations

pub mod context;
pub mod definition;
pub mod location;
pub mod matched;

pub use self::{
    context::StepContext,
    definition::{
        Options, StepBody, StepDefinition, StepFn, StepPattern, Target,
    },
    location::Location,
    matched::{Match, StepArgument, Value},
};
