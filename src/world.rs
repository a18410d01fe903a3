// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`World`] trait definition: the per-scenario state steps run against.

use crate::{
    error::{DispatchError, StepError},
    multiline::MultilineArgument,
    step::StepArgument,
};

/// Per-scenario state-holding object.
///
/// Lives exactly one scenario: [`Registry::begin_scenario()`] replaces it at
/// every scenario boundary. Steps registered with a method-name body are
/// dispatched through [`World::invoke_method`], a closed capability
/// interface instead of open-ended reflection: hosts opt into named dispatch
/// by matching on the method name, and the default implementation knows no
/// methods at all.
///
/// [`Registry::begin_scenario()`]: crate::registry::Registry::begin_scenario
pub trait World: 'static {
    /// Invokes a named method with the bound step arguments.
    ///
    /// # Errors
    ///
    /// [`DispatchError::UnknownMethod`] unless the implementation handles
    /// `method`; this propagates to the caller unchanged.
    fn invoke_method(
        &mut self,
        method: &str,
        call: MethodCall,
    ) -> Result<(), StepError> {
        drop(call);
        Err(DispatchError::UnknownMethod { method: method.to_owned() }.into())
    }

    /// Looks up a named attribute to use as a dispatch target instead of the
    /// world itself.
    fn attribute(&mut self, name: &str) -> Option<&mut dyn World> {
        let _ = name;
        None
    }
}

/// Arguments handed to a named-method dispatch: the bound captures plus any
/// multiline argument, owned by this single call.
#[derive(Debug)]
pub struct MethodCall {
    arguments: Vec<StepArgument>,
    multiline: MultilineArgument,
}

impl MethodCall {
    pub(crate) fn new(
        arguments: Vec<StepArgument>,
        multiline: MultilineArgument,
    ) -> Self {
        Self { arguments, multiline }
    }

    /// Bound arguments in capture order.
    #[must_use]
    pub fn arguments(&self) -> &[StepArgument] {
        &self.arguments
    }

    /// The attached multiline argument.
    #[must_use]
    pub fn multiline(&self) -> &MultilineArgument {
        &self.multiline
    }
}
