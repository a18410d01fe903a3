// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Registry`]: the set of registered step definitions for one run, the
//! active scenario world, and the match search over them.

use std::{
    cell::RefCell,
    fmt::{self, Debug, Formatter},
    rc::Rc,
};

use crate::{
    error::{DispatchError, PatternError, StepError},
    multiline::MultilineArgument,
    parameter::ParameterTypeRegistry,
    snippet::{Snippet, SnippetStyle},
    step::{Match, Options, StepBody, StepDefinition, StepPattern},
    world::World,
};

/// Media type of messages attached via [`StepContext::log()`].
///
/// [`StepContext::log()`]: crate::step::StepContext::log
pub const LOG_MEDIA_TYPE: &str = "text/x.stepglue.log+plain";

/// Message attached to the reporting surface by a step implementation.
#[derive(Clone, Debug, PartialEq)]
pub struct Attachment {
    body: String,
    media_type: &'static str,
}

impl Attachment {
    /// The attached text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The attachment's media type.
    #[must_use]
    pub fn media_type(&self) -> &'static str {
        self.media_type
    }
}

/// Owns the step definitions registered for the current run, the parameter
/// type catalog, and the active scenario world.
///
/// Single-threaded by design: one registry serves one scenario at a time,
/// and a host wanting parallel scenarios gives each its own registry.
pub struct Registry<W: World> {
    steps: Vec<Rc<StepDefinition<W>>>,
    parameters: ParameterTypeRegistry,
    world: RefCell<Option<W>>,
    attachments: RefCell<Vec<Attachment>>,
}

impl<W: World> Debug for Registry<W> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("steps", &self.steps)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

impl<W: World> Default for Registry<W> {
    fn default() -> Self {
        Self::with_parameters(ParameterTypeRegistry::default())
    }
}

impl<W: World> Registry<W> {
    /// Creates an empty registry with the built-in parameter types.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry around an existing catalog.
    #[must_use]
    pub fn with_parameters(parameters: ParameterTypeRegistry) -> Self {
        Self {
            steps: Vec::new(),
            parameters,
            world: RefCell::new(None),
            attachments: RefCell::new(Vec::new()),
        }
    }

    /// The parameter type catalog.
    #[must_use]
    pub fn parameters(&self) -> &ParameterTypeRegistry {
        &self.parameters
    }

    /// Mutable catalog access, for defining parameter types before a run.
    pub fn parameters_mut(&mut self) -> &mut ParameterTypeRegistry {
        &mut self.parameters
    }

    /// Registers a step definition.
    ///
    /// `pattern` is a literal [`Regex`] or an expression string resolved
    /// through the catalog on first use.
    ///
    /// [`Regex`]: regex::Regex
    pub fn register(
        &mut self,
        pattern: impl Into<StepPattern>,
        options: Options,
        body: StepBody<W>,
    ) {
        let definition =
            Rc::new(StepDefinition::new(pattern.into(), options, body));
        tracing::debug!(
            pattern = definition.pattern().source(),
            "registered step definition"
        );
        self.steps.push(definition);
    }

    /// Number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no definitions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Binds the world for the upcoming scenario and resets per-scenario
    /// state. The previous world, if any, is dropped.
    pub fn begin_scenario(&self, world: W) {
        self.attachments.borrow_mut().clear();
        *self.world.borrow_mut() = Some(world);
        tracing::debug!("began scenario");
    }

    /// Runs `f` against the active world, e.g. for host-side assertions.
    ///
    /// [`None`] if no scenario is active or the world is borrowed by a
    /// running invocation.
    pub fn with_world<R>(&self, f: impl FnOnce(&mut W) -> R) -> Option<R> {
        self.world.try_borrow_mut().ok()?.as_mut().map(f)
    }

    /// Returns every definition matching `text`, in registration order,
    /// each paired with its freshly bound arguments.
    ///
    /// # Errors
    ///
    /// [`PatternError`] if an expression-style definition fails to resolve
    /// through the catalog.
    pub fn find_matches(
        &self,
        text: &str,
    ) -> Result<Vec<Match<W>>, PatternError> {
        let mut matches = Vec::new();
        for definition in &self.steps {
            if let Some(arguments) = definition.bind(text, &self.parameters)? {
                matches.push(Match::new(Rc::clone(definition), arguments));
            }
        }
        tracing::debug!(text, matches = matches.len(), "searched step definitions");
        Ok(matches)
    }

    /// Invokes a matched definition with the given multiline argument.
    ///
    /// Not re-entrant: a running step requests nested steps through
    /// [`StepContext::step()`] instead.
    ///
    /// # Errors
    ///
    /// [`DispatchError::WorldUnavailable`] if no scenario is active;
    /// otherwise whatever the invocation produces (arity mismatch, pending,
    /// dispatch or implementation failure).
    ///
    /// [`StepContext::step()`]: crate::step::StepContext::step
    pub fn invoke(
        &self,
        matched: &Match<W>,
        multiline: MultilineArgument,
    ) -> Result<(), StepError> {
        let mut slot = self
            .world
            .try_borrow_mut()
            .map_err(|_| DispatchError::WorldUnavailable)?;
        let world = slot.as_mut().ok_or(DispatchError::WorldUnavailable)?;
        self.invoke_bound(world, matched, multiline)
    }

    /// Invocation path shared by [`Registry::invoke()`] and nested dynamic
    /// steps, which already hold the world borrow.
    pub(crate) fn invoke_bound(
        &self,
        world: &mut W,
        matched: &Match<W>,
        multiline: MultilineArgument,
    ) -> Result<(), StepError> {
        tracing::debug!(
            pattern = matched.definition().pattern().source(),
            "invoking step"
        );
        matched.definition().invoke(
            world,
            self,
            matched.arguments().to_vec(),
            multiline,
        )
    }

    /// Renders a definition skeleton proposing a step for unmatched `text`,
    /// using this registry's catalog.
    #[must_use]
    pub fn snippet_for(
        &self,
        keyword: &str,
        text: &str,
        multiline: &MultilineArgument,
        style: SnippetStyle,
    ) -> String {
        Snippet::new(keyword, text, multiline, &self.parameters).render(style)
    }

    /// Messages attached by step implementations since the last
    /// [`Registry::begin_scenario()`].
    #[must_use]
    pub fn attachments(&self) -> Vec<Attachment> {
        self.attachments.borrow().clone()
    }

    pub(crate) fn attach(&self, body: String) {
        self.attachments
            .borrow_mut()
            .push(Attachment { body, media_type: LOG_MEDIA_TYPE });
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use regex::Regex;

    use super::*;
    use crate::{
        here,
        step::{StepContext, Target, Value},
        world::MethodCall,
    };

    #[derive(Debug, Default)]
    struct Kitchen {
        cucumbers: i64,
        calls: Vec<String>,
        pantry: Pantry,
    }

    #[derive(Debug, Default)]
    struct Pantry {
        jars: i64,
    }

    impl World for Kitchen {
        fn invoke_method(
            &mut self,
            method: &str,
            call: MethodCall,
        ) -> Result<(), StepError> {
            match method {
                "stock" => {
                    if let Some(Value::Int(n)) =
                        call.arguments().first().map(|a| a.value())
                    {
                        self.cucumbers += *n;
                    }
                    self.calls.push(method.to_owned());
                    Ok(())
                }
                _ => Err(DispatchError::UnknownMethod {
                    method: method.to_owned(),
                }
                .into()),
            }
        }

        fn attribute(&mut self, name: &str) -> Option<&mut dyn World> {
            match name {
                "pantry" => Some(&mut self.pantry),
                _ => None,
            }
        }
    }

    impl World for Pantry {
        fn invoke_method(
            &mut self,
            method: &str,
            _call: MethodCall,
        ) -> Result<(), StepError> {
            match method {
                "refill" => {
                    self.jars += 1;
                    Ok(())
                }
                _ => Err(DispatchError::UnknownMethod {
                    method: method.to_owned(),
                }
                .into()),
            }
        }
    }

    fn counting_registry() -> Registry<Kitchen> {
        let mut registry = Registry::new();
        registry.register(
            "I have {int} cucumbers",
            Options::default(),
            StepBody::func(1, |world: &mut Kitchen, ctx| {
                if let Some(Value::Int(n)) = ctx.argument(0) {
                    world.cucumbers = *n;
                }
                Ok(())
            }),
        );
        registry
    }

    #[test]
    fn find_matches_keeps_registration_order() {
        let mut registry: Registry<Kitchen> = Registry::new();
        registry.register(
            Regex::new("cucumbers").unwrap(),
            Options::at(here!()),
            StepBody::variadic(|_, _| Ok(())),
        );
        registry.register(
            Regex::new(r"(\d+) cucumbers").unwrap(),
            Options::default(),
            StepBody::variadic(|_, _| Ok(())),
        );

        let matches = registry.find_matches("I have 5 cucumbers").unwrap();
        assert_eq!(matches.len(), 2);
        assert!(matches[0].definition().location().is_some());
        assert!(matches[1].definition().location().is_none());
        assert_eq!(matches[1].arguments()[0].raw(), Some("5"));
    }

    #[test]
    fn invoke_transforms_and_runs() {
        let registry = counting_registry();
        registry.begin_scenario(Kitchen::default());

        let matches = registry.find_matches("I have 5 cucumbers").unwrap();
        registry.invoke(&matches[0], MultilineArgument::None).unwrap();

        assert_eq!(registry.with_world(|w| w.cucumbers), Some(5));
    }

    #[test]
    fn invoke_without_scenario_reports_world_unavailable() {
        let registry = counting_registry();
        let matches = registry.find_matches("I have 5 cucumbers").unwrap();

        let err =
            registry.invoke(&matches[0], MultilineArgument::None).unwrap_err();
        assert!(matches!(
            err,
            StepError::Dispatch(DispatchError::WorldUnavailable),
        ));
    }

    #[test]
    fn independent_searches_share_no_argument_storage() {
        let mut registry: Registry<Kitchen> = Registry::new();
        registry.register(
            "I have {int} cucumbers",
            Options::default(),
            StepBody::func(1, |_, ctx: &mut StepContext<'_, Kitchen>| {
                *ctx.arguments_mut()[0].value_mut() = Value::Int(99);
                Ok(())
            }),
        );
        registry.begin_scenario(Kitchen::default());

        let first = registry.find_matches("I have 5 cucumbers").unwrap();
        let second = registry.find_matches("I have 5 cucumbers").unwrap();
        assert_eq!(first[0].arguments(), second[0].arguments());

        // The callback mutates its own copy of the arguments.
        registry.invoke(&first[0], MultilineArgument::None).unwrap();

        assert_eq!(first[0].arguments()[0].value(), &Value::Int(5));
        let fresh = registry.find_matches("I have 5 cucumbers").unwrap();
        assert_eq!(fresh[0].arguments()[0].value(), &Value::Int(5));
    }

    #[test]
    fn arity_mismatch_reports_before_the_body_runs() {
        let mut registry: Registry<Kitchen> = Registry::new();
        registry.register(
            Regex::new(r"I pick (\d+) apples").unwrap(),
            Options::at(here!()),
            StepBody::func(2, |world: &mut Kitchen, _| {
                world.calls.push("ran".to_owned());
                Ok(())
            }),
        );
        registry.begin_scenario(Kitchen::default());

        let matches = registry.find_matches("I pick 3 apples").unwrap();
        let err =
            registry.invoke(&matches[0], MultilineArgument::None).unwrap_err();

        match err {
            StepError::ArityMismatch { takes, matched, location } => {
                assert_eq!(takes, 2);
                assert_eq!(matched, 1);
                assert!(location.is_some());
            }
            other => panic!("unexpected: {other}"),
        }
        assert_eq!(registry.with_world(|w| w.calls.len()), Some(0));
    }

    #[test]
    fn multiline_argument_counts_toward_arity() {
        let mut registry: Registry<Kitchen> = Registry::new();
        registry.register(
            Regex::new(r"I pick (\d+) apples").unwrap(),
            Options::default(),
            StepBody::func(2, |world: &mut Kitchen, ctx| {
                assert!(ctx.table().is_some());
                world.calls.push("ran".to_owned());
                Ok(())
            }),
        );
        registry.begin_scenario(Kitchen::default());

        let matches = registry.find_matches("I pick 3 apples").unwrap();
        let table = crate::DataTable::from(vec![vec!["kind"], vec!["fuji"]]);
        registry
            .invoke(&matches[0], MultilineArgument::DataTable(table))
            .unwrap();

        assert_eq!(registry.with_world(|w| w.calls.len()), Some(1));
    }

    #[test]
    fn method_body_dispatches_on_the_world() {
        let mut registry: Registry<Kitchen> = Registry::new();
        registry.register(
            "restock {int} cucumbers",
            Options::default(),
            StepBody::method("stock"),
        );
        registry.begin_scenario(Kitchen::default());

        let matches = registry.find_matches("restock 4 cucumbers").unwrap();
        registry.invoke(&matches[0], MultilineArgument::None).unwrap();

        assert_eq!(registry.with_world(|w| w.cucumbers), Some(4));
    }

    #[test]
    fn unknown_method_propagates() {
        let mut registry: Registry<Kitchen> = Registry::new();
        registry.register(
            Regex::new("^do the impossible$").unwrap(),
            Options::default(),
            StepBody::method("levitate"),
        );
        registry.begin_scenario(Kitchen::default());

        let matches = registry.find_matches("do the impossible").unwrap();
        let err =
            registry.invoke(&matches[0], MultilineArgument::None).unwrap_err();
        assert!(matches!(
            err,
            StepError::Dispatch(DispatchError::UnknownMethod { .. }),
        ));
    }

    #[test]
    fn attribute_target_resolves_through_the_world() {
        let mut registry: Registry<Kitchen> = Registry::new();
        registry.register(
            Regex::new("^the pantry is refilled$").unwrap(),
            Options::dispatch_to(Target::Attribute("pantry".to_owned())),
            StepBody::method("refill"),
        );
        registry.begin_scenario(Kitchen::default());

        let matches = registry.find_matches("the pantry is refilled").unwrap();
        registry.invoke(&matches[0], MultilineArgument::None).unwrap();

        assert_eq!(registry.with_world(|w| w.pantry.jars), Some(1));
    }

    #[test]
    fn missing_attribute_propagates() {
        let mut registry: Registry<Kitchen> = Registry::new();
        registry.register(
            Regex::new("^the cellar is refilled$").unwrap(),
            Options::dispatch_to(Target::Attribute("cellar".to_owned())),
            StepBody::method("refill"),
        );
        registry.begin_scenario(Kitchen::default());

        let matches = registry.find_matches("the cellar is refilled").unwrap();
        let err =
            registry.invoke(&matches[0], MultilineArgument::None).unwrap_err();
        assert!(matches!(
            err,
            StepError::Dispatch(DispatchError::MissingAttribute { .. }),
        ));
    }

    #[test]
    fn object_and_resolver_targets_dispatch_to_their_object() {
        let pantry: Rc<RefCell<dyn World>> =
            Rc::new(RefCell::new(Pantry::default()));

        let mut registry: Registry<Kitchen> = Registry::new();
        registry.register(
            Regex::new("^the shared pantry is refilled$").unwrap(),
            Options::dispatch_to(Target::Object(Rc::clone(&pantry))),
            StepBody::method("refill"),
        );
        let resolved = Rc::clone(&pantry);
        registry.register(
            Regex::new("^the resolved pantry is refilled$").unwrap(),
            Options::dispatch_to(Target::Resolver(Rc::new(move || {
                Some(Rc::clone(&resolved))
            }))),
            StepBody::method("refill"),
        );
        registry.register(
            Regex::new("^the missing pantry is refilled$").unwrap(),
            Options::dispatch_to(Target::Resolver(Rc::new(|| None))),
            StepBody::method("refill"),
        );
        registry.begin_scenario(Kitchen::default());

        for text in
            ["the shared pantry is refilled", "the resolved pantry is refilled"]
        {
            let matches = registry.find_matches(text).unwrap();
            registry.invoke(&matches[0], MultilineArgument::None).unwrap();
        }

        let matches =
            registry.find_matches("the missing pantry is refilled").unwrap();
        let err =
            registry.invoke(&matches[0], MultilineArgument::None).unwrap_err();
        assert!(matches!(
            err,
            StepError::Dispatch(DispatchError::NilTarget { .. }),
        ));
    }

    #[test]
    fn pending_is_distinguished_from_failure() {
        let mut registry: Registry<Kitchen> = Registry::new();
        registry.register(
            Regex::new("^something unfinished$").unwrap(),
            Options::default(),
            StepBody::func(0, |_, _| Err(StepError::pending_with("soon"))),
        );
        registry.begin_scenario(Kitchen::default());

        let matches = registry.find_matches("something unfinished").unwrap();
        let err =
            registry.invoke(&matches[0], MultilineArgument::None).unwrap_err();
        assert!(matches!(err, StepError::Pending { .. }));
    }

    #[test]
    fn attachments_record_with_media_type_and_reset() {
        let mut registry: Registry<Kitchen> = Registry::new();
        registry.register(
            Regex::new(r"^I note (\d+)$").unwrap(),
            Options::default(),
            StepBody::func(1, |_, ctx: &mut StepContext<'_, Kitchen>| {
                // Non-text payloads go through their display representation.
                ctx.log(42);
                Ok(())
            }),
        );
        registry.begin_scenario(Kitchen::default());

        let matches = registry.find_matches("I note 42").unwrap();
        registry.invoke(&matches[0], MultilineArgument::None).unwrap();

        let attachments = registry.attachments();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].body(), "42");
        assert_eq!(attachments[0].media_type(), LOG_MEDIA_TYPE);

        registry.begin_scenario(Kitchen::default());
        assert!(registry.attachments().is_empty());
    }

    #[test]
    fn expression_compile_failure_surfaces() {
        let mut registry: Registry<Kitchen> = Registry::new();
        registry.register(
            "I have {cucumber} today",
            Options::default(),
            StepBody::variadic(|_, _| Ok(())),
        );

        let err = registry.find_matches("I have one today").unwrap_err();
        assert!(matches!(err, PatternError::Expression { .. }));
    }
}
