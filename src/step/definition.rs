// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`StepDefinition`]: a registered pattern plus the implementation invoked
//! when matching text is executed.

use std::{
    cell::RefCell,
    fmt::{self, Debug, Formatter},
    rc::Rc,
};

use cucumber_expressions::{Expression, SingleExpression};
use once_cell::unsync::OnceCell;
use regex::Regex;
use smart_default::SmartDefault;

use crate::{
    error::{DispatchError, PatternError, StepError},
    multiline::MultilineArgument,
    parameter::ParameterTypeRegistry,
    registry::Registry,
    step::{Location, StepArgument, StepContext, Value},
    world::{MethodCall, World},
};

/// Alias for a step implementation callback.
///
/// The callback receives the active world and the invocation context
/// carrying the bound arguments, the multiline argument and the dynamic-step
/// entry point.
pub type StepFn<W> =
    Rc<dyn Fn(&mut W, &mut StepContext<'_, W>) -> Result<(), StepError>>;

/// Pattern of a [`StepDefinition`], immutable after registration.
#[derive(Debug)]
pub enum StepPattern {
    /// Literal regular expression, applied to the step text directly.
    Regex(Regex),

    /// Expression resolved lazily through the parameter type catalog.
    Expression(ExpressionPattern),
}

impl StepPattern {
    /// Pattern source, for reporting and snippet output.
    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            Self::Regex(re) => re.as_str(),
            Self::Expression(expr) => &expr.source,
        }
    }

    /// Binds `text` against this pattern, extracting transformed arguments.
    ///
    /// [`None`] means the pattern doesn't accept the text. Unmatched
    /// optional groups bind as [`Value::Nil`].
    pub(crate) fn bind(
        &self,
        text: &str,
        catalog: &ParameterTypeRegistry,
    ) -> Result<Option<Vec<StepArgument>>, PatternError> {
        match self {
            Self::Regex(re) => Ok(re.captures(text).map(|caps| {
                (1..caps.len())
                    .map(|i| {
                        let raw = caps.get(i).map(|m| m.as_str().to_owned());
                        let value =
                            raw.clone().map_or(Value::Nil, Value::String);
                        StepArgument::new(raw, value)
                    })
                    .collect()
            })),
            Self::Expression(expr) => expr.bind(text, catalog),
        }
    }
}

impl From<Regex> for StepPattern {
    fn from(re: Regex) -> Self {
        Self::Regex(re)
    }
}

impl From<&str> for StepPattern {
    fn from(source: &str) -> Self {
        Self::Expression(ExpressionPattern {
            source: source.to_owned(),
            compiled: OnceCell::new(),
        })
    }
}

impl From<String> for StepPattern {
    fn from(source: String) -> Self {
        Self::Expression(ExpressionPattern { source, compiled: OnceCell::new() })
    }
}

/// Expression-style pattern. Compilation is deferred to the first match
/// attempt and cached; the catalog is consulted exactly once per definition.
#[derive(Debug)]
pub struct ExpressionPattern {
    source: String,
    compiled: OnceCell<CompiledExpression>,
}

#[derive(Debug)]
struct CompiledExpression {
    regex: Regex,
    parameters: Vec<String>,
}

impl ExpressionPattern {
    fn compile(
        &self,
        catalog: &ParameterTypeRegistry,
    ) -> Result<&CompiledExpression, PatternError> {
        self.compiled.get_or_try_init(|| {
            let ast = Expression::parse(self.source.as_str())
                .map_err(|e| PatternError::expression(&self.source, e))?;
            let parameters = ast
                .0
                .iter()
                .filter_map(|single| match single {
                    SingleExpression::Parameter(par) => {
                        Some((*par.input.fragment()).to_owned())
                    }
                    _ => None,
                })
                .collect();
            let regex = Expression::regex_with_parameters(
                self.source.as_str(),
                catalog,
            )
            .map_err(|e| PatternError::expression(&self.source, e))?;

            Ok(CompiledExpression { regex, parameters })
        })
    }

    fn bind(
        &self,
        text: &str,
        catalog: &ParameterTypeRegistry,
    ) -> Result<Option<Vec<StepArgument>>, PatternError> {
        let compiled = self.compile(catalog)?;

        Ok(compiled.regex.captures(text).map(|caps| {
            (1..caps.len())
                .map(|i| {
                    let raw = caps.get(i).map(|m| m.as_str().to_owned());
                    let value = match &raw {
                        Some(captured) => compiled
                            .parameters
                            .get(i - 1)
                            .and_then(|name| catalog.lookup(name))
                            .map_or_else(
                                || Value::String(captured.clone()),
                                |par| par.transform(captured),
                            ),
                        None => Value::Nil,
                    };
                    StepArgument::new(raw, value)
                })
                .collect()
        }))
    }
}

/// Dispatch target of a named-method step body, resolved once per
/// invocation into a plain method call.
#[derive(Clone)]
pub enum Target {
    /// The active scenario world itself.
    World,

    /// A named attribute looked up on the world.
    Attribute(String),

    /// An explicit object, shared across invocations.
    Object(Rc<RefCell<dyn World>>),

    /// A zero-argument resolver producing the target on every invocation.
    Resolver(Rc<dyn Fn() -> Option<Rc<RefCell<dyn World>>>>),
}

impl Debug for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::World => f.write_str("World"),
            Self::Attribute(name) => {
                f.debug_tuple("Attribute").field(name).finish()
            }
            Self::Object(_) => f.write_str("Object(..)"),
            Self::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

/// Registration options of a [`StepDefinition`].
#[derive(Debug, SmartDefault)]
pub struct Options {
    /// Dispatch target for named-method bodies. Defaults to the active
    /// world.
    #[default(Target::World)]
    pub on: Target,

    /// Source location of the registration, fixed at registration time.
    pub location: Option<Location>,
}

impl Options {
    /// Options dispatching to the given target.
    #[must_use]
    pub fn dispatch_to(target: Target) -> Self {
        Self { on: target, location: None }
    }

    /// Options recording the given registration location.
    #[must_use]
    pub fn at(location: Location) -> Self {
        Self { on: Target::World, location: Some(location) }
    }

    /// Attaches a registration location.
    #[must_use]
    pub fn located(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// Implementation of a [`StepDefinition`].
pub enum StepBody<W: World> {
    /// Inline callback together with its declared parameter count
    /// ([`None`] means variadic, skipping the arity check).
    Func {
        /// Declared parameter count.
        arity: Option<usize>,

        /// The callback.
        run: StepFn<W>,
    },

    /// Named method dispatched on the resolved target. Variadic.
    Method {
        /// The method name.
        name: String,
    },
}

impl<W: World> StepBody<W> {
    /// Inline callback declaring `arity` parameters.
    #[must_use]
    pub fn func(
        arity: usize,
        run: impl Fn(&mut W, &mut StepContext<'_, W>) -> Result<(), StepError>
            + 'static,
    ) -> Self {
        Self::Func { arity: Some(arity), run: Rc::new(run) }
    }

    /// Inline callback accepting any number of arguments.
    #[must_use]
    pub fn variadic(
        run: impl Fn(&mut W, &mut StepContext<'_, W>) -> Result<(), StepError>
            + 'static,
    ) -> Self {
        Self::Func { arity: None, run: Rc::new(run) }
    }

    /// Named method on the dispatch target.
    #[must_use]
    pub fn method(name: impl Into<String>) -> Self {
        Self::Method { name: name.into() }
    }

    fn declared_arity(&self) -> Option<usize> {
        match self {
            Self::Func { arity, .. } => *arity,
            Self::Method { .. } => None,
        }
    }
}

impl<W: World> Debug for StepBody<W> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Func { arity, .. } => {
                f.debug_struct("Func").field("arity", arity).finish_non_exhaustive()
            }
            Self::Method { name } => {
                f.debug_struct("Method").field("name", name).finish()
            }
        }
    }
}

/// A registered step definition: pattern, implementation, dispatch target
/// and source location.
pub struct StepDefinition<W: World> {
    pattern: StepPattern,
    body: StepBody<W>,
    target: Target,
    location: Option<Location>,
}

impl<W: World> Debug for StepDefinition<W> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("pattern", &self.pattern.source())
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl<W: World> StepDefinition<W> {
    pub(crate) fn new(
        pattern: StepPattern,
        options: Options,
        body: StepBody<W>,
    ) -> Self {
        Self {
            pattern,
            body,
            target: options.on,
            location: options.location,
        }
    }

    /// The registered pattern.
    #[must_use]
    pub fn pattern(&self) -> &StepPattern {
        &self.pattern
    }

    /// Location the definition was registered at, if recorded.
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub(crate) fn bind(
        &self,
        text: &str,
        catalog: &ParameterTypeRegistry,
    ) -> Result<Option<Vec<StepArgument>>, PatternError> {
        self.pattern.bind(text, catalog)
    }

    /// Validates arity, then executes the body with freshly bound
    /// arguments. The body is never called on a mismatch.
    pub(crate) fn invoke(
        &self,
        world: &mut W,
        registry: &Registry<W>,
        arguments: Vec<StepArgument>,
        multiline: MultilineArgument,
    ) -> Result<(), StepError> {
        let matched = arguments.len() + usize::from(!multiline.is_none());
        if let Some(takes) = self.body.declared_arity() {
            if takes != matched {
                return Err(StepError::ArityMismatch {
                    takes,
                    matched,
                    location: self.location,
                });
            }
        }

        match &self.body {
            StepBody::Func { run, .. } => {
                let mut ctx =
                    StepContext::new(registry, self, arguments, multiline);
                run(world, &mut ctx)
            }
            StepBody::Method { name } => {
                self.dispatch(world, name, MethodCall::new(arguments, multiline))
            }
        }
    }

    /// Resolves the dispatch target and calls the named method on it.
    fn dispatch(
        &self,
        world: &mut W,
        name: &str,
        call: MethodCall,
    ) -> Result<(), StepError> {
        match &self.target {
            Target::World => world.invoke_method(name, call),
            Target::Attribute(attr) => match world.attribute(attr) {
                Some(object) => object.invoke_method(name, call),
                None => Err(DispatchError::MissingAttribute {
                    attribute: attr.clone(),
                    method: name.to_owned(),
                }
                .into()),
            },
            Target::Object(object) => {
                object.borrow_mut().invoke_method(name, call)
            }
            Target::Resolver(resolve) => match resolve() {
                Some(object) => object.borrow_mut().invoke_method(name, call),
                None => Err(DispatchError::NilTarget {
                    method: name.to_owned(),
                }
                .into()),
            },
        }
    }
}
