// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error types surfaced by step matching, invocation and dispatch.

use derive_more::{Display, Error, From};

use crate::step::Location;

/// Error of a single step invocation.
///
/// Every variant is local to the invocation that produced it: the engine
/// performs no retries, a failed step is a correctness signal.
#[derive(Debug, Display, Error, From)]
pub enum StepError {
    /// A step requested dynamically from inside another step's body matched
    /// no registered definition.
    #[display("undefined dynamic step: {text:?}")]
    UndefinedDynamicStep {
        /// The requested step text (with any embedded multiline block
        /// already parsed out).
        #[error(not(source))]
        text: String,

        /// Location of the definition that requested the step.
        location: Option<Location>,
    },

    /// Captured-argument count doesn't fit the implementation's declared
    /// parameter count. The implementation is never called in this case.
    #[display(
        "arity mismatch: step takes {takes} arguments, \
         but {matched} were matched"
    )]
    ArityMismatch {
        /// Parameter count the implementation declared.
        takes: usize,

        /// Bound-argument count (captures plus any multiline argument).
        matched: usize,

        /// Location of the offending definition.
        location: Option<Location>,
    },

    /// The implementation explicitly signalled "not yet implemented".
    #[display("step marked as pending")]
    Pending {
        /// Optional message describing what is missing.
        #[error(not(source))]
        message: Option<String>,
    },

    /// The implementation failed with a message.
    #[display("step failed: {message}")]
    Failed {
        /// Failure description.
        #[error(not(source))]
        message: String,
    },

    /// Resolving or calling the dispatch target failed.
    #[display("{_0}")]
    #[from]
    Dispatch(DispatchError),

    /// A step pattern failed to resolve against the parameter type catalog.
    #[display("{_0}")]
    #[from]
    Pattern(PatternError),
}

impl StepError {
    /// Creates a [`StepError::Pending`] without a message.
    #[must_use]
    pub fn pending() -> Self {
        Self::Pending { message: None }
    }

    /// Creates a [`StepError::Pending`] carrying `message`.
    #[must_use]
    pub fn pending_with(message: impl Into<String>) -> Self {
        Self::Pending { message: Some(message.into()) }
    }

    /// Creates a [`StepError::Failed`] carrying `message`.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed { message: message.into() }
    }

    /// Location attached to this error, if any.
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        match self {
            Self::UndefinedDynamicStep { location, .. }
            | Self::ArityMismatch { location, .. } => *location,
            Self::Pending { .. }
            | Self::Failed { .. }
            | Self::Dispatch(_)
            | Self::Pattern(_) => None,
        }
    }
}

/// Error of resolving a dispatch target or calling a named method on it.
///
/// Never swallowed: a missing attribute or an unsupported method propagates
/// to the caller unchanged.
#[derive(Clone, Debug, Display, Error)]
pub enum DispatchError {
    /// No scenario world is bound, or the world is already borrowed by an
    /// enclosing invocation.
    #[display("the scenario world is not available to this call")]
    WorldUnavailable,

    /// The resolved target doesn't support the named method.
    #[display("target does not respond to `{method}`")]
    UnknownMethod {
        /// The method that was requested.
        #[error(not(source))]
        method: String,
    },

    /// The world has no attribute of the configured name.
    #[display("world has no attribute `{attribute}` to dispatch `{method}` on")]
    MissingAttribute {
        /// The missing attribute.
        #[error(not(source))]
        attribute: String,

        /// The method that was to be called on it.
        method: String,
    },

    /// A target resolver produced no object.
    #[display("dispatch target for `{method}` resolved to nothing")]
    NilTarget {
        /// The method that was to be called.
        #[error(not(source))]
        method: String,
    },
}

/// Error of turning a registered pattern into a usable matcher.
#[derive(Clone, Debug, Display, Error)]
pub enum PatternError {
    /// An expression string failed to compile through the catalog.
    #[display("failed to compile step expression {expression:?}: {message}")]
    Expression {
        /// The offending expression source.
        #[error(not(source))]
        expression: String,

        /// Compiler diagnostic.
        message: String,
    },

    /// A parameter type pattern is not a valid regular expression.
    #[display("invalid parameter type pattern {pattern:?}: {message}")]
    BadParameterPattern {
        /// The offending pattern source.
        #[error(not(source))]
        pattern: String,

        /// Regex diagnostic.
        message: String,
    },

    /// A parameter type pattern contains capture groups, which would shift
    /// the group-to-parameter mapping of compiled expressions.
    #[display("parameter type pattern {pattern:?} must not contain capture groups")]
    CaptureGroups {
        /// The offending pattern source.
        #[error(not(source))]
        pattern: String,
    },
}

impl PatternError {
    /// Creates a [`PatternError::Expression`] out of any compiler diagnostic.
    #[must_use]
    pub fn expression(source: &str, err: impl std::fmt::Display) -> Self {
        Self::Expression { expression: source.to_owned(), message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_mismatch_reports_both_counts() {
        let err = StepError::ArityMismatch { takes: 2, matched: 3, location: None };
        assert_eq!(
            err.to_string(),
            "arity mismatch: step takes 2 arguments, but 3 were matched",
        );
    }

    #[test]
    fn pending_constructors() {
        assert!(matches!(StepError::pending(), StepError::Pending { message: None }));
        match StepError::pending_with("soon") {
            StepError::Pending { message } => {
                assert_eq!(message.as_deref(), Some("soon"));
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn dispatch_error_converts_into_step_error() {
        let err: StepError = DispatchError::UnknownMethod { method: "jump".into() }.into();
        assert!(matches!(err, StepError::Dispatch(_)));
        assert_eq!(err.to_string(), "target does not respond to `jump`");
    }

    #[test]
    fn undefined_dynamic_step_carries_text() {
        let err = StepError::UndefinedDynamicStep { text: "a missing step".into(), location: None };
        assert_eq!(err.to_string(), "undefined dynamic step: \"a missing step\"");
    }
}
