// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Snippet synthesis: source skeletons proposing a step definition for
//! unmatched text.
//!
//! Four rendering strategies share one inference step and differ only in
//! surface syntax: three render an inferred literal regex (wrapped in call
//! parentheses, bare, or percent-delimited), the fourth renders catalog
//! generated expressions with commented-out alternatives.

mod expression;
mod regexp;

use itertools::Itertools as _;
use smart_default::SmartDefault;

use crate::{multiline::MultilineArgument, parameter::ParameterTypeRegistry};

/// Fixed body line instructing the author to replace it with real
/// behaviour.
pub const PLACEHOLDER: &str =
    "pending # Write code here that turns the phrase above into concrete actions";

/// Surface syntax of a rendered [`Snippet`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, SmartDefault)]
pub enum SnippetStyle {
    /// Inferred regex as a parenthesized-call literal:
    /// `Keyword(/^…$/) do |…|`.
    #[default]
    Regexp,

    /// Inferred regex as a bare literal after the keyword:
    /// `Keyword /^…$/ do`.
    Classic,

    /// Inferred regex in percent-delimited syntax, needing no forward-slash
    /// escaping: `Keyword %r{^…$} do |…|`.
    Percent,

    /// Catalog-generated expressions, best candidate live and the rest
    /// commented out: `Keyword('…') do |…|`.
    Expression,
}

/// Ephemeral snippet request: constructed per render call, holds no state
/// beyond its inputs.
pub struct Snippet<'s> {
    keyword: &'s str,
    text: &'s str,
    multiline: &'s MultilineArgument,
    parameters: &'s ParameterTypeRegistry,
}

impl<'s> Snippet<'s> {
    /// Creates a snippet request for one undefined step.
    #[must_use]
    pub fn new(
        keyword: &'s str,
        text: &'s str,
        multiline: &'s MultilineArgument,
        parameters: &'s ParameterTypeRegistry,
    ) -> Self {
        Self { keyword, text, multiline, parameters }
    }

    /// Renders the skeleton in the requested style.
    #[must_use]
    pub fn render(&self, style: SnippetStyle) -> String {
        match style {
            SnippetStyle::Regexp => regexp::wrapped(self),
            SnippetStyle::Classic => regexp::classic(self),
            SnippetStyle::Percent => regexp::percent(self),
            SnippetStyle::Expression => expression::render(self),
        }
    }
}

/// Name of the trailing block argument a multiline argument adds, if any.
fn multiline_arg(multiline: &MultilineArgument) -> Option<&'static str> {
    match multiline {
        MultilineArgument::None => None,
        MultilineArgument::DataTable(_) => Some("table"),
        MultilineArgument::DocString(_) => Some("doc_string"),
    }
}

/// The block opener: ` do` or ` do |args|`.
fn do_block(args: &[String]) -> String {
    if args.is_empty() {
        " do".to_owned()
    } else {
        format!(" do |{}|", args.iter().join(", "))
    }
}

/// Body lines of every style: an explanatory comment for tables (the doc
/// string case needs none, there is only one doc-string form), then the
/// placeholder.
fn body(multiline: &MultilineArgument) -> String {
    let mut out = String::new();
    if matches!(multiline, MultilineArgument::DataTable(_)) {
        out.push_str("  # table is a stepglue::DataTable\n");
    }
    out.push_str("  ");
    out.push_str(PLACEHOLDER);
    out.push('\n');
    out
}
