// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Literal-regex inference and the three regex-flavoured renderers.

use lazy_regex::regex;

use super::{body, do_block, multiline_arg, Snippet};
use crate::multiline::MultilineArgument;

/// Regex inferred from literal step text.
pub(super) struct InferredPattern {
    /// Anchored pattern source.
    pub pattern: String,

    /// Number of capture groups.
    pub groups: usize,
}

/// Infers an anchored pattern from literal step text: double-quoted runs
/// become `"([^"]*)"`, maximal digit runs become `(\d+)`, everything else
/// is escaped literally.
///
/// `escape_slashes` additionally escapes `/` for slash-delimited rendering.
pub(super) fn infer(text: &str, escape_slashes: bool) -> InferredPattern {
    let scanner = regex!(r#""[^"]*"|\d+"#);

    let mut pattern = String::from("^");
    let mut groups = 0;
    let mut cursor = 0;
    for found in scanner.find_iter(text) {
        push_literal(&text[cursor..found.start()], escape_slashes, &mut pattern);
        if found.as_str().starts_with('"') {
            pattern.push_str("\"([^\"]*)\"");
        } else {
            pattern.push_str(r"(\d+)");
        }
        groups += 1;
        cursor = found.end();
    }
    push_literal(&text[cursor..], escape_slashes, &mut pattern);
    pattern.push('$');

    InferredPattern { pattern, groups }
}

fn push_literal(chunk: &str, escape_slashes: bool, out: &mut String) {
    let escaped = regex::escape(chunk);
    if escape_slashes {
        out.push_str(&escaped.replace('/', "\\/"));
    } else {
        out.push_str(&escaped);
    }
}

/// Sequential `arg1..argN` names plus any trailing multiline argument.
fn arg_names(groups: usize, multiline: &MultilineArgument) -> Vec<String> {
    let mut names: Vec<String> =
        (1..=groups).map(|i| format!("arg{i}")).collect();
    if let Some(extra) = multiline_arg(multiline) {
        names.push(extra.to_owned());
    }
    names
}

/// `Keyword(/^…$/) do |…|` — the parenthesized-call style.
pub(super) fn wrapped(snippet: &Snippet<'_>) -> String {
    let inferred = infer(snippet.text, true);
    let args = arg_names(inferred.groups, snippet.multiline);
    format!(
        "{}(/{}/){}\n{}end",
        snippet.keyword,
        inferred.pattern,
        do_block(&args),
        body(snippet.multiline),
    )
}

/// `Keyword /^…$/ do` — the bare-literal style.
pub(super) fn classic(snippet: &Snippet<'_>) -> String {
    let inferred = infer(snippet.text, true);
    let args = arg_names(inferred.groups, snippet.multiline);
    format!(
        "{} /{}/{}\n{}end",
        snippet.keyword,
        inferred.pattern,
        do_block(&args),
        body(snippet.multiline),
    )
}

/// `Keyword %r{^…$} do |…|` — percent-delimited, so forward slashes stay
/// unescaped.
pub(super) fn percent(snippet: &Snippet<'_>) -> String {
    let inferred = infer(snippet.text, false);
    let args = arg_names(inferred.groups, snippet.multiline);
    format!(
        "{} %r{{{}}}{}\n{}end",
        snippet.keyword,
        inferred.pattern,
        do_block(&args),
        body(snippet.multiline),
    )
}
