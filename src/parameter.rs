// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Parameter type catalog: named patterns with transformers, consulted for
//! expression matching and snippet-expression generation.

use std::{
    cmp::Reverse,
    fmt::{self, Debug, Formatter},
    ops::Range,
    rc::Rc,
};

use cucumber_expressions::{expand::parameters::Provider, Spanned};
use lazy_regex::regex;
use linked_hash_map::LinkedHashMap;
use regex::Regex;

use crate::{error::PatternError, step::Value};

/// Upper bound on generated snippet-expression combinations per text.
const MAX_EXPRESSIONS: usize = 256;

/// Text-to-[`Value`] conversion applied to a parameter's captured substring.
pub type Transformer = Rc<dyn Fn(&str) -> Value>;

/// Named, reusable pattern plus transformer, usable both for matching
/// expression-style step definitions and for snippet-expression generation.
///
/// The pattern must not contain capture groups: compiled expressions map one
/// capture group to one parameter.
#[derive(Clone)]
pub struct ParameterType {
    name: String,
    regexp: Regex,
    transformer: Transformer,
    use_for_snippets: bool,
    prefer_for_regexp_match: bool,
}

impl Debug for ParameterType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterType")
            .field("name", &self.name)
            .field("regexp", &self.regexp.as_str())
            .field("use_for_snippets", &self.use_for_snippets)
            .field("prefer_for_regexp_match", &self.prefer_for_regexp_match)
            .finish_non_exhaustive()
    }
}

impl ParameterType {
    /// Creates a new [`ParameterType`], snippet-enabled and non-preferential
    /// by default.
    ///
    /// # Errors
    ///
    /// [`PatternError`] if `pattern` is not a valid regular expression or
    /// contains capture groups.
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        transformer: impl Fn(&str) -> Value + 'static,
    ) -> Result<Self, PatternError> {
        let regexp = Regex::new(pattern).map_err(|e| {
            PatternError::BadParameterPattern {
                pattern: pattern.to_owned(),
                message: e.to_string(),
            }
        })?;
        if regexp.captures_len() > 1 {
            return Err(PatternError::CaptureGroups { pattern: pattern.to_owned() });
        }

        Ok(Self {
            name: name.into(),
            regexp,
            transformer: Rc::new(transformer),
            use_for_snippets: true,
            prefer_for_regexp_match: false,
        })
    }

    /// Whether this type should be offered during snippet generation.
    #[must_use]
    pub fn use_for_snippets(mut self, yes: bool) -> Self {
        self.use_for_snippets = yes;
        self
    }

    /// Whether this type wins over non-preferential ones competing for the
    /// same substring.
    #[must_use]
    pub fn prefer_for_regexp_match(mut self, yes: bool) -> Self {
        self.prefer_for_regexp_match = yes;
        self
    }

    /// The name this type is referenced by in expressions.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The matching pattern.
    #[must_use]
    pub fn regexp(&self) -> &Regex {
        &self.regexp
    }

    /// Transforms a captured substring into its [`Value`].
    #[must_use]
    pub fn transform(&self, raw: &str) -> Value {
        (self.transformer)(raw)
    }

    /// Built-in type constructor: patterns are static and known-good.
    fn builtin(
        name: &str,
        regexp: Regex,
        transformer: impl Fn(&str) -> Value + 'static,
        use_for_snippets: bool,
        prefer_for_regexp_match: bool,
    ) -> Self {
        Self {
            name: name.to_owned(),
            regexp,
            transformer: Rc::new(transformer),
            use_for_snippets,
            prefer_for_regexp_match,
        }
    }
}

/// Candidate expression proposed by [`ParameterTypeRegistry::generate_expressions()`]:
/// the expression source plus the parameter names its block arguments use.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedExpression {
    text: String,
    parameter_names: Vec<String>,
}

impl GeneratedExpression {
    /// The candidate expression source.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Block-argument names, one per parameter, deduplicated with numeric
    /// suffixes.
    #[must_use]
    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }
}

/// Ordered catalog of [`ParameterType`]s.
///
/// Pre-seeded with the built-ins `int`, `float`, `word` and `string`.
/// Matching and snippet generation consume it read-only; definition order is
/// preserved and breaks ranking ties.
#[derive(Debug)]
pub struct ParameterTypeRegistry {
    types: LinkedHashMap<String, ParameterType>,
}

impl Default for ParameterTypeRegistry {
    fn default() -> Self {
        let mut this = Self { types: LinkedHashMap::new() };

        this.define(ParameterType::builtin(
            "int",
            Regex::clone(regex!(r"-?\d+")),
            |raw| raw.parse().map_or_else(|_| Value::String(raw.to_owned()), Value::Int),
            true,
            true,
        ));
        this.define(ParameterType::builtin(
            "float",
            Regex::clone(regex!(r"-?\d*\.?\d+")),
            |raw| raw.parse().map_or_else(|_| Value::String(raw.to_owned()), Value::Float),
            true,
            false,
        ));
        this.define(ParameterType::builtin(
            "word",
            Regex::clone(regex!(r"[^\s]+")),
            |raw| Value::String(raw.to_owned()),
            false,
            false,
        ));
        this.define(ParameterType::builtin(
            "string",
            Regex::clone(regex!(r#""[^"]*"|'[^']*'"#)),
            |raw| {
                let unquoted = raw
                    .strip_prefix('"')
                    .and_then(|s| s.strip_suffix('"'))
                    .or_else(|| {
                        raw.strip_prefix('\'').and_then(|s| s.strip_suffix('\''))
                    })
                    .unwrap_or(raw);
                Value::String(unquoted.to_owned())
            },
            true,
            false,
        ));

        this
    }
}

impl ParameterTypeRegistry {
    /// Creates a catalog holding the built-in types.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a parameter type, replacing any previous one of the same
    /// name.
    pub fn define(&mut self, parameter: ParameterType) {
        drop(self.types.insert(parameter.name.clone(), parameter));
    }

    /// Looks up a type by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&ParameterType> {
        self.types.get(name)
    }

    /// Proposes candidate expressions matching the literal `text`, best
    /// first.
    ///
    /// Snippet-enabled types compete for substrings left to right (earliest,
    /// then longest match claims a slot); within a slot, preferential types
    /// outrank the rest and definition order breaks ties. Every viable
    /// combination is returned, capped at a fixed bound.
    #[must_use]
    pub fn generate_expressions(&self, text: &str) -> Vec<GeneratedExpression> {
        let slots = self.parameter_slots(text);

        let counts: Vec<usize> = slots.iter().map(|(_, c)| c.len()).collect();
        let mut total = 1_usize;
        for c in &counts {
            total = total.saturating_mul(*c);
        }
        let total = total.min(MAX_EXPRESSIONS);

        let mut expressions = Vec::with_capacity(total);
        for seq in 0..total {
            let mut rem = seq;
            let mut choice = vec![0; counts.len()];
            for i in (0..counts.len()).rev() {
                choice[i] = rem % counts[i];
                rem /= counts[i];
            }
            expressions.push(self.render_expression(text, &slots, &choice));
        }
        expressions
    }

    /// Finds the disjoint substring slots parameter types compete for, in
    /// text order, each with its ranked candidate types.
    fn parameter_slots(&self, text: &str) -> Vec<(Range<usize>, Vec<&ParameterType>)> {
        let snippet_types: Vec<(usize, &ParameterType)> = self
            .types
            .values()
            .enumerate()
            .filter(|(_, p)| p.use_for_snippets)
            .collect();

        let mut slots = Vec::new();
        let mut pos = 0;
        while pos < text.len() {
            let mut span: Option<Range<usize>> = None;
            for (_, par) in &snippet_types {
                if let Some(found) = par.regexp.find_at(text, pos) {
                    let found = found.range();
                    let better = span.as_ref().map_or(true, |best| {
                        (found.start, Reverse(found.end))
                            < (best.start, Reverse(best.end))
                    });
                    if better {
                        span = Some(found);
                    }
                }
            }
            let Some(span) = span else { break };
            if span.end <= pos {
                break;
            }

            let mut candidates: Vec<(usize, &ParameterType)> = snippet_types
                .iter()
                .filter(|(_, p)| {
                    p.regexp.find_at(text, pos).map(|m| m.range()) == Some(span.clone())
                })
                .copied()
                .collect();
            candidates.sort_by_key(|(order, p)| {
                (Reverse(p.prefer_for_regexp_match), *order)
            });

            pos = span.end;
            slots.push((span, candidates.into_iter().map(|(_, p)| p).collect()));
        }
        slots
    }

    /// Renders one combination of slot candidates into an expression.
    fn render_expression(
        &self,
        text: &str,
        slots: &[(Range<usize>, Vec<&ParameterType>)],
        choice: &[usize],
    ) -> GeneratedExpression {
        let mut out = String::new();
        let mut names: Vec<String> = Vec::new();
        let mut cursor = 0;

        for (slot, &picked) in slots.iter().zip(choice) {
            let (span, candidates) = slot;
            escape_expression_text(&text[cursor..span.start], &mut out);

            let par = candidates[picked];
            out.push('{');
            out.push_str(&par.name);
            out.push('}');

            let base = if par.name.is_empty() { "arg" } else { par.name.as_str() };
            let repeats = names
                .iter()
                .filter(|n| {
                    n.as_str() == base
                        || (n.starts_with(base)
                            && n[base.len()..].chars().all(|c| c.is_ascii_digit()))
                })
                .count();
            names.push(if repeats == 0 {
                base.to_owned()
            } else {
                format!("{base}{}", repeats + 1)
            });

            cursor = span.end;
        }
        escape_expression_text(&text[cursor..], &mut out);

        GeneratedExpression { text: out, parameter_names: names }
    }
}

/// The compiler's parameter lookup: the catalog is the oracle mapping a
/// parameter name to its matching pattern.
impl<'p, 's> Provider<Spanned<'s>> for &'p ParameterTypeRegistry {
    type Item = char;
    type Value = &'p str;

    fn get(&self, input: &Spanned<'s>) -> Option<Self::Value> {
        let registry: &'p ParameterTypeRegistry = *self;
        registry.lookup(input.fragment()).map(|par| par.regexp.as_str())
    }
}

/// Escapes characters that are syntax inside an expression.
fn escape_expression_text(chunk: &str, out: &mut String) {
    for ch in chunk.chars() {
        if matches!(ch, '\\' | '(' | '{' | '/') {
            out.push('\\');
        }
        out.push(ch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_int_transforms() {
        let catalog = ParameterTypeRegistry::new();
        let int = catalog.lookup("int").unwrap();
        assert_eq!(int.transform("42"), Value::Int(42));
        assert_eq!(int.transform("-3"), Value::Int(-3));
    }

    #[test]
    fn builtin_string_strips_quotes() {
        let catalog = ParameterTypeRegistry::new();
        let string = catalog.lookup("string").unwrap();
        assert_eq!(string.transform("\"cuke\""), Value::String("cuke".into()));
        assert_eq!(string.transform("'cuke'"), Value::String("cuke".into()));
    }

    #[test]
    fn capture_groups_are_rejected() {
        let err = ParameterType::new("color", "(red|blue)", |raw| {
            Value::String(raw.to_owned())
        })
        .unwrap_err();
        assert!(matches!(err, PatternError::CaptureGroups { .. }));

        assert!(ParameterType::new("color", "red|blue", |raw| {
            Value::String(raw.to_owned())
        })
        .is_ok());
    }

    #[test]
    fn generates_int_expression_with_float_alternative() {
        let catalog = ParameterTypeRegistry::new();
        let generated = catalog.generate_expressions("Cloud 9 yeah");

        assert_eq!(generated[0].text(), "Cloud {int} yeah");
        assert_eq!(generated[0].parameter_names(), ["int"]);
        assert_eq!(generated[1].text(), "Cloud {float} yeah");
        assert_eq!(generated[1].parameter_names(), ["float"]);
    }

    #[test]
    fn generates_string_expression_per_quoted_run() {
        let catalog = ParameterTypeRegistry::new();
        let generated = catalog.generate_expressions("A \"first\" and \"second\" arg");

        assert_eq!(generated[0].text(), "A {string} and {string} arg");
        assert_eq!(generated[0].parameter_names(), ["string", "string2"]);
    }

    #[test]
    fn literal_text_yields_one_expression() {
        let catalog = ParameterTypeRegistry::new();
        let generated = catalog.generate_expressions("plain step text");

        assert_eq!(generated.len(), 1);
        assert_eq!(generated[0].text(), "plain step text");
        assert!(generated[0].parameter_names().is_empty());
    }

    #[test]
    fn custom_preferential_type_outranks_builtin() {
        let mut catalog = ParameterTypeRegistry::new();
        catalog.define(
            ParameterType::new("name", r#""[^"]*""#, |raw| {
                Value::String(raw.trim_matches('"').to_owned())
            })
            .unwrap()
            .prefer_for_regexp_match(true),
        );

        let generated = catalog.generate_expressions("greet \"Alice\"");
        assert_eq!(generated[0].text(), "greet {name}");
        assert_eq!(generated[1].text(), "greet {string}");
    }

    #[test]
    fn non_preferential_custom_type_ranks_after_definition_order() {
        let mut catalog = ParameterTypeRegistry::new();
        catalog.define(
            ParameterType::new("ordinal", r"\d+", |raw| {
                raw.parse().map_or(Value::Nil, Value::Int)
            })
            .unwrap(),
        );

        let generated = catalog.generate_expressions("slot 7");
        assert_eq!(generated[0].text(), "slot {int}");
        assert_eq!(generated[1].text(), "slot {float}");
        assert_eq!(generated[2].text(), "slot {ordinal}");
    }

    #[test]
    fn snippet_disabled_types_do_not_compete() {
        let catalog = ParameterTypeRegistry::new();
        // `word` matches any token but is not snippet-enabled, so plain
        // words stay literal.
        let generated = catalog.generate_expressions("just words");
        assert_eq!(generated[0].text(), "just words");
    }

    #[test]
    fn expression_syntax_is_escaped() {
        let catalog = ParameterTypeRegistry::new();
        let generated = catalog.generate_expressions("pick (a) or {b} or c/d");
        assert_eq!(generated[0].text(), "pick \\(a) or \\{b} or c\\/d");
    }
}
