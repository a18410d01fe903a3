// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Expression-flavoured renderer: the catalog's best candidate live, every
//! other viable candidate commented out directly beneath it.

use std::fmt::Write as _;

use super::{body, do_block, multiline_arg, Snippet};

pub(super) fn render(snippet: &Snippet<'_>) -> String {
    let candidates = snippet.parameters.generate_expressions(snippet.text);

    let mut out = String::new();
    for (idx, candidate) in candidates.iter().enumerate() {
        let mut args = candidate.parameter_names().to_vec();
        if let Some(extra) = multiline_arg(snippet.multiline) {
            args.push(extra.to_owned());
        }

        if idx > 0 {
            out.push_str("# ");
        }
        // Infallible on `String`.
        let _ = writeln!(
            out,
            "{}('{}'){}",
            snippet.keyword,
            candidate.text(),
            do_block(&args),
        );
    }
    out.push_str(&body(snippet.multiline));
    out.push_str("end");
    out
}
