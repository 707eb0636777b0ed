// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::TitleSpec;
use crate::titles;
use crate::utils::maybe_print_json;
use anyhow::Result;
use serde_json::json;

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    let json_flag = m.get_flag("json");
    let jsonl_flag = m.get_flag("jsonl");
    let spec = TitleSpec {
        category: m.get_one::<String>("category").unwrap().clone(),
        model_code: m.get_one::<String>("model").unwrap().clone(),
        collar: m.get_one::<String>("collar").cloned().unwrap_or_default(),
        sleeve: m.get_one::<String>("sleeve").cloned().unwrap_or_default(),
        pattern: m.get_one::<String>("pattern").cloned(),
        pockets: m.get_flag("pockets"),
        fabric: m.get_one::<String>("fabric").cloned(),
    };
    let title = titles::build_title(&spec);
    if maybe_print_json(json_flag, jsonl_flag, &json!({ "title": title }))? {
        return Ok(());
    }
    println!("{}", title);
    Ok(())
}
