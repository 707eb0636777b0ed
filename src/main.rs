// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use marginclip::{cli, commands, store};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let costs = store::CostStore::open_default()?;
    let settings_path = store::settings_path()?;
    let settings = store::load_settings(&settings_path)?;

    match matches.subcommand() {
        Some(("price", sub)) => commands::price::handle(&settings, sub)?,
        Some(("costs", sub)) => commands::costs::handle(&costs, sub)?,
        Some(("analyze", sub)) => commands::analyze::handle(&costs, &settings, sub)?,
        Some(("title", sub)) => commands::title::handle(sub)?,
        Some(("config", sub)) => commands::config::handle(&settings_path, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&costs)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
