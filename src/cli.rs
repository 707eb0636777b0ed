// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::titles;
use clap::{Arg, ArgAction, Command, crate_version};

fn output_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON instead of a table"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print JSON Lines instead of a table"),
    )
}

fn cost_structure_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("cost")
            .long("cost")
            .required(true)
            .help("Purchase price of the unit"),
    )
    .arg(
        Arg::new("cost-includes-vat")
            .long("cost-includes-vat")
            .action(ArgAction::SetTrue)
            .help("Treat the purchase price as VAT-inclusive"),
    )
    .arg(Arg::new("vat").long("vat").help("VAT rate % (default from config)"))
    .arg(
        Arg::new("commission")
            .long("commission")
            .help("Platform commission % on the VAT-inclusive price (default from config)"),
    )
    .arg(
        Arg::new("shipping")
            .long("shipping")
            .help("Shipping cost per unit (default from config)"),
    )
    .arg(
        Arg::new("ads")
            .long("ads")
            .help("Advertising cost per unit (default from config)"),
    )
}

pub fn build_cli() -> Command {
    Command::new("marginclip")
        .version(crate_version!())
        .about("Pricing, price solving, and profitability analysis for marketplace sellers")
        .subcommand(
            Command::new("price")
                .about("Price a single unit")
                .subcommand(output_flags(cost_structure_args(
                    Command::new("solve")
                        .about("Solve the VAT-inclusive sale price for a target margin or profit")
                        .arg(
                            Arg::new("margin")
                                .long("margin")
                                .conflicts_with("profit")
                                .help("Target margin % of the VAT-exclusive sale price"),
                        )
                        .arg(
                            Arg::new("profit")
                                .long("profit")
                                .help("Target absolute profit per unit"),
                        ),
                )))
                .subcommand(output_flags(cost_structure_args(
                    Command::new("check")
                        .about("Evaluate a chosen VAT-inclusive sale price")
                        .arg(
                            Arg::new("sale")
                                .long("sale")
                                .required(true)
                                .help("VAT-inclusive sale price to evaluate"),
                        ),
                ))),
        )
        .subcommand(
            Command::new("costs")
                .about("Manage the cost reference table")
                .subcommand(output_flags(
                    Command::new("list").about("List cost records"),
                ))
                .subcommand(
                    Command::new("set")
                        .about("Add or update one cost record")
                        .arg(
                            Arg::new("model")
                                .long("model")
                                .required(true)
                                .help("Model code grouping this barcode"),
                        )
                        .arg(Arg::new("barcode").long("barcode").required(true))
                        .arg(
                            Arg::new("price")
                                .long("price")
                                .required(true)
                                .help("Purchase price excluding VAT"),
                        ),
                )
                .subcommand(
                    Command::new("remove")
                        .about("Remove one cost record by barcode")
                        .arg(Arg::new("barcode").long("barcode").required(true)),
                )
                .subcommand(
                    Command::new("import")
                        .about("Import records from a cost sheet (CSV or spreadsheet)")
                        .arg(Arg::new("path").long("path").required(true)),
                )
                .subcommand(
                    Command::new("export")
                        .about("Export the cost table")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv or json"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(output_flags(
            Command::new("analyze")
                .about("Batch profitability over a platform order export")
                .arg(
                    Arg::new("orders")
                        .long("orders")
                        .required(true)
                        .help("Order export file (CSV or spreadsheet)"),
                )
                .arg(Arg::new("from").long("from").help("Keep orders from this date (YYYY-MM-DD)"))
                .arg(Arg::new("to").long("to").help("Keep orders up to this date (YYYY-MM-DD)"))
                .arg(Arg::new("vat").long("vat").help("VAT rate % (default from config)"))
                .arg(
                    Arg::new("commission")
                        .long("commission")
                        .help("Platform commission % (default from config)"),
                )
                .arg(
                    Arg::new("shipping-invoice")
                        .long("shipping-invoice")
                        .conflicts_with("shipping-per-order")
                        .help("Total shipping invoice to spread over matched units"),
                )
                .arg(
                    Arg::new("shipping-per-order")
                        .long("shipping-per-order")
                        .help("Shipping cost per order (default from config)"),
                )
                .arg(
                    Arg::new("ad-budget")
                        .long("ad-budget")
                        .requires("ad-platform")
                        .conflicts_with("ad-per-unit")
                        .help("Total ad budget to spread over one platform's units"),
                )
                .arg(
                    Arg::new("ad-platform")
                        .long("ad-platform")
                        .requires("ad-budget")
                        .help("Platform the ad budget was spent on"),
                )
                .arg(
                    Arg::new("ad-per-unit")
                        .long("ad-per-unit")
                        .help("Advertising cost per unit on every platform (default from config)"),
                ),
        ))
        .subcommand(output_flags(
            Command::new("title")
                .about("Compose a standardized product listing title")
                .arg(
                    Arg::new("category")
                        .long("category")
                        .required(true)
                        .help(format!("Product category, e.g. {}", titles::CATEGORIES.join(", "))),
                )
                .arg(
                    Arg::new("model")
                        .long("model")
                        .required(true)
                        .help("Model code appended to the title"),
                )
                .arg(
                    Arg::new("collar")
                        .long("collar")
                        .help(format!("Collar type, e.g. {}", titles::COLLARS.join(", "))),
                )
                .arg(
                    Arg::new("sleeve")
                        .long("sleeve")
                        .help(format!("Sleeve type, e.g. {}", titles::SLEEVES.join(", "))),
                )
                .arg(Arg::new("pattern").long("pattern").help("Pattern name, rendered as '<Pattern> Print'"))
                .arg(
                    Arg::new("pockets")
                        .long("pockets")
                        .action(ArgAction::SetTrue)
                        .help("Add the 'With Pockets' note"),
                )
                .arg(
                    Arg::new("fabric")
                        .long("fabric")
                        .help("Fabric blend; elastane adds the 'Stretch Fabric' note"),
                ),
        ))
        .subcommand(
            Command::new("config")
                .about("Show or change saved defaults")
                .subcommand(output_flags(
                    Command::new("show").about("Print current defaults"),
                ))
                .subcommand(
                    Command::new("set")
                        .about("Change one default")
                        .arg(
                            Arg::new("key")
                                .long("key")
                                .required(true)
                                .help("commission | shipping | ads | vat | margin"),
                        )
                        .arg(Arg::new("value").long("value").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check the cost table for data problems"))
}
