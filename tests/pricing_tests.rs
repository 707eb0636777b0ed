// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use marginclip::models::Settings;
use marginclip::{cli, commands::price};

#[test]
fn solve_uses_saved_defaults_when_flags_are_omitted() {
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["marginclip", "price", "solve", "--cost", "270"]);
    if let Some(("price", price_m)) = matches.subcommand() {
        price::handle(&Settings::default(), price_m).unwrap();
    } else {
        panic!("no price subcommand");
    }
}

#[test]
fn solve_reports_an_unreachable_margin_with_its_rates() {
    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "marginclip", "price", "solve", "--cost", "270", "--margin", "99.9",
    ]);
    if let Some(("price", price_m)) = matches.subcommand() {
        let err = price::handle(&Settings::default(), price_m).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("margin 99.9%"));
        assert!(msg.contains("21.5"));
    } else {
        panic!("no price subcommand");
    }
}

#[test]
fn solve_rejects_margin_and_profit_together() {
    let cli = cli::build_cli();
    let err = cli
        .try_get_matches_from([
            "marginclip", "price", "solve", "--cost", "270", "--margin", "20", "--profit", "150",
        ])
        .unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
}

#[test]
fn solve_rejects_a_malformed_cost() {
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["marginclip", "price", "solve", "--cost", "abc"]);
    if let Some(("price", price_m)) = matches.subcommand() {
        let err = price::handle(&Settings::default(), price_m).unwrap_err();
        assert!(err.to_string().contains("Invalid --cost 'abc'"));
    } else {
        panic!("no price subcommand");
    }
}

#[test]
fn check_accepts_flag_overrides() {
    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "marginclip",
        "price",
        "check",
        "--sale",
        "837.76",
        "--cost",
        "270",
        "--vat",
        "10",
        "--commission",
        "21.5",
        "--shipping",
        "80",
        "--ads",
        "30",
    ]);
    if let Some(("price", price_m)) = matches.subcommand() {
        price::handle(&Settings::default(), price_m).unwrap();
    } else {
        panic!("no price subcommand");
    }
}

#[test]
fn check_tolerates_a_non_positive_sale_price() {
    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "marginclip", "price", "check", "--sale", "0", "--cost", "270",
    ]);
    if let Some(("price", price_m)) = matches.subcommand() {
        price::handle(&Settings::default(), price_m).unwrap();
    } else {
        panic!("no price subcommand");
    }
}

#[test]
fn check_answers_in_json_even_for_a_non_positive_sale_price() {
    let dir = tempfile::tempdir().unwrap();
    let out = std::process::Command::new(env!("CARGO_BIN_EXE_marginclip"))
        .env("XDG_DATA_HOME", dir.path())
        .args(["price", "check", "--sale", "0", "--cost", "270", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(parsed["applicable"], false);
}

#[test]
fn check_with_inclusive_purchase_price_matches_exclusive_equivalent() {
    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "marginclip",
        "price",
        "check",
        "--sale",
        "900",
        "--cost",
        "297",
        "--cost-includes-vat",
        "--vat",
        "10",
    ]);
    if let Some(("price", price_m)) = matches.subcommand() {
        price::handle(&Settings::default(), price_m).unwrap();
    } else {
        panic!("no price subcommand");
    }
}
