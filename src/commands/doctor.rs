// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::CostStore;
use crate::utils::pretty_table;
use anyhow::Result;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

pub fn handle(store: &CostStore) -> Result<()> {
    let load = store.load_all()?;
    let mut rows = Vec::new();

    // 1) Rows the loader could not keep
    if load.duplicates > 0 {
        rows.push(vec![
            "duplicate_barcode".into(),
            format!("{} row(s) collapsed, last write kept", load.duplicates),
        ]);
    }
    if load.dropped > 0 {
        rows.push(vec![
            "unusable_row".into(),
            format!("{} row(s) skipped at load", load.dropped),
        ]);
    }

    // 2) Prices that cannot be real purchase costs
    for rec in &load.records {
        if rec.purchase_price_excl_tax <= Decimal::ZERO {
            rows.push(vec![
                "non_positive_price".into(),
                format!("{} ({})", rec.barcode, rec.model_code),
            ]);
        }
    }

    // 3) One model code carrying different purchase prices; batch analysis
    //    uses the first-seen price, so spread here means skewed totals
    let mut by_model: BTreeMap<&str, Vec<Decimal>> = BTreeMap::new();
    for rec in &load.records {
        by_model
            .entry(rec.model_code.as_str())
            .or_default()
            .push(rec.purchase_price_excl_tax);
    }
    for (model, prices) in by_model {
        if let (Some(min), Some(max)) = (prices.iter().min(), prices.iter().max()) {
            if min != max {
                rows.push(vec![
                    "model_price_variance".into(),
                    format!("{}: {} .. {}", model, min, max),
                ]);
            }
        }
    }

    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
