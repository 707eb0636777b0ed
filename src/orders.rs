// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::OrderLine;
use crate::utils::{coerce_decimal, normalize_barcode, parse_flexible_date, read_xlsx_rows};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use rust_decimal::prelude::ToPrimitive;
use std::path::Path;

/// Outcome of reading an order export: typed lines plus the count of rows
/// discarded for an unparseable date, quantity, or amount.
#[derive(Debug, Default)]
pub struct OrderIngest {
    pub lines: Vec<OrderLine>,
    pub dropped: usize,
}

/// Reads a platform order export. CSV and the common spreadsheet formats
/// are both accepted; the column layout is matched by header name, not
/// position, so exports from different platforms line up.
pub fn read_order_file(path: &Path) -> Result<OrderIngest> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let rows = match ext.as_str() {
        "csv" => read_csv_rows(path)?,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_xlsx_rows(path)?,
        other => {
            return Err(anyhow!(
                "Unsupported order file type '{}' (expected csv or a spreadsheet)",
                other
            ));
        }
    };
    if rows.is_empty() {
        return Ok(OrderIngest::default());
    }
    parse_order_rows(rows)
}

/// Keeps lines whose order date falls inside the inclusive range.
pub fn filter_date_range(
    lines: Vec<OrderLine>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<OrderLine> {
    lines
        .into_iter()
        .filter(|l| from.is_none_or(|d| l.order_date >= d))
        .filter(|l| to.is_none_or(|d| l.order_date <= d))
        .collect()
}

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path.display()))?;
    let mut rows = Vec::new();
    for result in rdr.records() {
        let rec = result?;
        rows.push(rec.iter().map(|s| s.to_string()).collect());
    }
    Ok(rows)
}

fn header_index(headers: &[String], names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let h = h.trim();
        names.iter().any(|n| h.eq_ignore_ascii_case(n))
    })
}

fn parse_order_rows(rows: Vec<Vec<String>>) -> Result<OrderIngest> {
    let headers = &rows[0];
    let order_idx = header_index(
        headers,
        &["order_id", "order id", "order number", "sipariş no", "siparis no"],
    )
    .context("Order file has no order id column")?;
    let date_idx = header_index(
        headers,
        &["order_date", "date", "tarih", "sipariş tarihi", "siparis tarihi"],
    )
    .context("Order file has no date column")?;
    let qty_idx = header_index(headers, &["quantity", "qty", "adet"])
        .context("Order file has no quantity column")?;
    let amount_idx = header_index(
        headers,
        &["amount", "tutar", "unit price", "birim fiyat", "price"],
    )
    .context("Order file has no amount column")?;
    let barcode_idx = header_index(headers, &["barcode", "barkod"])
        .context("Order file has no barcode column")?;
    let platform_idx = header_index(headers, &["platform", "pazaryeri", "kanal"]);

    let cell = |row: &[String], idx: usize| -> String {
        row.get(idx).map(|s| s.trim().to_string()).unwrap_or_default()
    };

    let mut ingest = OrderIngest::default();
    for row in rows.iter().skip(1) {
        if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let Some(order_date) = parse_flexible_date(&cell(row, date_idx)) else {
            ingest.dropped += 1;
            continue;
        };
        let quantity = coerce_decimal(&cell(row, qty_idx)).and_then(|d| d.to_u32());
        let Some(quantity) = quantity.filter(|q| *q >= 1) else {
            ingest.dropped += 1;
            continue;
        };
        let Some(amount) = coerce_decimal(&cell(row, amount_idx)) else {
            ingest.dropped += 1;
            continue;
        };
        ingest.lines.push(OrderLine {
            order_id: cell(row, order_idx),
            order_date,
            platform: platform_idx.map(|idx| cell(row, idx)).unwrap_or_default(),
            quantity,
            amount,
            barcode: normalize_barcode(&cell(row, barcode_idx)),
        });
    }
    Ok(ingest)
}
