// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{CostRecord, Settings};
use crate::utils::{coerce_decimal, normalize_barcode, read_xlsx_rows};
use anyhow::{Context, Result, anyhow};
use csv::ReaderBuilder;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Marginclip", "marginclip"));

pub fn data_dir() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let dir = proj.data_dir();
    fs::create_dir_all(dir).context("Failed to create data dir")?;
    Ok(dir.to_path_buf())
}

pub fn costs_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("costs.csv"))
}

pub fn settings_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("settings.json"))
}

/// Outcome of reading a cost table: the surviving records plus how many
/// rows were dropped (unusable) or folded into an earlier barcode.
#[derive(Debug, Default)]
pub struct CostLoad {
    pub records: Vec<CostRecord>,
    pub dropped: usize,
    pub duplicates: usize,
}

/// The cost reference table, one CSV file. Loaded whole, saved whole.
#[derive(Debug, Clone)]
pub struct CostStore {
    path: PathBuf,
}

impl CostStore {
    pub fn open_default() -> Result<Self> {
        Ok(Self { path: costs_path()? })
    }

    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty store.
    pub fn load_all(&self) -> Result<CostLoad> {
        if !self.path.exists() {
            return Ok(CostLoad::default());
        }
        let rows = read_csv_rows(&self.path)?;
        if rows.is_empty() {
            return Ok(CostLoad::default());
        }
        parse_cost_rows(rows)
    }

    /// Writes the whole table through a temp file so a crash mid-write
    /// cannot leave a half-written store behind.
    pub fn save_all(&self, records: &[CostRecord]) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Create data dir {}", dir.display()))?;
        }
        let tmp = self.path.with_extension("csv.tmp");
        {
            let mut w = csv::Writer::from_path(&tmp)
                .with_context(|| format!("Write cost table {}", tmp.display()))?;
            w.write_record(["model_code", "barcode", "purchase_price_excl_tax"])?;
            for rec in records {
                w.write_record([
                    rec.model_code.as_str(),
                    rec.barcode.as_str(),
                    &rec.purchase_price_excl_tax.to_string(),
                ])?;
            }
            w.flush()?;
        }
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Replace cost table {}", self.path.display()))?;
        Ok(())
    }

    pub fn upsert(&self, record: CostRecord) -> Result<()> {
        let mut load = self.load_all()?;
        let key = normalize_barcode(&record.barcode);
        let record = CostRecord {
            barcode: key.clone(),
            ..record
        };
        match load.records.iter_mut().find(|r| r.barcode == key) {
            Some(existing) => *existing = record,
            None => load.records.push(record),
        }
        self.save_all(&load.records)
    }

    pub fn remove(&self, barcode: &str) -> Result<bool> {
        let mut load = self.load_all()?;
        let key = normalize_barcode(barcode);
        let before = load.records.len();
        load.records.retain(|r| r.barcode != key);
        let removed = load.records.len() != before;
        if removed {
            self.save_all(&load.records)?;
        }
        Ok(removed)
    }
}

/// Reads an external cost sheet (CSV or spreadsheet) with the same header
/// aliases and coercion the store itself uses.
pub fn read_cost_sheet(path: &Path) -> Result<CostLoad> {
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
                "Unsupported cost sheet type '{}' (expected csv or a spreadsheet)",
                other
            ));
        }
    };
    if rows.is_empty() {
        return Ok(CostLoad::default());
    }
    parse_cost_rows(rows)
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

fn parse_cost_rows(rows: Vec<Vec<String>>) -> Result<CostLoad> {
    let headers = &rows[0];
    let model_idx = header_index(headers, &["model_code", "model", "model kodu", "stok kodu"])
        .context("Cost sheet has no model code column")?;
    let barcode_idx =
        header_index(headers, &["barcode", "barkod"]).context("Cost sheet has no barcode column")?;
    let price_idx = header_index(
        headers,
        &[
            "purchase_price_excl_tax",
            "purchase_price",
            "price",
            "alış fiyatı",
            "alis fiyati",
            "maliyet",
        ],
    )
    .context("Cost sheet has no purchase price column")?;

    let mut load = CostLoad::default();
    let mut seen: HashMap<String, usize> = HashMap::new();
    for row in rows.iter().skip(1) {
        let barcode = normalize_barcode(row.get(barcode_idx).map(String::as_str).unwrap_or(""));
        let model_code = row
            .get(model_idx)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        if barcode.is_empty() || model_code.is_empty() {
            load.dropped += 1;
            continue;
        }
        let Some(price) = row
            .get(price_idx)
            .map(String::as_str)
            .and_then(coerce_decimal)
        else {
            load.dropped += 1;
            continue;
        };
        let record = CostRecord {
            model_code,
            barcode: barcode.clone(),
            purchase_price_excl_tax: price,
        };
        match seen.get(&barcode) {
            // Last write wins, first position kept.
            Some(&idx) => {
                load.records[idx] = record;
                load.duplicates += 1;
            }
            None => {
                seen.insert(barcode, load.records.len());
                load.records.push(record);
            }
        }
    }
    Ok(load)
}

pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Read settings {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Parse settings {}", path.display()))
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("Create data dir {}", dir.display()))?;
    }
    let raw = serde_json::to_string_pretty(settings)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, raw).with_context(|| format!("Write settings {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("Swap settings into {}", path.display()))?;
    Ok(())
}
