// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::TitleSpec;

/// Suggested vocabularies for listing titles. Any string is accepted;
/// these only seed the CLI help so titles stay consistent across listings.
pub const CATEGORIES: &[&str] = &["Dress", "Tunic", "Blouse", "Shirt", "Skirt", "Trousers"];
pub const COLLARS: &[&str] = &["Crew Neck", "V Neck", "Shirt Collar", "Turtleneck", "Square Neck"];
pub const SLEEVES: &[&str] = &[
    "Short Sleeve",
    "Long Sleeve",
    "Half Sleeve",
    "Sleeveless",
    "Balloon Sleeve",
];

/// Assembles a listing title in the house order: size prefix, collar,
/// sleeve, pattern, pockets, stretch note, category, model code. Empty
/// parts are skipped, parts are joined by single spaces.
pub fn build_title(spec: &TitleSpec) -> String {
    let mut parts: Vec<String> = vec!["Plus Size".to_string()];
    for part in [&spec.collar, &spec.sleeve] {
        let part = part.trim();
        if !part.is_empty() {
            parts.push(part.to_string());
        }
    }
    if let Some(pattern) = spec
        .pattern
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        parts.push(format!("{} Print", capitalize(pattern)));
    }
    if spec.pockets {
        parts.push("With Pockets".to_string());
    }
    if let Some(fabric) = spec.fabric.as_deref() {
        if fabric.to_lowercase().contains("elastan") {
            parts.push("Stretch Fabric".to_string());
        }
    }
    for part in [&spec.category, &spec.model_code] {
        let part = part.trim();
        if !part.is_empty() {
            parts.push(part.to_string());
        }
    }
    parts.join(" ")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
