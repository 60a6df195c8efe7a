//! Build script for rule table validation
//!
//! This script runs at compile time and rejects a corrupt bone/rule table
//! before any code depending on it is built.

// Include the shared bone table sources
#[allow(dead_code)]
#[path = "src/bone/id.rs"]
mod id;
#[allow(dead_code)]
#[path = "src/bone/rules.rs"]
mod rules;

use id::BoneId;
use rules::{BONE_DEFS, BoneDef};
use std::collections::HashSet;

/// Validate a single bone definition
fn validate_bone(index: usize, def: &BoneDef) -> Vec<String> {
    let mut errors = Vec::new();

    if def.id.index() != index {
        errors.push(format!(
            "  {} sits at index {} but has id index {}",
            def.key,
            index,
            def.id.index()
        ));
    }
    if def.rules.is_empty() {
        errors.push(format!("  {} has no rules", def.key));
    }

    let mut seen = HashSet::new();
    for rule in def.rules {
        let label = format!(
            "{} {} {}",
            def.key,
            rule.action.as_str(),
            rule.direction.as_str()
        );
        if !seen.insert((rule.action, rule.direction)) {
            errors.push(format!("  {}: duplicate rule", label));
        }
        if !rule.axis.is_finite() || rule.axis.length_squared() < 1e-12 {
            errors.push(format!("  {}: zero or non-finite axis {:?}", label, rule.axis));
        }
        if !rule.limit.is_finite() || rule.limit < 0.0 {
            errors.push(format!("  {}: invalid limit {}", label, rule.limit));
        }
    }

    errors
}

fn main() {
    println!("cargo:rerun-if-changed=src/bone/id.rs");
    println!("cargo:rerun-if-changed=src/bone/rules.rs");

    let mut errors = Vec::new();
    let mut keys = HashSet::new();
    let mut names = HashSet::new();

    for (i, def) in BONE_DEFS.iter().enumerate() {
        errors.extend(validate_bone(i, def));

        if !keys.insert(def.key) {
            errors.push(format!("  duplicate bone key {}", def.key));
        }
        for name in [def.name_en, def.name_ja] {
            if !names.insert(name) {
                errors.push(format!("  duplicate display name {}", name));
            }
        }
    }

    if BoneId::COUNT > 64 {
        errors.push(format!("  {} bones do not fit a 64-bit mask", BoneId::COUNT));
    }

    if !errors.is_empty() {
        for error in &errors {
            println!("cargo:warning={}", error);
        }
        panic!("Rule table validation failed with {} error(s)", errors.len());
    }
}
