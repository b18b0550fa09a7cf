// src/pipeline/generate.rs

//! C++ header rendering.
//!
//! Renders the validated partition into a generated header with a fixed,
//! parseable grammar: a sorted category list and a class-to-category map
//! sorted by class name. Output is byte-identical for identical input.

use std::fmt::Write;

use crate::models::CategoryPartition;

/// Banner naming the producing tool inside the generated header.
pub const GENERATOR_NAME: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

/// Category names renamed in the emitted category list only; the
/// partition key and the class map are unaffected.
pub const DISPLAY_RENAMES: &[(&str, &str)] = &[("SFX", "Self")];

/// Render the partition as a C++ header.
pub fn render_header(partition: &CategoryPartition) -> String {
    let mut out = String::new();

    out.push_str("#pragma once\n\n");
    out.push_str("#include <string>\n");
    out.push_str("#include <vector>\n");
    out.push_str("#include <unordered_map>\n\n");
    out.push_str("// Doom class information auto-generated from ZDoom wiki.\n");
    let _ = writeln!(out, "// Generated by {GENERATOR_NAME}\n");

    out.push_str("// Listing default object categories in Doom\n");
    out.push_str("const std::vector<std::string> categories = {\n");
    for category in partition.categories().keys() {
        let _ = writeln!(out, "    \"{}\",", display_name(category));
    }
    out.push_str("};\n\n");

    out.push_str("// Mapping from class names to their category\n");
    out.push_str("const std::unordered_map<std::string, std::string> classToCategory = {\n");
    for (class, category) in partition.class_to_category() {
        let _ = writeln!(out, "    {{\"{class}\", \"{category}\"}},");
    }
    out.push_str("};\n");

    out
}

fn display_name(category: &str) -> &str {
    DISPLAY_RENAMES
        .iter()
        .find(|(from, _)| *from == category)
        .map(|(_, to)| *to)
        .unwrap_or(category)
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;

    fn sample_partition() -> CategoryPartition {
        let mut categories = BTreeMap::new();
        categories.insert(
            "Monster".to_string(),
            BTreeSet::from(["zombieman".to_string(), "cacodemon".to_string()]),
        );
        categories.insert(
            "SFX".to_string(),
            BTreeSet::from(["bulletpuff".to_string()]),
        );
        CategoryPartition::new(categories)
    }

    #[test]
    fn render_is_idempotent() {
        let partition = sample_partition();
        assert_eq!(render_header(&partition), render_header(&partition));
    }

    #[test]
    fn categories_are_sorted_and_renamed_for_display() {
        let rendered = render_header(&sample_partition());
        assert!(rendered.contains("    \"Monster\",\n    \"Self\",\n"));
        // The rename applies to the display list only.
        assert!(!rendered.contains("\"SFX\",\n"));
        assert!(rendered.contains("{\"bulletpuff\", \"SFX\"},"));
    }

    #[test]
    fn class_map_is_sorted_by_class_name() {
        let rendered = render_header(&sample_partition());
        let bullet = rendered.find("{\"bulletpuff\"").unwrap();
        let caco = rendered.find("{\"cacodemon\"").unwrap();
        let zombie = rendered.find("{\"zombieman\"").unwrap();
        assert!(bullet < caco && caco < zombie);
    }

    #[test]
    fn header_has_fixed_preamble() {
        let rendered = render_header(&sample_partition());
        assert!(rendered.starts_with("#pragma once\n"));
        assert!(rendered.contains("#include <unordered_map>"));
        assert!(rendered.contains("// Generated by"));
    }
}
