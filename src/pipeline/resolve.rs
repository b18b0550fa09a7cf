// src/pipeline/resolve.rs

//! Primary-category resolution.
//!
//! Flattens raw category memberships into a validated partition where
//! every class belongs to exactly one category. Classes the wiki lists
//! under several categories are resolved through a declarative override
//! table; a fixed injection list adds classes the artifact must carry
//! even though the wiki does not list them.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{AppError, Result};
use crate::models::{CategoryMap, CategoryPartition};

/// Non-wiki-sourced classes the artifact must always include, with the
/// category each one lands in.
pub const CLASS_INJECTIONS: &[(&str, &str)] = &[("marinechainsawvzd", "Monster")];

/// Classes the wiki lists in more than one category, and the category
/// each one is removed from. The survivor is its primary category.
/// Stale entries are reported by the partition check below.
pub const PRIMARY_CATEGORY_OVERRIDES: &[(&str, &str)] = &[
    // https://zdoom.org/wiki/Classes:HeadCandles
    ("headcandles", "Gore"),
    // https://zdoom.org/wiki/Classes:PlayerPawn
    ("playerpawn", "Player"),
    // https://zdoom.org/wiki/Classes:ZCorpseSitting
    ("zcorpsesitting", "Breakable"),
];

/// Resolve raw categories and the flattened class universe into a
/// validated [`CategoryPartition`].
///
/// Class names are casefolded; category names get their first
/// underscore collapsed into camel case. After injections and
/// overrides, every class in the universe must appear in exactly one
/// category or resolution fails with [`AppError::Partition`].
pub fn resolve_partition(
    categories: &CategoryMap,
    all_classes: &[String],
) -> Result<CategoryPartition> {
    let mut universe: BTreeSet<String> =
        all_classes.iter().map(|c| c.to_lowercase()).collect();

    let mut partition: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (category, members) in categories {
        let members = members.iter().map(|c| c.to_lowercase()).collect();
        partition.insert(normalize_category(category), members);
    }

    for (class, target_category) in CLASS_INJECTIONS {
        universe.insert(class.to_string());
        if let Some(members) = partition.get_mut(*target_category) {
            members.insert(class.to_string());
        }
    }

    log::info!("Handling classes that have multiple categories by setting primary category...");
    for (class, category) in PRIMARY_CATEGORY_OVERRIDES {
        match partition.get_mut(*category) {
            Some(members) => {
                if !members.remove(*class) {
                    log::warn!("Stale override: {class} not listed under {category}");
                }
            }
            None => log::warn!("Stale override: category {category} not discovered"),
        }
    }

    for class in &universe {
        let count = partition
            .values()
            .filter(|members| members.contains(class))
            .count();
        if count != 1 {
            return Err(AppError::partition(class, count));
        }
    }

    Ok(CategoryPartition::new(partition))
}

/// Collapse the first underscore in a category name into camel case,
/// e.g. `Ammo_pickup` becomes `AmmoPickup`.
fn normalize_category(name: &str) -> String {
    let Some(idx) = name.find('_') else {
        return name.to_string();
    };
    if idx == 0 {
        return name.to_string();
    }
    let Some(next) = name[idx + 1..].chars().next() else {
        return name.to_string();
    };
    name.replace(
        &format!("_{next}"),
        &next.to_uppercase().collect::<String>(),
    )
}

/// Flatten category members into the sorted, unique class universe.
pub fn flatten_classes(categories: &CategoryMap) -> Vec<String> {
    let universe: BTreeSet<&String> = categories.values().flatten().collect();
    universe.into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_map(entries: &[(&str, &[&str])]) -> CategoryMap {
        entries
            .iter()
            .map(|(category, members)| {
                (
                    category.to_string(),
                    members.iter().map(|m| m.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn override_resolves_multi_category_class() {
        let categories = to_map(&[
            ("Monster", &["zombieman", "headcandles"]),
            ("Gore", &["headcandles", "gibs"]),
        ]);
        let all_classes = flatten_classes(&categories);

        let partition = resolve_partition(&categories, &all_classes).unwrap();
        assert!(partition.categories()["Monster"].contains("headcandles"));
        assert!(!partition.categories()["Gore"].contains("headcandles"));
    }

    #[test]
    fn injection_adds_synthetic_class_once() {
        let categories = to_map(&[("Monster", &["ZombieMan"])]);
        let all_classes = flatten_classes(&categories);

        let partition = resolve_partition(&categories, &all_classes).unwrap();
        let monster = &partition.categories()["Monster"];
        assert!(monster.contains("marinechainsawvzd"));
        assert_eq!(
            monster.iter().filter(|c| *c == "marinechainsawvzd").count(),
            1
        );
        // Sorted order preserved by the set representation.
        let members: Vec<_> = monster.iter().cloned().collect();
        assert_eq!(members, vec!["marinechainsawvzd", "zombieman"]);
    }

    #[test]
    fn unresolved_duplicate_is_fatal_with_count() {
        let categories = to_map(&[
            ("Monster", &["cacodemon", "lostsoul"]),
            ("Decoration", &["lostsoul"]),
        ]);
        let all_classes = flatten_classes(&categories);

        let err = resolve_partition(&categories, &all_classes).unwrap_err();
        match err {
            AppError::Partition { class, count } => {
                assert_eq!(class, "lostsoul");
                assert_eq!(count, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unassigned_class_is_fatal_with_zero_count() {
        let categories = to_map(&[("Monster", &["zombieman"])]);
        let all_classes = vec!["zombieman".to_string(), "orphan".to_string()];

        let err = resolve_partition(&categories, &all_classes).unwrap_err();
        match err {
            AppError::Partition { class, count } => {
                assert_eq!(class, "orphan");
                assert_eq!(count, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn class_names_are_casefolded() {
        let categories = to_map(&[("Monster", &["ZombieMan", "CACODEMON"])]);
        let all_classes = flatten_classes(&categories);

        let partition = resolve_partition(&categories, &all_classes).unwrap();
        let members: Vec<_> = partition.categories()["Monster"]
            .iter()
            .cloned()
            .collect();
        assert!(members.contains(&"zombieman".to_string()));
        assert!(members.contains(&"cacodemon".to_string()));
    }

    #[test]
    fn category_names_are_camel_cased() {
        assert_eq!(normalize_category("Ammo_pickup"), "AmmoPickup");
        assert_eq!(normalize_category("Monster"), "Monster");
        assert_eq!(normalize_category("_leading"), "_leading");
        assert_eq!(normalize_category("trailing_"), "trailing_");
    }

    #[test]
    fn flatten_is_sorted_and_unique() {
        let categories = to_map(&[
            ("Monster", &["zombieman", "cacodemon"]),
            ("Gore", &["gibs", "cacodemon"]),
        ]);
        assert_eq!(
            flatten_classes(&categories),
            vec!["cacodemon", "gibs", "zombieman"]
        );
    }
}
