//! Place group building: partition, rank, deduplicate.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::geo::{distance, Coordinate};

use super::{CatalogConfig, ItemIdentity, PlaceCategory, RawElement, UnmatchedPolicy};

/// A ranked point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceItem {
    /// Stable dedup and lookup key.
    pub identity: ItemIdentity,
    /// Bucket this item belongs to.
    pub category: PlaceCategory,
    /// Place name.
    pub name: String,
    /// Place position.
    pub coordinate: Coordinate,
    /// Distance from the origin at fetch time, metres.
    pub distance_meters: f64,
}

/// One category bucket with its ranked items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceGroup {
    /// The bucket.
    pub category: PlaceCategory,
    /// Items sorted ascending by distance.
    pub items: Vec<PlaceItem>,
}

const FOOD_AMENITIES: [&str; 3] = ["cafe", "restaurant", "bar"];
const FUN_LEISURE: [&str; 2] = ["park", "garden"];

fn classify(element: &RawElement, policy: UnmatchedPolicy) -> Option<PlaceCategory> {
    if element
        .tag("amenity")
        .is_some_and(|value| FOOD_AMENITIES.contains(&value))
    {
        return Some(PlaceCategory::Food);
    }
    if element
        .tag("leisure")
        .is_some_and(|value| FUN_LEISURE.contains(&value))
        || element.tag("tourism") == Some("museum")
    {
        return Some(PlaceCategory::Fun);
    }
    match policy {
        UnmatchedPolicy::AssignService => Some(PlaceCategory::Service),
        UnmatchedPolicy::Drop => None,
    }
}

/// Partition raw elements into the fixed category buckets.
///
/// Membership rules run in a fixed priority order and the first match wins,
/// so no element lands in two buckets. Elements without a resolvable point or
/// a `name` tag are dropped. Every bucket is returned, empty or not, in the
/// [`PlaceCategory::ALL`] display order; each is sorted ascending by distance
/// and deduplicated by identity.
#[must_use]
pub fn build_place_groups(
    elements: &[RawElement],
    origin: Coordinate,
    config: &CatalogConfig,
) -> Vec<PlaceGroup> {
    let mut groups: Vec<PlaceGroup> = PlaceCategory::ALL
        .into_iter()
        .map(|category| PlaceGroup {
            category,
            items: Vec::new(),
        })
        .collect();

    for element in elements {
        let Some(coordinate) = element.resolved_point() else {
            continue;
        };
        let Some(name) = element.tag("name") else {
            continue;
        };
        let Some(category) = classify(element, config.unmatched_policy) else {
            continue;
        };

        let item = PlaceItem {
            identity: ItemIdentity::derive(category.key(), coordinate),
            category,
            name: name.to_owned(),
            coordinate,
            distance_meters: distance(origin, coordinate),
        };
        if let Some(group) = groups.iter_mut().find(|group| group.category == category) {
            group.items.push(item);
        }
    }

    for group in &mut groups {
        group
            .items
            .sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
        let mut seen = HashSet::new();
        group.items.retain(|item| seen.insert(item.identity.clone()));
        if let Some(cap) = config.place_group_cap {
            group.items.truncate(cap);
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    //! Regression coverage for place partitioning.

    use rstest::rstest;

    use crate::domain::catalog::test_support::element;

    use super::*;

    fn origin() -> Coordinate {
        Coordinate::new(55.95, -3.19)
    }

    fn group(groups: &[PlaceGroup], category: PlaceCategory) -> &PlaceGroup {
        groups
            .iter()
            .find(|group| group.category == category)
            .expect("all buckets are always present")
    }

    #[rstest]
    #[case::cafe(&[("amenity", "cafe"), ("name", "Brew")], PlaceCategory::Food)]
    #[case::bar(&[("amenity", "bar"), ("name", "Taproom")], PlaceCategory::Food)]
    #[case::park(&[("leisure", "park"), ("name", "Meadows")], PlaceCategory::Fun)]
    #[case::museum(&[("tourism", "museum"), ("name", "Annex")], PlaceCategory::Fun)]
    #[case::other(&[("amenity", "pharmacy"), ("name", "Chemist")], PlaceCategory::Service)]
    fn partitions_by_the_fixed_rule_table(
        #[case] tags: &[(&str, &str)],
        #[case] expected: PlaceCategory,
    ) {
        let groups = build_place_groups(
            &[element(Some((55.951, -3.19)), tags)],
            origin(),
            &CatalogConfig::default(),
        );

        assert_eq!(group(&groups, expected).items.len(), 1);
        let other_buckets: usize = groups
            .iter()
            .filter(|g| g.category != expected)
            .map(|g| g.items.len())
            .sum();
        assert_eq!(other_buckets, 0, "partition puts each element in one bucket");
    }

    #[rstest]
    fn food_rule_outranks_fun_rule() {
        let cafe_in_park = element(
            Some((55.951, -3.19)),
            &[("amenity", "cafe"), ("leisure", "garden"), ("name", "Glasshouse")],
        );

        let groups = build_place_groups(&[cafe_in_park], origin(), &CatalogConfig::default());
        assert_eq!(group(&groups, PlaceCategory::Food).items.len(), 1);
        assert!(group(&groups, PlaceCategory::Fun).items.is_empty());
    }

    #[rstest]
    fn drop_policy_discards_unmatched_elements() {
        let unmatched = element(Some((55.951, -3.19)), &[("amenity", "pharmacy"), ("name", "Chemist")]);
        let config = CatalogConfig {
            unmatched_policy: UnmatchedPolicy::Drop,
            ..CatalogConfig::default()
        };

        let groups = build_place_groups(&[unmatched], origin(), &config);
        assert!(groups.iter().all(|group| group.items.is_empty()));
    }

    #[rstest]
    #[case::no_name(element(Some((55.951, -3.19)), &[("amenity", "cafe")]))]
    #[case::no_point(element(None, &[("amenity", "cafe"), ("name", "Nowhere")]))]
    fn drops_non_actionable_elements(#[case] rejected: RawElement) {
        let groups = build_place_groups(&[rejected], origin(), &CatalogConfig::default());
        assert!(groups.iter().all(|group| group.items.is_empty()));
    }

    #[rstest]
    fn groups_sort_ascending_and_deduplicate() {
        let elements = vec![
            element(Some((55.96, -3.19)), &[("amenity", "cafe"), ("name", "Far Cafe")]),
            element(Some((55.951, -3.19)), &[("amenity", "cafe"), ("name", "Near Cafe")]),
            // Same rounded point as Near Cafe under different wording.
            element(
                Some((55.951_000_4, -3.19)),
                &[("amenity", "restaurant"), ("name", "Near Cafe & Kitchen")],
            ),
        ];

        let groups = build_place_groups(&elements, origin(), &CatalogConfig::default());
        let food = group(&groups, PlaceCategory::Food);

        assert_eq!(food.items.len(), 2);
        assert_eq!(food.items[0].name, "Near Cafe");
        assert_eq!(food.items[1].name, "Far Cafe");
        assert!(food
            .items
            .windows(2)
            .all(|pair| pair[0].distance_meters <= pair[1].distance_meters));
    }

    #[rstest]
    fn group_cap_bounds_each_bucket() {
        let elements: Vec<RawElement> = (0..10)
            .map(|i| {
                element(
                    Some((55.951 + f64::from(i) * 0.001, -3.19)),
                    &[("amenity", "cafe"), ("name", "Cafe")],
                )
            })
            .collect();
        let config = CatalogConfig {
            place_group_cap: Some(4),
            ..CatalogConfig::default()
        };

        let groups = build_place_groups(&elements, origin(), &config);
        assert_eq!(group(&groups, PlaceCategory::Food).items.len(), 4);
    }
}
