// Listing pipeline
//
// Composes the location partitioner, the AI filter step and the sort
// comparator for each listing view. Every stage is a pure function of its
// inputs; nothing here touches the network or the session store.

use serde::Serialize;

use crate::models::Hotel;
use crate::search::criteria::SearchCriteria;
use crate::search::evaluator::apply_ai_filters;
use crate::search::location::LocationSelection;
use crate::search::sort::{sort_hotels, SortKey};

/// Inputs of the home listing view
#[derive(Debug, Clone)]
pub struct ListingInput<'a> {
    pub hotels: &'a [Hotel],
    pub criteria: &'a SearchCriteria,
    pub matched: &'a [Hotel],
    pub location: &'a LocationSelection,
    pub sort: SortKey,
    pub search_mode: bool,
}

/// Home view: location partition (skipped in search mode), AI filters, sort
pub fn home_listing(input: &ListingInput<'_>) -> Vec<Hotel> {
    let partitioned = if input.search_mode {
        input.hotels.to_vec()
    } else {
        input.location.partition(input.hotels)
    };

    let filtered = apply_ai_filters(&partitioned, input.criteria, input.matched);
    sort_hotels(&filtered, input.sort)
}

/// Search-results view: AI filters over text-search hits, no partition or sort
pub fn search_results(hotels: &[Hotel], criteria: &SearchCriteria, matched: &[Hotel]) -> Vec<Hotel> {
    apply_ai_filters(hotels, criteria, matched)
}

/// Whether the listing should behave as a search session
///
/// Requires a non-blank query plus either an override list or at least one
/// derived constraint.
pub fn is_search_mode(query: &str, matched: &[Hotel], criteria: &SearchCriteria) -> bool {
    !query.trim().is_empty() && (!matched.is_empty() || criteria.has_constraints())
}

/// One page of an ordered collection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
}

/// Slices `items` into the 1-based `page`; a page past the end is empty
pub fn paginate<T: Clone>(items: &[T], page: u32, page_size: u32) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total = items.len() as u64;
    let total_pages = (total.div_ceil(u64::from(page_size)) as u32).max(1);

    let start = (page as usize - 1).saturating_mul(page_size as usize);
    let slice = items
        .iter()
        .skip(start)
        .take(page_size as usize)
        .cloned()
        .collect();

    Page {
        items: slice,
        page,
        page_size,
        total,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::hotel;
    use crate::search::criteria::PriceRange;

    fn catalog() -> Vec<Hotel> {
        vec![
            hotel("A", "Paris, France", 120.0, Some(4.5), &["Pool"]),
            hotel("B", "Nice, France", 60.0, Some(3.0), &[]),
            hotel("C", "Rome, Italy", 150.0, Some(4.9), &["Pool", "Spa"]),
            hotel("D", "Tokyo, Japan", 200.0, None, &["Gym"]),
        ]
    }

    fn names(hotels: &[Hotel]) -> Vec<&str> {
        hotels.iter().map(|h| h.name.as_str()).collect()
    }

    #[test]
    fn test_home_listing_default_is_featured_order() {
        let hotels = catalog();
        let criteria = SearchCriteria::default();
        let input = ListingInput {
            hotels: &hotels,
            criteria: &criteria,
            matched: &[],
            location: &LocationSelection::All,
            sort: SortKey::Featured,
            search_mode: false,
        };
        assert_eq!(names(&home_listing(&input)), vec!["C", "A", "B", "D"]);
    }

    #[test]
    fn test_home_listing_applies_partition_then_filters_then_sort() {
        let hotels = catalog();
        let criteria = SearchCriteria {
            amenities: vec!["pool".into()],
            ..Default::default()
        };
        let location = LocationSelection::Country("France".into());
        let input = ListingInput {
            hotels: &hotels,
            criteria: &criteria,
            matched: &[],
            location: &location,
            sort: SortKey::PriceAsc,
            search_mode: false,
        };
        assert_eq!(names(&home_listing(&input)), vec!["A"]);
    }

    #[test]
    fn test_home_listing_skips_partition_in_search_mode() {
        let hotels = catalog();
        let criteria = SearchCriteria {
            price_range: PriceRange { min: Some(100.0), max: None },
            ..Default::default()
        };
        let location = LocationSelection::Country("France".into());
        let input = ListingInput {
            hotels: &hotels,
            criteria: &criteria,
            matched: &[],
            location: &location,
            sort: SortKey::PriceAsc,
            search_mode: true,
        };
        assert_eq!(names(&home_listing(&input)), vec!["A", "C", "D"]);
    }

    #[test]
    fn test_home_listing_sorts_override_list() {
        let hotels = catalog();
        let matched = vec![
            hotel("Low", "", 10.0, Some(2.0), &[]),
            hotel("High", "", 10.0, Some(4.0), &[]),
        ];
        let criteria = SearchCriteria {
            location: Some("france".into()),
            ..Default::default()
        };
        let input = ListingInput {
            hotels: &hotels,
            criteria: &criteria,
            matched: &matched,
            location: &LocationSelection::All,
            sort: SortKey::Featured,
            search_mode: true,
        };
        assert_eq!(names(&home_listing(&input)), vec!["High", "Low"]);
    }

    #[test]
    fn test_search_results_keeps_input_order() {
        let hotels = catalog();
        let criteria = SearchCriteria {
            amenities: vec!["pool".into()],
            ..Default::default()
        };
        assert_eq!(names(&search_results(&hotels, &criteria, &[])), vec!["A", "C"]);
    }

    #[test]
    fn test_is_search_mode() {
        let empty = SearchCriteria::default();
        let constrained = SearchCriteria {
            rating: Some(4.0),
            ..Default::default()
        };
        let matched = catalog();

        assert!(!is_search_mode("", &matched, &constrained));
        assert!(!is_search_mode("   ", &matched, &constrained));
        assert!(!is_search_mode("beach", &[], &empty));
        assert!(is_search_mode("beach", &matched, &empty));
        assert!(is_search_mode("beach", &[], &constrained));
    }

    #[test]
    fn test_paginate_slices_pages() {
        let items: Vec<u32> = (1..=25).collect();

        let first = paginate(&items, 1, 12);
        assert_eq!(first.items, (1..=12).collect::<Vec<_>>());
        assert_eq!(first.total, 25);
        assert_eq!(first.total_pages, 3);

        let last = paginate(&items, 3, 12);
        assert_eq!(last.items, vec![25]);

        let beyond = paginate(&items, 4, 12);
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.page, 4);
    }

    #[test]
    fn test_paginate_empty_has_one_page() {
        let page = paginate::<u32>(&[], 1, 12);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_paginate_clamps_zero_page_and_size() {
        let items = vec![1, 2, 3];
        let page = paginate(&items, 0, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 1);
        assert_eq!(page.items, vec![1]);
    }
}
