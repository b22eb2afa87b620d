use crate::models::Hotel;
use crate::search::criteria::SearchCriteria;
use crate::search::vocabulary;

/// Inclusion predicate shared by every listing view
///
/// Clauses are evaluated in a fixed order and the first failing clause
/// excludes the hotel.
pub struct FilterEvaluator;

impl FilterEvaluator {
    pub fn matches(hotel: &Hotel, criteria: &SearchCriteria) -> bool {
        Self::within_price(hotel, criteria)
            && Self::matches_location(hotel, criteria)
            && Self::has_amenities(hotel, criteria)
            && Self::meets_rating(hotel, criteria)
            && Self::mentions_keyword(hotel, criteria)
    }

    fn within_price(hotel: &Hotel, criteria: &SearchCriteria) -> bool {
        if let Some(min) = criteria.price_range.min {
            if hotel.price < min {
                return false;
            }
        }
        if let Some(max) = criteria.price_range.max {
            if hotel.price > max {
                return false;
            }
        }
        true
    }

    /// Substring match, or for known countries a match on any comma part
    fn matches_location(hotel: &Hotel, criteria: &SearchCriteria) -> bool {
        let Some(token) = criteria.location.as_deref() else {
            return true;
        };
        let token = token.to_lowercase();
        let location = hotel.location.to_lowercase();

        if location.contains(&token) {
            return true;
        }

        vocabulary::is_country(&token)
            && location.split(',').map(str::trim).any(|part| part.contains(&token))
    }

    /// Every requested amenity needs a substring match among the hotel's labels
    fn has_amenities(hotel: &Hotel, criteria: &SearchCriteria) -> bool {
        if criteria.amenities.is_empty() {
            return true;
        }
        let labels: Vec<String> = hotel.amenities.iter().map(|a| a.to_lowercase()).collect();

        criteria.amenities.iter().all(|wanted| {
            let wanted = wanted.to_lowercase();
            labels.iter().any(|label| label.contains(&wanted))
        })
    }

    /// An unrated hotel fails whenever a threshold is set
    fn meets_rating(hotel: &Hotel, criteria: &SearchCriteria) -> bool {
        match (criteria.rating, hotel.rating) {
            (None, _) => true,
            (Some(threshold), Some(rating)) => rating >= threshold,
            (Some(_), None) => false,
        }
    }

    /// At least one keyword must appear in the name or description
    fn mentions_keyword(hotel: &Hotel, criteria: &SearchCriteria) -> bool {
        if criteria.keywords.is_empty() {
            return true;
        }
        let text = format!(
            "{} {}",
            hotel.name,
            hotel.description.as_deref().unwrap_or_default()
        )
        .to_lowercase();

        criteria
            .keywords
            .iter()
            .any(|keyword| text.contains(&keyword.to_lowercase()))
    }
}

/// Applies AI criteria to `hotels`, unless an override match list is present
///
/// A non-empty `matched` list is returned verbatim and no clause is
/// evaluated, even when some of its entries would fail `criteria`.
pub fn apply_ai_filters(hotels: &[Hotel], criteria: &SearchCriteria, matched: &[Hotel]) -> Vec<Hotel> {
    if !matched.is_empty() {
        return matched.to_vec();
    }

    hotels
        .iter()
        .filter(|hotel| FilterEvaluator::matches(hotel, criteria))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::hotel;
    use crate::search::criteria::PriceRange;

    fn criteria() -> SearchCriteria {
        SearchCriteria::default()
    }

    #[test]
    fn test_empty_criteria_accepts_everything() {
        let h = hotel("A", "", 0.0, None, &[]);
        assert!(FilterEvaluator::matches(&h, &criteria()));
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let c = SearchCriteria {
            price_range: PriceRange { min: Some(100.0), max: Some(200.0) },
            ..criteria()
        };
        assert!(FilterEvaluator::matches(&hotel("A", "", 100.0, None, &[]), &c));
        assert!(FilterEvaluator::matches(&hotel("B", "", 200.0, None, &[]), &c));
        assert!(!FilterEvaluator::matches(&hotel("C", "", 99.99, None, &[]), &c));
        assert!(!FilterEvaluator::matches(&hotel("D", "", 200.01, None, &[]), &c));
    }

    #[test]
    fn test_location_substring_match() {
        let c = SearchCriteria { location: Some("beach".into()), ..criteria() };
        assert!(FilterEvaluator::matches(&hotel("A", "Bondi Beach, Australia", 0.0, None, &[]), &c));
        assert!(!FilterEvaluator::matches(&hotel("B", "Sydney, Australia", 0.0, None, &[]), &c));
    }

    #[test]
    fn test_location_country_match_on_comma_parts() {
        let c = SearchCriteria { location: Some("france".into()), ..criteria() };
        assert!(FilterEvaluator::matches(&hotel("A", "Paris, France", 0.0, None, &[]), &c));
        assert!(!FilterEvaluator::matches(&hotel("B", "Rome, Italy", 0.0, None, &[]), &c));
    }

    #[test]
    fn test_location_token_is_case_insensitive() {
        let c = SearchCriteria { location: Some("Japan".into()), ..criteria() };
        assert!(FilterEvaluator::matches(&hotel("A", "Kyoto, JAPAN", 0.0, None, &[]), &c));
    }

    #[test]
    fn test_amenities_require_all_with_substring_match() {
        let c = SearchCriteria {
            amenities: vec!["pool".into(), "wifi".into()],
            ..criteria()
        };
        let both = hotel("A", "", 0.0, None, &["Infinity Pool", "Free WiFi"]);
        let one = hotel("B", "", 0.0, None, &["Infinity Pool"]);

        assert!(FilterEvaluator::matches(&both, &c));
        assert!(!FilterEvaluator::matches(&one, &c));
    }

    #[test]
    fn test_rating_threshold() {
        let c = SearchCriteria { rating: Some(4.0), ..criteria() };
        assert!(FilterEvaluator::matches(&hotel("A", "", 0.0, Some(4.0), &[]), &c));
        assert!(!FilterEvaluator::matches(&hotel("B", "", 0.0, Some(3.9), &[]), &c));
        assert!(!FilterEvaluator::matches(&hotel("C", "", 0.0, None, &[]), &c));
    }

    #[test]
    fn test_unrated_hotel_passes_without_threshold() {
        assert!(FilterEvaluator::matches(&hotel("A", "", 0.0, None, &[]), &criteria()));
    }

    #[test]
    fn test_keywords_match_any_in_name_or_description() {
        let c = SearchCriteria {
            keywords: vec!["luxury".into(), "boutique".into()],
            ..criteria()
        };
        let mut described = hotel("Harbor House", "", 0.0, None, &[]);
        described.description = Some("A Boutique stay by the water".into());

        assert!(FilterEvaluator::matches(&hotel("Luxury Towers", "", 0.0, None, &[]), &c));
        assert!(FilterEvaluator::matches(&described, &c));
        assert!(!FilterEvaluator::matches(&hotel("Budget Inn", "", 0.0, None, &[]), &c));
    }

    #[test]
    fn test_combined_clauses_end_to_end() {
        let hotels = vec![
            hotel("A", "Paris, France", 120.0, Some(4.5), &["Pool"]),
            hotel("B", "Nice, France", 60.0, Some(3.0), &[]),
        ];
        let c = SearchCriteria {
            price_range: PriceRange { min: Some(100.0), max: None },
            location: Some("france".into()),
            ..criteria()
        };

        let result = apply_ai_filters(&hotels, &c, &[]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "A");
    }

    #[test]
    fn test_override_list_bypasses_evaluation() {
        let hotels = vec![hotel("A", "Paris, France", 120.0, Some(4.5), &[])];
        let matched = vec![hotel("Cheap", "Rome, Italy", 10.0, None, &[])];
        let c = SearchCriteria {
            price_range: PriceRange { min: Some(100.0), max: None },
            location: Some("france".into()),
            ..criteria()
        };

        let result = apply_ai_filters(&hotels, &c, &matched);
        assert_eq!(result, matched);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::models::fixtures::hotel;
    use crate::search::criteria::PriceRange;
    use proptest::prelude::*;

    fn hotel_strategy() -> impl Strategy<Value = Hotel> {
        (
            0.0f64..500.0,
            prop::option::of(0.0f64..5.0),
            prop::sample::select(vec!["Paris, France", "Rome, Italy", "Bondi Beach, Australia", ""]),
            prop::sample::subsequence(vec!["Pool", "WiFi", "Spa", "Gym"], 0..4),
            prop::sample::select(vec!["Luxury Palace", "Budget Inn", "Family Lodge"]),
        )
            .prop_map(|(price, rating, location, amenities, name)| hotel(name, location, price, rating, &amenities))
    }

    fn criteria_strategy() -> impl Strategy<Value = SearchCriteria> {
        (
            prop::option::of(0.0f64..500.0),
            prop::option::of(0.0f64..500.0),
            prop::option::of(prop::sample::select(vec!["france", "beach", "italy"])),
            prop::sample::subsequence(vec!["pool", "wifi", "spa"], 0..3),
            prop::option::of(0.0f64..5.0),
            prop::sample::subsequence(vec!["luxury", "budget", "family"], 0..3),
        )
            .prop_map(|(min, max, location, amenities, rating, keywords)| SearchCriteria {
                price_range: PriceRange { min, max },
                location: location.map(str::to_string),
                amenities: amenities.into_iter().map(str::to_string).collect(),
                rating,
                keywords: keywords.into_iter().map(str::to_string).collect(),
            })
    }

    /// Evaluates one clause of `criteria` in isolation
    fn single_clauses(criteria: &SearchCriteria) -> Vec<SearchCriteria> {
        let empty = SearchCriteria::default();
        vec![
            SearchCriteria {
                price_range: PriceRange { min: criteria.price_range.min, max: None },
                ..empty.clone()
            },
            SearchCriteria {
                price_range: PriceRange { min: None, max: criteria.price_range.max },
                ..empty.clone()
            },
            SearchCriteria { location: criteria.location.clone(), ..empty.clone() },
            SearchCriteria { amenities: criteria.amenities.clone(), ..empty.clone() },
            SearchCriteria { rating: criteria.rating, ..empty.clone() },
            SearchCriteria { keywords: criteria.keywords.clone(), ..empty },
        ]
    }

    proptest! {
        /// A hotel passes iff every set clause holds on its own
        #[test]
        fn prop_match_is_conjunction_of_clauses(h in hotel_strategy(), c in criteria_strategy()) {
            let combined = FilterEvaluator::matches(&h, &c);
            let each = single_clauses(&c).iter().all(|clause| FilterEvaluator::matches(&h, clause));
            prop_assert_eq!(combined, each);
        }

        /// The filtered set is an order-preserving subset of the input
        #[test]
        fn prop_filter_preserves_order(hotels in prop::collection::vec(hotel_strategy(), 0..12), c in criteria_strategy()) {
            let filtered = apply_ai_filters(&hotels, &c, &[]);
            let mut cursor = hotels.iter();
            for kept in &filtered {
                prop_assert!(cursor.any(|h| h == kept));
            }
        }

        /// A non-empty override list is returned verbatim for any criteria
        #[test]
        fn prop_override_wins(
            hotels in prop::collection::vec(hotel_strategy(), 0..6),
            matched in prop::collection::vec(hotel_strategy(), 1..6),
            c in criteria_strategy(),
        ) {
            prop_assert_eq!(apply_ai_filters(&hotels, &c, &matched), matched);
        }
    }
}
