use regex::Captures;

use crate::search::criteria::{PriceRange, SearchCriteria};
use crate::search::vocabulary::{self, PriceBound};

/// Turns a free-text assistant response into structured search criteria
///
/// Categories are independent of each other; inside a category the first
/// matching rule wins. Keywords are plain substring matches against the
/// lower-cased text, so one word may land in more than one category
/// ("spa" is both a setting and an amenity).
pub struct CriteriaExtractor;

impl CriteriaExtractor {
    /// Extracts criteria from `response`; empty or absent text yields the default
    pub fn extract(response: Option<&str>) -> SearchCriteria {
        let text = match response {
            Some(text) if !text.trim().is_empty() => text.to_lowercase(),
            _ => return SearchCriteria::default(),
        };

        SearchCriteria {
            price_range: Self::extract_price_range(&text),
            location: Self::extract_location(&text),
            amenities: Self::collect_vocabulary(&text, &vocabulary::AMENITY_KEYWORDS),
            rating: Self::extract_rating(&text),
            keywords: Self::collect_vocabulary(&text, &vocabulary::GENERAL_KEYWORDS),
        }
    }

    /// Range patterns first; single bounds only when no range matched
    fn extract_price_range(text: &str) -> PriceRange {
        let rules = vocabulary::rules();

        for pattern in &rules.price_ranges {
            if let Some(caps) = pattern.captures(text) {
                return PriceRange {
                    min: number_at(&caps, 1),
                    max: number_at(&caps, 2),
                };
            }
        }

        for (pattern, bound) in &rules.single_bounds {
            if let Some(caps) = pattern.captures(text) {
                let amount = number_at(&caps, 2);
                return match bound {
                    PriceBound::Max => PriceRange { min: None, max: amount },
                    PriceBound::Min => PriceRange { min: amount, max: None },
                };
            }
        }

        PriceRange::default()
    }

    fn extract_location(text: &str) -> Option<String> {
        vocabulary::location_keywords()
            .find(|keyword| text.contains(keyword))
            .map(str::to_string)
    }

    fn extract_rating(text: &str) -> Option<f64> {
        vocabulary::rules()
            .ratings
            .iter()
            .find_map(|pattern| pattern.captures(text))
            .and_then(|caps| number_at(&caps, 1))
    }

    fn collect_vocabulary(text: &str, vocabulary: &[&str]) -> Vec<String> {
        vocabulary
            .iter()
            .filter(|keyword| text.contains(*keyword))
            .map(|keyword| keyword.to_string())
            .collect()
    }
}

/// Parses an ASCII digit capture group
fn number_at(caps: &Captures<'_>, group: usize) -> Option<f64> {
    caps.get(group).and_then(|m| m.as_str().parse::<f64>().ok())
}
