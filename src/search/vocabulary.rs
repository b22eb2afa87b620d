// Rule table for criteria extraction
//
// Ordered vocabularies and pattern lists consumed by the criteria extractor.
// Order matters: the first pattern that matches wins within a category, and
// the first location keyword in list order wins regardless of where it
// appears in the text. Numbers are ASCII digits only; `\d` would also
// match other scripts' digits, which `f64::from_str` rejects.

use regex::Regex;
use std::sync::OnceLock;

/// Which single price bound a pattern sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBound {
    Max,
    Min,
}

/// Price range patterns, tried in order; groups 1 and 2 are min and max
const PRICE_RANGE_PATTERNS: [&str; 3] = [
    r"([0-9]+)\s*-\s*([0-9]+)\s*(dollars?|usd|\$)",
    r"between\s*([0-9]+)\s*and\s*([0-9]+)\s*(dollars?|usd|\$)",
    r"from\s*([0-9]+)\s*to\s*([0-9]+)\s*(dollars?|usd|\$)",
];

/// Single-bound price patterns; group 2 is the amount
const SINGLE_BOUND_PATTERNS: [(&str, PriceBound); 2] = [
    (
        r"(under|below|less than|max|maximum)\s*([0-9]+)\s*(dollars?|usd|\$)",
        PriceBound::Max,
    ),
    (
        r"(over|above|more than|min|minimum)\s*([0-9]+)\s*(dollars?|usd|\$)",
        PriceBound::Min,
    ),
];

/// Rating patterns, tried in order; group 1 is the rating
const RATING_PATTERNS: [&str; 4] = [
    r"([0-9]+)\s*star",
    r"rating.*?([0-9]+)",
    r"at least\s*([0-9]+)\s*star",
    r"minimum\s*([0-9]+)\s*star",
];

/// Country names that get comma-aware matching in the filter evaluator
pub const COUNTRY_KEYWORDS: [&str; 16] = [
    "canada",
    "usa",
    "united states",
    "mexico",
    "france",
    "italy",
    "spain",
    "germany",
    "japan",
    "china",
    "australia",
    "brazil",
    "india",
    "thailand",
    "singapore",
    "dubai",
];

/// Terrain and setting words, scanned before the country names
const TERRAIN_KEYWORDS: [&str; 23] = [
    "beach",
    "city",
    "mountain",
    "downtown",
    "resort",
    "spa",
    "coastal",
    "urban",
    "rural",
    "ocean",
    "lake",
    "river",
    "hills",
    "valley",
    "desert",
    "forest",
    "island",
    "peninsula",
    "waterfront",
    "seaside",
    "countryside",
    "suburban",
    "metropolitan",
];

pub const AMENITY_KEYWORDS: [&str; 24] = [
    "pool",
    "gym",
    "spa",
    "restaurant",
    "bar",
    "wifi",
    "parking",
    "pet-friendly",
    "balcony",
    "ocean view",
    "garden",
    "terrace",
    "fitness",
    "sauna",
    "jacuzzi",
    "concierge",
    "room service",
    "breakfast",
    "air conditioning",
    "tv",
    "minibar",
    "safe",
    "laundry",
    "business center",
];

/// Style and tier descriptors
pub const GENERAL_KEYWORDS: [&str; 26] = [
    "luxury",
    "budget",
    "family",
    "romantic",
    "business",
    "quiet",
    "lively",
    "modern",
    "traditional",
    "elegant",
    "chic",
    "cozy",
    "spacious",
    "intimate",
    "grand",
    "boutique",
    "resort",
    "hotel",
    "affordable",
    "expensive",
    "cheap",
    "premium",
    "deluxe",
    "standard",
    "suite",
    "villa",
];

/// Compiled pattern lists
pub struct RuleTable {
    pub price_ranges: Vec<Regex>,
    pub single_bounds: Vec<(Regex, PriceBound)>,
    pub ratings: Vec<Regex>,
}

impl RuleTable {
    fn compile() -> Self {
        // The patterns are constants; a failure here is a programming error
        // caught by the unit tests below.
        let build = |pattern: &str| Regex::new(pattern).expect("invalid built-in pattern");

        Self {
            price_ranges: PRICE_RANGE_PATTERNS.iter().map(|p| build(p)).collect(),
            single_bounds: SINGLE_BOUND_PATTERNS
                .iter()
                .map(|(p, bound)| (build(p), *bound))
                .collect(),
            ratings: RATING_PATTERNS.iter().map(|p| build(p)).collect(),
        }
    }
}

static RULES: OnceLock<RuleTable> = OnceLock::new();

/// Shared compiled rule table
pub fn rules() -> &'static RuleTable {
    RULES.get_or_init(RuleTable::compile)
}

/// Location keywords in scan order: terrain words first, then countries
pub fn location_keywords() -> impl Iterator<Item = &'static str> {
    TERRAIN_KEYWORDS.iter().chain(COUNTRY_KEYWORDS.iter()).copied()
}

/// Whether a lower-cased token names a recognized country
pub fn is_country(token: &str) -> bool {
    COUNTRY_KEYWORDS.contains(&token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_table_compiles() {
        let table = rules();
        assert_eq!(table.price_ranges.len(), 3);
        assert_eq!(table.single_bounds.len(), 2);
        assert_eq!(table.ratings.len(), 4);
    }

    #[test]
    fn test_location_scan_order_puts_terrain_first() {
        let keywords: Vec<&str> = location_keywords().collect();
        assert_eq!(keywords.first(), Some(&"beach"));
        assert_eq!(keywords.last(), Some(&"dubai"));
        let city = keywords.iter().position(|k| *k == "city").unwrap();
        let france = keywords.iter().position(|k| *k == "france").unwrap();
        assert!(city < france);
    }

    #[test]
    fn test_is_country() {
        assert!(is_country("france"));
        assert!(is_country("united states"));
        assert!(!is_country("paris"));
        assert!(!is_country("beach"));
    }
}
