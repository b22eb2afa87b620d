use crate::models::Hotel;

/// Location tab selection on the home listing view
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LocationSelection {
    #[default]
    All,
    Country(String),
}

impl LocationSelection {
    /// Parses a tab name; `"All"` (any case) and blank names select everything
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            None | Some("") => LocationSelection::All,
            Some(name) if name.eq_ignore_ascii_case("all") => LocationSelection::All,
            Some(name) => LocationSelection::Country(name.to_string()),
        }
    }

    /// Keeps hotels whose last comma-separated location segment equals the selection
    pub fn partition(&self, hotels: &[Hotel]) -> Vec<Hotel> {
        match self {
            LocationSelection::All => hotels.to_vec(),
            LocationSelection::Country(selected) => {
                let selected = selected.trim().to_lowercase();
                hotels
                    .iter()
                    .filter(|hotel| country_of(&hotel.location) == selected)
                    .cloned()
                    .collect()
            }
        }
    }
}

/// Last comma segment of a free-text location, trimmed and lower-cased
fn country_of(location: &str) -> String {
    location
        .rsplit(',')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}
