//! US state lookup for station time zones

/// One US state or territory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct State {
    /// Full name
    pub name: &'static str,
    /// Postal abbreviation
    pub abbreviation: &'static str,
    /// Primary time zone
    pub timezone: &'static str,
}

const fn state(name: &'static str, abbreviation: &'static str, timezone: &'static str) -> State {
    State {
        name,
        abbreviation,
        timezone,
    }
}

const EASTERN: &str = "Eastern";
const CENTRAL: &str = "Central";
const MOUNTAIN: &str = "Mountain";
const PACIFIC: &str = "Pacific";

static STATES: &[State] = &[
    state("Alabama", "AL", CENTRAL),
    state("Alaska", "AK", "Alaska"),
    state("Arizona", "AZ", MOUNTAIN),
    state("Arkansas", "AR", CENTRAL),
    state("California", "CA", PACIFIC),
    state("Colorado", "CO", MOUNTAIN),
    state("Connecticut", "CT", EASTERN),
    state("Delaware", "DE", EASTERN),
    state("District of Columbia", "DC", EASTERN),
    state("Florida", "FL", EASTERN),
    state("Georgia", "GA", EASTERN),
    state("Hawaii", "HI", "Hawaii-Aleutian"),
    state("Idaho", "ID", MOUNTAIN),
    state("Illinois", "IL", CENTRAL),
    state("Indiana", "IN", EASTERN),
    state("Iowa", "IA", CENTRAL),
    state("Kansas", "KS", CENTRAL),
    state("Kentucky", "KY", EASTERN),
    state("Louisiana", "LA", CENTRAL),
    state("Maine", "ME", EASTERN),
    state("Maryland", "MD", EASTERN),
    state("Massachusetts", "MA", EASTERN),
    state("Michigan", "MI", EASTERN),
    state("Minnesota", "MN", CENTRAL),
    state("Mississippi", "MS", CENTRAL),
    state("Missouri", "MO", CENTRAL),
    state("Montana", "MT", MOUNTAIN),
    state("Nebraska", "NE", CENTRAL),
    state("Nevada", "NV", PACIFIC),
    state("New Hampshire", "NH", EASTERN),
    state("New Jersey", "NJ", EASTERN),
    state("New Mexico", "NM", MOUNTAIN),
    state("New York", "NY", EASTERN),
    state("North Carolina", "NC", EASTERN),
    state("North Dakota", "ND", CENTRAL),
    state("Ohio", "OH", EASTERN),
    state("Oklahoma", "OK", CENTRAL),
    state("Oregon", "OR", PACIFIC),
    state("Pennsylvania", "PA", EASTERN),
    state("Puerto Rico", "PR", "Atlantic"),
    state("Rhode Island", "RI", EASTERN),
    state("South Carolina", "SC", EASTERN),
    state("South Dakota", "SD", CENTRAL),
    state("Tennessee", "TN", CENTRAL),
    state("Texas", "TX", CENTRAL),
    state("Utah", "UT", MOUNTAIN),
    state("Vermont", "VT", EASTERN),
    state("Virginia", "VA", EASTERN),
    state("Washington", "WA", PACIFIC),
    state("West Virginia", "WV", EASTERN),
    state("Wisconsin", "WI", CENTRAL),
    state("Wyoming", "WY", MOUNTAIN),
];

/// Finds a state by full name or abbreviation, ignoring case
pub fn find_state(name_or_abbreviation: &str) -> Option<&'static State> {
    let needle = name_or_abbreviation.trim();
    STATES.iter().find(|s| {
        s.name.eq_ignore_ascii_case(needle) || s.abbreviation.eq_ignore_ascii_case(needle)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("MA", Some("Eastern") ; "abbreviation")]
    #[test_case("texas", Some("Central") ; "lowercase name")]
    #[test_case(" Hawaii ", Some("Hawaii-Aleutian") ; "padded")]
    #[test_case("Atlantis", None ; "unknown")]
    fn test_find_state(input: &str, timezone: Option<&str>) {
        assert_eq!(find_state(input).map(|s| s.timezone), timezone);
    }

    #[test]
    fn test_abbreviations_are_unique() {
        let mut seen = std::collections::HashSet::new();
        assert!(STATES.iter().all(|s| seen.insert(s.abbreviation)));
    }
}
