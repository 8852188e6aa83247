use std::sync::LazyLock;

use regex::Regex;

static METRO_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+(?:metro(?:politan)?\s+area|metro)$").expect("valid metro suffix regex")
});

static GREATER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^greater\s+").expect("valid greater prefix regex"));

static US_ZIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:US\s+)?(\d{5})(?:-\d{4})?$").expect("valid zip regex")
});

const US_ALIASES: &[&str] = &["us", "usa", "u.s.", "u.s.a.", "united states", "united states of america"];

/// Look up city and state from a US zip code
pub fn lookup_zipcode(zip: &str) -> Option<(String, String)> {
    // Avoid zipcodes::matching to suppress debug_print output.
    let results = zipcodes::filter_by(vec![|z: &zipcodes::Zipcode| z.zip_code == zip], None).ok()?;
    let info = results.first()?;
    Some((info.city.clone(), info.state.clone()))
}

/// Whether a free-text country names the United States
pub fn is_us_country(country: &str) -> bool {
    let country = country.trim().to_ascii_lowercase();
    US_ALIASES.contains(&country.as_str())
}

/// Format a place as "City, State" (US), "City, Country" (non-US) or "City".
///
/// Returns an empty string when there is no city.
pub fn format_place(city: &str, state: Option<&str>, country: Option<&str>) -> String {
    let city = city.trim();
    if city.is_empty() {
        return String::new();
    }

    let state = state.map(str::trim).filter(|s| !s.is_empty());
    let country = country.map(str::trim).filter(|s| !s.is_empty());

    match (state, country) {
        (Some(state), Some(country)) if is_us_country(country) => format!("{}, {}", city, state),
        (_, Some(country)) if !is_us_country(country) => format!("{}, {}", city, country),
        _ => city.to_string(),
    }
}

/// City segment of a free-text place: everything before the first comma
pub fn city_of(place: &str) -> &str {
    place.split(',').next().unwrap_or("").trim()
}

/// Key used to compare two places by city: lowercased with whitespace collapsed
pub fn city_key(place: &str) -> String {
    collapse_whitespace(city_of(place)).to_lowercase()
}

/// Whether two free-text places name the same city.
///
/// Substring-tolerant in both directions, so "Los Angeles Metro" and
/// "los angeles" match. Empty places never match anything.
pub fn same_city(a: &str, b: &str) -> bool {
    let a = city_key(a);
    let b = city_key(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

/// Normalize a free-text place for lookups against external services.
///
/// Resolves US zip codes to "City, ST" and strips metro-area qualifiers
/// from the city segment. Anything else passes through with whitespace
/// collapsed.
pub fn normalize_place(raw: &str) -> String {
    let raw = collapse_whitespace(raw);

    if let Some(caps) = US_ZIP.captures(&raw)
        && let Some((city, state)) = lookup_zipcode(&caps[1])
    {
        return format!("{}, {}", city, state);
    }

    let mut segments = raw.splitn(2, ',');
    let city = segments.next().unwrap_or("").trim();
    let rest = segments.next().map(str::trim).filter(|s| !s.is_empty());

    let city = GREATER_PREFIX.replace(city, "");
    let city = METRO_SUFFIX.replace(&city, "");

    match rest {
        Some(rest) => format!("{}, {}", city, rest),
        None => city.into_owned(),
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
