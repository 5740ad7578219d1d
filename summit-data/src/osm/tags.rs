//! Tag predicates and value parsers for summit and via ferrata extraction.

/// Returns true for `natural=peak`.
pub(super) fn is_peak<'a, T>(tags: T) -> bool
where
    T: IntoIterator<Item = (&'a str, &'a str)>,
{
    tags.into_iter()
        .any(|(key, value)| key == "natural" && value == "peak")
}

/// Returns true for `highway=via_ferrata`.
pub(super) fn is_via_ferrata<'a, T>(tags: T) -> bool
where
    T: IntoIterator<Item = (&'a str, &'a str)>,
{
    tags.into_iter()
        .any(|(key, value)| key == "highway" && value == "via_ferrata")
}

/// Summit attributes read from a peak's tags.
#[derive(Debug, Default, PartialEq)]
pub(super) struct PeakTags {
    pub(super) elevation: Option<f64>,
    pub(super) name: Option<String>,
    pub(super) has_cross: bool,
    pub(super) prominence: Option<f64>,
}

impl PeakTags {
    pub(super) fn collect<'a, T>(tags: T) -> Self
    where
        T: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut peak = Self::default();
        for (key, value) in tags {
            match key {
                "ele" => peak.elevation = parse_metres(value),
                "name" => peak.name = Some(value.to_owned()),
                "summit:cross" => peak.has_cross = value.eq_ignore_ascii_case("yes"),
                "prominence" => peak.prominence = parse_metres(value),
                _ => {}
            }
        }
        peak
    }
}

/// Difficulty from a via ferrata's `via_ferrata_scale` tag.
pub(super) fn via_ferrata_scale<'a, T>(tags: T) -> Option<i32>
where
    T: IntoIterator<Item = (&'a str, &'a str)>,
{
    tags.into_iter()
        .find(|(key, _)| *key == "via_ferrata_scale")
        .and_then(|(_, value)| value.trim().parse().ok())
}

/// Parse a plain decimal number of metres, ignoring surrounding whitespace.
///
/// Values with units or other decoration are rejected.
fn parse_metres(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|metres| metres.is_finite())
}
