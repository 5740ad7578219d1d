//! Parsing of query parameters shared by the prompts and `find` flags.

use summit_core::ReachabilityFilter;

use crate::ParameterError;

pub(crate) const FIELD_COUNTRY: &str = "country";
pub(crate) const FIELD_POSTAL_CODE: &str = "postal code";
pub(crate) const FIELD_MIN_ELEVATION: &str = "minimum elevation";
pub(crate) const FIELD_THRESHOLD: &str = "distance threshold";
pub(crate) const FIELD_MAX_DIFFICULTY: &str = "maximum difficulty";

/// Trimmed, uppercased country code.
pub(crate) fn parse_country(input: &str) -> Result<String, ParameterError> {
    non_empty(input, FIELD_COUNTRY).map(str::to_ascii_uppercase)
}

/// Trimmed postal code.
pub(crate) fn parse_postal_code(input: &str) -> Result<String, ParameterError> {
    non_empty(input, FIELD_POSTAL_CODE).map(str::to_owned)
}

pub(crate) fn parse_min_elevation(input: &str) -> Result<f64, ParameterError> {
    parse_finite(input, FIELD_MIN_ELEVATION, "a number of metres")
}

pub(crate) fn parse_threshold(input: &str) -> Result<f64, ParameterError> {
    parse_finite(input, FIELD_THRESHOLD, "a number of metres")
}

pub(crate) fn parse_max_difficulty(input: &str) -> Result<i32, ParameterError> {
    let trimmed = input.trim();
    trimmed.parse().map_err(|_| ParameterError::Unparsable {
        field: FIELD_MAX_DIFFICULTY,
        value: trimmed.to_owned(),
        expected: "a whole number from 0 to 6",
    })
}

/// Answers starting with `y` or `Y` mean yes; anything else means no.
pub(crate) fn is_yes(input: &str) -> bool {
    input
        .trim_start()
        .chars()
        .next()
        .is_some_and(|first| first.eq_ignore_ascii_case(&'y'))
}

/// Check a parsed elevation supplied as a flag.
pub(crate) fn check_min_elevation(value: f64) -> Result<f64, ParameterError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParameterError::Unparsable {
            field: FIELD_MIN_ELEVATION,
            value: value.to_string(),
            expected: "a number of metres",
        })
    }
}

/// Validate the via ferrata constraints.
///
/// The error names the threshold or the difficulty, whichever was rejected.
pub(crate) fn reachability(
    threshold_m: f64,
    max_difficulty: i32,
) -> Result<ReachabilityFilter, ParameterError> {
    ReachabilityFilter::new(threshold_m, max_difficulty).map_err(|source| {
        let field = match source {
            summit_core::ReachabilityFilterError::InvalidThreshold { .. } => FIELD_THRESHOLD,
            summit_core::ReachabilityFilterError::DifficultyOutOfRange { .. } => {
                FIELD_MAX_DIFFICULTY
            }
        };
        ParameterError::OutOfRange { field, source }
    })
}

fn non_empty<'a>(input: &'a str, field: &'static str) -> Result<&'a str, ParameterError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        Err(ParameterError::Empty { field })
    } else {
        Ok(trimmed)
    }
}

fn parse_finite(
    input: &str,
    field: &'static str,
    expected: &'static str,
) -> Result<f64, ParameterError> {
    let trimmed = input.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ParameterError::Unparsable {
            field,
            value: trimmed.to_owned(),
            expected,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(" at ", "AT")]
    #[case("De", "DE")]
    fn countries_are_trimmed_and_uppercased(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(parse_country(input).as_deref(), Ok(expected));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn empty_country_is_rejected(#[case] input: &str) {
        assert_eq!(
            parse_country(input),
            Err(ParameterError::Empty {
                field: FIELD_COUNTRY
            })
        );
    }

    #[rstest]
    #[case("1300", 1300.0)]
    #[case(" 1300.5 ", 1300.5)]
    #[case("-12", -12.0)]
    fn elevations_parse(#[case] input: &str, #[case] expected: f64) {
        assert_eq!(parse_min_elevation(input), Ok(expected));
    }

    #[rstest]
    #[case("high")]
    #[case("")]
    #[case("NaN")]
    #[case("inf")]
    fn bad_elevations_name_the_field(#[case] input: &str) {
        let err = parse_min_elevation(input).expect_err("rejected");
        assert!(err.to_string().contains(FIELD_MIN_ELEVATION), "{err}");
    }

    #[rstest]
    #[case("y", true)]
    #[case("Yes", true)]
    #[case("  yep", true)]
    #[case("n", false)]
    #[case("", false)]
    #[case("ok", false)]
    fn yes_answers(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_yes(input), expected);
    }

    #[rstest]
    fn difficulty_must_be_an_integer() {
        let err = parse_max_difficulty("3+").expect_err("rejected");
        assert!(matches!(
            err,
            ParameterError::Unparsable {
                field: FIELD_MAX_DIFFICULTY,
                ..
            }
        ));
    }

    #[rstest]
    #[case(-1.0, 3, FIELD_THRESHOLD)]
    #[case(300.0, 7, FIELD_MAX_DIFFICULTY)]
    #[case(300.0, -1, FIELD_MAX_DIFFICULTY)]
    fn out_of_range_constraints_name_the_field(
        #[case] threshold_m: f64,
        #[case] max_difficulty: i32,
        #[case] expected: &str,
    ) {
        match reachability(threshold_m, max_difficulty) {
            Err(ParameterError::OutOfRange { field, .. }) => assert_eq!(field, expected),
            other => panic!("expected OutOfRange, found {other:?}"),
        }
    }

    #[rstest]
    fn valid_constraints_build_a_filter() {
        let filter = reachability(333.0, 3).expect("valid constraints");
        assert_eq!(filter.max_difficulty, 3);
    }
}
