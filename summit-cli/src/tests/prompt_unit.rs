//! Scripted sessions exercising the interactive prompt loop.

use super::helpers::{run_input, run_script, serles_via_ferrata};
use super::*;
use prompt::{
    PROMPT_ANOTHER, PROMPT_COUNTRY, PROMPT_CROSS_ONLY, PROMPT_DOMINANCE, PROMPT_MAX_DIFFICULTY,
    PROMPT_MIN_ELEVATION, PROMPT_POSTAL_CODE, PROMPT_THRESHOLD, PROMPT_VIA_FERRATA, SESSION_END,
};
use rstest::rstest;
use summit_core::QueryError;
use summit_core::test_support::{CountingSegmentSource, FailingSegmentSource};

fn position(output: &str, needle: &str) -> usize {
    output
        .find(needle)
        .unwrap_or_else(|| panic!("missing {needle:?} in output:\n{output}"))
}

#[rstest]
fn prompts_follow_the_query_order() {
    let (result, output) = run_script(
        "AT\n6150\n0\nn\nn\ny\n100\n3\nn\n",
        CountingSegmentSource::default(),
    );
    result.expect("session succeeds");
    let order = [
        PROMPT_COUNTRY,
        PROMPT_POSTAL_CODE,
        PROMPT_MIN_ELEVATION,
        PROMPT_CROSS_ONLY,
        PROMPT_DOMINANCE,
        PROMPT_VIA_FERRATA,
        PROMPT_THRESHOLD,
        PROMPT_MAX_DIFFICULTY,
        PROMPT_ANOTHER,
        SESSION_END,
    ];
    let positions: Vec<usize> = order
        .iter()
        .map(|needle| position(&output, needle))
        .collect();
    assert!(positions.is_sorted(), "prompts out of order:\n{output}");
}

#[rstest]
fn proximity_query_lists_nearest_first() {
    let (result, output) = run_script(
        "at\n6150\n2000\nn\nn\nn\nn\n",
        CountingSegmentSource::default(),
    );
    result.expect("session succeeds");
    assert!(output.contains("The 3 nearest summits:"), "{output}");
    let blaser = position(&output, "1. Blaser: elevation 2241.0 m, distance");
    let serles = position(&output, "2. Serles: elevation 2717.0 m, prominence 512 m");
    let habicht = position(&output, "3. Habicht:");
    assert!(blaser < serles && serles < habicht);
    assert!(!output.contains("dominance"));
}

#[rstest]
fn dominance_query_puts_the_highest_summit_first() {
    let script = "AT\n6150\n0\nn\ny\nn\nn\n";
    let (result, output) = run_script(script, CountingSegmentSource::default());
    result.expect("session succeeds");
    assert!(output.contains("1. Habicht: elevation 3277.0 m, dominance ∞ km, distance"));
    assert!(output.contains("2. Serles:"));
    assert!(output.contains("3. Blaser:"));
}

#[rstest]
fn cross_only_keeps_summits_with_a_cross() {
    let script = "AT\n6150\n0\ny\nn\nn\nn\n";
    let (result, output) = run_script(script, CountingSegmentSource::default());
    result.expect("session succeeds");
    assert!(output.contains("Elevation/cross filter kept 2 summits"));
    assert!(!output.contains("Habicht"));
}

#[rstest]
fn invalid_elevation_abandons_only_that_query() {
    let (result, output) = run_script(
        "AT\n6150\nhigh\ny\nAT\n6150\n3000\nn\nn\nn\nn\n",
        CountingSegmentSource::default(),
    );
    result.expect("session succeeds");
    assert!(output.contains("minimum elevation: \"high\""), "{output}");
    assert_eq!(output.matches(PROMPT_CROSS_ONLY).count(), 1);
    assert!(output.contains("1. Habicht:"));
}

#[rstest]
fn via_ferrata_query_loads_segments_once() {
    let source = CountingSegmentSource::new(serles_via_ferrata());
    let (result, output) = run_script(
        "AT\n6150\n0\nn\nn\ny\n100\n3\ny\nAT\n6150\n0\nn\nn\ny\n100\n3\nn\n",
        &source,
    );
    result.expect("session succeeds");
    let kept = output.matches("Via ferrata filter kept 1 of 3 summits");
    assert_eq!(kept.count(), 2);
    assert_eq!(output.matches("1. Serles:").count(), 2);
    assert_eq!(source.loads(), 1);
}

#[rstest]
fn too_hard_via_ferratas_are_excluded() {
    let source = CountingSegmentSource::new(serles_via_ferrata());
    let (result, output) = run_script("AT\n6150\n0\nn\nn\ny\n100\n2\nn\n", &source);
    result.expect("session succeeds");
    assert!(output.contains("No matching summits found."));
}

#[rstest]
#[case("AT\n6150\n0\nn\nn\ny\nfar\n", "invalid distance threshold")]
#[case("AT\n6150\n0\nn\nn\ny\n100\n9\n", "invalid maximum difficulty")]
#[case("AT\n6150\n0\nn\nn\ny\n100\nhard\n", "invalid maximum difficulty")]
fn bad_via_ferrata_answers_skip_the_segment_load(#[case] script: &str, #[case] message: &str) {
    let source = CountingSegmentSource::new(serles_via_ferrata());
    let (result, output) = run_script(script, &source);
    result.expect("session ends cleanly");
    assert!(output.contains(message), "{output}");
    assert_eq!(source.loads(), 0);
}

#[rstest]
fn unknown_postal_codes_are_reported_and_the_loop_continues() {
    let (result, output) = run_script(
        "AT\n0000\n0\nn\nn\nn\ny\nAT\n6150\n3000\nn\nn\nn\nn\n",
        CountingSegmentSource::default(),
    );
    result.expect("session succeeds");
    assert!(output.contains("Error: postal code 0000 in AT was not found"));
    assert!(output.contains("1. Habicht:"));
}

#[rstest]
#[case("")]
#[case("AT\n")]
#[case("AT\n6150\n0\nn\nn\nn\n")]
fn end_of_input_ends_the_session_cleanly(#[case] script: &str) {
    let (result, output) = run_script(script, CountingSegmentSource::default());
    result.expect("end of input is not an error");
    assert!(output.ends_with(&format!("{SESSION_END}\n")), "{output}");
}

#[rstest]
fn failed_segment_loads_end_the_session() {
    let source = FailingSegmentSource::default();
    let (result, _) = run_script("AT\n6150\n0\nn\nn\ny\n100\n3\ny\n", &source);
    let err = result.expect_err("segment load failure is fatal");
    assert!(matches!(
        err,
        CliError::Query(QueryError::LoadSegments { .. })
    ));
    assert_eq!(source.attempts(), 1);
}

struct ClosedTerminal;

impl std::io::Read for ClosedTerminal {
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
        Err(std::io::Error::other("terminal closed"))
    }
}

#[rstest]
fn input_errors_are_reported_as_read_failures() {
    let input = std::io::BufReader::new(ClosedTerminal);
    let (result, output) = run_input(input, CountingSegmentSource::default());
    let err = result.expect_err("read failure is fatal");
    assert!(matches!(err, CliError::ReadInput(_)));
    assert_eq!(err.to_string(), "failed to read input: terminal closed");
    assert_eq!(output, PROMPT_COUNTRY);
}
