//! Text and JSON rendering of a [`Ranking`].

use std::io::{self, Write};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use summit_core::{RankedResult, Ranking, RankingOrder, StageCounts, StartPoint};

use crate::CliError;

/// Printed instead of a table when nothing survived the filters.
pub(crate) const NO_RESULTS: &str = "No matching summits found.";

/// Output format of `summit find`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Numbered lines for people.
    #[default]
    Text,
    /// A single JSON document.
    Json,
}

/// Write `ranking` in `format`.
pub(crate) fn write_ranking(
    writer: &mut dyn Write,
    ranking: &Ranking<'_>,
    format: OutputFormat,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Text => write_text(writer, ranking).map_err(CliError::Io),
        OutputFormat::Json => write_json(writer, ranking),
    }
}

/// Stage summary followed by one line per summit.
pub(crate) fn write_text(writer: &mut dyn Write, ranking: &Ranking<'_>) -> io::Result<()> {
    writeln!(
        writer,
        "Start coordinates: {:.5}, {:.5}",
        ranking.start.lat, ranking.start.lon
    )?;
    writeln!(
        writer,
        "Elevation/cross filter kept {} summits",
        ranking.stages.base_filter
    )?;
    if let Some(reachable) = ranking.stages.reachable {
        writeln!(
            writer,
            "Via ferrata filter kept {reachable} of {} summits",
            ranking.stages.base_filter
        )?;
    }
    if ranking.is_empty() {
        return writeln!(writer, "{NO_RESULTS}");
    }
    let heading = match ranking.order {
        RankingOrder::Proximity => "nearest summits",
        RankingOrder::Dominance => "nearest summits, ranked by dominance (km)",
    };
    writeln!(writer)?;
    writeln!(writer, "The {} {heading}:", ranking.results.len())?;
    for result in &ranking.results {
        writeln!(writer, "{}", result_line(result))?;
    }
    Ok(())
}

/// One numbered result, e.g.
/// `1. Serles: elevation 2717.0 m, prominence 512 m, distance 3.21 km`.
pub(crate) fn result_line(result: &RankedResult<'_>) -> String {
    let summit = result.summit;
    let mut line = format!(
        "{}. {}: elevation {:.1} m",
        result.rank, summit.name, summit.elevation
    );
    if let Some(prominence) = summit.prominence {
        line.push_str(&format!(", prominence {prominence:.0} m"));
    }
    if let Some(dominance) = result.dominance_km() {
        line.push_str(&format!(", dominance {} km", dominance_text(dominance)));
    }
    line.push_str(&format!(", distance {:.2} km", result.distance_km()));
    line
}

fn dominance_text(km: f64) -> String {
    if km.is_infinite() {
        "∞".to_owned()
    } else {
        format!("{km:.2}")
    }
}

fn write_json(writer: &mut dyn Write, ranking: &Ranking<'_>) -> Result<(), CliError> {
    let view = RankingView::from(ranking);
    let payload = serde_json::to_string_pretty(&view).map_err(CliError::Serialise)?;
    writer.write_all(payload.as_bytes()).map_err(CliError::Io)?;
    writer.write_all(b"\n").map_err(CliError::Io)?;
    Ok(())
}

/// Serialisable view of a [`Ranking`] in kilometres.
#[derive(Debug, Serialize)]
struct RankingView<'a> {
    start: StartPoint,
    order: RankingOrder,
    stages: StageCounts,
    results: Vec<ResultView<'a>>,
}

#[derive(Debug, Serialize)]
struct ResultView<'a> {
    rank: usize,
    id: u64,
    name: &'a str,
    lat: f64,
    lon: f64,
    elevation: f64,
    has_cross: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    prominence: Option<f64>,
    distance_km: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    dominance_km: Option<DominanceView>,
}

/// JSON has no infinity, so unbounded dominance is written as `"∞"`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum DominanceView {
    Finite(f64),
    Unbounded(&'static str),
}

impl From<f64> for DominanceView {
    fn from(km: f64) -> Self {
        if km.is_finite() {
            Self::Finite(km)
        } else {
            Self::Unbounded("∞")
        }
    }
}

impl<'a> From<&'a Ranking<'_>> for RankingView<'a> {
    fn from(ranking: &'a Ranking<'_>) -> Self {
        Self {
            start: ranking.start,
            order: ranking.order,
            stages: ranking.stages,
            results: ranking.results.iter().map(ResultView::from).collect(),
        }
    }
}

impl<'a> From<&'a RankedResult<'_>> for ResultView<'a> {
    fn from(result: &'a RankedResult<'_>) -> Self {
        let summit = result.summit;
        Self {
            rank: result.rank,
            id: summit.id,
            name: &summit.name,
            lat: summit.location.y,
            lon: summit.location.x,
            elevation: summit.elevation,
            has_cross: summit.has_cross,
            prominence: summit.prominence,
            distance_km: result.distance_km(),
            dominance_km: result.dominance_km().map(DominanceView::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::Value;
    use summit_core::test_support::summit;
    use summit_core::{Summit, UNNAMED_SUMMIT};

    #[fixture]
    fn serles() -> Summit {
        summit(1, 11.3853, 47.1, 2717.0)
            .with_name("Serles")
            .with_cross(true)
            .with_prominence(Some(512.0))
    }

    fn ranked(summit: &Summit, distance_m: f64, dominance_m: Option<f64>) -> RankedResult<'_> {
        RankedResult {
            rank: 1,
            summit,
            distance_m,
            dominance_m,
        }
    }

    fn ranking<'a>(order: RankingOrder, results: Vec<RankedResult<'a>>) -> Ranking<'a> {
        Ranking {
            start: StartPoint::new(47.0833, 11.4667),
            order,
            stages: StageCounts {
                base_filter: 4,
                reachable: Some(results.len()),
            },
            results,
        }
    }

    fn render(ranking: &Ranking<'_>, format: OutputFormat) -> String {
        let mut out = Vec::new();
        write_ranking(&mut out, ranking, format).expect("render");
        String::from_utf8(out).expect("utf-8 output")
    }

    #[rstest]
    fn proximity_line_includes_prominence(serles: Summit) {
        let line = result_line(&ranked(&serles, 3210.0, None));
        assert_eq!(
            line,
            "1. Serles: elevation 2717.0 m, prominence 512 m, distance 3.21 km"
        );
    }

    #[rstest]
    fn dominance_line_inserts_dominance_before_distance(serles: Summit) {
        let line = result_line(&ranked(&serles, 3210.0, Some(12_340.0)));
        assert_eq!(
            line,
            "1. Serles: elevation 2717.0 m, prominence 512 m, dominance 12.34 km, distance 3.21 km"
        );
    }

    #[rstest]
    fn infinite_dominance_prints_as_infinity() {
        let plain = summit(2, 11.0, 47.0, 3798.0);
        let line = result_line(&ranked(&plain, 1000.0, Some(f64::INFINITY)));
        assert_eq!(
            line,
            format!("1. {UNNAMED_SUMMIT}: elevation 3798.0 m, dominance ∞ km, distance 1.00 km")
        );
    }

    #[rstest]
    fn empty_rankings_say_so() {
        let empty = ranking(RankingOrder::Proximity, Vec::new());
        let text = render(&empty, OutputFormat::Text);
        assert!(text.contains("Elevation/cross filter kept 4 summits"));
        assert!(text.contains("Via ferrata filter kept 0 of 4 summits"));
        assert!(text.ends_with(&format!("{NO_RESULTS}\n")));
    }

    #[rstest]
    fn text_output_lists_every_result(serles: Summit) {
        let results = vec![ranked(&serles, 3210.0, Some(5000.0))];
        let text = render(
            &ranking(RankingOrder::Dominance, results),
            OutputFormat::Text,
        );
        assert!(text.contains("Start coordinates: 47.08330, 11.46670"));
        assert!(text.contains("The 1 nearest summits, ranked by dominance (km):"));
        assert!(text.contains("1. Serles:"));
    }

    #[rstest]
    fn json_output_uses_kilometres_and_marks_infinity(serles: Summit) {
        let results = vec![ranked(&serles, 3210.0, Some(f64::INFINITY))];
        let json = render(
            &ranking(RankingOrder::Dominance, results),
            OutputFormat::Json,
        );
        let value: Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["order"], "dominance");
        assert_eq!(value["stages"]["base_filter"], 4);
        let first = &value["results"][0];
        assert_eq!(first["name"], "Serles");
        assert_eq!(first["distance_km"], 3.21);
        assert_eq!(first["dominance_km"], "∞");
        assert_eq!(first["prominence"], 512.0);
    }

    #[rstest]
    fn json_omits_dominance_for_proximity_rankings(serles: Summit) {
        let results = vec![ranked(&serles, 1500.0, None)];
        let json = render(
            &ranking(RankingOrder::Proximity, results),
            OutputFormat::Json,
        );
        let value: Value = serde_json::from_str(&json).expect("valid json");
        assert!(value["results"][0].get("dominance_km").is_none());
        assert_eq!(value["order"], "proximity");
    }
}
