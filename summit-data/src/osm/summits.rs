//! Accumulates summits from `natural=peak` nodes during a parallel scan.

use log::warn;
use osmpbf::Element;
use summit_core::Summit;

use super::ids::{OsmElementKind, encode_element_id};
use super::tags::{PeakTags, is_peak};
use super::{OsmScanSummary, SummitReport, validated_coord};

#[derive(Debug, Default)]
pub(super) struct SummitAccumulator {
    summary: OsmScanSummary,
    summits: Vec<Summit>,
    missing_elevation: u64,
    invalid_location: u64,
    invalid_id: u64,
}

impl SummitAccumulator {
    pub(super) fn process_element(&mut self, element: Element<'_>) {
        match element {
            Element::Node(node) => {
                self.process_node(node.id(), node.lon(), node.lat(), node.tags());
            }
            Element::DenseNode(node) => {
                self.process_node(node.id(), node.lon(), node.lat(), node.tags());
            }
            Element::Way(_) => self.summary.record_way(),
            Element::Relation(_) => {}
        }
    }

    fn process_node<'a, T>(&mut self, raw_id: i64, lon: f64, lat: f64, tags: T)
    where
        T: IntoIterator<Item = (&'a str, &'a str)> + Clone,
    {
        self.summary.record_node();
        if !is_peak(tags.clone()) {
            return;
        }
        let peak = PeakTags::collect(tags);
        let Some(elevation) = peak.elevation else {
            self.missing_elevation += 1;
            return;
        };
        let Some(id) = encode_element_id(OsmElementKind::Node, raw_id) else {
            self.invalid_id += 1;
            return;
        };
        let Some(location) = validated_coord(lon, lat) else {
            self.invalid_location += 1;
            return;
        };
        match Summit::new(id, location, elevation) {
            Ok(summit) => {
                let named = match peak.name {
                    Some(name) => summit.with_name(name),
                    None => summit,
                };
                self.summits.push(
                    named
                        .with_cross(peak.has_cross)
                        .with_prominence(peak.prominence),
                );
            }
            Err(err) => warn!("Skipped peak {raw_id}: {err}"),
        }
    }

    pub(super) fn combine(mut self, other: Self) -> Self {
        self.summary = self.summary.combine(other.summary);
        self.summits.extend(other.summits);
        self.missing_elevation += other.missing_elevation;
        self.invalid_location += other.invalid_location;
        self.invalid_id += other.invalid_id;
        self
    }

    pub(super) fn into_report(self) -> SummitReport {
        let mut summits = self.summits;
        summits.sort_by_key(|summit| summit.id);
        SummitReport {
            summary: self.summary,
            summits,
            missing_elevation: self.missing_elevation,
            invalid_location: self.invalid_location,
            invalid_id: self.invalid_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use summit_core::UNNAMED_SUMMIT;

    #[fixture]
    fn accumulator() -> SummitAccumulator {
        SummitAccumulator::default()
    }

    fn feed(
        accumulator: &mut SummitAccumulator,
        raw_id: i64,
        (lon, lat): (f64, f64),
        tags: &[(&str, &str)],
    ) {
        accumulator.process_node(raw_id, lon, lat, tags.iter().copied());
    }

    fn peak(ele: &str) -> [(&str, &str); 2] {
        [("natural", "peak"), ("ele", ele)]
    }

    #[rstest]
    fn keeps_tagged_peaks_with_defaults(mut accumulator: SummitAccumulator) {
        feed(&mut accumulator, 7, (11.39, 47.07), &peak("2717"));
        let report = accumulator.into_report();
        assert_eq!(report.summits.len(), 1);
        let summit = report.summits.first().expect("one summit");
        assert_eq!(summit.id, 7);
        assert_eq!(summit.name, UNNAMED_SUMMIT);
        assert!(!summit.has_cross);
        assert_eq!(report.summary.nodes, 1);
    }

    #[rstest]
    fn drops_peaks_without_numeric_elevation(mut accumulator: SummitAccumulator) {
        feed(&mut accumulator, 1, (11.0, 47.0), &[("natural", "peak")]);
        feed(&mut accumulator, 2, (11.0, 47.0), &peak("~900"));
        let report = accumulator.into_report();
        assert!(report.summits.is_empty());
        assert_eq!(report.missing_elevation, 2);
    }

    #[rstest]
    fn drops_peaks_with_invalid_locations(mut accumulator: SummitAccumulator) {
        feed(&mut accumulator, 3, (200.0, 47.0), &peak("900"));
        let report = accumulator.into_report();
        assert!(report.summits.is_empty());
        assert_eq!(report.invalid_location, 1);
    }

    #[rstest]
    fn counts_peaks_with_unencodable_ids(mut accumulator: SummitAccumulator) {
        feed(&mut accumulator, -12, (11.0, 47.0), &peak("900"));
        let report = accumulator.into_report();
        assert!(report.summits.is_empty());
        assert_eq!(report.invalid_id, 1);
        assert_eq!(report.missing_elevation, 0);
    }

    #[rstest]
    fn ignores_other_nodes(mut accumulator: SummitAccumulator) {
        const SADDLE: [(&str, &str); 2] = [("natural", "saddle"), ("ele", "1900")];
        feed(&mut accumulator, 4, (11.0, 47.0), &SADDLE);
        let report = accumulator.into_report();
        assert!(report.summits.is_empty());
        assert_eq!(report.missing_elevation, 0);
    }

    #[rstest]
    fn combined_reports_are_ordered_by_id() {
        let mut left = SummitAccumulator::default();
        feed(&mut left, 9, (11.0, 47.0), &peak("1000"));
        let mut right = SummitAccumulator::default();
        feed(&mut right, 5, (11.1, 47.1), &peak("1100"));
        let report = left.combine(right).into_report();
        let ids: Vec<u64> = report.summits.iter().map(|summit| summit.id).collect();
        assert_eq!(ids, vec![5, 9]);
        assert_eq!(report.summary.nodes, 2);
    }
}
