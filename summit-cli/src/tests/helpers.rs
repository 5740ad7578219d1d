//! Test helpers: an in-memory Tyrolean dataset, fixture files and a
//! scripted prompt session.

use super::*;
use base64::{Engine as _, engine::general_purpose};
use std::fs;
use summit_core::test_support::{FixedResolver, offset_north, segment, summit};
use summit_core::{DatasetStore, RouteSegment, RouteSegmentSource, StartPoint, Summit};
use tempfile::TempDir;

/// Steinach am Brenner, the start of every scripted query.
pub(super) const STEINACH: StartPoint = StartPoint::new(47.0833, 11.4667);

pub(super) const AUSTRIA_TABLE: &str = "\
AT\t6150\tSteinach am Brenner\tTirol\t07\tInnsbruck Land\t703\t\t\t47.0833\t11.4667\t4
";

/// Blaser, Serles and Habicht, nearest first from Steinach.
pub(super) fn tyrol_summits() -> Vec<Summit> {
    vec![
        summit(1, 11.3853, 47.1, 2717.0)
            .with_name("Serles")
            .with_cross(true)
            .with_prominence(Some(512.0)),
        summit(2, 11.2867, 47.0436, 3277.0).with_name("Habicht"),
        summit(3, 11.44, 47.065, 2241.0)
            .with_name("Blaser")
            .with_cross(true),
    ]
}

/// A difficulty 3 via ferrata 80 m north of the Serles summit.
pub(super) fn serles_via_ferrata() -> Vec<RouteSegment> {
    let serles = summit(1, 11.3853, 47.1, 2717.0).location;
    let vertex = offset_north(serles, 80.0);
    vec![segment(100, &[(vertex.x, vertex.y)], Some(3))]
}

pub(super) fn steinach_resolver() -> FixedResolver {
    FixedResolver::default().with("AT", "6150", STEINACH)
}

/// Feed `script` to an interactive session over `source`.
pub(super) fn run_script<S: RouteSegmentSource>(
    script: &str,
    source: S,
) -> (Result<(), CliError>, String) {
    run_input(script.as_bytes(), source)
}

/// Run an interactive session that reads its answers from `input`.
pub(super) fn run_input<R, S>(input: R, source: S) -> (Result<(), CliError>, String)
where
    R: std::io::BufRead,
    S: RouteSegmentSource,
{
    let store = DatasetStore::new(tyrol_summits(), source);
    let pipeline = QueryPipeline::new(&store);
    let resolver = steinach_resolver();
    let mut output = Vec::new();
    let result = prompt::run_session(input, &mut output, &pipeline, &resolver);
    (result, String::from_utf8(output).expect("utf-8 output"))
}

pub(super) fn utf8_root(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir")
}

pub(super) fn write_utf8(path: &camino::Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write fixture file");
}

/// Decode a Base64 PBF fixture from `summit-data` into `dir`.
pub(super) fn decode_pbf_fixture(dir: &camino::Utf8Path, stem: &str) -> Utf8PathBuf {
    let encoded_path = Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../summit-data/tests/fixtures")
        .join(format!("{stem}.osm.pbf.b64"));
    let encoded = fs::read_to_string(encoded_path.as_std_path()).expect("read fixture");
    let cleaned: String = encoded
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace())
        .collect();
    let decoded = general_purpose::STANDARD
        .decode(cleaned.as_bytes())
        .expect("decode fixture");
    let path = dir.join(format!("{stem}.osm.pbf"));
    write_utf8(&path, &decoded);
    path
}
