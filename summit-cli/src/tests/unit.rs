//! Focused unit tests covering query CLI parsing and configuration.

use super::*;
use rstest::rstest;
use serde_json::json;

fn parse(args: &[&str]) -> Cli {
    let argv = std::iter::once("summit").chain(args.iter().copied());
    Cli::try_parse_from(argv).expect("arguments parse")
}

#[rstest]
#[case(None, Some("postal"), ARG_OSM_PBF, ENV_QUERY_OSM_PBF)]
#[case(Some("alps.osm.pbf"), None, ARG_POSTAL_DIR, ENV_QUERY_POSTAL_DIR)]
fn converting_without_required_fields_errors(
    #[case] osm: Option<&str>,
    #[case] postal: Option<&str>,
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let args = QueryArgs {
        osm_pbf: osm.map(Utf8PathBuf::from),
        postal_dir: postal.map(Utf8PathBuf::from),
        ..QueryArgs::default()
    };
    let err = DatasetConfig::try_from(args).expect_err("missing field should error");
    match err {
        CliError::MissingArgument {
            field: missing,
            env,
        } => {
            assert_eq!(missing, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
#[case(&[], false)]
#[case(&["--preload-segments"], true)]
#[case(&["--preload-segments", "false"], false)]
#[case(&["--preload-segments", "true"], true)]
fn preload_flag_accepts_an_optional_value(#[case] extra: &[&str], #[case] expected: bool) {
    let mut args = vec![
        "query",
        "--osm-pbf",
        "alps.osm.pbf",
        "--postal-dir",
        "postal",
    ];
    args.extend_from_slice(extra);
    let Command::Query(query) = parse(&args).command else {
        panic!("expected the query command");
    };
    let config = DatasetConfig::try_from(query).expect("config builds");
    assert_eq!(config.preload_segments, expected);
    assert_eq!(config.osm_pbf, Utf8PathBuf::from("alps.osm.pbf"));
}

#[rstest]
fn find_flags_parse() {
    let cli = parse(&[
        "find",
        "--country",
        "AT",
        "--postal-code",
        "4363",
        "--min-elevation",
        "1300",
        "--cross-only",
        "--via-ferrata",
        "--threshold-m",
        "333",
        "--max-difficulty",
        "3",
        "--format",
        "json",
    ]);
    let Command::Find(args) = cli.command else {
        panic!("expected the find command");
    };
    assert_eq!(args.cross_only, Some(true));
    assert_eq!(args.dominance, None);
    assert_eq!(args.via_ferrata, Some(true));
    assert_eq!(args.max_difficulty, Some(3));
    assert_eq!(args.format, Some(OutputFormat::Json));
}

#[rstest]
fn unknown_formats_are_rejected_by_clap() {
    let err = Cli::try_parse_from(["summit", "find", "--format", "xml"])
        .expect_err("xml is not a format");
    assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "preload_segments": "sometimes" }));

    let err = query_config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    assert!(matches!(err, CliError::Configuration(_)), "{err:?}");
}

#[rstest]
fn merge_layers_honour_precedence() {
    use ortho_config::MergeComposer;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "osm_pbf": "from-file.osm.pbf",
            "postal_dir": "from-file-postal",
            "preload_segments": true,
        }),
        None,
    );
    composer.push_environment(json!({ "postal_dir": "from-env-postal" }));
    composer.push_cli(json!({ "osm_pbf": "from-cli.osm.pbf" }));

    let config =
        query_config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.osm_pbf, Utf8PathBuf::from("from-cli.osm.pbf"));
    assert_eq!(config.postal_dir, Utf8PathBuf::from("from-env-postal"));
    assert!(config.preload_segments);
}
