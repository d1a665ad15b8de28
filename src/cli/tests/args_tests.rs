use clap::Parser;

use super::args::{CliArgs, ReportFormat};

#[test]
fn parses_defaults() {
    let args = CliArgs::try_parse_from(["flowguard", "calls.json"]).expect("default args should parse");

    assert_eq!(args.input, std::path::PathBuf::from("calls.json"));
    assert_eq!(args.format, ReportFormat::Text);
    assert!(!args.show_ranking);
    assert!(!args.first_only);
}

#[test]
fn parses_flags() {
    let args = CliArgs::try_parse_from([
        "flowguard",
        "--format",
        "JSON",
        "--showRanking",
        "--first-only",
        "calls.json",
    ])
    .expect("flagged args should parse");

    assert_eq!(args.format, ReportFormat::Json);
    assert!(args.show_ranking);
    assert!(args.first_only);
}

#[test]
fn accepts_kebab_case_alias() {
    let args = CliArgs::try_parse_from(["flowguard", "--show-ranking", "calls.json"])
        .expect("alias should parse");
    assert!(args.show_ranking);
}

#[test]
fn requires_input() {
    assert!(CliArgs::try_parse_from(["flowguard"]).is_err());
}

#[test]
fn rejects_unknown_format() {
    assert!(CliArgs::try_parse_from(["flowguard", "--format", "yaml", "calls.json"]).is_err());
}
