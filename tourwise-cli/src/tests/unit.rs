//! Focused unit tests covering argument parsing and logger setup.

use super::*;
use crate::plan::OutputFormat;
use camino::Utf8PathBuf;
use rstest::rstest;

fn parse_plan(argv: &[&str]) -> (Option<LevelFilter>, PlanArgs) {
    let cli = Cli::try_parse_from(argv).expect("arguments should parse");
    match cli.command {
        Command::Plan(args) => (cli.log_level, args),
    }
}

#[rstest]
fn log_level_is_accepted_after_the_subcommand() {
    let (level, args) = parse_plan(&["tourwise", "plan", "stops.json", "--log-level", "debug"]);
    assert_eq!(level, Some(LevelFilter::Debug));
    assert_eq!(args.waypoints_path, Some(Utf8PathBuf::from("stops.json")));
}

#[rstest]
#[case::bare_flag(&["tourwise", "plan", "--offline"], Some(true))]
#[case::explicit_false(&["tourwise", "plan", "--offline", "false"], Some(false))]
#[case::absent(&["tourwise", "plan"], None)]
fn offline_flag_accepts_optional_value(#[case] argv: &[&str], #[case] expected: Option<bool>) {
    let (_, args) = parse_plan(argv);
    assert_eq!(args.offline, expected);
}

#[rstest]
fn format_and_limits_are_parsed() {
    let (_, args) = parse_plan(&[
        "tourwise",
        "plan",
        "--format",
        "json",
        "--max-destinations",
        "5",
        "--max-concurrent-requests",
        "2",
    ]);
    assert_eq!(args.format, Some(OutputFormat::Json));
    assert_eq!(args.max_destinations, Some(5));
    assert_eq!(args.max_concurrent_requests, Some(2));
}

#[rstest]
#[case::unknown_format(&["tourwise", "plan", "--format", "yaml"])]
#[case::unknown_api(&["tourwise", "plan", "--api", "bing"])]
#[case::bad_level(&["tourwise", "--log-level", "loud", "plan"])]
#[case::missing_subcommand(&["tourwise"])]
fn invalid_arguments_are_rejected(#[case] argv: &[&str]) {
    let err = Cli::try_parse_from(argv).expect_err("arguments should be rejected");
    let wrapped = CliError::from(err);
    assert!(matches!(wrapped, CliError::ArgumentParsing(_)));
}

#[rstest]
#[case(LevelFilter::Debug)]
#[case(LevelFilter::Off)]
fn explicit_log_level_overrides_environment(#[case] level: LevelFilter) {
    let logger = logging::builder(Some(level)).build();
    assert_eq!(logger.filter(), level);
}
