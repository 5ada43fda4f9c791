use std::path::PathBuf;

use clap::Parser;
use pretty_assertions::assert_eq;
use recompose_player::ReplayFailurePolicy;
use recompose_shell::{run, Args, Demo};
use recompose_wire::UnknownOpcodePolicy;
use rstest::rstest;

fn parse(args: &[&str]) -> Args {
    Args::parse_from(std::iter::once("rcsh").chain(args.iter().copied()))
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("rcsh-{}-{name}.rc", std::process::id()))
}

fn run_to_string(args: &Args) -> String {
    let mut out = Vec::new();
    run(args, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_defaults() {
    let args = parse(&["-f", "doc.rc"]);
    assert_eq!(args.file, Some(PathBuf::from("doc.rc")));
    assert!(!args.disassemble);
    assert_eq!(args.replay, 0);
    assert_eq!(args.frame_step, 1.0);
    assert_eq!(args.log_level(), "warn");

    let config = args.player_config();
    assert_eq!(config.failure_policy, ReplayFailurePolicy::AbortFrame);
    assert_eq!(config.decode.unknown_opcode, UnknownOpcodePolicy::Strict);
}

#[test]
fn test_policy_flags() {
    let args = parse(&["-f", "doc.rc", "--lenient", "--continue-on-error"]);
    let config = args.player_config();
    assert_eq!(config.failure_policy, ReplayFailurePolicy::ContinueAndReport);
    assert_eq!(config.decode.unknown_opcode, UnknownOpcodePolicy::Skip);
}

#[rstest]
#[case(&["-v"], "info")]
#[case(&["-vv"], "debug")]
#[case(&["-v", "-v", "-v"], "trace")]
fn test_verbosity(#[case] flags: &[&str], #[case] level: &str) {
    assert_eq!(parse(flags).log_level(), level);
}

#[test]
fn test_clock_for_frame() {
    let args = parse(&["--time", "100", "--frame-step", "0.5"]);
    let clock = args.clock(4);
    assert_eq!(clock.elapsed, 2.0);
    assert_eq!(clock.since_midnight, 102.0);
}

#[test]
fn test_unknown_demo_is_rejected() {
    assert!(Args::try_parse_from(["rcsh", "--write-demo", "nope"]).is_err());
    assert_eq!(parse(&["--write-demo", "clock"]).write_demo, Some(Demo::Clock));
}

#[test]
fn test_missing_input_is_an_error() {
    let mut out = Vec::new();
    assert!(run(&parse(&[]), &mut out).is_err());
    assert!(run(&parse(&["--write-demo", "shapes"]), &mut out).is_err());
}

#[test]
fn test_write_demo_then_replay() {
    let path = temp_path("clock");
    let path_arg = path.to_str().unwrap();
    let written = run_to_string(&parse(&["--write-demo", "clock", "-o", path_arg]));
    assert!(written.starts_with("wrote clock ("));

    let output = run_to_string(&parse(&[
        "-f",
        path_arg,
        "-d",
        "-r",
        "2",
        "--time",
        "45296",
        "--variables",
    ]));
    std::fs::remove_file(&path).unwrap();

    assert!(output.contains("  Header "));
    assert!(output.contains("frame 0:\n"));
    assert!(output.contains(r#"draw_text_run("12:34:56", 40, 120)"#));
    assert!(output.contains(r#"draw_text_run("12:34:57", 40, 120)"#));
    assert!(output.contains("\"frame\": 2"));
}

#[test]
fn test_disassemble_only() {
    let path = temp_path("shapes");
    let path_arg = path.to_str().unwrap();
    run_to_string(&parse(&["--write-demo", "shapes", "-o", path_arg]));
    let output = run_to_string(&parse(&["-f", path_arg, "-d"]));
    std::fs::remove_file(&path).unwrap();

    assert!(output.contains("  MatrixSave\n"));
    assert!(output.contains("  DrawCircle 80, 80, 30\n"));
    assert!(!output.contains("frame 0:"));
}
