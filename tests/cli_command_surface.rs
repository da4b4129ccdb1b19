use progressctl::cli;
use progressctl::commands::{cli_help_lines, parse_draft_args, run_cli};

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn help_verb_and_empty_invocation_print_the_same_usage() {
    let help = run_cli(args(&["help"])).expect("help");
    let empty = run_cli(Vec::new()).expect("empty");
    assert_eq!(help, empty);
    assert_eq!(help, cli_help_lines().join("\n"));
    for verb in ["show", "check", "submit"] {
        assert!(help.contains(verb), "usage must mention `{verb}`");
    }
}

#[test]
fn unknown_verbs_fail_with_a_usage_hint() {
    let err = cli::run(args(&["destroy", "PRJ-1"])).expect_err("unknown verb");
    assert!(err.contains("destroy"));
    assert!(err.contains("progressctl help"));
}

#[test]
fn show_requires_a_project_id() {
    let err = run_cli(args(&["show"])).expect_err("missing id");
    assert!(err.contains("project-id"));
}

#[test]
fn invalid_project_ids_are_rejected_before_any_work() {
    let err = run_cli(args(&["show", "bad id"])).expect_err("invalid id");
    assert!(err.contains("project id"));
}

#[test]
fn submit_requires_at_least_one_update_option() {
    let err = run_cli(args(&["submit", "PRJ-1"])).expect_err("no update values");
    assert!(err.contains("--progress"));
    assert!(err.contains("--bill-amount"));
}

#[test]
fn draft_options_parse_for_both_categories_together() {
    let parsed = parse_draft_args(&args(&[
        "--progress",
        "55.5",
        "--bill-amount",
        "400000",
        "--remarks",
        "joint physical and financial update",
        "--bill-number",
        "RB-4",
        "--bill-date",
        "2024-06-01",
        "--bill-description",
        "fourth running bill",
    ]))
    .expect("parse");
    assert_eq!(parsed.progress, Some(55.5));
    assert_eq!(parsed.bill_amount, Some(400_000.0));
    assert_eq!(parsed.bill_number.as_deref(), Some("RB-4"));
    assert_eq!(parsed.bill_date.as_deref(), Some("2024-06-01"));
}

#[test]
fn option_values_cannot_be_omitted() {
    for flag in ["--progress", "--bill-amount", "--remarks", "--file"] {
        let err = parse_draft_args(&args(&["--progress", "1", flag]))
            .err()
            .filter(|e| e.contains(flag));
        // `--progress 1 --progress` still errors on the dangling flag.
        assert!(err.is_some(), "dangling `{flag}` must be rejected");
    }
}
