use crate::client::{ApiError, EnvTokenProvider, ProgressApiClient};
use crate::config::{load_global_settings, Settings};
use crate::project::{ProjectId, ProjectProgressState};
use crate::shared::logging::append_submission_log_line;
use crate::update::draft::{discard_draft, save_draft, DraftSession};
use crate::update::files::{AttachedFile, FileKind};
use chrono::Utc;
use std::fs;
use std::path::PathBuf;

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "usage: progressctl <command> [arguments]".to_string(),
        String::new(),
        "commands:".to_string(),
        "  show <project-id>              fetch and display committed progress".to_string(),
        "  check <project-id> [options]   stage a draft and validate it locally".to_string(),
        "  submit <project-id> [options]  stage, validate, and submit a draft".to_string(),
        "  help                           show this message".to_string(),
        String::new(),
        "options:".to_string(),
        "  --progress <n>             new physical progress percentage".to_string(),
        "  --bill-amount <n>          new cumulative bill amount".to_string(),
        "  --remarks <text>           free-text remarks (max 500 chars)".to_string(),
        "  --bill-number <text>       bill number for financial updates".to_string(),
        "  --bill-date <YYYY-MM-DD>   bill date for financial updates".to_string(),
        "  --bill-description <text>  bill description".to_string(),
        "  --file <path>              attach a supporting file (repeatable)".to_string(),
    ]
}

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    let Some(verb) = args.first().map(String::as_str) else {
        return Ok(cli_help_lines().join("\n"));
    };
    match verb {
        "help" | "--help" | "-h" => Ok(cli_help_lines().join("\n")),
        "show" => {
            let id = required_project_id(&args)?;
            cmd_show(&id)
        }
        "check" => {
            let id = required_project_id(&args)?;
            let draft = parse_draft_args(&args[2..])?;
            cmd_check(&id, draft)
        }
        "submit" => {
            let id = required_project_id(&args)?;
            let draft = parse_draft_args(&args[2..])?;
            cmd_submit(&id, draft)
        }
        other => Err(format!(
            "unknown command `{other}`; run `progressctl help` for usage"
        )),
    }
}

fn required_project_id(args: &[String]) -> Result<ProjectId, String> {
    let raw = args
        .get(1)
        .ok_or_else(|| "missing <project-id> argument".to_string())?;
    ProjectId::parse(raw)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftArgs {
    pub progress: Option<f64>,
    pub bill_amount: Option<f64>,
    pub remarks: Option<String>,
    pub bill_number: Option<String>,
    pub bill_date: Option<String>,
    pub bill_description: Option<String>,
    pub files: Vec<PathBuf>,
}

pub fn parse_draft_args(args: &[String]) -> Result<DraftArgs, String> {
    let mut draft = DraftArgs::default();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let mut value_for = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("`{flag}` requires a value"))
        };
        match flag.as_str() {
            "--progress" => {
                let raw = value_for("--progress")?;
                draft.progress = Some(
                    raw.parse::<f64>()
                        .map_err(|_| format!("`--progress` value `{raw}` is not a number"))?,
                );
            }
            "--bill-amount" => {
                let raw = value_for("--bill-amount")?;
                draft.bill_amount = Some(
                    raw.parse::<f64>()
                        .map_err(|_| format!("`--bill-amount` value `{raw}` is not a number"))?,
                );
            }
            "--remarks" => draft.remarks = Some(value_for("--remarks")?),
            "--bill-number" => draft.bill_number = Some(value_for("--bill-number")?),
            "--bill-date" => draft.bill_date = Some(value_for("--bill-date")?),
            "--bill-description" => draft.bill_description = Some(value_for("--bill-description")?),
            "--file" => draft.files.push(PathBuf::from(value_for("--file")?)),
            other => return Err(format!("unknown option `{other}`")),
        }
    }
    if draft.progress.is_none() && draft.bill_amount.is_none() {
        return Err("provide `--progress`, `--bill-amount`, or both".to_string());
    }
    Ok(draft)
}

/// Stages a session from CLI arguments. The physical flag is active iff
/// `--progress` was given; financial iff `--bill-amount` was given.
pub fn stage_session(
    snapshot: ProjectProgressState,
    args: &DraftArgs,
) -> Result<DraftSession, String> {
    let mut session = DraftSession::open(snapshot);
    session.flags.physical = args.progress.is_some();
    session.flags.financial = args.bill_amount.is_some();
    if let Some(progress) = args.progress {
        session.proposed.progress = Some(progress);
    }
    if let Some(amount) = args.bill_amount {
        session.proposed.new_bill_amount = Some(amount);
    }
    if let Some(remarks) = &args.remarks {
        session.proposed.remarks = remarks.clone();
    }
    session.proposed.bill_details.bill_number = args.bill_number.clone();
    session.proposed.bill_details.bill_date = args.bill_date.clone();
    session.proposed.bill_details.bill_description = args.bill_description.clone();

    for path in &args.files {
        let kind = FileKind::from_path(path)?;
        let content = fs::read(path)
            .map_err(|e| format!("failed to read file {}: {e}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|v| v.to_str())
            .ok_or_else(|| format!("file `{}` has no usable name", path.display()))?;
        session.attach_file(AttachedFile::new(file_name, kind, content));
    }
    Ok(session)
}

fn load_settings() -> Result<Settings, String> {
    load_global_settings().map_err(|e| e.to_string())
}

fn api_client(settings: &Settings) -> ProgressApiClient {
    ProgressApiClient::new(&settings.api_base, Box::new(EnvTokenProvider))
}

pub fn render_state(state: &ProjectProgressState) -> String {
    let mut lines = vec![format!("project {}", state.id)];
    if !state.name.trim().is_empty() {
        lines.push(format!("  name:               {}", state.name));
    }
    lines.push(format!("  physical progress:  {}%", state.progress));
    lines.push(format!(
        "  billed:             {} of {} ({:.1}%)",
        state.bill_amount_submitted,
        state.estimated_cost,
        state.financial_percent()
    ));
    lines.join("\n")
}

fn cmd_show(id: &ProjectId) -> Result<String, String> {
    let settings = load_settings()?;
    let state = api_client(&settings)
        .fetch_project(id)
        .map_err(|e| e.to_string())?;
    Ok(render_state(&state))
}

fn cmd_check(id: &ProjectId, args: DraftArgs) -> Result<String, String> {
    let settings = load_settings()?;
    let state_root = settings.resolve_state_root().map_err(|e| e.to_string())?;
    let snapshot = api_client(&settings)
        .fetch_project(id)
        .map_err(|e| e.to_string())?;
    let session = stage_session(snapshot, &args)?;
    save_draft(&state_root, id, &session).map_err(|e| e.to_string())?;

    let errors = session.validate(settings.upload_limits());
    if errors.is_empty() {
        return Ok(format!("draft for {id} is valid"));
    }
    let mut lines = vec![format!("draft for {id} has {} problem(s):", errors.len())];
    for (field, message) in errors.iter() {
        lines.push(format!("  {field}: {message}"));
    }
    Err(lines.join("\n"))
}

fn cmd_submit(id: &ProjectId, args: DraftArgs) -> Result<String, String> {
    let settings = load_settings()?;
    let state_root = settings.resolve_state_root().map_err(|e| e.to_string())?;
    let client = api_client(&settings);
    let snapshot = client.fetch_project(id).map_err(|e| e.to_string())?;
    let mut session = stage_session(snapshot, &args)?;

    let result = client.submit_combined_progress(id, &mut session, settings.upload_limits());
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            let line = format!("{} submit {id} failed: {err}", Utc::now().to_rfc3339());
            let _ = append_submission_log_line(&state_root, &line);
            if let ApiError::ValidationFailed(errors) = &err {
                let mut lines = vec![format!("submission refused, {} problem(s):", errors.len())];
                for (field, message) in errors.iter() {
                    lines.push(format!("  {field}: {message}"));
                }
                return Err(lines.join("\n"));
            }
            return Err(err.to_string());
        }
    };

    let applied = if outcome.updates_applied.is_empty() {
        "none".to_string()
    } else {
        outcome.updates_applied.join(", ")
    };
    let line = format!(
        "{} submit {id} ok applied={applied} files={}",
        Utc::now().to_rfc3339(),
        outcome.files_uploaded.count
    );
    let _ = append_submission_log_line(&state_root, &line);
    discard_draft(&state_root, id).map_err(|e| e.to_string())?;

    let mut lines = Vec::new();
    if !outcome.message.trim().is_empty() {
        lines.push(outcome.message.clone());
    }
    lines.push(format!("updates applied: {applied}"));
    if outcome.files_uploaded.count > 0 {
        lines.push(format!(
            "files uploaded: {} ({} bytes)",
            outcome.files_uploaded.count, outcome.files_uploaded.total_size
        ));
    }
    lines.push(render_state(&outcome.project));
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::ids::ProjectId;

    fn snapshot() -> ProjectProgressState {
        ProjectProgressState {
            id: ProjectId::parse("PRJ-3").expect("project id"),
            name: "Culvert repair".to_string(),
            progress: 40.0,
            bill_amount_submitted: 0.0,
            estimated_cost: 500_000.0,
        }
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn draft_args_require_at_least_one_update_value() {
        let err = parse_draft_args(&args(&["--remarks", "note"])).expect_err("no values");
        assert!(err.contains("--progress"));
    }

    #[test]
    fn draft_args_parse_numbers_and_repeatable_files() {
        let parsed = parse_draft_args(&args(&[
            "--progress",
            "45",
            "--bill-amount",
            "120000.5",
            "--file",
            "a.pdf",
            "--file",
            "b.png",
        ]))
        .expect("parse");
        assert_eq!(parsed.progress, Some(45.0));
        assert_eq!(parsed.bill_amount, Some(120_000.5));
        assert_eq!(parsed.files.len(), 2);

        assert!(parse_draft_args(&args(&["--progress", "abc"])).is_err());
        assert!(parse_draft_args(&args(&["--progress"])).is_err());
        assert!(parse_draft_args(&args(&["--progress", "1", "--bogus", "x"])).is_err());
    }

    #[test]
    fn staging_activates_flags_from_provided_values_only() {
        let parsed = parse_draft_args(&args(&["--progress", "45"])).expect("parse");
        let session = stage_session(snapshot(), &parsed).expect("stage");
        assert!(session.flags.physical);
        assert!(!session.flags.financial);
        assert_eq!(session.proposed.progress, Some(45.0));
        // Untouched financial draft value stays at the committed default.
        assert_eq!(session.proposed.new_bill_amount, Some(0.0));
    }

    #[test]
    fn unknown_verb_is_reported_with_usage_hint() {
        let err = run_cli(args(&["frobnicate"])).expect_err("unknown verb");
        assert!(err.contains("frobnicate"));
        assert!(err.contains("help"));
    }

    #[test]
    fn empty_invocation_prints_usage() {
        let output = run_cli(Vec::new()).expect("usage");
        assert!(output.contains("usage: progressctl"));
        assert!(output.contains("submit <project-id>"));
    }
}
