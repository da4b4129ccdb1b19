use crate::project::ProjectProgressState;
use crate::update::draft::{ActiveUpdateFlags, ProposedUpdate};
use crate::update::files::AttachedFile;
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub const MAX_REMARKS_CHARS: usize = 500;
pub const MAX_PROGRESS_DECREASE_POINTS: f64 = 5.0;
pub const MAX_PROGRESS_INCREASE_POINTS: f64 = 50.0;
pub const MAX_BILL_DECREASE_COST_FRACTION: f64 = 0.05;
pub const MAX_BILL_INCREASE_COST_FRACTION: f64 = 0.5;
pub const BILL_DATE_FORMAT: &str = "%Y-%m-%d";

/// Per-file and per-submission upload constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_file_size_bytes: u64,
    pub max_file_count: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size_bytes: super::files::MAX_FILE_SIZE_BYTES,
            max_file_count: super::files::DEFAULT_MAX_FILE_COUNT,
        }
    }
}

/// Field-keyed validation outcome. Empty means the proposed update is
/// acceptable. The first message recorded for a field wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrorSet(BTreeMap<String, String>);

impl ValidationErrorSet {
    pub fn record(&mut self, field: &str, message: String) {
        self.0.entry(field.to_string()).or_insert(message);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Pure rule evaluation for a proposed combined progress update.
///
/// `current` is a caller-supplied snapshot; identical inputs always produce an
/// identical error set.
pub fn validate(
    current: &ProjectProgressState,
    proposed: &ProposedUpdate,
    flags: ActiveUpdateFlags,
    files: &[AttachedFile],
) -> ValidationErrorSet {
    validate_with_limits(current, proposed, flags, files, UploadLimits::default())
}

pub fn validate_with_limits(
    current: &ProjectProgressState,
    proposed: &ProposedUpdate,
    flags: ActiveUpdateFlags,
    files: &[AttachedFile],
    limits: UploadLimits,
) -> ValidationErrorSet {
    let mut errors = ValidationErrorSet::default();

    if !flags.physical && !flags.financial {
        errors.record(
            "general",
            "select at least one update type (physical or financial)".to_string(),
        );
        return errors;
    }

    if flags.physical {
        check_physical(current, proposed, &mut errors);
    }
    if flags.financial {
        check_financial(current, proposed, &mut errors);
    }

    if proposed.remarks.chars().count() > MAX_REMARKS_CHARS {
        errors.record(
            "remarks",
            format!("remarks must be at most {MAX_REMARKS_CHARS} characters"),
        );
    }

    check_files(files, limits, &mut errors);
    check_completion_evidence(current, proposed, flags, files, &mut errors);

    errors
}

fn check_physical(
    current: &ProjectProgressState,
    proposed: &ProposedUpdate,
    errors: &mut ValidationErrorSet,
) {
    let Some(value) = proposed.progress else {
        errors.record(
            "progress",
            "physical progress value is required for a physical update".to_string(),
        );
        return;
    };
    if !(0.0..=100.0).contains(&value) {
        errors.record(
            "progress",
            "physical progress must be between 0 and 100".to_string(),
        );
        return;
    }
    let delta = value - current.progress;
    if delta < -MAX_PROGRESS_DECREASE_POINTS {
        errors.record(
            "progress",
            format!(
                "physical progress cannot decrease by more than {MAX_PROGRESS_DECREASE_POINTS} percentage points (current {})",
                current.progress
            ),
        );
    } else if delta > MAX_PROGRESS_INCREASE_POINTS {
        errors.record(
            "progress",
            format!(
                "physical progress cannot increase by more than {MAX_PROGRESS_INCREASE_POINTS} percentage points in one update"
            ),
        );
    }
}

fn check_financial(
    current: &ProjectProgressState,
    proposed: &ProposedUpdate,
    errors: &mut ValidationErrorSet,
) {
    let Some(value) = proposed.new_bill_amount else {
        errors.record(
            "newBillAmount",
            "bill amount is required for a financial update".to_string(),
        );
        return;
    };
    // NaN compares false against every band bound and would slip through.
    if !value.is_finite() {
        errors.record(
            "newBillAmount",
            "bill amount must be a finite number".to_string(),
        );
        return;
    }
    if value < 0.0 {
        errors.record(
            "newBillAmount",
            "bill amount cannot be negative".to_string(),
        );
        return;
    }
    if value > current.estimated_cost {
        errors.record(
            "newBillAmount",
            format!(
                "bill amount cannot exceed the estimated cost of {}",
                current.estimated_cost
            ),
        );
        return;
    }
    let delta = value - current.bill_amount_submitted;
    if delta < -(MAX_BILL_DECREASE_COST_FRACTION * current.estimated_cost) {
        errors.record(
            "newBillAmount",
            "bill amount cannot decrease by more than 5% of the estimated cost".to_string(),
        );
    } else if delta > MAX_BILL_INCREASE_COST_FRACTION * current.estimated_cost {
        errors.record(
            "newBillAmount",
            "bill amount cannot increase by more than 50% of the estimated cost in one update"
                .to_string(),
        );
    }

    if let Some(raw_date) = proposed
        .bill_details
        .bill_date
        .as_deref()
        .filter(|v| !v.trim().is_empty())
    {
        if NaiveDate::parse_from_str(raw_date.trim(), BILL_DATE_FORMAT).is_err() {
            errors.record(
                "billDate",
                format!("bill date `{raw_date}` must use the {BILL_DATE_FORMAT} format"),
            );
        }
    }
}

fn check_files(files: &[AttachedFile], limits: UploadLimits, errors: &mut ValidationErrorSet) {
    if files.len() > limits.max_file_count {
        errors.record(
            "files",
            format!("no more than {} files may be attached", limits.max_file_count),
        );
        return;
    }
    for file in files {
        if let Err(message) = file.check(limits.max_file_size_bytes) {
            errors.record("files", message);
            return;
        }
    }
}

fn check_completion_evidence(
    current: &ProjectProgressState,
    proposed: &ProposedUpdate,
    flags: ActiveUpdateFlags,
    files: &[AttachedFile],
    errors: &mut ValidationErrorSet,
) {
    let physical_completes = flags.physical && proposed.progress == Some(100.0);
    let financial_completes = flags.financial
        && proposed
            .new_bill_amount
            .map(|value| current.estimated_cost > 0.0 && value == current.estimated_cost)
            .unwrap_or(false);

    if (physical_completes || financial_completes) && files.is_empty() {
        errors.record(
            "files",
            "completing a project requires at least one supporting document".to_string(),
        );
    }
    if financial_completes
        && proposed
            .bill_details
            .bill_number
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .is_empty()
    {
        errors.record(
            "billNumber",
            "a bill number is required when billing reaches 100% of the estimated cost"
                .to_string(),
        );
    }
}
