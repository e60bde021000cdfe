//! clinscore core library - clinical risk scores from bedside vitals and labs

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Scoring is a pure function of one record's parameters
// - No global mutable state
// - Scoring never fails; degenerate inputs yield guarded sentinels
// - Score order is fixed and independent of configuration order
// - Every table is scanned closed-lower / open-upper
// - Identical input yields byte-for-byte identical output

pub mod bands;
pub mod config;
pub mod input;
pub mod news2;
pub mod patient;
pub mod report;
pub mod scores;
pub mod units;

pub use config::ResolvedConfig;
pub use input::PatientRecord;
pub use patient::{Avpu, PatientInfo, PatientParameters, Sex};
pub use report::{render_json, render_text, ScoreReport, ScoreResult};
pub use scores::{ScoreKind, ScoreOptions};
pub use units::UnitSelection;

use rayon::prelude::*;

/// Compute every score with default options, in report order
pub fn compute_scores(params: &PatientParameters) -> Vec<ScoreResult> {
    compute_scores_with_config(params, &ResolvedConfig::defaults())
}

/// Compute the scores enabled by `config`, in report order
pub fn compute_scores_with_config(
    params: &PatientParameters,
    config: &ResolvedConfig,
) -> Vec<ScoreResult> {
    let normalized = units::normalize(params);
    ScoreKind::ALL
        .iter()
        .filter(|kind| config.is_enabled(**kind))
        .map(|kind| scores::evaluate(*kind, &normalized, &config.options))
        .collect()
}

/// Score one input document, resolving its units against `config`
pub fn score_patient(record: PatientRecord, config: &ResolvedConfig) -> ScoreReport {
    let units = config.units_for(record.units.as_ref());
    let (patient, params) = record.into_parameters(units);
    let scores = compute_scores_with_config(&params, config);
    ScoreReport {
        patient,
        units,
        scores,
    }
}

/// Score many documents in parallel, preserving input order
pub fn score_batch(records: Vec<PatientRecord>, config: &ResolvedConfig) -> Vec<ScoreReport> {
    score_batch_with_progress(records, config, || {})
}

/// Like [`score_batch`], calling `on_done` once per finished record
pub fn score_batch_with_progress<F>(
    records: Vec<PatientRecord>,
    config: &ResolvedConfig,
    on_done: F,
) -> Vec<ScoreReport>
where
    F: Fn() + Sync,
{
    records
        .into_par_iter()
        .map(|record| {
            let report = score_patient(record, config);
            on_done();
            report
        })
        .collect()
}
