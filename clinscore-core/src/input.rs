//! Patient input documents
//!
//! A record is one JSON object:
//!
//! ```json
//! {
//!   "patient": { "name": "...", "date": "2024-03-01", "diagnosis": "..." },
//!   "units":   { "protein": "g/dL", "urea_source": "bun" },
//!   "vitals":  { "age": 70, "respiratory_rate": 22, "temperature_f": 99.1 },
//!   "labs":    { "albumin": 3.4, "lymphocytes": 1200 }
//! }
//! ```
//!
//! Missing numbers take the form defaults. The only validation is clamping
//! each value into its plausible range.

use crate::patient::{Avpu, PatientInfo, PatientParameters, Sex};
use crate::units::{UnitOverrides, UnitSelection};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

pub const MIN_TEMPERATURE_F: f64 = 94.0;
pub const MAX_TEMPERATURE_F: f64 = 108.0;
pub const MAX_SPO2: f64 = 100.0;

fn default_temperature_f() -> f64 {
    MIN_TEMPERATURE_F
}

/// Bedside observations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Vitals {
    #[serde(default)]
    pub age: f64,
    #[serde(default)]
    pub sex: Sex,
    #[serde(default)]
    pub respiratory_rate: f64,
    #[serde(default)]
    pub spo2: f64,
    #[serde(default)]
    pub oxygen_therapy: bool,
    #[serde(default = "default_temperature_f")]
    pub temperature_f: f64,
    #[serde(default)]
    pub systolic_bp: f64,
    #[serde(default)]
    pub heart_rate: f64,
    #[serde(default)]
    pub avpu: Avpu,
    #[serde(default)]
    pub new_confusion: bool,
}

impl Default for Vitals {
    fn default() -> Self {
        Vitals {
            age: 0.0,
            sex: Sex::default(),
            respiratory_rate: 0.0,
            spo2: 0.0,
            oxygen_therapy: false,
            temperature_f: default_temperature_f(),
            systolic_bp: 0.0,
            heart_rate: 0.0,
            avpu: Avpu::default(),
            new_confusion: false,
        }
    }
}

/// Laboratory values, in the record's declared units
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Labs {
    pub neutrophils: f64,
    pub lymphocytes: f64,
    pub monocytes: f64,
    pub platelets: f64,
    pub albumin: f64,
    pub total_protein: f64,
    pub globulin: Option<f64>,
    pub bilirubin: f64,
    pub creatinine: f64,
    pub urea: f64,
    pub glucose: f64,
    pub hba1c: f64,
    pub alt: f64,
    pub ast: f64,
}

/// One patient input document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatientRecord {
    #[serde(default)]
    pub patient: PatientInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<UnitOverrides>,
    #[serde(default)]
    pub vitals: Vitals,
    #[serde(default)]
    pub labs: Labs,
}

/// Clamp `value` into `[min, max]`, logging when it moves
fn clamp(field: &'static str, value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        warn!(field, "value is not a number, using {}", min);
        return min;
    }
    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!(field, value, clamped, "input clamped into range");
    }
    clamped
}

fn non_negative(field: &'static str, value: f64) -> f64 {
    clamp(field, value, 0.0, f64::INFINITY)
}

impl PatientRecord {
    /// Split into pass-through identification and clamped scoring parameters
    pub fn into_parameters(self, units: UnitSelection) -> (PatientInfo, PatientParameters) {
        let v = self.vitals;
        let l = self.labs;
        let params = PatientParameters {
            age: non_negative("age", v.age),
            sex: v.sex,
            respiratory_rate: non_negative("respiratory_rate", v.respiratory_rate),
            spo2: clamp("spo2", v.spo2, 0.0, MAX_SPO2),
            oxygen_therapy: v.oxygen_therapy,
            temperature_f: clamp(
                "temperature_f",
                v.temperature_f,
                MIN_TEMPERATURE_F,
                MAX_TEMPERATURE_F,
            ),
            systolic_bp: non_negative("systolic_bp", v.systolic_bp),
            heart_rate: non_negative("heart_rate", v.heart_rate),
            avpu: v.avpu,
            new_confusion: v.new_confusion,
            neutrophils: non_negative("neutrophils", l.neutrophils),
            lymphocytes: non_negative("lymphocytes", l.lymphocytes),
            monocytes: non_negative("monocytes", l.monocytes),
            platelets: non_negative("platelets", l.platelets),
            albumin: non_negative("albumin", l.albumin),
            total_protein: non_negative("total_protein", l.total_protein),
            globulin: l.globulin.map(|g| non_negative("globulin", g)),
            bilirubin: non_negative("bilirubin", l.bilirubin),
            creatinine: non_negative("creatinine", l.creatinine),
            urea: non_negative("urea", l.urea),
            glucose: non_negative("glucose", l.glucose),
            hba1c: non_negative("hba1c", l.hba1c),
            alt: non_negative("alt", l.alt),
            ast: non_negative("ast", l.ast),
            units,
        };
        (self.patient, params)
    }
}

/// Parse a single record from a JSON string
pub fn parse_record(json: &str) -> Result<PatientRecord> {
    serde_json::from_str(json).context("failed to parse patient record")
}

/// Load a single record from a JSON file
pub fn load_record(path: &Path) -> Result<PatientRecord> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read patient file: {}", path.display()))?;
    parse_record(&content).with_context(|| format!("invalid patient file: {}", path.display()))
}

/// Parse JSON Lines, one record per non-blank line
pub fn parse_records_jsonl(content: &str) -> Result<Vec<PatientRecord>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("failed to parse record on line {}", index + 1))
        })
        .collect()
}

/// Load a JSON Lines batch file
pub fn load_records_jsonl(path: &Path) -> Result<Vec<PatientRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read batch file: {}", path.display()))?;
    parse_records_jsonl(&content).with_context(|| format!("invalid batch file: {}", path.display()))
}
