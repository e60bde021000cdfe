//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Results keep the engine's fixed score order
//! - Identical input yields byte-for-byte identical output

use crate::bands::Severity;
use crate::patient::PatientInfo;
use crate::units::UnitSelection;
use serde::{Deserialize, Serialize};

/// One interpreted score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ScoreResult {
    pub id: String,
    pub name: String,
    /// Rounded to `precision` decimal places
    pub value: f64,
    #[serde(skip, default)]
    pub precision: usize,
    pub band: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,
}

impl ScoreResult {
    pub fn formatted_value(&self) -> String {
        format!("{:.*}", self.precision, self.value)
    }
}

/// Scored output for one patient record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreReport {
    pub patient: PatientInfo,
    pub units: UnitSelection,
    pub scores: Vec<ScoreResult>,
}

impl ScoreReport {
    pub fn get(&self, id: &str) -> Option<&ScoreResult> {
        self.scores.iter().find(|s| s.id == id)
    }

    /// Most severe band across all scores
    pub fn highest_severity(&self) -> Severity {
        self.scores
            .iter()
            .map(|s| s.severity)
            .max()
            .unwrap_or(Severity::None)
    }
}

/// Render one report as text output
pub fn render_text(report: &ScoreReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("Patient: {}\n", display_or_dash(&report.patient.name)));
    output.push_str(&format!("Date: {}\n", display_or_dash(&report.patient.date)));
    if let Some(ref diagnosis) = report.patient.diagnosis {
        output.push_str(&format!("Diagnosis: {}\n", diagnosis));
    }
    output.push_str(&format!(
        "Units: protein {}, bilirubin {}, {} {}\n\n",
        report.units.protein.as_str(),
        report.units.bilirubin.as_str(),
        report.units.urea_source.as_str(),
        report.units.urea_unit.as_str(),
    ));

    output.push_str(&format!(
        "{:<20} {:<10} {:<34} {}\n",
        "SCORE", "VALUE", "BAND", "NOTE"
    ));

    for score in &report.scores {
        output.push_str(&format!(
            "{:<20} {:<10} {:<34} {}\n",
            truncate_or_pad(&score.name, 20),
            score.formatted_value(),
            score.band,
            score.comment.as_deref().unwrap_or("-"),
        ));
    }

    output.push_str(&format!(
        "\nHighest severity: {}\n",
        report.highest_severity().as_str()
    ));

    output
}

/// Render one report as JSON output
pub fn render_json(report: &ScoreReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

/// Render several reports as a JSON array
pub fn render_json_batch(reports: &[ScoreReport]) -> String {
    serde_json::to_string_pretty(reports).unwrap_or_else(|_| "[]".to_string())
}

/// Render reports as JSON Lines, one compact report per line
pub fn render_jsonl(reports: &[ScoreReport]) -> String {
    let mut output = String::new();
    for report in reports {
        let line = serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string());
        output.push_str(&line);
        output.push('\n');
    }
    output
}

fn display_or_dash(s: &str) -> &str {
    if s.trim().is_empty() {
        "-"
    } else {
        s
    }
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> ScoreReport {
        ScoreReport {
            patient: PatientInfo {
                name: "Jane Doe".to_string(),
                date: "2024-03-01".to_string(),
                diagnosis: Some("Community-acquired pneumonia".to_string()),
            },
            units: UnitSelection::default(),
            scores: vec![
                ScoreResult {
                    id: "curb65".to_string(),
                    name: "CURB-65".to_string(),
                    value: 3.0,
                    precision: 0,
                    band: "High risk".to_string(),
                    severity: Severity::Severe,
                    comment: Some("criteria met: confusion, RR >= 30, age >= 65".to_string()),
                },
                ScoreResult {
                    id: "pni".to_string(),
                    name: "PNI".to_string(),
                    value: 42.5,
                    precision: 1,
                    band: "Moderate malnutrition".to_string(),
                    severity: Severity::Moderate,
                    comment: None,
                },
            ],
        }
    }

    #[test]
    fn test_render_text_contains_patient_and_scores() {
        let text = render_text(&sample_report());
        assert!(text.starts_with("Patient: Jane Doe\n"));
        assert!(text.contains("Diagnosis: Community-acquired pneumonia"));
        assert!(text.contains("Units: protein g/dL, bilirubin mg/dL, urea mg/dL"));
        assert!(text.contains("CURB-65"));
        assert!(text.contains("42.5"));
        assert!(text.contains("Moderate malnutrition"));
        assert!(text.ends_with("\nHighest severity: severe\n"));
    }

    #[test]
    fn test_formatted_value_respects_precision() {
        let report = sample_report();
        assert_eq!(report.scores[0].formatted_value(), "3");
        assert_eq!(report.scores[1].formatted_value(), "42.5");
    }

    #[test]
    fn test_render_json_omits_empty_comment() {
        let json = render_json(&sample_report());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let scores = value["scores"].as_array().unwrap();
        assert_eq!(scores[0]["severity"], "severe");
        assert!(scores[1].get("comment").is_none());
        assert!(scores[1].get("precision").is_none());
        assert_eq!(value["units"]["protein"], "g/dL");
    }

    #[test]
    fn test_render_jsonl_one_line_per_report() {
        let report = sample_report();
        let out = render_jsonl(&[report.clone(), report]);
        assert_eq!(out.lines().count(), 2);
        for line in out.lines() {
            serde_json::from_str::<serde_json::Value>(line).unwrap();
        }
    }

    #[test]
    fn test_render_jsonl_keeps_every_report_line() {
        let mut odd = sample_report();
        odd.scores[1].value = f64::NAN;
        let out = render_jsonl(&[sample_report(), odd, sample_report()]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        let middle: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(middle["patient"]["name"], "Jane Doe");
        assert!(middle["scores"][1]["value"].is_null());
    }

    #[test]
    fn test_missing_name_renders_dash() {
        let mut report = sample_report();
        report.patient.name = String::new();
        assert!(render_text(&report).starts_with("Patient: -\n"));
    }

    #[test]
    fn test_highest_severity_and_lookup() {
        let report = sample_report();
        assert_eq!(report.highest_severity(), Severity::Severe);
        assert_eq!(report.get("pni").map(|s| s.value), Some(42.5));
        assert!(report.get("apri").is_none());
    }
}
