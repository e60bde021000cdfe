//! Patient parameter record
//!
//! One `PatientParameters` value carries every raw field a scoring pass reads,
//! together with the units the values were entered in. Nothing here is
//! normalized; see `units::normalize` for that.

use crate::units::UnitSelection;
use serde::{Deserialize, Serialize};

/// Biological sex, as used by the MDRD eGFR coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sex {
    #[default]
    #[serde(alias = "male", alias = "M")]
    Male,
    #[serde(alias = "female", alias = "F")]
    Female,
}

/// AVPU level of consciousness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Avpu {
    #[default]
    #[serde(rename = "A", alias = "Alert", alias = "alert")]
    Alert,
    #[serde(rename = "V", alias = "Voice", alias = "voice")]
    Voice,
    #[serde(rename = "P", alias = "Pain", alias = "pain")]
    Pain,
    #[serde(rename = "U", alias = "Unresponsive", alias = "unresponsive")]
    Unresponsive,
}

/// Identification strings carried through to the report unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatientInfo {
    #[serde(default)]
    pub name: String,
    /// Report date as entered (not parsed)
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
}

/// Raw patient inputs for one scoring pass
///
/// Protein-family values, bilirubin and urea are in the units declared by
/// `units`. Temperature is always Fahrenheit. Cell counts are absolute counts
/// per mm³.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientParameters {
    pub age: f64,
    pub sex: Sex,
    pub respiratory_rate: f64,
    pub spo2: f64,
    pub oxygen_therapy: bool,
    pub temperature_f: f64,
    pub systolic_bp: f64,
    pub heart_rate: f64,
    pub avpu: Avpu,
    pub new_confusion: bool,
    pub neutrophils: f64,
    pub lymphocytes: f64,
    pub monocytes: f64,
    pub platelets: f64,
    pub albumin: f64,
    pub total_protein: f64,
    /// Entered globulin; derived from total protein and albumin when absent
    pub globulin: Option<f64>,
    pub bilirubin: f64,
    /// Creatinine in mg/dL
    pub creatinine: f64,
    /// Urea or BUN, per `units.urea_source` / `units.urea_unit`
    pub urea: f64,
    /// Admission glucose in mg/dL
    pub glucose: f64,
    /// HbA1c in %
    pub hba1c: f64,
    pub alt: f64,
    pub ast: f64,
    pub units: UnitSelection,
}

impl Default for PatientParameters {
    /// Form defaults: every numeric input at its minimum
    fn default() -> Self {
        PatientParameters {
            age: 0.0,
            sex: Sex::Male,
            respiratory_rate: 0.0,
            spo2: 0.0,
            oxygen_therapy: false,
            temperature_f: 94.0,
            systolic_bp: 0.0,
            heart_rate: 0.0,
            avpu: Avpu::Alert,
            new_confusion: false,
            neutrophils: 0.0,
            lymphocytes: 0.0,
            monocytes: 0.0,
            platelets: 0.0,
            albumin: 0.0,
            total_protein: 0.0,
            globulin: None,
            bilirubin: 0.0,
            creatinine: 0.0,
            urea: 0.0,
            glucose: 0.0,
            hba1c: 0.0,
            alt: 0.0,
            ast: 0.0,
            units: UnitSelection::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avpu_accepts_letters_and_words() {
        let a: Avpu = serde_json::from_str(r#""A""#).unwrap();
        let v: Avpu = serde_json::from_str(r#""Voice""#).unwrap();
        let u: Avpu = serde_json::from_str(r#""unresponsive""#).unwrap();
        assert_eq!(a, Avpu::Alert);
        assert_eq!(v, Avpu::Voice);
        assert_eq!(u, Avpu::Unresponsive);
        assert_eq!(serde_json::to_string(&Avpu::Pain).unwrap(), r#""P""#);
    }

    #[test]
    fn test_sex_aliases() {
        let f: Sex = serde_json::from_str(r#""F""#).unwrap();
        assert_eq!(f, Sex::Female);
        let m: Sex = serde_json::from_str(r#""male""#).unwrap();
        assert_eq!(m, Sex::Male);
    }

    #[test]
    fn test_default_parameters_match_form_minimums() {
        let p = PatientParameters::default();
        assert_eq!(p.temperature_f, 94.0);
        assert_eq!(p.age, 0.0);
        assert!(p.globulin.is_none());
    }
}
