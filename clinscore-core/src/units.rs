//! Unit selection and normalization
//!
//! Every raw input is converted into one canonical unit per analyte before any
//! score formula runs:
//!
//! | Analyte            | Canonical unit |
//! |--------------------|----------------|
//! | Temperature        | °C             |
//! | Albumin, TP, glob. | g/L            |
//! | Bilirubin          | µmol/L         |
//! | Urea / BUN         | mmol/L         |
//! | Cell counts        | ×10⁹/L         |
//!
//! Formulas that are defined on g/dL (PNI, UAR) derive it from the canonical
//! g/L value, so every score sees the same albumin.
//!
//! Global invariants enforced:
//! - Conversions are pure and deterministic
//! - Normalization never mutates its input

use crate::patient::{Avpu, PatientParameters, Sex};
use serde::{Deserialize, Serialize};

pub const PROTEIN_G_DL_TO_G_L: f64 = 10.0;
pub const BILIRUBIN_MG_DL_TO_UMOL_L: f64 = 17.1;
pub const UREA_MG_DL_TO_MMOL_L: f64 = 0.357;
/// Cells per mm³ in one unit of ×10⁹/L
pub const CELLS_PER_MM3_PER_GIGA_PER_L: f64 = 1000.0;

/// Unit for albumin, total protein and globulin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProteinUnit {
    #[default]
    #[serde(rename = "g/dL")]
    GramsPerDeciliter,
    #[serde(rename = "g/L")]
    GramsPerLiter,
}

/// Unit for total bilirubin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BilirubinUnit {
    #[default]
    #[serde(rename = "mg/dL")]
    MilligramsPerDeciliter,
    #[serde(rename = "umol/L", alias = "µmol/L")]
    MicromolesPerLiter,
}

/// Which nitrogen-waste analyte was entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UreaSource {
    #[default]
    #[serde(alias = "Urea")]
    Urea,
    #[serde(alias = "BUN")]
    Bun,
}

/// Unit the urea/BUN value was entered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UreaUnit {
    #[default]
    #[serde(rename = "mg/dL")]
    MilligramsPerDeciliter,
    #[serde(rename = "mmol/L")]
    MillimolesPerLiter,
}

impl ProteinUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProteinUnit::GramsPerDeciliter => "g/dL",
            ProteinUnit::GramsPerLiter => "g/L",
        }
    }
}

impl BilirubinUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            BilirubinUnit::MilligramsPerDeciliter => "mg/dL",
            BilirubinUnit::MicromolesPerLiter => "umol/L",
        }
    }
}

impl UreaSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            UreaSource::Urea => "urea",
            UreaSource::Bun => "bun",
        }
    }
}

impl UreaUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            UreaUnit::MilligramsPerDeciliter => "mg/dL",
            UreaUnit::MillimolesPerLiter => "mmol/L",
        }
    }
}

/// Declared units for one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitSelection {
    pub protein: ProteinUnit,
    pub bilirubin: BilirubinUnit,
    pub urea_source: UreaSource,
    pub urea_unit: UreaUnit,
}

/// Partial unit selection layered over a base selection
///
/// Used for config file defaults, per-record declarations and CLI flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitOverrides {
    pub protein: Option<ProteinUnit>,
    pub bilirubin: Option<BilirubinUnit>,
    pub urea_source: Option<UreaSource>,
    pub urea_unit: Option<UreaUnit>,
}

impl UnitOverrides {
    /// Apply the set fields over `base`
    pub fn apply_to(&self, base: UnitSelection) -> UnitSelection {
        UnitSelection {
            protein: self.protein.unwrap_or(base.protein),
            bilirubin: self.bilirubin.unwrap_or(base.bilirubin),
            urea_source: self.urea_source.unwrap_or(base.urea_source),
            urea_unit: self.urea_unit.unwrap_or(base.urea_unit),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == UnitOverrides::default()
    }
}

/// `C = (F − 32) × 5/9`
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn protein_to_g_l(value: f64, unit: ProteinUnit) -> f64 {
    match unit {
        ProteinUnit::GramsPerDeciliter => value * PROTEIN_G_DL_TO_G_L,
        ProteinUnit::GramsPerLiter => value,
    }
}

pub fn g_l_to_g_dl(value: f64) -> f64 {
    value / PROTEIN_G_DL_TO_G_L
}

pub fn bilirubin_to_umol_l(value: f64, unit: BilirubinUnit) -> f64 {
    match unit {
        BilirubinUnit::MilligramsPerDeciliter => value * BILIRUBIN_MG_DL_TO_UMOL_L,
        BilirubinUnit::MicromolesPerLiter => value,
    }
}

/// Convert an entered urea or BUN value to urea in mmol/L
///
/// BUN is reported in mg/dL of nitrogen; a BUN value declared in mmol/L is
/// already molar and passes through.
pub fn urea_to_mmol_l(value: f64, source: UreaSource, unit: UreaUnit) -> f64 {
    match (source, unit) {
        (_, UreaUnit::MillimolesPerLiter) => value,
        (UreaSource::Urea, UreaUnit::MilligramsPerDeciliter)
        | (UreaSource::Bun, UreaUnit::MilligramsPerDeciliter) => value * UREA_MG_DL_TO_MMOL_L,
    }
}

/// Inverse of the mg/dL → mmol/L conversion (exact reciprocal)
pub fn urea_mmol_l_to_mg_dl(value: f64) -> f64 {
    value / UREA_MG_DL_TO_MMOL_L
}

/// `total_protein − albumin`, floored at zero, in whichever unit both share
pub fn derive_globulin(total_protein: f64, albumin: f64) -> f64 {
    (total_protein - albumin).max(0.0)
}

pub fn per_mm3_to_giga_per_l(count: f64) -> f64 {
    count / CELLS_PER_MM3_PER_GIGA_PER_L
}

/// Patient parameters in canonical units
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedParameters {
    pub age: f64,
    pub sex: Sex,
    pub respiratory_rate: f64,
    pub spo2: f64,
    pub oxygen_therapy: bool,
    pub temperature_c: f64,
    pub systolic_bp: f64,
    pub heart_rate: f64,
    pub avpu: Avpu,
    pub new_confusion: bool,
    /// ×10⁹/L
    pub neutrophils: f64,
    /// ×10⁹/L
    pub lymphocytes: f64,
    /// ×10⁹/L
    pub monocytes: f64,
    /// ×10⁹/L
    pub platelets: f64,
    /// Absolute lymphocyte count per mm³, as PNI expects
    pub lymphocytes_per_mm3: f64,
    pub albumin_g_l: f64,
    pub total_protein_g_l: f64,
    pub globulin_g_l: f64,
    pub bilirubin_umol_l: f64,
    pub creatinine_mg_dl: f64,
    pub urea_mmol_l: f64,
    pub glucose_mg_dl: f64,
    pub hba1c: f64,
    pub alt: f64,
    pub ast: f64,
}

impl NormalizedParameters {
    pub fn albumin_g_dl(&self) -> f64 {
        g_l_to_g_dl(self.albumin_g_l)
    }
}

/// Convert every raw field of `params` into its canonical unit
pub fn normalize(params: &PatientParameters) -> NormalizedParameters {
    let units = params.units;

    // Globulin is derived in the entered unit, then converted with the rest
    let globulin = match params.globulin {
        Some(g) if g > 0.0 => g,
        _ => derive_globulin(params.total_protein, params.albumin),
    };

    NormalizedParameters {
        age: params.age,
        sex: params.sex,
        respiratory_rate: params.respiratory_rate,
        spo2: params.spo2,
        oxygen_therapy: params.oxygen_therapy,
        temperature_c: fahrenheit_to_celsius(params.temperature_f),
        systolic_bp: params.systolic_bp,
        heart_rate: params.heart_rate,
        avpu: params.avpu,
        new_confusion: params.new_confusion,
        neutrophils: per_mm3_to_giga_per_l(params.neutrophils),
        lymphocytes: per_mm3_to_giga_per_l(params.lymphocytes),
        monocytes: per_mm3_to_giga_per_l(params.monocytes),
        platelets: per_mm3_to_giga_per_l(params.platelets),
        lymphocytes_per_mm3: params.lymphocytes,
        albumin_g_l: protein_to_g_l(params.albumin, units.protein),
        total_protein_g_l: protein_to_g_l(params.total_protein, units.protein),
        globulin_g_l: protein_to_g_l(globulin, units.protein),
        bilirubin_umol_l: bilirubin_to_umol_l(params.bilirubin, units.bilirubin),
        creatinine_mg_dl: params.creatinine,
        urea_mmol_l: urea_to_mmol_l(params.urea, units.urea_source, units.urea_unit),
        glucose_mg_dl: params.glucose,
        hba1c: params.hba1c,
        alt: params.alt,
        ast: params.ast,
    }
}
