//! Score calculators
//!
//! Every calculator is a pure function of `NormalizedParameters`. None of them
//! can fail: each denominator is guarded and a degenerate input, or a result
//! too large for `f64`, yields the sentinel 0. `evaluate` reports a sentinel
//! as "Not computed" with a comment instead of banding it.
//!
//! Formulas (canonical units):
//! - PNI  = 10 × albumin(g/dL) + 0.005 × lymphocytes(/mm³)
//! - SII  = neutrophils × platelets / lymphocytes        (×10⁹/L)
//! - SIRI = neutrophils × monocytes / lymphocytes        (×10⁹/L)
//! - ALBI = 0.66 × log10(bilirubin µmol/L) − 0.085 × albumin(g/L)
//! - eGFR = 175 × Cr^-1.154 × age^-0.203 × 0.742 (female)
//! - UAR  = urea(mmol/L) / albumin(g/dL)
//! - SHR  = glucose(mg/dL) / (28.7 × HbA1c − 46.7)
//! - APRI = (AST / AST ULN) × 100 / platelets(×10⁹/L)

use crate::bands::{self, BandTable};
use crate::news2;
use crate::patient::Sex;
use crate::report::ScoreResult;
use crate::units::NormalizedParameters;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Denominators at or below this are treated as zero
pub const EPSILON: f64 = 1e-9;
/// Floor applied to bilirubin before taking log10
pub const BILIRUBIN_FLOOR_UMOL_L: f64 = 1e-6;
/// Upper limit of normal for AST used by APRI (U/L)
pub const DEFAULT_AST_UPPER_LIMIT: f64 = 40.0;

const CURB65_UREA_MMOL_L: f64 = 7.0;
const CURB65_RESPIRATORY_RATE: f64 = 30.0;
const CURB65_SYSTOLIC_BP: f64 = 90.0;
const CURB65_AGE: f64 = 65.0;

/// Identifier for every score the engine computes, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    News2,
    Curb65,
    Pni,
    Sii,
    Siri,
    Albi,
    Egfr,
    Uar,
    Shr,
    AltPlateletRatio,
    GlobulinTotalProteinRatio,
    Nlr,
    Plr,
    DeRitisRatio,
    Apri,
}

impl ScoreKind {
    pub const ALL: [ScoreKind; 15] = [
        ScoreKind::News2,
        ScoreKind::Curb65,
        ScoreKind::Pni,
        ScoreKind::Sii,
        ScoreKind::Siri,
        ScoreKind::Albi,
        ScoreKind::Egfr,
        ScoreKind::Uar,
        ScoreKind::Shr,
        ScoreKind::AltPlateletRatio,
        ScoreKind::GlobulinTotalProteinRatio,
        ScoreKind::Nlr,
        ScoreKind::Plr,
        ScoreKind::DeRitisRatio,
        ScoreKind::Apri,
    ];

    /// Stable identifier used in config files and JSON output
    pub fn id(&self) -> &'static str {
        match self {
            ScoreKind::News2 => "news2",
            ScoreKind::Curb65 => "curb65",
            ScoreKind::Pni => "pni",
            ScoreKind::Sii => "sii",
            ScoreKind::Siri => "siri",
            ScoreKind::Albi => "albi",
            ScoreKind::Egfr => "egfr",
            ScoreKind::Uar => "uar",
            ScoreKind::Shr => "shr",
            ScoreKind::AltPlateletRatio => "alt_platelet_ratio",
            ScoreKind::GlobulinTotalProteinRatio => "globulin_total_protein_ratio",
            ScoreKind::Nlr => "nlr",
            ScoreKind::Plr => "plr",
            ScoreKind::DeRitisRatio => "de_ritis_ratio",
            ScoreKind::Apri => "apri",
        }
    }

    /// Display name used in reports
    pub fn name(&self) -> &'static str {
        match self {
            ScoreKind::News2 => "NEWS2",
            ScoreKind::Curb65 => "CURB-65",
            ScoreKind::Pni => "PNI",
            ScoreKind::Sii => "SII",
            ScoreKind::Siri => "SIRI",
            ScoreKind::Albi => "ALBI",
            ScoreKind::Egfr => "eGFR (MDRD)",
            ScoreKind::Uar => "UAR",
            ScoreKind::Shr => "SHR",
            ScoreKind::AltPlateletRatio => "ALT/Platelet",
            ScoreKind::GlobulinTotalProteinRatio => "Globulin/TP",
            ScoreKind::Nlr => "NLR",
            ScoreKind::Plr => "PLR",
            ScoreKind::DeRitisRatio => "AST/ALT (De Ritis)",
            ScoreKind::Apri => "APRI",
        }
    }

    /// Decimal places the reported value is rounded to
    pub fn precision(&self) -> usize {
        match self {
            ScoreKind::News2 | ScoreKind::Curb65 => 0,
            ScoreKind::Pni | ScoreKind::Sii | ScoreKind::Egfr | ScoreKind::Plr => 1,
            ScoreKind::AltPlateletRatio => 3,
            ScoreKind::Siri
            | ScoreKind::Albi
            | ScoreKind::Uar
            | ScoreKind::Shr
            | ScoreKind::GlobulinTotalProteinRatio
            | ScoreKind::Nlr
            | ScoreKind::DeRitisRatio
            | ScoreKind::Apri => 2,
        }
    }

    pub fn table(&self) -> &'static BandTable {
        match self {
            ScoreKind::News2 => &bands::NEWS2,
            ScoreKind::Curb65 => &bands::CURB65,
            ScoreKind::Pni => &bands::PNI,
            ScoreKind::Sii => &bands::SII,
            ScoreKind::Siri => &bands::SIRI,
            ScoreKind::Albi => &bands::ALBI,
            ScoreKind::Egfr => &bands::EGFR,
            ScoreKind::Uar => &bands::UAR,
            ScoreKind::Shr => &bands::SHR,
            ScoreKind::AltPlateletRatio => &bands::ALT_PLATELET,
            ScoreKind::GlobulinTotalProteinRatio => &bands::GLOBULIN_TOTAL_PROTEIN,
            ScoreKind::Nlr => &bands::NLR,
            ScoreKind::Plr => &bands::PLR,
            ScoreKind::DeRitisRatio => &bands::DE_RITIS,
            ScoreKind::Apri => &bands::APRI,
        }
    }

    pub fn from_id(id: &str) -> Option<ScoreKind> {
        ScoreKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.id().eq_ignore_ascii_case(id))
    }
}

impl std::str::FromStr for ScoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        ScoreKind::from_id(s).ok_or_else(|| {
            let known: Vec<&str> = ScoreKind::ALL.iter().map(|k| k.id()).collect();
            anyhow::anyhow!("unknown score '{}' (expected one of: {})", s, known.join(", "))
        })
    }
}

/// Tunables that are not patient data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreOptions {
    pub ast_upper_limit: f64,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        ScoreOptions {
            ast_upper_limit: DEFAULT_AST_UPPER_LIMIT,
        }
    }
}

/// `numerator / denominator`, or 0 when the denominator is not positive or
/// the quotient is not finite
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator <= EPSILON {
        debug!(numerator, denominator, "denominator below epsilon, returning 0");
        return 0.0;
    }
    let quotient = numerator / denominator;
    if !quotient.is_finite() {
        debug!(numerator, denominator, "quotient not finite, returning 0");
        return 0.0;
    }
    quotient
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// CURB-65 criteria, one flag per point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Curb65Criteria {
    pub confusion: bool,
    pub urea: bool,
    pub respiratory_rate: bool,
    pub blood_pressure: bool,
    pub age: bool,
}

impl Curb65Criteria {
    pub fn evaluate(p: &NormalizedParameters) -> Self {
        Curb65Criteria {
            confusion: p.new_confusion,
            urea: p.urea_mmol_l >= CURB65_UREA_MMOL_L,
            respiratory_rate: p.respiratory_rate >= CURB65_RESPIRATORY_RATE,
            blood_pressure: p.systolic_bp < CURB65_SYSTOLIC_BP,
            age: p.age >= CURB65_AGE,
        }
    }

    pub fn met(&self) -> Vec<&'static str> {
        [
            (self.confusion, "confusion"),
            (self.urea, "urea >= 7 mmol/L"),
            (self.respiratory_rate, "RR >= 30"),
            (self.blood_pressure, "SBP < 90"),
            (self.age, "age >= 65"),
        ]
        .iter()
        .filter(|(flag, _)| *flag)
        .map(|(_, name)| *name)
        .collect()
    }

    pub fn count(&self) -> u8 {
        self.met().len() as u8
    }
}

pub fn calculate_curb65(p: &NormalizedParameters) -> f64 {
    f64::from(Curb65Criteria::evaluate(p).count())
}

pub fn calculate_pni(p: &NormalizedParameters) -> f64 {
    10.0 * p.albumin_g_dl() + 0.005 * p.lymphocytes_per_mm3
}

pub fn calculate_sii(p: &NormalizedParameters) -> f64 {
    ratio(ScoreKind::Sii, p, &ScoreOptions::default())
}

pub fn calculate_siri(p: &NormalizedParameters) -> f64 {
    ratio(ScoreKind::Siri, p, &ScoreOptions::default())
}

pub fn calculate_albi(p: &NormalizedParameters) -> f64 {
    let bilirubin = p.bilirubin_umol_l.max(BILIRUBIN_FLOOR_UMOL_L);
    0.66 * bilirubin.log10() - 0.085 * p.albumin_g_l
}

pub fn calculate_egfr(p: &NormalizedParameters) -> f64 {
    if p.creatinine_mg_dl <= EPSILON || p.age <= EPSILON {
        debug!(
            creatinine = p.creatinine_mg_dl,
            age = p.age,
            "eGFR inputs not positive, returning 0"
        );
        return 0.0;
    }
    let sex_factor = match p.sex {
        Sex::Female => 0.742,
        Sex::Male => 1.0,
    };
    175.0 * p.creatinine_mg_dl.powf(-1.154) * p.age.powf(-0.203) * sex_factor
}

pub fn calculate_uar(p: &NormalizedParameters) -> f64 {
    ratio(ScoreKind::Uar, p, &ScoreOptions::default())
}

/// HbA1c-derived estimated average glucose (mg/dL)
pub fn estimated_average_glucose(hba1c: f64) -> f64 {
    28.7 * hba1c - 46.7
}

pub fn calculate_shr(p: &NormalizedParameters) -> f64 {
    ratio(ScoreKind::Shr, p, &ScoreOptions::default())
}

pub fn calculate_alt_platelet_ratio(p: &NormalizedParameters) -> f64 {
    ratio(ScoreKind::AltPlateletRatio, p, &ScoreOptions::default())
}

/// Both operands share the canonical g/L unit
pub fn calculate_globulin_total_protein_ratio(p: &NormalizedParameters) -> f64 {
    ratio(ScoreKind::GlobulinTotalProteinRatio, p, &ScoreOptions::default())
}

pub fn calculate_nlr(p: &NormalizedParameters) -> f64 {
    ratio(ScoreKind::Nlr, p, &ScoreOptions::default())
}

pub fn calculate_plr(p: &NormalizedParameters) -> f64 {
    ratio(ScoreKind::Plr, p, &ScoreOptions::default())
}

pub fn calculate_de_ritis_ratio(p: &NormalizedParameters) -> f64 {
    ratio(ScoreKind::DeRitisRatio, p, &ScoreOptions::default())
}

pub fn calculate_apri(p: &NormalizedParameters, options: &ScoreOptions) -> f64 {
    ratio(ScoreKind::Apri, p, options)
}

/// `(numerator, denominator, reason when the denominator is unusable)`
type RatioTerms = (f64, f64, &'static str);

const LYMPHOCYTES_ZERO: &str = "lymphocyte count is zero";
const PLATELETS_ZERO: &str = "platelet count is zero";
const OUT_OF_RANGE: &str = "result out of range";

/// Terms of every score defined as a quotient
fn ratio_terms(kind: ScoreKind, p: &NormalizedParameters, options: &ScoreOptions) -> Option<RatioTerms> {
    let terms = match kind {
        ScoreKind::Sii => (p.neutrophils * p.platelets, p.lymphocytes, LYMPHOCYTES_ZERO),
        ScoreKind::Siri => (p.neutrophils * p.monocytes, p.lymphocytes, LYMPHOCYTES_ZERO),
        ScoreKind::Nlr => (p.neutrophils, p.lymphocytes, LYMPHOCYTES_ZERO),
        ScoreKind::Plr => (p.platelets, p.lymphocytes, LYMPHOCYTES_ZERO),
        ScoreKind::Uar => (p.urea_mmol_l, p.albumin_g_dl(), "albumin is zero"),
        ScoreKind::Shr => (
            p.glucose_mg_dl,
            estimated_average_glucose(p.hba1c),
            "HbA1c too low for a positive estimated average glucose",
        ),
        ScoreKind::AltPlateletRatio => (p.alt, p.platelets, PLATELETS_ZERO),
        ScoreKind::GlobulinTotalProteinRatio => {
            (p.globulin_g_l, p.total_protein_g_l, "total protein is zero")
        }
        ScoreKind::DeRitisRatio => (p.ast, p.alt, "ALT is zero"),
        ScoreKind::Apri => (
            safe_div(p.ast, options.ast_upper_limit) * 100.0,
            p.platelets,
            PLATELETS_ZERO,
        ),
        _ => return None,
    };
    Some(terms)
}

fn ratio(kind: ScoreKind, p: &NormalizedParameters, options: &ScoreOptions) -> f64 {
    ratio_terms(kind, p, options).map_or(0.0, |(numerator, denominator, _)| {
        safe_div(numerator, denominator)
    })
}

fn formula(kind: ScoreKind, p: &NormalizedParameters, options: &ScoreOptions) -> f64 {
    match kind {
        ScoreKind::News2 => news2::calculate_news2(p),
        ScoreKind::Curb65 => calculate_curb65(p),
        ScoreKind::Pni => calculate_pni(p),
        ScoreKind::Albi => calculate_albi(p),
        ScoreKind::Egfr => calculate_egfr(p),
        _ => ratio(kind, p, options),
    }
}

/// Raw (unrounded) value of `kind`, or why it cannot be computed
///
/// Fails for a zero or negative denominator, non-positive eGFR inputs, and
/// any result that does not fit in a finite `f64`.
pub fn try_calculate(
    kind: ScoreKind,
    p: &NormalizedParameters,
    options: &ScoreOptions,
) -> Result<f64, String> {
    if let Some((numerator, denominator, reason)) = ratio_terms(kind, p, options) {
        if denominator <= EPSILON {
            return Err(reason.to_string());
        }
        let quotient = numerator / denominator;
        return if quotient.is_finite() {
            Ok(quotient)
        } else {
            Err(OUT_OF_RANGE.to_string())
        };
    }
    if kind == ScoreKind::Egfr && (p.creatinine_mg_dl <= EPSILON || p.age <= EPSILON) {
        return Err("creatinine and age must be positive".to_string());
    }
    let value = formula(kind, p, options);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(OUT_OF_RANGE.to_string())
    }
}

/// Raw (unrounded) value of `kind`; 0 when it cannot be computed
pub fn calculate(kind: ScoreKind, p: &NormalizedParameters, options: &ScoreOptions) -> f64 {
    try_calculate(kind, p, options).unwrap_or_else(|reason| {
        debug!(score = kind.id(), reason = %reason, "score not computed, returning 0");
        0.0
    })
}

fn bilirubin_floor_note(kind: ScoreKind, p: &NormalizedParameters) -> Option<String> {
    if kind == ScoreKind::Albi && p.bilirubin_umol_l <= BILIRUBIN_FLOOR_UMOL_L {
        Some(format!(
            "bilirubin not positive; floored at {} umol/L",
            BILIRUBIN_FLOOR_UMOL_L
        ))
    } else {
        None
    }
}

/// Compute, round and interpret one score
pub fn evaluate(kind: ScoreKind, p: &NormalizedParameters, options: &ScoreOptions) -> ScoreResult {
    let (value, band, comment) = match kind {
        ScoreKind::News2 => {
            let breakdown = news2::calculate_breakdown(p);
            (
                f64::from(breakdown.total()),
                news2::assign_band(&breakdown),
                Some(breakdown.summary()),
            )
        }
        ScoreKind::Curb65 => {
            let criteria = Curb65Criteria::evaluate(p);
            let met = criteria.met();
            let value = f64::from(criteria.count());
            let comment = if met.is_empty() {
                "no criteria met".to_string()
            } else {
                format!("criteria met: {}", met.join(", "))
            };
            (value, kind.table().interpret(value), Some(comment))
        }
        _ => {
            let outcome = try_calculate(kind, p, options).and_then(|raw| {
                let value = round_to(raw, kind.precision());
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(OUT_OF_RANGE.to_string())
                }
            });
            match outcome {
                Ok(value) => (
                    value,
                    kind.table().interpret(value),
                    bilirubin_floor_note(kind, p),
                ),
                // A sentinel is not a measurement; keep it out of the clinical bands
                Err(reason) => (
                    0.0,
                    &bands::NOT_COMPUTED,
                    Some(format!("{}; reported as 0", reason)),
                ),
            }
        }
    };

    debug!(
        score = kind.id(),
        value,
        band = band.label,
        "computed score"
    );

    ScoreResult {
        id: kind.id().to_string(),
        name: kind.name().to_string(),
        value,
        precision: kind.precision(),
        band: band.label.to_string(),
        severity: band.severity,
        comment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::PatientParameters;
    use crate::units::normalize;

    fn labs() -> PatientParameters {
        PatientParameters {
            age: 50.0,
            neutrophils: 4000.0,
            lymphocytes: 2000.0,
            monocytes: 500.0,
            platelets: 250_000.0,
            albumin: 4.0,
            total_protein: 7.0,
            bilirubin: 0.8,
            creatinine: 1.0,
            urea: 5.0,
            glucose: 140.0,
            hba1c: 6.0,
            alt: 30.0,
            ast: 25.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_safe_div_guards_zero_and_negative() {
        assert_eq!(safe_div(5.0, 0.0), 0.0);
        assert_eq!(safe_div(5.0, -2.0), 0.0);
        assert_eq!(safe_div(5.0, 2.0), 2.5);
        assert_eq!(safe_div(f64::MAX, 0.5), 0.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(42.46, 1), 42.5);
        assert_eq!(round_to(-2.614, 2), -2.61);
        assert_eq!(round_to(3.0, 0), 3.0);
    }

    #[test]
    fn test_inflammation_ratios() {
        let n = normalize(&labs());
        // 4.0 × 250 / 2.0
        assert!((calculate_sii(&n) - 500.0).abs() < 1e-9);
        // 4.0 × 0.5 / 2.0
        assert!((calculate_siri(&n) - 1.0).abs() < 1e-9);
        assert!((calculate_nlr(&n) - 2.0).abs() < 1e-9);
        assert!((calculate_plr(&n) - 125.0).abs() < 1e-9);
    }

    #[test]
    fn test_albi_grade_one_for_normal_liver() {
        let n = normalize(&labs());
        let albi = calculate_albi(&n);
        let expected = 0.66 * (0.8f64 * 17.1).log10() - 0.085 * 40.0;
        assert!((albi - expected).abs() < 1e-12);
        assert_eq!(bands::ALBI.interpret(albi).label, "Grade 1");
    }

    #[test]
    fn test_albi_with_zero_bilirubin_is_finite() {
        let mut p = labs();
        p.bilirubin = 0.0;
        let n = normalize(&p);
        let albi = calculate_albi(&n);
        assert!(albi.is_finite());
        let result = evaluate(ScoreKind::Albi, &n, &ScoreOptions::default());
        assert_eq!(result.band, "Grade 1");
        assert!(result.comment.unwrap().contains("floored"));
    }

    #[test]
    fn test_egfr_female_factor() {
        let mut p = labs();
        let male = calculate_egfr(&normalize(&p));
        p.sex = Sex::Female;
        let female = calculate_egfr(&normalize(&p));
        assert!((female / male - 0.742).abs() < 1e-12);
    }

    #[test]
    fn test_egfr_sentinel_for_zero_creatinine() {
        let mut p = labs();
        p.creatinine = 0.0;
        let n = normalize(&p);
        assert_eq!(calculate_egfr(&n), 0.0);
        let result = evaluate(ScoreKind::Egfr, &n, &ScoreOptions::default());
        assert_eq!(result.value, 0.0);
        assert_eq!(result.band, "Not computed");
        assert_eq!(result.severity, bands::Severity::None);
        assert_eq!(
            result.comment.as_deref(),
            Some("creatinine and age must be positive; reported as 0")
        );
    }

    #[test]
    fn test_shr() {
        let n = normalize(&labs());
        // eAG = 28.7 × 6 − 46.7 = 125.5
        assert!((calculate_shr(&n) - 140.0 / 125.5).abs() < 1e-12);
    }

    #[test]
    fn test_shr_guard_for_low_hba1c() {
        let mut p = labs();
        p.hba1c = 1.5;
        let n = normalize(&p);
        assert_eq!(calculate_shr(&n), 0.0);
        let result = evaluate(ScoreKind::Shr, &n, &ScoreOptions::default());
        assert_eq!(result.band, "Not computed");
        assert_eq!(result.severity, bands::Severity::None);
        assert!(result.comment.unwrap().starts_with("HbA1c too low"));
    }

    #[test]
    fn test_shr_eag_just_above_zero_overflows_to_sentinel() {
        let mut p = labs();
        p.glucose = 1e308;
        p.hba1c = 1.6272;
        let n = normalize(&p);
        assert_eq!(calculate_shr(&n), 0.0);
        assert_eq!(
            try_calculate(ScoreKind::Shr, &n, &ScoreOptions::default()),
            Err("result out of range".to_string())
        );
        let result = evaluate(ScoreKind::Shr, &n, &ScoreOptions::default());
        assert_eq!(result.value, 0.0);
        assert_eq!(result.band, "Not computed");
    }

    #[test]
    fn test_sii_overflow_is_not_computed() {
        let mut p = labs();
        p.neutrophils = 1e200;
        p.platelets = 1e200;
        p.lymphocytes = 1.0;
        let n = normalize(&p);
        assert_eq!(calculate_sii(&n), 0.0);
        let result = evaluate(ScoreKind::Sii, &n, &ScoreOptions::default());
        assert_eq!(result.value, 0.0);
        assert_eq!(result.band, "Not computed");
        assert_eq!(result.severity, bands::Severity::None);
        assert_eq!(result.comment.as_deref(), Some("result out of range; reported as 0"));
    }

    #[test]
    fn test_calculate_matches_try_calculate_when_computable() {
        let n = normalize(&labs());
        let options = ScoreOptions::default();
        for kind in ScoreKind::ALL {
            let raw = try_calculate(kind, &n, &options).unwrap();
            assert_eq!(calculate(kind, &n, &options), raw, "{}", kind.id());
        }
    }

    #[test]
    fn test_uar_uses_albumin_in_g_dl() {
        let mut p = labs();
        p.units.urea_unit = crate::units::UreaUnit::MillimolesPerLiter;
        let n = normalize(&p);
        assert!((calculate_uar(&n) - 5.0 / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_globulin_ratio_uses_derived_globulin() {
        let n = normalize(&labs());
        assert!((calculate_globulin_total_protein_ratio(&n) - 3.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_apri_uses_upper_limit() {
        let n = normalize(&labs());
        let apri = calculate_apri(&n, &ScoreOptions::default());
        // (25 / 40) × 100 / 250
        assert!((apri - 0.25).abs() < 1e-12);
        let strict = calculate_apri(
            &n,
            &ScoreOptions {
                ast_upper_limit: 25.0,
            },
        );
        assert!((strict - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_curb65_criteria_comment() {
        let mut p = labs();
        p.age = 70.0;
        p.systolic_bp = 85.0;
        p.respiratory_rate = 18.0;
        let n = normalize(&p);
        let result = evaluate(ScoreKind::Curb65, &n, &ScoreOptions::default());
        assert_eq!(result.value, 2.0);
        assert_eq!(result.band, "Moderate risk");
        assert_eq!(
            result.comment.as_deref(),
            Some("criteria met: SBP < 90, age >= 65")
        );
    }

    #[test]
    fn test_zero_denominator_notes() {
        let n = normalize(&PatientParameters::default());
        let options = ScoreOptions::default();
        for kind in [
            ScoreKind::Sii,
            ScoreKind::Siri,
            ScoreKind::Uar,
            ScoreKind::AltPlateletRatio,
            ScoreKind::GlobulinTotalProteinRatio,
        ] {
            let result = evaluate(kind, &n, &options);
            assert_eq!(result.value, 0.0, "{} should be the sentinel", kind.id());
            assert_eq!(result.band, "Not computed", "{}", kind.id());
            assert_eq!(result.severity, bands::Severity::None, "{}", kind.id());
            assert!(result.comment.is_some(), "{} should explain", kind.id());
        }
    }

    #[test]
    fn test_id_round_trip_and_unknown() {
        for kind in ScoreKind::ALL {
            assert_eq!(ScoreKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(ScoreKind::from_id("NEWS2"), Some(ScoreKind::News2));
        assert!("qsofa".parse::<ScoreKind>().is_err());
    }

    #[test]
    fn test_serde_ids_match_id() {
        for kind in ScoreKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.id()));
        }
    }
}
