//! Band interpretation
//!
//! Each score owns one ordered table of `(upper bound, label, severity)`
//! entries. All tables are evaluated by `scan`, so boundary semantics are the
//! same everywhere:
//!
//! - Entries are scanned in ascending bound order
//! - An entry matches when `value < upper` (closed lower, open upper)
//! - A value beyond every bound takes the last entry
//!
//! Global invariants enforced:
//! - Lookup always yields a label
//! - Tables are never shared between scores

use serde::{Deserialize, Serialize};

/// Severity rank attached to every band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    None,
    Mild,
    Moderate,
    Severe,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
            Severity::Critical => "critical",
        }
    }
}

/// Which end of a table is clinically worse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherIsWorse,
    LowerIsWorse,
    /// Both tails are abnormal
    Centered,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::HigherIsWorse => "higher is worse",
            Direction::LowerIsWorse => "lower is worse",
            Direction::Centered => "both tails abnormal",
        }
    }
}

/// One entry of a band table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    /// Exclusive upper bound
    pub below: f64,
    pub label: &'static str,
    pub severity: Severity,
}

const fn band(below: f64, label: &'static str, severity: Severity) -> Band {
    Band {
        below,
        label,
        severity,
    }
}

/// Ordered threshold table for one score
#[derive(Debug, Clone, Copy)]
pub struct BandTable {
    pub direction: Direction,
    pub bands: &'static [Band],
}

static UNCLASSIFIED: Band = band(f64::INFINITY, "Unclassified", Severity::None);

/// Find the first entry whose upper bound exceeds `value`
///
/// Falls back to the last entry (open-ended top band), so NaN and values past
/// the final bound land there too.
pub fn scan<T>(entries: &[T], value: f64, upper: impl Fn(&T) -> f64) -> Option<&T> {
    entries
        .iter()
        .find(|entry| value < upper(entry))
        .or_else(|| entries.last())
}

impl BandTable {
    pub fn interpret(&self, value: f64) -> &'static Band {
        scan(self.bands, value, |b| b.below).unwrap_or(&UNCLASSIFIED)
    }

    /// Human-readable range for the entry at `index`, e.g. `"1 – <5"`
    pub fn range_label(&self, index: usize) -> String {
        let lower = if index == 0 {
            None
        } else {
            self.bands.get(index - 1).map(|b| b.below)
        };
        let upper = self.bands.get(index).map(|b| b.below);
        match (lower, upper) {
            (None, Some(u)) if u.is_finite() => format!("< {}", u),
            (Some(l), Some(u)) if u.is_finite() => format!("{} – <{}", l, u),
            (Some(l), _) => format!(">= {}", l),
            _ => "any".to_string(),
        }
    }
}

pub const NEWS2: BandTable = BandTable {
    direction: Direction::HigherIsWorse,
    bands: &[
        band(1.0, "No risk", Severity::None),
        band(5.0, "Low", Severity::Mild),
        band(7.0, "Medium", Severity::Moderate),
        band(f64::INFINITY, "High", Severity::Severe),
    ],
};

/// Applied instead of the table when a single NEWS2 parameter scores 3 and the
/// aggregate is below the medium band
pub static NEWS2_LOW_MEDIUM: Band = band(5.0, "Low-medium", Severity::Moderate);

/// Reported in place of a band when a score could not be computed
pub static NOT_COMPUTED: Band = band(f64::INFINITY, "Not computed", Severity::None);

pub const CURB65: BandTable = BandTable {
    direction: Direction::HigherIsWorse,
    bands: &[
        band(2.0, "Low risk", Severity::None),
        band(3.0, "Moderate risk", Severity::Moderate),
        band(f64::INFINITY, "High risk", Severity::Severe),
    ],
};

pub const PNI: BandTable = BandTable {
    direction: Direction::LowerIsWorse,
    bands: &[
        band(40.0, "Severe malnutrition", Severity::Severe),
        band(45.0, "Moderate malnutrition", Severity::Moderate),
        band(50.0, "Mild malnutrition", Severity::Mild),
        band(f64::INFINITY, "Normal", Severity::None),
    ],
};

pub const SII: BandTable = BandTable {
    direction: Direction::HigherIsWorse,
    bands: &[
        band(500.0, "Low inflammation", Severity::None),
        band(1000.0, "Moderate inflammation", Severity::Moderate),
        band(f64::INFINITY, "High inflammation", Severity::Severe),
    ],
};

pub const SIRI: BandTable = BandTable {
    direction: Direction::HigherIsWorse,
    bands: &[
        band(1.0, "Low inflammation", Severity::None),
        band(2.0, "Moderate inflammation", Severity::Moderate),
        band(f64::INFINITY, "High inflammation", Severity::Severe),
    ],
};

pub const ALBI: BandTable = BandTable {
    direction: Direction::HigherIsWorse,
    bands: &[
        band(-2.60, "Grade 1", Severity::None),
        band(-1.39, "Grade 2", Severity::Moderate),
        band(f64::INFINITY, "Grade 3", Severity::Severe),
    ],
};

pub const EGFR: BandTable = BandTable {
    direction: Direction::LowerIsWorse,
    bands: &[
        band(15.0, "Kidney failure", Severity::Critical),
        band(30.0, "Severe CKD", Severity::Severe),
        band(45.0, "Moderate-severe CKD", Severity::Moderate),
        band(60.0, "Mild-moderate CKD", Severity::Moderate),
        band(90.0, "Mild CKD", Severity::Mild),
        band(f64::INFINITY, "Normal", Severity::None),
    ],
};

pub const UAR: BandTable = BandTable {
    direction: Direction::HigherIsWorse,
    bands: &[
        band(1.5, "Low risk", Severity::None),
        band(3.0, "Moderate risk", Severity::Moderate),
        band(f64::INFINITY, "High risk", Severity::Severe),
    ],
};

pub const SHR: BandTable = BandTable {
    direction: Direction::HigherIsWorse,
    bands: &[
        band(1.0, "No stress hyperglycemia", Severity::None),
        band(1.3, "Mild stress hyperglycemia", Severity::Mild),
        band(f64::INFINITY, "Significant stress hyperglycemia", Severity::Severe),
    ],
};

pub const ALT_PLATELET: BandTable = BandTable {
    direction: Direction::HigherIsWorse,
    bands: &[
        band(0.2, "Normal", Severity::None),
        band(0.5, "Elevated", Severity::Moderate),
        band(f64::INFINITY, "Markedly elevated", Severity::Severe),
    ],
};

pub const GLOBULIN_TOTAL_PROTEIN: BandTable = BandTable {
    direction: Direction::Centered,
    bands: &[
        band(0.35, "Low globulin fraction", Severity::Mild),
        band(0.50, "Normal", Severity::None),
        band(f64::INFINITY, "High globulin fraction", Severity::Moderate),
    ],
};

pub const NLR: BandTable = BandTable {
    direction: Direction::HigherIsWorse,
    bands: &[
        band(3.0, "Normal", Severity::None),
        band(6.0, "Mild inflammatory stress", Severity::Mild),
        band(9.0, "Moderate inflammatory stress", Severity::Moderate),
        band(f64::INFINITY, "Severe inflammatory stress", Severity::Severe),
    ],
};

pub const PLR: BandTable = BandTable {
    direction: Direction::HigherIsWorse,
    bands: &[
        band(150.0, "Normal", Severity::None),
        band(300.0, "Elevated", Severity::Moderate),
        band(f64::INFINITY, "Markedly elevated", Severity::Severe),
    ],
};

pub const DE_RITIS: BandTable = BandTable {
    direction: Direction::HigherIsWorse,
    bands: &[
        band(1.0, "Normal", Severity::None),
        band(2.0, "Elevated", Severity::Mild),
        band(f64::INFINITY, "Markedly elevated", Severity::Moderate),
    ],
};

pub const APRI: BandTable = BandTable {
    direction: Direction::HigherIsWorse,
    bands: &[
        band(0.5, "No significant fibrosis", Severity::None),
        band(1.5, "Indeterminate", Severity::Mild),
        band(2.0, "Significant fibrosis", Severity::Moderate),
        band(f64::INFINITY, "Cirrhosis likely", Severity::Severe),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[&BandTable] = &[
        &NEWS2,
        &CURB65,
        &PNI,
        &SII,
        &SIRI,
        &ALBI,
        &EGFR,
        &UAR,
        &SHR,
        &ALT_PLATELET,
        &GLOBULIN_TOTAL_PROTEIN,
        &NLR,
        &PLR,
        &DE_RITIS,
        &APRI,
    ];

    #[test]
    fn test_tables_are_ascending_and_open_ended() {
        for table in ALL {
            assert!(!table.bands.is_empty());
            for pair in table.bands.windows(2) {
                assert!(pair[0].below < pair[1].below, "bounds must ascend");
            }
            assert_eq!(table.bands[table.bands.len() - 1].below, f64::INFINITY);
        }
    }

    #[test]
    fn test_boundary_is_closed_lower_open_upper() {
        assert_eq!(CURB65.interpret(1.0).label, "Low risk");
        assert_eq!(CURB65.interpret(2.0).label, "Moderate risk");
        assert_eq!(CURB65.interpret(3.0).label, "High risk");
        assert_eq!(EGFR.interpret(89.999).label, "Mild CKD");
        assert_eq!(EGFR.interpret(90.0).label, "Normal");
    }

    #[test]
    fn test_value_beyond_last_bound_takes_last_entry() {
        assert_eq!(SII.interpret(1e12).label, "High inflammation");
        assert_eq!(SII.interpret(f64::INFINITY).label, "High inflammation");
        assert_eq!(SII.interpret(f64::NAN).label, "High inflammation");
    }

    #[test]
    fn test_negative_values_fall_in_first_band() {
        assert_eq!(PNI.interpret(-5.0).label, "Severe malnutrition");
        assert_eq!(ALBI.interpret(-3.0).label, "Grade 1");
    }

    #[test]
    fn test_scan_on_empty_table_is_none() {
        let empty: [(f64, u8); 0] = [];
        assert!(scan(&empty, 1.0, |e| e.0).is_none());
    }

    #[test]
    fn test_monotonic_severity_matches_direction() {
        for table in ALL {
            let severities: Vec<Severity> = table.bands.iter().map(|b| b.severity).collect();
            match table.direction {
                Direction::HigherIsWorse => {
                    assert!(severities.windows(2).all(|w| w[0] <= w[1]))
                }
                Direction::LowerIsWorse => {
                    assert!(severities.windows(2).all(|w| w[0] >= w[1]))
                }
                Direction::Centered => {}
            }
        }
    }

    #[test]
    fn test_range_labels() {
        assert_eq!(CURB65.range_label(0), "< 2");
        assert_eq!(CURB65.range_label(1), "2 – <3");
        assert_eq!(CURB65.range_label(2), ">= 3");
    }
}
