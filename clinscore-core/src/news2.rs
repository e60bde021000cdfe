//! National Early Warning Score 2 (NEWS2)
//!
//! Uses the RCP 2017 chart with SpO2 scale 1. Each parameter maps to 0–3
//! points through its own stepwise table; the aggregate is their sum (0–20).
//!
//! Chart bands are written as inclusive integer ranges (e.g. RR 21–24). Here
//! each table stores the lower bound of the next band as an exclusive upper
//! bound, which reproduces the chart for integer inputs and gives fractional
//! inputs the same closed-lower/open-upper treatment as every other table.
//! Temperature is rounded to one decimal first, as charted.

use crate::bands::{self, scan, Band};
use crate::patient::Avpu;
use crate::units::NormalizedParameters;
use serde::{Deserialize, Serialize};

/// `(exclusive upper bound, points)`
type PointTable = &'static [(f64, u8)];

const RESPIRATION: PointTable = &[
    (9.0, 3),
    (12.0, 1),
    (21.0, 0),
    (25.0, 2),
    (f64::INFINITY, 3),
];

const OXYGEN_SATURATION: PointTable = &[(92.0, 3), (94.0, 2), (96.0, 1), (f64::INFINITY, 0)];

const SYSTOLIC_BP: PointTable = &[
    (91.0, 3),
    (101.0, 2),
    (111.0, 1),
    (220.0, 0),
    (f64::INFINITY, 3),
];

const PULSE: PointTable = &[
    (41.0, 3),
    (51.0, 1),
    (91.0, 0),
    (111.0, 1),
    (131.0, 2),
    (f64::INFINITY, 3),
];

const TEMPERATURE: PointTable = &[
    (35.1, 3),
    (36.1, 1),
    (38.1, 0),
    (39.1, 1),
    (f64::INFINITY, 2),
];

const SUPPLEMENTAL_OXYGEN_POINTS: u8 = 2;
const CONSCIOUSNESS_POINTS: u8 = 3;

fn points(table: PointTable, value: f64) -> u8 {
    scan(table, value, |entry| entry.0).map_or(0, |entry| entry.1)
}

/// Per-parameter NEWS2 points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct News2Breakdown {
    pub respiration: u8,
    pub oxygen_saturation: u8,
    pub supplemental_oxygen: u8,
    pub temperature: u8,
    pub systolic_bp: u8,
    pub heart_rate: u8,
    pub consciousness: u8,
}

impl News2Breakdown {
    pub fn total(&self) -> u8 {
        self.components().iter().map(|(_, p)| p).sum()
    }

    /// Highest single-parameter score
    pub fn max_single(&self) -> u8 {
        self.components()
            .iter()
            .map(|(_, p)| *p)
            .max()
            .unwrap_or(0)
    }

    pub fn components(&self) -> [(&'static str, u8); 7] {
        [
            ("RR", self.respiration),
            ("SpO2", self.oxygen_saturation),
            ("O2", self.supplemental_oxygen),
            ("Temp", self.temperature),
            ("SBP", self.systolic_bp),
            ("HR", self.heart_rate),
            ("ACVPU", self.consciousness),
        ]
    }

    /// Compact summary, e.g. `"RR 0, SpO2 1, O2 0, ..."`
    pub fn summary(&self) -> String {
        self.components()
            .iter()
            .map(|(name, p)| format!("{} {}", name, p))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Round to one decimal place, as temperatures are charted
fn charted_temperature(celsius: f64) -> f64 {
    (celsius * 10.0).round() / 10.0
}

pub fn calculate_breakdown(p: &NormalizedParameters) -> News2Breakdown {
    let alert = p.avpu == Avpu::Alert && !p.new_confusion;
    News2Breakdown {
        respiration: points(RESPIRATION, p.respiratory_rate),
        oxygen_saturation: points(OXYGEN_SATURATION, p.spo2),
        supplemental_oxygen: if p.oxygen_therapy {
            SUPPLEMENTAL_OXYGEN_POINTS
        } else {
            0
        },
        temperature: points(TEMPERATURE, charted_temperature(p.temperature_c)),
        systolic_bp: points(SYSTOLIC_BP, p.systolic_bp),
        heart_rate: points(PULSE, p.heart_rate),
        consciousness: if alert { 0 } else { CONSCIOUSNESS_POINTS },
    }
}

/// Aggregate NEWS2 score (0–20)
pub fn calculate_news2(p: &NormalizedParameters) -> f64 {
    f64::from(calculate_breakdown(p).total())
}

/// Clinical band for a breakdown
///
/// A single parameter at 3 escalates an otherwise low aggregate to
/// low-medium.
pub fn assign_band(breakdown: &News2Breakdown) -> &'static Band {
    let total = f64::from(breakdown.total());
    let band = bands::NEWS2.interpret(total);
    if breakdown.max_single() >= 3 && total < bands::NEWS2_LOW_MEDIUM.below {
        &bands::NEWS2_LOW_MEDIUM
    } else {
        band
    }
}
