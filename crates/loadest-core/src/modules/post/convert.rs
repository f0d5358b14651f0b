//! Unit conversion for the parsed estimates. LOADEST reports flow in cubic
//! feet per second and loads on a per-day basis; concentrations come out in
//! milligrams per liter. A zero or non-finite flow yields a non-finite
//! concentration which is kept, not dropped, so the gap stays visible
//! downstream.

use super::parser::EstimateRow;

pub const CUBIC_FEET_PER_CUBIC_METER: f64 = 35.315;
pub const SECONDS_PER_DAY: f64 = 86_400.0;
/// Milligrams per liter equals grams per cubic meter times this factor.
const MG_PER_L_PER_UNIT: f64 = 1_000.0;

/// Load estimators LOADEST reports for every estimation point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Estimator {
    Amle,
    Mle,
    Ladm,
}

impl Estimator {
    pub const ALL: [Estimator; 3] = [Self::Amle, Self::Mle, Self::Ladm];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Amle => "amle",
            Self::Mle => "mle",
            Self::Ladm => "ladm",
        }
    }
}

/// An estimate row with its derived volumetric flow and per-estimator
/// concentrations.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEstimate {
    pub date: String,
    pub time: String,
    pub flow_cfs: f64,
    pub flow_m3_per_day: f64,
    pub amle_mg_per_l: f64,
    pub mle_mg_per_l: f64,
    pub ladm_mg_per_l: f64,
}

impl ParsedEstimate {
    pub fn concentration(&self, estimator: Estimator) -> f64 {
        match estimator {
            Estimator::Amle => self.amle_mg_per_l,
            Estimator::Mle => self.mle_mg_per_l,
            Estimator::Ladm => self.ladm_mg_per_l,
        }
    }
}

pub fn flow_cubic_meters_per_day(flow_cfs: f64) -> f64 {
    flow_cfs / CUBIC_FEET_PER_CUBIC_METER * SECONDS_PER_DAY
}

pub fn concentration_mg_per_liter(load_per_day: f64, flow_cfs: f64) -> f64 {
    load_per_day / flow_cubic_meters_per_day(flow_cfs) * MG_PER_L_PER_UNIT
}

pub fn convert_estimates(rows: Vec<EstimateRow>) -> Vec<ParsedEstimate> {
    rows.into_iter()
        .map(|row| ParsedEstimate {
            flow_m3_per_day: flow_cubic_meters_per_day(row.flow),
            amle_mg_per_l: concentration_mg_per_liter(row.amle, row.flow),
            mle_mg_per_l: concentration_mg_per_liter(row.mle, row.flow),
            ladm_mg_per_l: concentration_mg_per_liter(row.ladm, row.flow),
            date: row.date,
            time: row.time,
            flow_cfs: row.flow,
        })
        .collect()
}
