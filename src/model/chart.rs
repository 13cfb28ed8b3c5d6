//! Donut chart geometry for the income / expense / savings breakdown.

use crate::model::Amount;
use serde::{Deserialize, Serialize};

/// Segments start at twelve o'clock.
const START_ANGLE: f64 = -90.0;
const FULL_CIRCLE: f64 = 360.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub label: String,
    pub value: Amount,
    /// Share of the chart total, 0 to 100.
    pub percent: f64,
    /// Angle in degrees where this arc begins.
    pub start: f64,
    /// Arc length in degrees.
    pub sweep: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonutChart {
    pub total: Amount,
    pub segments: Vec<Segment>,
}

impl DonutChart {
    /// Builds the chart with segments in the order income, expense, savings.
    pub fn new(income: Amount, expense: Amount, savings: Amount) -> Self {
        let total: Amount = [income, expense, savings].iter().sum();
        let mut start = START_ANGLE;
        let segments = [("income", income), ("expense", expense), ("savings", savings)]
            .into_iter()
            .map(|(label, value)| {
                let share = value.ratio_of(total);
                let segment = Segment {
                    label: label.to_string(),
                    value,
                    percent: share * 100.0,
                    start,
                    sweep: share * FULL_CIRCLE,
                };
                start += segment.sweep;
                segment
            })
            .collect();
        Self { total, segments }
    }

    pub fn segment(&self, label: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.label == label)
    }
}
