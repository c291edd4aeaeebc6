//! Colour distance to UV dose mapping
//!
//! Evaluates a profile's piecewise-linear calibration curve and attaches a
//! confidence that is highest for mid-range colour shifts.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::calibration::CalibrationProfile;
use crate::config::ConfidenceConfig;
use crate::constants::confidence::MAX_CONFIDENCE;

/// Coarse exposure bucket derived from colour distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExposureLevel {
    Low,
    Medium,
    High,
    Extreme,
}

impl ExposureLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExposureLevel::Low => "low",
            ExposureLevel::Medium => "medium",
            ExposureLevel::High => "high",
            ExposureLevel::Extreme => "extreme",
        }
    }

    /// Advisory text for a measured dose in this bucket
    pub fn recommendation(&self, dose: f64) -> String {
        match self {
            ExposureLevel::Low => format!(
                "Low UV exposure ({:.1} J/cm²). Normal range for brief sun exposure. No action needed.",
                dose
            ),
            ExposureLevel::Medium => format!(
                "Medium UV exposure ({:.1} J/cm²). Roughly 2-4 hours of summer sun. Regular checks recommended.",
                dose
            ),
            ExposureLevel::High => format!(
                "High UV exposure ({:.1} J/cm²). Take care during long stays outdoors. Additional sun protection required.",
                dose
            ),
            ExposureLevel::Extreme => format!(
                "Extreme UV exposure ({:.1} J/cm²). Immediate sun protection required. Review workplace safety measures.",
                dose
            ),
        }
    }
}

impl fmt::Display for ExposureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dose inferred from a colour shift
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoseEstimate {
    /// Estimated dose in J/cm², non-negative
    pub estimated_dose: f64,
    pub exposure_level: ExposureLevel,
    /// Confidence in percent, [0, 100]
    pub confidence: f64,
}

impl DoseEstimate {
    /// Dose rounded to one decimal, as shown to users
    pub fn rounded_dose(&self) -> f64 {
        (self.estimated_dose * 10.0).round() / 10.0
    }
}

/// Maps colour distance to a dose estimate
#[derive(Debug, Clone, Default)]
pub struct DoseEstimator {
    confidence: ConfidenceConfig,
}

impl DoseEstimator {
    pub fn new(confidence: ConfidenceConfig) -> Self {
        Self { confidence }
    }

    /// Estimate dose, level and confidence for a colour distance.
    ///
    /// Total over all inputs: negative or NaN distances are treated as 0.
    pub fn estimate(&self, color_distance: f64, profile: &CalibrationProfile) -> DoseEstimate {
        let distance = color_distance.max(0.0);
        let segment = profile.segment_for(distance);

        DoseEstimate {
            estimated_dose: segment.dose_at(distance),
            exposure_level: segment.level,
            confidence: self.confidence(distance),
        }
    }

    /// Confidence in percent: lower for tiny and for very large shifts
    pub fn confidence(&self, distance: f64) -> f64 {
        let c = &self.confidence;
        let value = if distance < c.low_shift_below {
            c.low_shift_confidence
        } else if distance < c.high_shift_from {
            c.mid_shift_confidence
        } else {
            c.high_shift_confidence
        };
        value.clamp(0.0, MAX_CONFIDENCE)
    }
}
