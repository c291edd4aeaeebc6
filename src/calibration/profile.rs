//! Per-strip-type calibration: baseline colour and dose curve

use serde::{Deserialize, Serialize};

use crate::constants::calibration::{STANDARD_BASELINE_RGB, STANDARD_PROFILE};
use crate::dose::ExposureLevel;
use crate::error::{AnalysisError, Result};

/// One linear piece of a calibration curve, valid from `from_distance`
/// up to the next segment's start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseSegment {
    /// Colour distance at which this segment starts (inclusive)
    pub from_distance: f64,
    /// Exposure bucket for distances in this segment
    pub level: ExposureLevel,
    /// Dose at `from_distance` in J/cm²
    pub base_dose: f64,
    /// Dose increase per unit of colour distance
    pub slope: f64,
    /// Upper bound on the increase above `base_dose`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_increment: Option<f64>,
}

impl DoseSegment {
    pub fn new(from_distance: f64, level: ExposureLevel, base_dose: f64, slope: f64) -> Self {
        Self {
            from_distance,
            level,
            base_dose,
            slope,
            max_increment: None,
        }
    }

    pub fn with_max_increment(mut self, max_increment: f64) -> Self {
        self.max_increment = Some(max_increment);
        self
    }

    /// `max(0, base + min(cap, slope × (distance − start)))`
    pub fn dose_at(&self, distance: f64) -> f64 {
        let increment = self.slope * (distance - self.from_distance);
        let increment = match self.max_increment {
            Some(cap) => increment.min(cap),
            None => increment,
        };
        (self.base_dose + increment).max(0.0)
    }
}

/// Calibration of one strip type.
///
/// Immutable once built; construction validates that the curve is
/// monotonically non-decreasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProfileRecord", into = "ProfileRecord")]
pub struct CalibrationProfile {
    name: String,
    baseline_rgb: [u8; 3],
    segments: Vec<DoseSegment>,
}

/// Serialized form of a profile, validated on conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProfileRecord {
    name: String,
    baseline_rgb: [u8; 3],
    segments: Vec<DoseSegment>,
}

impl TryFrom<ProfileRecord> for CalibrationProfile {
    type Error = AnalysisError;

    fn try_from(record: ProfileRecord) -> Result<Self> {
        CalibrationProfile::new(record.name, record.baseline_rgb, record.segments)
    }
}

impl From<CalibrationProfile> for ProfileRecord {
    fn from(profile: CalibrationProfile) -> Self {
        Self {
            name: profile.name,
            baseline_rgb: profile.baseline_rgb,
            segments: profile.segments,
        }
    }
}

impl CalibrationProfile {
    /// Build a profile from its segments, ordered by `from_distance`
    ///
    /// # Errors
    ///
    /// `AnalysisError::InvalidParameter` if the segments are empty, do not
    /// start at distance 0, are out of order, have negative slopes or caps,
    /// or would make the dose drop at a segment boundary.
    pub fn new(
        name: impl Into<String>,
        baseline_rgb: [u8; 3],
        segments: Vec<DoseSegment>,
    ) -> Result<Self> {
        let profile = Self {
            name: name.into(),
            baseline_rgb,
            segments,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Built-in profile for standard UV strips.
    ///
    /// | distance | level | dose |
    /// |---|---|---|
    /// | [0, 25) | low | `2.0 × d` |
    /// | [25, 50) | medium | `50 + 4.0 × (d − 25)` |
    /// | [50, 80) | high | `150 + 5.0 × (d − 50)` |
    /// | [80, ∞) | extreme | `300 + min(200, 2.5 × (d − 80))` |
    pub fn standard() -> Self {
        Self {
            name: STANDARD_PROFILE.to_string(),
            baseline_rgb: STANDARD_BASELINE_RGB,
            segments: vec![
                DoseSegment::new(0.0, ExposureLevel::Low, 0.0, 2.0),
                DoseSegment::new(25.0, ExposureLevel::Medium, 50.0, 4.0),
                DoseSegment::new(50.0, ExposureLevel::High, 150.0, 5.0),
                DoseSegment::new(80.0, ExposureLevel::Extreme, 300.0, 2.5)
                    .with_max_increment(200.0),
            ],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Colour of an unexposed strip
    pub fn baseline_rgb(&self) -> [u8; 3] {
        self.baseline_rgb
    }

    pub fn segments(&self) -> &[DoseSegment] {
        &self.segments
    }

    /// Segment covering `distance`: the last one starting at or before it
    pub fn segment_for(&self, distance: f64) -> &DoseSegment {
        let index = self
            .segments
            .iter()
            .rposition(|s| distance >= s.from_distance)
            .unwrap_or(0);
        &self.segments[index]
    }

    fn validate(&self) -> Result<()> {
        let first = self
            .segments
            .first()
            .ok_or_else(|| AnalysisError::invalid_parameter("segments", "[]"))?;
        if first.from_distance != 0.0 {
            return Err(AnalysisError::invalid_parameter(
                "segments[0].from_distance",
                first.from_distance,
            ));
        }

        for (i, segment) in self.segments.iter().enumerate() {
            let finite = segment.from_distance.is_finite()
                && segment.base_dose.is_finite()
                && segment.slope.is_finite();
            if !finite || segment.base_dose < 0.0 || segment.slope < 0.0 {
                return Err(AnalysisError::invalid_parameter(
                    format!("segments[{}]", i),
                    format!("{:?}", segment),
                ));
            }
            if let Some(cap) = segment.max_increment {
                if !(cap >= 0.0) {
                    return Err(AnalysisError::invalid_parameter(
                        format!("segments[{}].max_increment", i),
                        cap,
                    ));
                }
            }

            if i == 0 {
                continue;
            }
            let prev = &self.segments[i - 1];
            if segment.from_distance <= prev.from_distance {
                return Err(AnalysisError::invalid_parameter(
                    format!("segments[{}].from_distance", i),
                    segment.from_distance,
                ));
            }
            let reached = prev.dose_at(segment.from_distance);
            if segment.base_dose + 1e-9 < reached {
                return Err(AnalysisError::invalid_parameter(
                    format!("segments[{}].base_dose", i),
                    format!("{} (previous segment reaches {})", segment.base_dose, reached),
                ));
            }
        }
        Ok(())
    }
}
