//! Strip localisation
//!
//! Runs candidate extraction and scoring and picks the winning region. A
//! missing strip is expected: when no candidate survives filtering, or
//! contour analysis hits a geometry fault, the locator falls back to a
//! fixed central crop instead of failing the request.

use image::{imageops, RgbImage};
use serde::Serialize;

use super::candidates::{RegionCandidate, RegionCandidateFinder};
use super::geometry::PixelBounds;
use super::scoring::CandidateScorer;
use crate::config::{LocatorConfig, PipelineConfig};
use crate::constants::scoring::REPORT_TOP_CANDIDATES;
use crate::error::{AnalysisError, Result};

/// Final state of a localisation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorState {
    /// A candidate was selected
    Found,
    /// The central fallback crop was used
    FallbackUsed,
}

/// Why the fallback crop was used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    NoCandidates,
    ProcessingFault,
}

/// How the analysed region was chosen
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DetectionOutcome {
    Found {
        /// Selection score of the winner
        total_score: f64,
        /// Candidates that passed filtering
        candidates: usize,
        /// Unpadded bounding box of the winner
        candidate_bounds: PixelBounds,
    },
    Fallback { reason: FallbackReason },
}

/// Region selected for colour analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StripLocation {
    /// Pixel bounds within the searched image, padding included
    pub bounds: PixelBounds,
    pub outcome: DetectionOutcome,
}

impl StripLocation {
    pub fn state(&self) -> LocatorState {
        match self.outcome {
            DetectionOutcome::Found { .. } => LocatorState::Found,
            DetectionOutcome::Fallback { .. } => LocatorState::FallbackUsed,
        }
    }

    /// Copy the located region out of the searched image
    ///
    /// # Errors
    ///
    /// `AnalysisError::DegenerateRegion` if the region holds no pixels.
    pub fn crop(&self, image: &RgbImage) -> Result<RgbImage> {
        let (width, height) = image.dimensions();
        let clipped = PixelBounds::from_corners(
            self.bounds.x.min(width),
            self.bounds.y.min(height),
            self.bounds.right().min(width),
            self.bounds.bottom().min(height),
        );
        if clipped.is_empty() {
            return Err(AnalysisError::DegenerateRegion {
                width: clipped.width,
                height: clipped.height,
            });
        }
        Ok(imageops::crop_imm(image, clipped.x, clipped.y, clipped.width, clipped.height).to_image())
    }
}

/// Candidate summary for debugging detection on a given photo
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionReport {
    pub image_width: u32,
    pub image_height: u32,
    pub candidates_found: usize,
    pub best: Option<RegionCandidate>,
    /// First candidates in discovery order, scored
    pub top_candidates: Vec<RegionCandidate>,
}

/// Orchestrates candidate finding and scoring
#[derive(Debug, Clone)]
pub struct StripLocator {
    finder: RegionCandidateFinder,
    scorer: CandidateScorer,
    config: LocatorConfig,
}

impl Default for StripLocator {
    fn default() -> Self {
        Self::from_validated(&PipelineConfig::default())
    }
}

impl StripLocator {
    /// # Errors
    ///
    /// `AnalysisError::InvalidParameter` if `config` fails
    /// [`PipelineConfig::validate`].
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    pub(crate) fn from_validated(config: &PipelineConfig) -> Self {
        Self {
            finder: RegionCandidateFinder::from_validated(config.detection.clone()),
            scorer: CandidateScorer::new(config.scoring.clone()),
            config: config.locator.clone(),
        }
    }

    /// Locate the strip in a preprocessed image
    ///
    /// Detection misses never surface as errors; they yield the fallback
    /// region.
    ///
    /// # Errors
    ///
    /// `AnalysisError::DegenerateRegion` if the resulting region is empty,
    /// which only happens for an image without pixels.
    pub fn locate(&self, image: &RgbImage) -> Result<StripLocation> {
        let (width, height) = image.dimensions();
        self.resolve(self.search(image), width, height)
    }

    /// Turn a search outcome into a location, absorbing recoverable faults
    fn resolve(
        &self,
        search: Result<(Option<RegionCandidate>, usize)>,
        width: u32,
        height: u32,
    ) -> Result<StripLocation> {
        let location = match search {
            Ok((Some(best), count)) => {
                tracing::info!(
                    score = best.total_score,
                    area_percent = best.area_percent,
                    aspect_ratio = best.aspect_ratio,
                    candidates = count,
                    "strip located"
                );
                StripLocation {
                    bounds: self.padded(&best.bbox, width, height),
                    outcome: DetectionOutcome::Found {
                        total_score: best.total_score,
                        candidates: count,
                        candidate_bounds: best.bbox,
                    },
                }
            }
            Ok((None, _)) => {
                tracing::warn!("no strip candidate found, using fallback region");
                Self::fallback(width, height, FallbackReason::NoCandidates)
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!(error = %e, "strip detection failed, using fallback region");
                Self::fallback(width, height, FallbackReason::ProcessingFault)
            }
            Err(e) => return Err(e),
        };

        if location.bounds.is_empty() {
            return Err(AnalysisError::DegenerateRegion {
                width: location.bounds.width,
                height: location.bounds.height,
            });
        }
        Ok(location)
    }

    /// Score every candidate and report the winner without cropping
    pub fn inspect(&self, image: &RgbImage) -> Result<DetectionReport> {
        let (width, height) = image.dimensions();
        let mut candidates = self.finder.find(image)?;
        let best = self.select_best(&mut candidates, width, height);

        Ok(DetectionReport {
            image_width: width,
            image_height: height,
            candidates_found: candidates.len(),
            best,
            top_candidates: candidates.into_iter().take(REPORT_TOP_CANDIDATES).collect(),
        })
    }

    fn search(&self, image: &RgbImage) -> Result<(Option<RegionCandidate>, usize)> {
        let (width, height) = image.dimensions();
        let mut candidates = self.finder.find(image)?;
        let best = self.select_best(&mut candidates, width, height);
        Ok((best, candidates.len()))
    }

    /// Score all candidates and return the highest total score.
    ///
    /// Ties go to the candidate found first.
    pub fn select_best(
        &self,
        candidates: &mut [RegionCandidate],
        width: u32,
        height: u32,
    ) -> Option<RegionCandidate> {
        let mut best: Option<&RegionCandidate> = None;
        for candidate in candidates.iter_mut() {
            self.scorer.score(candidate, width, height);
            tracing::debug!(
                bbox = ?candidate.bbox,
                rect_score = candidate.rect_score,
                total_score = candidate.total_score,
                "scored candidate"
            );
        }
        for candidate in candidates.iter() {
            match best {
                Some(b) if candidate.total_score <= b.total_score => {}
                _ => best = Some(candidate),
            }
        }
        best.cloned()
    }

    /// Candidate box grown by the configured padding, clipped to the image
    fn padded(&self, bbox: &PixelBounds, width: u32, height: u32) -> PixelBounds {
        let pad_x = ((bbox.width as f64 * self.config.padding_fraction) as u32)
            .max(self.config.min_padding);
        let pad_y = ((bbox.height as f64 * self.config.padding_fraction) as u32)
            .max(self.config.min_padding);
        bbox.expand_clipped(pad_x, pad_y, width, height)
    }

    fn fallback(width: u32, height: u32, reason: FallbackReason) -> StripLocation {
        StripLocation {
            bounds: fallback_bounds(width, height),
            outcome: DetectionOutcome::Fallback { reason },
        }
    }
}

/// Horizontal middle half and vertical middle third of the image.
///
/// Each span is at least one pixel wide for non-empty images.
pub fn fallback_bounds(width: u32, height: u32) -> PixelBounds {
    let x1 = width / 4;
    let x2 = ((width as u64 * 3 / 4) as u32).max(x1 + 1).min(width);
    let y1 = height / 3;
    let y2 = ((height as u64 * 2 / 3) as u32).max(y1 + 1).min(height);
    PixelBounds::from_corners(x1, y1, x2, y2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use imageproc::point::Point;

    fn scene(width: u32, height: u32, rects: &[(u32, u32, u32, u32)]) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            let inside = rects
                .iter()
                .any(|&(rx, ry, rw, rh)| x >= rx && x < rx + rw && y >= ry && y < ry + rh);
            if inside {
                Rgb([140, 100, 80])
            } else {
                Rgb([250, 245, 240])
            }
        })
    }

    fn bare_candidate(bbox: PixelBounds) -> RegionCandidate {
        RegionCandidate {
            bbox,
            area: bbox.area(),
            area_percent: 5.0,
            aspect_ratio: bbox.aspect_ratio(),
            rect_score: 0.0,
            total_score: 0.0,
            contour: vec![
                Point::new(bbox.x as i32, bbox.y as i32),
                Point::new(bbox.right() as i32 - 1, bbox.y as i32),
                Point::new(bbox.right() as i32 - 1, bbox.bottom() as i32 - 1),
                Point::new(bbox.x as i32, bbox.bottom() as i32 - 1),
            ],
        }
    }

    #[test]
    fn test_fallback_bounds_exact() {
        assert_eq!(fallback_bounds(1024, 768), PixelBounds::from_corners(256, 256, 768, 512));
        assert_eq!(fallback_bounds(101, 50), PixelBounds::from_corners(25, 16, 75, 33));
    }

    #[test]
    fn test_fallback_bounds_tiny_images_non_empty() {
        for (w, h) in [(1, 1), (2, 1), (1, 2), (3, 2)] {
            let b = fallback_bounds(w, h);
            assert!(!b.is_empty(), "{}x{} -> {:?}", w, h, b);
            assert!(b.right() <= w && b.bottom() <= h);
        }
        assert!(fallback_bounds(0, 10).is_empty());
    }

    #[test]
    fn test_flat_image_uses_fallback() {
        let img = RgbImage::from_pixel(400, 300, Rgb([250, 245, 240]));
        let location = StripLocator::default().locate(&img).unwrap();

        assert_eq!(location.state(), LocatorState::FallbackUsed);
        assert_eq!(
            location.outcome,
            DetectionOutcome::Fallback {
                reason: FallbackReason::NoCandidates
            }
        );
        assert_eq!(location.bounds, PixelBounds::from_corners(100, 100, 300, 200));
    }

    #[test]
    fn test_strip_found_with_padding() {
        let img = scene(640, 480, &[(220, 210, 200, 60)]);
        let location = StripLocator::default().locate(&img).unwrap();

        assert_eq!(location.state(), LocatorState::Found);
        let b = location.bounds;
        // 5% of 200 = 10 px horizontally, 5 px minimum vertically
        assert!((b.x as i64 - 210).abs() <= 3, "{:?}", b);
        assert!((b.y as i64 - 205).abs() <= 3, "{:?}", b);
        assert!((b.right() as i64 - 430).abs() <= 3, "{:?}", b);
        assert!((b.bottom() as i64 - 275).abs() <= 3, "{:?}", b);
    }

    #[test]
    fn test_processing_fault_uses_fallback() {
        let locator = StripLocator::default();
        let location = locator
            .resolve(Err(AnalysisError::processing("degenerate contour")), 640, 480)
            .unwrap();

        assert_eq!(location.state(), LocatorState::FallbackUsed);
        assert_eq!(
            location.outcome,
            DetectionOutcome::Fallback {
                reason: FallbackReason::ProcessingFault
            }
        );
        assert_eq!(location.bounds, fallback_bounds(640, 480));
        assert_eq!(location.bounds, PixelBounds::from_corners(160, 160, 480, 320));
    }

    #[test]
    fn test_fatal_search_error_propagates() {
        let locator = StripLocator::default();
        let err = locator
            .resolve(
                Err(AnalysisError::DegenerateRegion { width: 0, height: 3 }),
                640,
                480,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::DegenerateRegion { width: 0, height: 3 }
        ));
    }

    #[test]
    fn test_new_validates_config() {
        let mut config = PipelineConfig::default();
        config.detection.canny_low = 200.0;
        assert!(matches!(
            StripLocator::new(&config),
            Err(AnalysisError::InvalidParameter { .. })
        ));
        assert!(StripLocator::new(&PipelineConfig::default()).is_ok());
    }

    #[test]
    fn test_padding_clipped_at_border() {
        let locator = StripLocator::default();
        let padded = locator.padded(&PixelBounds::new(2, 3, 200, 40), 204, 45);
        assert_eq!(padded, PixelBounds::from_corners(0, 0, 204, 45));

        let padded = locator.padded(&PixelBounds::new(100, 100, 300, 80), 1000, 1000);
        assert_eq!(padded, PixelBounds::from_corners(85, 95, 415, 185));
    }

    #[test]
    fn test_select_best_prefers_centered() {
        let locator = StripLocator::default();
        let mut candidates = vec![
            bare_candidate(PixelBounds::new(10, 10, 200, 50)),
            bare_candidate(PixelBounds::new(412, 359, 200, 50)),
        ];
        let best = locator.select_best(&mut candidates, 1024, 768).unwrap();
        assert_eq!(best.bbox, PixelBounds::new(412, 359, 200, 50));
        assert!(candidates.iter().all(|c| c.total_score > 0.0));
    }

    #[test]
    fn test_select_best_tie_keeps_first() {
        let locator = StripLocator::default();
        // Mirror images about the centre score identically.
        let mut candidates = vec![
            bare_candidate(PixelBounds::new(100, 359, 200, 50)),
            bare_candidate(PixelBounds::new(724, 359, 200, 50)),
        ];
        let best = locator.select_best(&mut candidates, 1024, 768).unwrap();
        assert_eq!(candidates[0].total_score, candidates[1].total_score);
        assert_eq!(best.bbox.x, 100);
    }

    #[test]
    fn test_select_best_empty() {
        assert!(StripLocator::default()
            .select_best(&mut [], 100, 100)
            .is_none());
    }

    #[test]
    fn test_crop_matches_bounds() {
        let img = scene(64, 48, &[]);
        let location = StripLocation {
            bounds: PixelBounds::new(10, 5, 20, 8),
            outcome: DetectionOutcome::Fallback {
                reason: FallbackReason::NoCandidates,
            },
        };
        let crop = location.crop(&img).unwrap();
        assert_eq!(crop.dimensions(), (20, 8));
    }

    #[test]
    fn test_crop_outside_image_is_degenerate() {
        let img = scene(64, 48, &[]);
        let location = StripLocation {
            bounds: PixelBounds::new(70, 5, 20, 8),
            outcome: DetectionOutcome::Fallback {
                reason: FallbackReason::NoCandidates,
            },
        };
        assert!(matches!(
            location.crop(&img),
            Err(AnalysisError::DegenerateRegion { .. })
        ));
    }

    #[test]
    fn test_inspect_reports_candidates() {
        let img = scene(640, 480, &[(60, 60, 180, 45), (300, 250, 200, 50)]);
        let report = StripLocator::default().inspect(&img).unwrap();

        assert_eq!(report.candidates_found, 2);
        assert_eq!(report.top_candidates.len(), 2);
        let best = report.best.unwrap();
        assert!(report
            .top_candidates
            .iter()
            .all(|c| c.total_score <= best.total_score));
    }
}
