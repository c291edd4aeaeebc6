//! Candidate scoring
//!
//! Two scores per candidate:
//! - `rect_score`: how rectangular the contour is (fill ratio of its
//!   bounding box plus a near-quadrilateral corner count)
//! - `total_score`: weighted preference for rectangular, moderately sized,
//!   elongated candidates near the image centre
//!
//! Rectangularity feeds into the total score and is therefore counted
//! twice. The selection weights are applied as configured, with no
//! correction for that overlap.

use imageproc::point::Point;

use super::candidates::RegionCandidate;
use super::geometry::{perimeter, polygon_area, simplify_closed, PixelBounds};
use crate::config::ScoringConfig;

/// Multi-factor candidate scorer
#[derive(Debug, Clone)]
pub struct CandidateScorer {
    config: ScoringConfig,
}

impl Default for CandidateScorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl CandidateScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Fill in `rect_score` and `total_score` for a candidate found in a
    /// `width × height` image
    pub fn score(&self, candidate: &mut RegionCandidate, width: u32, height: u32) {
        candidate.rect_score = self.rect_score(&candidate.contour, &candidate.bbox);
        candidate.total_score = self.total_score(candidate, width, height);
    }

    /// Rectangularity of a contour within its bounding box, in [0, 1]
    pub fn rect_score(&self, contour: &[Point<i32>], bbox: &PixelBounds) -> f64 {
        let bbox_area = bbox.area() as f64;
        if bbox_area == 0.0 {
            return 0.0;
        }
        let fill_ratio = polygon_area(contour) / bbox_area;

        let epsilon = self.config.poly_epsilon_factor * perimeter(contour);
        let corners = if epsilon > 0.0 {
            simplify_closed(contour, epsilon).len()
        } else {
            contour.len()
        };
        let corner_score = self.corner_score(corners);

        (fill_ratio * self.config.contour_fill_weight + corner_score * self.config.corner_weight)
            .clamp(0.0, 1.0)
    }

    /// `max(0, 1 - penalty × |N - target|)`
    pub fn corner_score(&self, corners: usize) -> f64 {
        let off = corners.abs_diff(self.config.target_corners) as f64;
        (1.0 - self.config.corner_penalty * off).max(0.0)
    }

    /// Weighted selection score in [0, 1]; expects `rect_score` to be set
    pub fn total_score(&self, candidate: &RegionCandidate, width: u32, height: u32) -> f64 {
        let area_score = (candidate.area_percent / self.config.area_norm_percent).min(1.0);
        let aspect_score = (candidate.aspect_ratio / self.config.aspect_norm).min(1.0);
        let position = position_score(&candidate.bbox, width, height);

        let total = candidate.rect_score * self.config.rect_weight
            + area_score * self.config.area_weight
            + aspect_score * self.config.aspect_weight
            + position * self.config.position_weight;
        total.clamp(0.0, 1.0)
    }
}

/// `1 - d / d_max` for the distance `d` of the box centre from the image
/// centre, where `d_max` is the centre-to-corner distance
pub fn position_score(bbox: &PixelBounds, width: u32, height: u32) -> f64 {
    let (img_cx, img_cy) = (width as f64 / 2.0, height as f64 / 2.0);
    let max_distance = img_cx.hypot(img_cy);
    if max_distance == 0.0 {
        return 0.0;
    }
    let (cx, cy) = bbox.center();
    let distance = (cx - img_cx).hypot(cy - img_cy);
    (1.0 - distance / max_distance).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn rect_contour(x: i32, y: i32, w: i32, h: i32) -> Vec<Point<i32>> {
        let mut pts = Vec::new();
        for i in x..x + w {
            pts.push(Point::new(i, y));
        }
        for j in y + 1..y + h {
            pts.push(Point::new(x + w - 1, j));
        }
        for i in (x..x + w - 1).rev() {
            pts.push(Point::new(i, y + h - 1));
        }
        for j in (y + 1..y + h - 1).rev() {
            pts.push(Point::new(x, j));
        }
        pts
    }

    fn candidate(bbox: PixelBounds, image_w: u32, image_h: u32) -> RegionCandidate {
        let area = bbox.area();
        RegionCandidate {
            bbox,
            area,
            area_percent: area as f64 / (image_w as f64 * image_h as f64) * 100.0,
            aspect_ratio: bbox.aspect_ratio(),
            rect_score: 0.0,
            total_score: 0.0,
            contour: rect_contour(
                bbox.x as i32,
                bbox.y as i32,
                bbox.width as i32,
                bbox.height as i32,
            ),
        }
    }

    #[test]
    fn test_corner_score() {
        let scorer = CandidateScorer::default();
        assert_relative_eq!(scorer.corner_score(4), 1.0);
        assert_relative_eq!(scorer.corner_score(3), 0.9);
        assert_relative_eq!(scorer.corner_score(6), 0.8);
        assert_relative_eq!(scorer.corner_score(40), 0.0);
    }

    #[test]
    fn test_rect_score_of_rectangle_outline() {
        let scorer = CandidateScorer::default();
        let contour = rect_contour(10, 10, 120, 30);
        let bbox = PixelBounds::new(10, 10, 120, 30);

        // Fill ratio (119 * 29) / (120 * 30), four corners.
        let expected = 0.7 * (119.0 * 29.0) / 3600.0 + 0.3;
        assert_relative_eq!(scorer.rect_score(&contour, &bbox), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_rect_score_of_triangle_is_lower() {
        let scorer = CandidateScorer::default();
        let triangle = vec![Point::new(0, 0), Point::new(99, 0), Point::new(0, 29)];
        let bbox = PixelBounds::new(0, 0, 100, 30);
        let rect = rect_contour(0, 0, 100, 30);

        assert!(scorer.rect_score(&triangle, &bbox) < scorer.rect_score(&rect, &bbox));
    }

    #[test]
    fn test_rect_score_degenerate_inputs() {
        let scorer = CandidateScorer::default();
        assert_eq!(scorer.rect_score(&[], &PixelBounds::new(0, 0, 0, 10)), 0.0);
        let single = [Point::new(4, 4)];
        let s = scorer.rect_score(&single, &PixelBounds::new(4, 4, 1, 1));
        assert!((0.0..=1.0).contains(&s));
    }

    #[test]
    fn test_position_score() {
        assert_relative_eq!(
            position_score(&PixelBounds::new(450, 350, 100, 100), 1000, 800),
            1.0
        );
        // Box centred on a corner scores zero.
        assert_relative_eq!(
            position_score(&PixelBounds::new(0, 0, 0, 0), 1000, 800),
            0.0
        );
    }

    #[test]
    fn test_centered_candidate_wins_tie() {
        let scorer = CandidateScorer::default();
        let mut centered = candidate(PixelBounds::new(362, 344, 300, 80), 1024, 768);
        let mut off_center = candidate(PixelBounds::new(20, 20, 300, 80), 1024, 768);

        scorer.score(&mut centered, 1024, 768);
        scorer.score(&mut off_center, 1024, 768);

        assert_relative_eq!(centered.rect_score, off_center.rect_score, epsilon = 1e-12);
        assert!(centered.total_score > off_center.total_score);
    }

    #[test]
    fn test_total_score_weights() {
        let scorer = CandidateScorer::default();
        let mut c = candidate(PixelBounds::new(362, 344, 300, 80), 1024, 768);
        c.rect_score = 1.0;

        let area_score = (c.area_percent / 20.0).min(1.0);
        let aspect_score = (3.75f64 / 4.0).min(1.0);
        let pos = position_score(&c.bbox, 1024, 768);
        let expected = 0.4 + 0.3 * area_score + 0.2 * aspect_score + 0.1 * pos;

        assert_relative_eq!(scorer.total_score(&c, 1024, 768), expected, epsilon = 1e-12);
    }

    proptest! {
        #[test]
        fn prop_scores_within_unit_interval(
            x in 0u32..900, y in 0u32..700, w in 2u32..300, h in 2u32..300
        ) {
            let scorer = CandidateScorer::default();
            let bbox = PixelBounds::new(x, y, w, h);
            let mut c = candidate(bbox, 1200, 1000);
            scorer.score(&mut c, 1200, 1000);

            prop_assert!((0.0..=1.0).contains(&c.rect_score));
            prop_assert!((0.0..=1.0).contains(&c.total_score));
        }
    }
}
