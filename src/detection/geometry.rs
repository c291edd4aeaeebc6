//! Planar geometry on traced contours
//!
//! Bounding boxes, polygon area, and Douglas-Peucker simplification of
//! closed contours. Contours are the `i32` point lists produced by
//! `imageproc::contours::find_contours`.

use imageproc::point::Point;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Axis-aligned pixel rectangle, `[x, x + width) × [y, y + height)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelBounds {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from corner coordinates `(x1, y1)` inclusive to `(x2, y2)` exclusive
    pub fn from_corners(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self {
            x: x1,
            y: y1,
            width: x2.saturating_sub(x1),
            height: y2.saturating_sub(y1),
        }
    }

    /// Exclusive right edge
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// `max(w,h) / min(w,h)`; infinite for an empty box
    pub fn aspect_ratio(&self) -> f64 {
        let long = self.width.max(self.height) as f64;
        let short = self.width.min(self.height) as f64;
        if short == 0.0 {
            f64::INFINITY
        } else {
            long / short
        }
    }

    /// Grow by `(pad_x, pad_y)` on every side, clipped to a `width × height` image
    pub fn expand_clipped(&self, pad_x: u32, pad_y: u32, width: u32, height: u32) -> Self {
        let x1 = self.x.saturating_sub(pad_x);
        let y1 = self.y.saturating_sub(pad_y);
        let x2 = self.right().saturating_add(pad_x).min(width);
        let y2 = self.bottom().saturating_add(pad_y).min(height);
        Self::from_corners(x1, y1.min(y2), x2.max(x1), y2)
    }
}

/// Bounding box of a contour, inclusive of its extreme pixels.
///
/// Fails on an empty contour or one with negative coordinates.
pub fn bounding_box(points: &[Point<i32>]) -> Result<PixelBounds> {
    let first = points
        .first()
        .ok_or_else(|| AnalysisError::processing("bounding box of empty contour"))?;

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    if min_x < 0 || min_y < 0 {
        return Err(AnalysisError::processing(format!(
            "contour has negative coordinates ({}, {})",
            min_x, min_y
        )));
    }

    Ok(PixelBounds::new(
        min_x as u32,
        min_y as u32,
        (max_x - min_x + 1) as u32,
        (max_y - min_y + 1) as u32,
    ))
}

/// Area enclosed by a closed polygon (shoelace formula)
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        twice_area += p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
    }
    twice_area.abs() * 0.5
}

/// Perimeter of a closed contour
pub fn perimeter(points: &[Point<i32>]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    imageproc::geometry::arc_length(points, true)
}

/// Simplify a closed contour using the Douglas-Peucker algorithm.
///
/// A closed curve has no natural end points, so it is first split at the
/// vertex farthest from the starting point and each half is simplified as
/// an open polyline. The returned polygon does not repeat its first vertex.
pub fn simplify_closed(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let start = points[0];
    let (far, _) = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, squared_distance(*p, start)))
        .fold((0, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });
    if far == 0 {
        // every point coincides with the start
        return vec![start];
    }

    let mut ring: Vec<Point<i32>> = points.to_vec();
    ring.push(start);

    let first_half = simplify_open(&ring[..=far], epsilon);
    let second_half = simplify_open(&ring[far..], epsilon);

    let mut simplified = first_half;
    simplified.pop();
    simplified.extend(second_half);
    simplified.pop();
    simplified
}

/// Douglas-Peucker on an open polyline; both end points are kept.
///
/// Iterative with an explicit stack so long contours do not recurse deeply.
fn simplify_open(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut stack = vec![(0usize, n - 1)];
    while let Some((start, end)) = stack.pop() {
        if end - start < 2 {
            continue;
        }

        let mut dmax = 0.0;
        let mut index = start;
        for i in start + 1..end {
            let d = perpendicular_distance(points[i], points[start], points[end]);
            if d > dmax {
                index = i;
                dmax = d;
            }
        }

        if dmax > epsilon {
            keep[index] = true;
            stack.push((start, index));
            stack.push((index, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

fn squared_distance(a: Point<i32>, b: Point<i32>) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    dx * dx + dy * dy
}

fn perpendicular_distance(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    let mag = (dx * dx + dy * dy).sqrt();
    if mag < 1e-9 {
        return squared_distance(p, a).sqrt();
    }
    (dy * p.x as f64 - dx * p.y as f64 + b.x as f64 * a.y as f64 - b.y as f64 * a.x as f64).abs()
        / mag
}
