//! Edge-chain irregularity

use super::{components, sobel, Component};
use image::GrayImage;
use std::collections::VecDeque;

const LOW_THRESHOLD: i32 = 50;
const HIGH_THRESHOLD: i32 = 150;
/// Chains with this many points or fewer do not contribute a ratio
const MIN_CHAIN_POINTS: usize = 10;

/// tan(22.5°) and tan(67.5°) in 15-bit fixed point
const TAN_22_5: i64 = 13573;
const TAN_67_5: i64 = 79109;

/// Canny edge map with L1 gradient magnitude and 50/150 hysteresis
pub(super) fn canny(gray: &GrayImage) -> Vec<bool> {
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    let (gx, gy) = sobel(gray);
    let mag: Vec<i32> = gx.iter().zip(&gy).map(|(x, y)| x.abs() + y.abs()).collect();

    // Non-maximum suppression; border pixels never survive
    let mut strong = Vec::new();
    let mut weak = vec![false; w * h];
    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            let i = y * w + x;
            let m = mag[i];
            if m <= LOW_THRESHOLD {
                continue;
            }
            let ax = gx[i].abs() as i64;
            let ay = (gy[i].abs() as i64) << 15;
            let (before, after) = if ay < ax * TAN_22_5 {
                (i - 1, i + 1)
            } else if ay > ax * TAN_67_5 {
                (i - w, i + w)
            } else if (gx[i] < 0) == (gy[i] < 0) {
                (i - w - 1, i + w + 1)
            } else {
                (i - w + 1, i + w - 1)
            };
            if m > mag[before] && m >= mag[after] {
                weak[i] = true;
                if m > HIGH_THRESHOLD {
                    strong.push(i);
                }
            }
        }
    }

    // Hysteresis: keep weak pixels 8-connected to a strong one
    let mut edges = vec![false; w * h];
    let mut queue: VecDeque<usize> = strong.into_iter().collect();
    for &i in &queue {
        edges[i] = true;
    }
    while let Some(i) = queue.pop_front() {
        let (x, y) = (i % w, i / w);
        for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                let j = ny * w + nx;
                if weak[j] && !edges[j] {
                    edges[j] = true;
                    queue.push_back(j);
                }
            }
        }
    }
    edges
}

/// Mean ratio of chain perimeter to convex-hull perimeter over the edge
/// chains of the image, divided over all chains (short ones included)
pub(super) fn edge_irregularity(gray: &GrayImage) -> f64 {
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    if w < 3 || h < 3 {
        return 0.0;
    }
    let chains = components(&canny(gray), w, h);
    if chains.is_empty() {
        return 0.0;
    }

    let total: f64 = chains
        .iter()
        .filter(|c| c.points.len() > MIN_CHAIN_POINTS)
        .filter_map(perimeter_ratio)
        .sum();
    total / chains.len() as f64
}

/// A traced outline walks a one-pixel chain out and back
fn perimeter_ratio(chain: &Component) -> Option<f64> {
    let hull = hull_perimeter(&convex_hull(&chain.points));
    (hull > 0.0).then(|| 2.0 * chain.link_length / hull)
}

/// Andrew's monotone chain; returns hull vertices counter-clockwise
fn convex_hull(points: &[(i64, i64)]) -> Vec<(i64, i64)> {
    let mut pts = points.to_vec();
    pts.sort_unstable();
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let cross = |o: (i64, i64), a: (i64, i64), b: (i64, i64)| {
        (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
    };

    let mut hull: Vec<(i64, i64)> = Vec::with_capacity(pts.len() * 2);
    for &p in pts.iter() {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

fn hull_perimeter(hull: &[(i64, i64)]) -> f64 {
    match hull.len() {
        0 | 1 => 0.0,
        n => (0..n)
            .map(|i| {
                let (a, b) = (hull[i], hull[(i + 1) % n]);
                (((a.0 - b.0).pow(2) + (a.1 - b.1).pow(2)) as f64).sqrt()
            })
            .sum(),
    }
}
