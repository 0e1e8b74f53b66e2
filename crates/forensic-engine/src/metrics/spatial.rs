//! Pixel-domain measurements

use super::{reflect_101, sobel};
use image::GrayImage;

fn histogram(gray: &GrayImage) -> [u64; 256] {
    let mut hist = [0u64; 256];
    for &p in gray.as_raw() {
        hist[p as usize] += 1;
    }
    hist
}

/// Population variance of the 4-neighbour Laplacian
pub(super) fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    if w == 0 || h == 0 {
        return 0.0;
    }
    let px = gray.as_raw();
    let at = |x: isize, y: isize| px[reflect_101(y, h) * w + reflect_101(x, w)] as f64;

    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for y in 0..h as isize {
        for x in 0..w as isize {
            let lap = at(x - 1, y) + at(x + 1, y) + at(x, y - 1) + at(x, y + 1) - 4.0 * at(x, y);
            sum += lap;
            sum_sq += lap * lap;
        }
    }
    let n = (w * h) as f64;
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0)
}

pub(super) fn entropy(gray: &GrayImage) -> f64 {
    let total = gray.as_raw().len() as f64;
    if total == 0.0 {
        return 0.0;
    }
    histogram(gray)
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum()
}

pub(super) fn rms_contrast(gray: &GrayImage) -> f64 {
    let px = gray.as_raw();
    if px.is_empty() {
        return 0.0;
    }
    let n = px.len() as f64;
    let mean = px.iter().map(|&p| p as f64).sum::<f64>() / n;
    let var = px.iter().map(|&p| (p as f64 - mean).powi(2)).sum::<f64>() / n;
    var.sqrt()
}

/// Average of the medians of horizontal and vertical absolute differences
pub(super) fn noise_estimate(gray: &GrayImage) -> f64 {
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    if w < 2 || h < 2 {
        return 0.0;
    }
    let px = gray.as_raw();
    let mut horizontal = [0u64; 256];
    let mut vertical = [0u64; 256];

    for y in 0..h {
        for x in 0..w {
            let p = px[y * w + x];
            if x + 1 < w {
                horizontal[p.abs_diff(px[y * w + x + 1]) as usize] += 1;
            }
            if y + 1 < h {
                vertical[p.abs_diff(px[(y + 1) * w + x]) as usize] += 1;
            }
        }
    }

    (histogram_median(&horizontal) + histogram_median(&vertical)) / 2.0
}

/// Median of the values a 256-bin count histogram describes
fn histogram_median(hist: &[u64; 256]) -> f64 {
    let total: u64 = hist.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let nth = |k: u64| -> f64 {
        let mut seen = 0;
        for (value, &count) in hist.iter().enumerate() {
            seen += count;
            if seen > k {
                return value as f64;
            }
        }
        255.0
    };
    if total % 2 == 1 {
        nth(total / 2)
    } else {
        (nth(total / 2 - 1) + nth(total / 2)) / 2.0
    }
}

pub(super) fn gradient_magnitude(gray: &GrayImage) -> f64 {
    let (gx, gy) = sobel(gray);
    if gx.is_empty() {
        return 0.0;
    }
    let total: f64 = gx
        .iter()
        .zip(&gy)
        .map(|(&x, &y)| ((x * x + y * y) as f64).sqrt())
        .sum();
    total / gx.len() as f64
}

/// Mean absolute difference between the image and its 3x3 closing
pub(super) fn halftone_score(gray: &GrayImage) -> f64 {
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    let px = gray.as_raw();
    if px.is_empty() {
        return 0.0;
    }
    let dilated = window_3x3(px, w, h, u8::max);
    let closed = window_3x3(&dilated, w, h, u8::min);

    let total: u64 = px
        .iter()
        .zip(&closed)
        .map(|(&a, &b)| a.abs_diff(b) as u64)
        .sum();
    total as f64 / px.len() as f64
}

/// Separable 3x3 rank filter; out-of-bounds neighbours are ignored
fn window_3x3(px: &[u8], w: usize, h: usize, pick: fn(u8, u8) -> u8) -> Vec<u8> {
    let mut rows = vec![0u8; px.len()];
    for y in 0..h {
        for x in 0..w {
            let mut v = px[y * w + x];
            if x > 0 {
                v = pick(v, px[y * w + x - 1]);
            }
            if x + 1 < w {
                v = pick(v, px[y * w + x + 1]);
            }
            rows[y * w + x] = v;
        }
    }

    let mut out = vec![0u8; px.len()];
    for y in 0..h {
        for x in 0..w {
            let mut v = rows[y * w + x];
            if y > 0 {
                v = pick(v, rows[(y - 1) * w + x]);
            }
            if y + 1 < h {
                v = pick(v, rows[(y + 1) * w + x]);
            }
            out[y * w + x] = v;
        }
    }
    out
}
