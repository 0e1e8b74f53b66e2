//! Frequency-domain measurements

use super::components;
use image::GrayImage;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Magnitude of the 2-D DFT with the zero frequency moved to the centre
fn shifted_magnitude(gray: &GrayImage) -> Vec<f64> {
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    let mut data: Vec<Complex<f64>> = gray
        .as_raw()
        .iter()
        .map(|&p| Complex::new(p as f64, 0.0))
        .collect();

    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_forward(w).process(&mut data);

    let mut columns = transpose(&data, w, h);
    planner.plan_fft_forward(h).process(&mut columns);
    let data = transpose(&columns, h, w);

    let mut shifted = vec![0.0; w * h];
    for y in 0..h {
        let sy = (y + h - h / 2) % h;
        for x in 0..w {
            let sx = (x + w - w / 2) % w;
            shifted[y * w + x] = data[sy * w + sx].norm();
        }
    }
    shifted
}

fn transpose(data: &[Complex<f64>], w: usize, h: usize) -> Vec<Complex<f64>> {
    let mut out = vec![Complex::new(0.0, 0.0); w * h];
    for y in 0..h {
        for x in 0..w {
            out[x * h + y] = data[y * w + x];
        }
    }
    out
}

/// Central half of the spectrum along both axes: values plus region shape
fn central_region(spectrum: &[f64], w: usize, h: usize) -> (Vec<f64>, usize, usize) {
    let (y0, y1) = (h / 2 - h / 4, h / 2 + h / 4);
    let (x0, x1) = (w / 2 - w / 4, w / 2 + w / 4);
    let mut region = Vec::with_capacity((y1 - y0) * (x1 - x0));
    for y in y0..y1 {
        region.extend_from_slice(&spectrum[y * w + x0..y * w + x1]);
    }
    (region, x1 - x0, y1 - y0)
}

/// Mean log-magnitude (`20 ln(|F| + 1)`) over the central spectrum band
pub(super) fn high_frequency_energy(gray: &GrayImage) -> f64 {
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    if w < 2 || h < 2 {
        return 0.0;
    }
    let spectrum = shifted_magnitude(gray);
    let (w0, w1) = (w / 4, 3 * w / 4);
    let (h0, h1) = (h / 4, 3 * h / 4);

    let mut total = 0.0;
    let mut count = 0usize;
    for y in h0..h1 {
        for &m in &spectrum[y * w + w0..y * w + w1] {
            total += 20.0 * (m + 1.0).ln();
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Connected spectral peaks above the 95th percentile, per unit area
pub(super) fn grid_density(gray: &GrayImage) -> f64 {
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    if w < 2 || h < 2 {
        return 0.0;
    }
    let spectrum = shifted_magnitude(gray);
    let (region, rw, rh) = central_region(&spectrum, w, h);
    if region.is_empty() {
        return 0.0;
    }

    let threshold = percentile(&region, 95.0);
    let mask: Vec<bool> = region.iter().map(|&v| v > threshold).collect();
    components(&mask, rw, rh).len() as f64 / region.len() as f64
}

/// Percentile with linear interpolation between closest ranks
fn percentile(values: &[f64], pct: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}
