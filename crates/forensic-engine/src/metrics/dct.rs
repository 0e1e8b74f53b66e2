//! Block-DCT compression measurement

use image::GrayImage;
use std::f64::consts::PI;

const BLOCK: usize = 8;
const BINS: usize = 50;
const RANGE: (f64, f64) = (-100.0, 100.0);

/// Orthonormal DCT-II basis: `basis[k][n]`
fn basis() -> [[f64; BLOCK]; BLOCK] {
    let mut b = [[0.0; BLOCK]; BLOCK];
    for (k, row) in b.iter_mut().enumerate() {
        let scale = if k == 0 {
            (1.0 / BLOCK as f64).sqrt()
        } else {
            (2.0 / BLOCK as f64).sqrt()
        };
        for (n, v) in row.iter_mut().enumerate() {
            *v = scale * (PI * (2 * n + 1) as f64 * k as f64 / (2 * BLOCK) as f64).cos();
        }
    }
    b
}

fn dct_block(block: &[[f64; BLOCK]; BLOCK], basis: &[[f64; BLOCK]; BLOCK]) -> [[f64; BLOCK]; BLOCK] {
    // Rows, then columns
    let mut rows = [[0.0; BLOCK]; BLOCK];
    for y in 0..BLOCK {
        for k in 0..BLOCK {
            rows[y][k] = (0..BLOCK).map(|n| basis[k][n] * block[y][n]).sum();
        }
    }
    let mut out = [[0.0; BLOCK]; BLOCK];
    for x in 0..BLOCK {
        for k in 0..BLOCK {
            out[k][x] = (0..BLOCK).map(|n| basis[k][n] * rows[n][x]).sum();
        }
    }
    out
}

/// Coefficient-of-variation of the histogram of all 8x8 DCT coefficients.
///
/// Only complete blocks are transformed; coefficients outside
/// `[-100, 100]` are not counted.
pub(super) fn compression_variance(gray: &GrayImage) -> f64 {
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    let px = gray.as_raw();
    let basis = basis();
    let mut hist = [0u64; BINS];
    let bin_width = (RANGE.1 - RANGE.0) / BINS as f64;

    for by in (0..h.saturating_sub(BLOCK - 1)).step_by(BLOCK) {
        for bx in (0..w.saturating_sub(BLOCK - 1)).step_by(BLOCK) {
            let mut block = [[0.0; BLOCK]; BLOCK];
            for (y, row) in block.iter_mut().enumerate() {
                for (x, v) in row.iter_mut().enumerate() {
                    *v = px[(by + y) * w + bx + x] as f64;
                }
            }
            for coeff in dct_block(&block, &basis).iter().flatten() {
                if *coeff < RANGE.0 || *coeff > RANGE.1 {
                    continue;
                }
                let bin = (((coeff - RANGE.0) / bin_width) as usize).min(BINS - 1);
                hist[bin] += 1;
            }
        }
    }

    let mean = hist.iter().sum::<u64>() as f64 / BINS as f64;
    let var = hist
        .iter()
        .map(|&c| (c as f64 - mean).powi(2))
        .sum::<f64>()
        / BINS as f64;
    var.sqrt() / (mean + 1e-8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_constant_block_has_only_dc() {
        let block = [[10.0; BLOCK]; BLOCK];
        let out = dct_block(&block, &basis());
        assert!((out[0][0] - 80.0).abs() < 1e-9);
        let ac: f64 = out.iter().flatten().skip(1).map(|c| c.abs()).sum();
        assert!(ac < 1e-9);
    }

    #[test]
    fn test_flat_image_concentrates_histogram() {
        // DC = 8 * 10 = 80 lands in one bin, every AC coefficient in the zero bin
        let gray = GrayImage::from_pixel(16, 16, Luma([10]));
        let score = compression_variance(&gray);
        assert!(score > 3.0);
    }

    #[test]
    fn test_image_smaller_than_a_block() {
        let gray = GrayImage::from_pixel(7, 7, Luma([10]));
        assert_eq!(compression_variance(&gray), 0.0);
    }
}
