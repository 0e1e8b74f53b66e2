//! Raster image measurements
//!
//! [`MetricExtractor`] exposes one operation per image-processing primitive
//! the scoring engine consumes. [`NativeMetrics`] implements them directly
//! over 8-bit grayscale buffers.

mod dct;
mod edges;
mod spatial;
mod spectral;

use crate::scoring::ImageMeasurement;
use image::GrayImage;

/// Capability interface over the image-processing primitives
pub trait MetricExtractor: Send + Sync {
    /// Variance of the Laplacian response (focus / sharpness)
    fn laplacian_variance(&self, gray: &GrayImage) -> f64;

    /// Shannon entropy of the intensity histogram, in bits
    fn entropy(&self, gray: &GrayImage) -> f64;

    /// Standard deviation of intensities
    fn rms_contrast(&self, gray: &GrayImage) -> f64;

    fn noise_estimate(&self, gray: &GrayImage) -> f64;

    /// Mean Sobel gradient magnitude
    fn gradient_magnitude(&self, gray: &GrayImage) -> f64;

    fn high_frequency_energy(&self, gray: &GrayImage) -> f64;

    fn halftone_score(&self, gray: &GrayImage) -> f64;

    fn edge_irregularity(&self, gray: &GrayImage) -> f64;

    fn compression_variance(&self, gray: &GrayImage) -> f64;

    fn grid_density(&self, gray: &GrayImage) -> f64;

    /// Run every primitive and collect the results
    fn measure(&self, gray: &GrayImage) -> ImageMeasurement {
        ImageMeasurement {
            sharpness: self.laplacian_variance(gray),
            entropy: self.entropy(gray),
            contrast: self.rms_contrast(gray),
            noise: self.noise_estimate(gray),
            gradient: self.gradient_magnitude(gray),
            high_frequency: self.high_frequency_energy(gray),
            halftone: self.halftone_score(gray),
            edge_irregularity: self.edge_irregularity(gray),
            compression_variance: self.compression_variance(gray),
            grid_density: self.grid_density(gray),
        }
        .sanitized()
    }
}

/// Pure-Rust implementation of every primitive
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeMetrics;

impl MetricExtractor for NativeMetrics {
    fn laplacian_variance(&self, gray: &GrayImage) -> f64 {
        spatial::laplacian_variance(gray)
    }

    fn entropy(&self, gray: &GrayImage) -> f64 {
        spatial::entropy(gray)
    }

    fn rms_contrast(&self, gray: &GrayImage) -> f64 {
        spatial::rms_contrast(gray)
    }

    fn noise_estimate(&self, gray: &GrayImage) -> f64 {
        spatial::noise_estimate(gray)
    }

    fn gradient_magnitude(&self, gray: &GrayImage) -> f64 {
        spatial::gradient_magnitude(gray)
    }

    fn high_frequency_energy(&self, gray: &GrayImage) -> f64 {
        spectral::high_frequency_energy(gray)
    }

    fn halftone_score(&self, gray: &GrayImage) -> f64 {
        spatial::halftone_score(gray)
    }

    fn edge_irregularity(&self, gray: &GrayImage) -> f64 {
        edges::edge_irregularity(gray)
    }

    fn compression_variance(&self, gray: &GrayImage) -> f64 {
        dct::compression_variance(gray)
    }

    fn grid_density(&self, gray: &GrayImage) -> f64 {
        spectral::grid_density(gray)
    }
}

/// Mirror an out-of-range index back into `0..n` without repeating the edge
/// pixel (`-1 -> 1`, `n -> n - 2`)
pub(crate) fn reflect_101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    let mut i = i;
    while i < 0 || i >= n {
        if i < 0 {
            i = -i;
        }
        if i >= n {
            i = 2 * (n - 1) - i;
        }
    }
    i as usize
}

/// 3x3 Sobel derivatives with reflected borders
pub(crate) fn sobel(gray: &GrayImage) -> (Vec<i32>, Vec<i32>) {
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    let px = gray.as_raw();
    let at = |x: isize, y: isize| px[reflect_101(y, h) * w + reflect_101(x, w)] as i32;

    let mut gx = vec![0i32; w * h];
    let mut gy = vec![0i32; w * h];
    for y in 0..h as isize {
        for x in 0..w as isize {
            let i = y as usize * w + x as usize;
            gx[i] = (at(x + 1, y - 1) + 2 * at(x + 1, y) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2 * at(x - 1, y) + at(x - 1, y + 1));
            gy[i] = (at(x - 1, y + 1) + 2 * at(x, y + 1) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2 * at(x, y - 1) + at(x + 1, y - 1));
        }
    }
    (gx, gy)
}

/// One 8-connected region of a binary mask
#[derive(Debug, Clone)]
pub(crate) struct Component {
    pub points: Vec<(i64, i64)>,
    /// Total length of the breadth-first spanning tree links
    /// (1 for axial steps, sqrt(2) for diagonal ones)
    pub link_length: f64,
}

/// Label 8-connected regions of `mask` (row-major, `w * h`)
pub(crate) fn components(mask: &[bool], w: usize, h: usize) -> Vec<Component> {
    let mut seen = vec![false; mask.len()];
    let mut out = Vec::new();
    let mut queue = std::collections::VecDeque::new();

    for start in 0..mask.len() {
        if !mask[start] || seen[start] {
            continue;
        }
        seen[start] = true;
        queue.push_back(start);
        let mut component = Component {
            points: Vec::new(),
            link_length: 0.0,
        };

        while let Some(i) = queue.pop_front() {
            let (x, y) = ((i % w) as i64, (i / w) as i64);
            component.points.push((x, y));
            for dy in -1..=1i64 {
                for dx in -1..=1i64 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let (nx, ny) = (x + dx, y + dy);
                    if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                        continue;
                    }
                    let j = ny as usize * w + nx as usize;
                    if mask[j] && !seen[j] {
                        seen[j] = true;
                        component.link_length += if dx != 0 && dy != 0 {
                            std::f64::consts::SQRT_2
                        } else {
                            1.0
                        };
                        queue.push_back(j);
                    }
                }
            }
        }
        out.push(component);
    }
    out
}
