//! Band normalization: percentile or fixed-bound contrast stretch with a
//! gamma-0.5 curve, mapping floating-point backscatter onto 0..=255.
use ndarray::{Array2, Zip};
use tracing::debug;

use crate::core::params::NormalizationRange;
use crate::error::Result;

/// Lower percentile used when no explicit range is supplied.
pub const LOW_PERCENTILE: f64 = 3.0;
/// Upper percentile used when no explicit range is supplied.
pub const HIGH_PERCENTILE: f64 = 97.0;

/// `p`-th percentile (0..=100) of sorted values, linearly interpolated between
/// the closest ranks. Returns `None` for an empty slice.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Low/high percentiles over the finite samples of `band`.
/// `None` when the band holds no finite sample at all.
pub fn band_percentile_range(band: &Array2<f64>, low: f64, high: f64) -> Option<(f64, f64)> {
    let mut finite: Vec<f64> = band.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_unstable_by(f64::total_cmp);
    Some((
        percentile_sorted(&finite, low)?,
        percentile_sorted(&finite, high)?,
    ))
}

/// True where the sample is not the NaN no-data sentinel.
pub fn validity_mask(band: &Array2<f64>) -> Array2<bool> {
    band.mapv(|v| !v.is_nan())
}

#[inline]
fn stretch_sample(x: f64, vmin: f64, span: f64) -> u8 {
    let offset = x - vmin;
    let y = if offset < 0.0 {
        0.0
    } else {
        (offset / span).sqrt()
    };
    // NaN (no-data) lands here too
    if y.is_nan() {
        return 0;
    }
    (y.clamp(0.0, 1.0) * 255.0).round_ties_even() as u8
}

/// Map a band onto 0..=255 with `sqrt((x - vmin) / (vmax - vmin))`.
///
/// When `range` is `None`, the bounds are the 3rd and 97th percentiles of the
/// band's finite samples. A band without finite samples normalizes to all
/// zeros; derived bounds that coincide are rejected as degenerate.
pub fn normalize(band: &Array2<f64>, range: Option<NormalizationRange>) -> Result<Array2<u8>> {
    let range = match range {
        Some(r) => r,
        None => match band_percentile_range(band, LOW_PERCENTILE, HIGH_PERCENTILE) {
            Some((vmin, vmax)) => {
                debug!("normalize: derived bounds p3={} p97={}", vmin, vmax);
                NormalizationRange::new(vmin, vmax)?
            }
            None => {
                debug!("normalize: band has no finite samples; output is all zeros");
                return Ok(Array2::zeros(band.dim()));
            }
        },
    };

    let (vmin, span) = (range.vmin(), range.span());
    let mut out = Array2::<u8>::zeros(band.dim());
    Zip::from(&mut out)
        .and(band)
        .par_for_each(|o, &x| *o = stretch_sample(x, vmin, span));
    Ok(out)
}
