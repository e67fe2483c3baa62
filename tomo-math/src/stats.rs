//! Statistical functions for sample aggregation and histogramming

use thiserror::Error;

/// Errors from statistics on degenerate input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("cannot compute {0} of an empty sample")]
    Empty(&'static str),
    #[error("insufficient data points to compute median: {0} total values, 0 valid (all NaN)")]
    AllNan(usize),
    #[error("histogram needs at least one bin and an increasing range, got {bins} bins over [{min}, {max}]")]
    InvalidHistogram { bins: usize, min: f64, max: f64 },
}

/// Arithmetic mean of a sample.
pub fn mean(values: &[f64]) -> Result<f64, StatsError> {
    if values.is_empty() {
        return Err(StatsError::Empty("mean"));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (normalised by `n`, not `n - 1`).
pub fn std_dev(values: &[f64]) -> Result<f64, StatsError> {
    let mu = mean(values)?;
    let variance = values.iter().map(|x| (x - mu).powi(2)).sum::<f64>() / values.len() as f64;
    Ok(variance.sqrt())
}

/// Calculate median of a slice of f64 values
///
/// NaN values are ignored, infinite values are kept. For even-length data the
/// average of the two middle values is returned.
pub fn median(values: &[f64]) -> Result<f64, StatsError> {
    let mut valid_values: Vec<f64> = values.iter().filter(|v| !v.is_nan()).copied().collect();

    if valid_values.is_empty() {
        return Err(StatsError::AllNan(values.len()));
    }

    valid_values.sort_by(f64::total_cmp);

    let mid = valid_values.len() / 2;
    let median_value = if valid_values.len() % 2 == 0 {
        (valid_values[mid - 1] + valid_values[mid]) / 2.0
    } else {
        valid_values[mid]
    };

    Ok(median_value)
}

/// `n` evenly spaced values over the closed interval `[start, end]`.
///
/// Matches the usual `linspace` convention: `n == 1` yields `[start]` and
/// `n == 0` yields an empty vector.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Histogram of `values` over `[min, max]` with `bins` equal-width bins.
///
/// Values outside the range (and NaN) are ignored; `max` itself falls into
/// the last bin. Returns the bin centres and the counts.
pub fn histogram(
    values: impl IntoIterator<Item = f64>,
    bins: usize,
    range: (f64, f64),
) -> Result<(Vec<f64>, Vec<usize>), StatsError> {
    let (min, max) = range;
    if bins == 0 || min.is_nan() || max.is_nan() || max <= min {
        return Err(StatsError::InvalidHistogram { bins, min, max });
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for value in values {
        if !(min..=max).contains(&value) {
            continue;
        }
        let bin = (((value - min) / width) as usize).min(bins - 1);
        counts[bin] += 1;
    }

    let centres = (0..bins)
        .map(|i| min + width * (i as f64 + 0.5))
        .collect();

    Ok((centres, counts))
}
