// src/processing/time_axis.rs
//! Uniform time axis for a sample sequence

/// `count` evenly spaced times over the closed interval `[0, count / sample_rate]`
///
/// Both endpoints are included, so consecutive samples are
/// `duration / (count - 1)` apart rather than `1 / sample_rate`. A single
/// sample maps to `[0.0]`. Rebuild the axis after every reslice.
pub fn time_axis(count: usize, sample_rate_hz: u32) -> Vec<f64> {
    let duration_s = count as f64 / sample_rate_hz as f64;
    linspace(0.0, duration_s, count)
}

/// `count` evenly spaced values over `[start, stop]`, endpoint included
pub fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            let mut values: Vec<f64> = (0..count).map(|i| start + i as f64 * step).collect();
            values[count - 1] = stop;
            values
        }
    }
}
