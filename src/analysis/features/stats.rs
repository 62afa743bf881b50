// Stats module - summary statistics over per-frame feature tracks
//
// Standard deviations are population deviations (divide by N), matching how
// frame statistics are conventionally summarized for audio descriptors.
// Empty inputs summarize to zero instead of NaN.

use super::types::Summary;

pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values.iter().map(|&v| v as f64).sum();
    (sum / values.len() as f64) as f32
}

pub fn std_dev(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values) as f64;
    let var: f64 = values
        .iter()
        .map(|&v| {
            let d = v as f64 - m;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64;
    var.sqrt() as f32
}

pub fn summarize(values: &[f32]) -> Summary {
    Summary {
        mean: mean(values),
        std: std_dev(values),
    }
}

/// Per-column mean and std over a frames × columns matrix
pub fn column_summaries<const N: usize>(rows: &[[f32; N]]) -> ([f32; N], [f32; N]) {
    let mut means = [0.0; N];
    let mut stds = [0.0; N];
    let mut column = Vec::with_capacity(rows.len());

    for c in 0..N {
        column.clear();
        column.extend(rows.iter().map(|row| row[c]));
        means[c] = mean(&column);
        stds[c] = std_dev(&column);
    }

    (means, stds)
}
