/// Basic statistics over a nullable numeric column. Every field is
/// `None` when the column has no non-null values; `std` additionally
/// needs at least two values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumericSummary {
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Two-pass mean / sample standard deviation / min / max, skipping
/// nulls. Sample std uses the n-1 denominator.
pub fn summarize(values: &[Option<f64>]) -> NumericSummary {
    let mut count = 0usize;
    let mut sum = 0.0f64;
    let mut min: Option<f64> = None;
    let mut max: Option<f64> = None;

    for value in values.iter().flatten() {
        count += 1;
        sum += value;
        min = Some(min.map_or(*value, |m| m.min(*value)));
        max = Some(max.map_or(*value, |m| m.max(*value)));
    }

    if count == 0 {
        return NumericSummary::default();
    }

    let mean = sum / count as f64;
    let std = if count < 2 {
        None
    } else {
        let sum_sq: f64 = values
            .iter()
            .flatten()
            .map(|v| (v - mean).powi(2))
            .sum();
        Some((sum_sq / (count - 1) as f64).sqrt())
    };

    NumericSummary {
        mean: Some(mean),
        std,
        min,
        max,
    }
}
