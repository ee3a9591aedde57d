use crate::model::{ForecastSeries, SummaryStats};

/// Reduce an hourly series to min/max/mean in a single pass.
///
/// Ties on min/max resolve to the first occurrence, so the reported
/// timestamps stay stable. The mean is unrounded; rounding belongs to
/// presentation. An empty or misaligned series yields `None` rather than an
/// error: "no stats" is an expected outcome when the service had no hourly
/// block for the requested date.
pub fn summarize(series: &ForecastSeries) -> Option<SummaryStats> {
    let temps = &series.temperatures;
    if temps.is_empty() || series.times.len() != temps.len() {
        return None;
    }

    let mut i_min = 0;
    let mut i_max = 0;
    let mut sum = 0.0;
    for (i, &t) in temps.iter().enumerate() {
        sum += t;
        if t < temps[i_min] {
            i_min = i;
        }
        if t > temps[i_max] {
            i_max = i;
        }
    }

    Some(SummaryStats {
        t_min: temps[i_min],
        t_min_time: series.times[i_min].clone(),
        t_max: temps[i_max],
        t_max_time: series.times[i_max].clone(),
        mean: sum / temps.len() as f64,
        n: temps.len(),
    })
}
