use crate::series::{Metric, SampleSeries};

/// Headroom added above autoscaled axes.
const AXIS_MARGIN: f64 = 1.05;

/// Percentile with linear interpolation between closest ranks.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

fn autoscale_top(max: f64) -> f64 {
    if max > 0.0 {
        max * AXIS_MARGIN
    } else {
        1.0
    }
}

/// Y extents of one sample's four axes.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackLimits {
    /// Upper-row primary axis; depth is capped here.
    pub depth_top: f64,
    /// Bottom of the inverted soft-clip axis, absent when nothing was clipped.
    pub soft_floor: Option<f64>,
    /// Lower-row discordant axis.
    pub lower_top: f64,
    pub insert_bottom: f64,
    pub insert_top: f64,
}

impl TrackLimits {
    pub fn for_series(series: &SampleSeries) -> Self {
        let p99 = percentile(series.values(Metric::Depth), 99.0);
        let depth_top = if p99 > 0.0 { p99 } else { 1.0 };

        let max_soft = series.max_of(Metric::Softs);
        let soft_floor = if max_soft > 0.0 {
            Some((-depth_top).max(-2.0 * max_soft))
        } else {
            None
        };

        let lower_top =
            autoscale_top(series.max_of(Metric::Discordant).max(series.max_of(Metric::DiscChrom)));

        let insert_top =
            autoscale_top(series.max_of(Metric::Inserts1).max(series.max_of(Metric::Inserts2)));
        let insert_min = series
            .values(Metric::Inserts1)
            .iter()
            .chain(series.values(Metric::Inserts2))
            .cloned()
            .fold(0.0, f64::min);

        Self {
            depth_top,
            soft_floor,
            lower_top,
            insert_bottom: insert_min * AXIS_MARGIN,
            insert_top,
        }
    }
}

/// Give every sample the widest extent seen for each axis group so stacked
/// tracks share a scale.
pub fn unify_limits(limits: &mut [TrackLimits]) {
    let depth_top = limits.iter().map(|l| l.depth_top).fold(f64::MIN, f64::max);
    let lower_top = limits.iter().map(|l| l.lower_top).fold(f64::MIN, f64::max);
    let insert_top = limits.iter().map(|l| l.insert_top).fold(f64::MIN, f64::max);
    let insert_bottom = limits.iter().map(|l| l.insert_bottom).fold(0.0, f64::min);
    let soft_floor = limits
        .iter()
        .filter_map(|l| l.soft_floor)
        .fold(0.0, f64::min);

    for l in limits.iter_mut() {
        l.depth_top = depth_top;
        l.lower_top = lower_top;
        l.insert_top = insert_top;
        l.insert_bottom = insert_bottom;
        if l.soft_floor.is_some() {
            l.soft_floor = Some(soft_floor);
        }
    }
}

/// Tick label in megabases: `1500000 -> "1.5M"`, `2000000 -> "2M"`.
pub fn format_megabases(x: f64) -> String {
    let mut v = format!("{:.3}", x / 1_000_000.0);
    while v.contains('.') && (v.ends_with('0') || v.ends_with('.')) {
        v.pop();
    }
    v + "M"
}

/// Vertices of a step line where `ys[i]` holds over `(xs[i-1], xs[i]]`.
pub fn step_points(xs: &[u32], ys: &[f64]) -> Vec<(u32, f64)> {
    let mut points = Vec::with_capacity(xs.len() * 2);
    for (i, (&x, &y)) in xs.iter().zip(ys).enumerate() {
        if i > 0 {
            points.push((xs[i - 1], y));
        }
        points.push((x, y));
    }
    points
}

/// Pair positions with values, capping at `top`.
pub fn clipped_points(xs: &[u32], ys: &[f64], top: f64) -> Vec<(u32, f64)> {
    xs.iter().zip(ys).map(|(&x, &y)| (x, y.min(top))).collect()
}
