use super::visible::VisibleMetric;

/// Order metrics by `avg_visible_t`, highest first.  The sort is stable, so
/// ties keep their input order.
pub fn rank<'a, I>(metrics: I) -> Vec<&'a VisibleMetric>
where
    I: IntoIterator<Item = &'a VisibleMetric>,
{
    let mut ranked: Vec<&VisibleMetric> = metrics.into_iter().collect();
    ranked.sort_by(|a, b| b.avg_visible_t.total_cmp(&a.avg_visible_t));
    ranked
}

/// Metrics whose `avg_visible_t` reaches `threshold`, in input order.
pub fn feasible<'a, I>(metrics: I, threshold: f64) -> Vec<&'a VisibleMetric>
where
    I: IntoIterator<Item = &'a VisibleMetric>,
{
    metrics
        .into_iter()
        .filter(|m| m.avg_visible_t >= threshold)
        .collect()
}
