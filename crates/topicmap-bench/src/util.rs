use topicmap_core::{
    Cluster, ClusterId, ClusterSnapshot, ComparisonResult, CoreError, EpisodeId, NormalizedPos,
};

/// Deterministic pseudo-random snapshot with `count` clusters spread over the unit square.
pub fn synthetic_snapshot(count: usize) -> Result<ClusterSnapshot, CoreError> {
    let clusters = (0..count)
        .map(|i| {
            // Low-discrepancy positions keep bubbles spread out without a RNG.
            let x = (i as f32 * 0.618_034).fract();
            let y = (i as f32 * 0.414_214).fract();
            let size = ((i * 37) % 120) as i64 + 1;
            Cluster::new(i as i64, format!("Cluster {i}"), NormalizedPos::new(x, y), size)
                .with_keywords(["alpha", "beta", "gamma", "delta", "epsilon"])
        })
        .collect();
    ClusterSnapshot::new(clusters)
}

/// Episode covering every third cluster, notebook covering every second.
pub fn synthetic_comparison(count: usize) -> ComparisonResult {
    let episode: Vec<ClusterId> = (0..count as i64).step_by(3).map(ClusterId).collect();
    let notebook: Vec<ClusterId> = (0..count as i64).step_by(2).map(ClusterId).collect();
    ComparisonResult::from_coverage(EpisodeId::new("bench"), &episode, &notebook)
}
