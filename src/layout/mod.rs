mod grid;
mod placement;
mod resolve;
mod scale;
pub(crate) mod types;

pub use grid::SpatialGrid;
pub use placement::{PlacementTier, is_rotated};
pub use scale::{reduced_size, scale_size};
pub use types::*;

use crate::config::CloudConfig;
use crate::text_metrics::TextMeasure;
use crate::words::WordCounts;
use placement::place;
use rand::Rng;
use resolve::resolve;
use serde::Serialize;

/// Counters describing how a layout call went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutStats {
    pub requested: usize,
    pub attempted: usize,
    pub spiral: usize,
    pub random: usize,
    pub reduced: usize,
    pub unplaced: usize,
    pub relax_iterations: usize,
    pub pushed: usize,
    pub dropped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CloudLayout {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub labels: Vec<PlacedLabel>,
    pub stats: LayoutStats,
}

impl CloudLayout {
    fn empty(config: &CloudConfig, requested: usize) -> Self {
        Self {
            width: config.canvas.width,
            height: config.canvas.height,
            margin: config.canvas.margin,
            labels: Vec::new(),
            stats: LayoutStats {
                requested,
                ..LayoutStats::default()
            },
        }
    }
}

/// Lay out a word cloud.
///
/// Words are visited by descending count (input order breaks ties), sized on
/// a power curve, placed through the spiral/random/reduced search tiers and
/// finally relaxed and validated so no two kept labels overlap. Words that
/// cannot be placed are left out.
pub fn compute_layout<R: Rng + ?Sized>(
    words: &WordCounts,
    config: &CloudConfig,
    metrics: &dyn TextMeasure,
    rng: &mut R,
) -> CloudLayout {
    let _span = tracing::debug_span!("word_cloud_layout", words = words.len()).entered();

    debug_assert!(
        config.canvas.is_valid(),
        "invalid canvas {:?}",
        config.canvas
    );
    if !config.canvas.is_valid() {
        tracing::warn!(canvas = ?config.canvas, "invalid canvas, returning empty layout");
        return CloudLayout::empty(config, words.len());
    }
    let Some((min_count, max_count)) = words.min_max() else {
        return CloudLayout::empty(config, 0);
    };

    let mut layout = CloudLayout::empty(config, words.len());
    let stats = &mut layout.stats;
    let mut grid = SpatialGrid::new(
        &config.canvas,
        config.placement.grid_size,
        config.placement.collision_padding,
    );
    let mut placed = Vec::new();

    for (index, entry) in words
        .sorted()
        .iter()
        .take(config.placement.max_words)
        .enumerate()
    {
        stats.attempted += 1;
        let font_size = scale_size(entry.count, min_count, max_count, &config.sizing);
        let placement = place(
            entry,
            font_size,
            index,
            placed.len(),
            &mut grid,
            config,
            metrics,
            rng,
        );
        let Some(placement) = placement else {
            stats.unplaced += 1;
            tracing::trace!(word = %entry.word, font_size, "no room for word");
            continue;
        };
        match placement.tier {
            PlacementTier::Spiral => stats.spiral += 1,
            PlacementTier::Random => stats.random += 1,
            PlacementTier::Reduced => stats.reduced += 1,
        }
        placed.push(placement.label);
    }
    tracing::debug!(
        spiral = stats.spiral,
        random = stats.random,
        reduced = stats.reduced,
        unplaced = stats.unplaced,
        "placement finished"
    );

    let (labels, resolved) = resolve(placed, config, rng);
    stats.relax_iterations = resolved.iterations;
    stats.pushed = resolved.pushed;
    stats.dropped = resolved.dropped;
    tracing::debug!(
        kept = labels.len(),
        iterations = resolved.iterations,
        dropped = resolved.dropped,
        "overlap resolution finished"
    );

    layout.labels = labels;
    layout
}
