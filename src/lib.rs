//! Word cloud layout engine.
//!
//! Packs `word -> count` frequencies onto a bounded canvas: counts become font
//! sizes on a power curve, words are placed largest first by spiral and random
//! search over a spatial hash, and a force-directed pass followed by greedy
//! validation guarantees that no two kept labels overlap.
//!
//! ```rust
//! use wordcloud_layout::{WordCounts, layout_word_cloud};
//!
//! let words: WordCounts = [("weather", 12), ("traffic", 5)].into_iter().collect();
//! let labels = layout_word_cloud(&words, None);
//! assert_eq!(labels.len(), 2);
//! ```

pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod layout_dump;
pub mod text_metrics;
pub mod words;

#[cfg(feature = "cli")]
pub use cli::run;

pub use cache::{CacheKey, WordCountCache};
pub use config::{Canvas, CloudConfig, load_config};
pub use error::CloudError;
pub use layout::{CloudLayout, LayoutStats, PlacedLabel, compute_layout};
pub use text_metrics::{EstimatedMetrics, TextMeasure};
pub use words::{WordCounts, WordFrequency};

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Lay out `words` on `canvas` (1200x600, margin 15 when `None`) with default
/// settings and an entropy-seeded random source.
pub fn layout_word_cloud(words: &WordCounts, canvas: Option<Canvas>) -> Vec<PlacedLabel> {
    let config = CloudConfig::default().with_canvas(canvas.unwrap_or_default());
    let mut rng = StdRng::from_entropy();
    let metrics = EstimatedMetrics::from(&config.text);
    compute_layout(words, &config, &metrics, &mut rng).labels
}

/// Reproducible layout: the same words, config and seed give the same result.
pub fn layout_word_cloud_seeded(words: &WordCounts, config: &CloudConfig, seed: u64) -> CloudLayout {
    let mut rng = StdRng::seed_from_u64(seed);
    let metrics = EstimatedMetrics::from(&config.text);
    compute_layout(words, config, &metrics, &mut rng)
}
