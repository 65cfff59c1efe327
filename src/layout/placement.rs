use super::grid::SpatialGrid;
use super::scale::reduced_size;
use super::types::{LabelBox, PlacedLabel};
use crate::config::{Canvas, CloudConfig};
use crate::text_metrics::{TextBox, TextMeasure, estimate_dimensions};
use crate::words::WordFrequency;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementTier {
    Spiral,
    Random,
    Reduced,
}

#[derive(Debug, Clone)]
pub struct Placement {
    pub label: PlacedLabel,
    pub tier: PlacementTier,
}

/// Fixed rotation pattern: about a third of the labels turn 90 degrees.
pub fn is_rotated(index: usize) -> bool {
    index % 3 == 1 || index % 7 == 0
}

/// Find a collision-free spot for one word and register it in `grid`.
///
/// Tries the center spiral, then uniform sampling, then uniform sampling at a
/// reduced font size. Returns `None` when every tier is exhausted.
#[allow(clippy::too_many_arguments)]
pub fn place<R: Rng + ?Sized>(
    entry: &WordFrequency,
    font_size: f32,
    index: usize,
    placed_count: usize,
    grid: &mut SpatialGrid,
    config: &CloudConfig,
    metrics: &dyn TextMeasure,
    rng: &mut R,
) -> Option<Placement> {
    let canvas = &config.canvas;
    let rotated = is_rotated(index);
    let text = estimate_dimensions(&entry.word, font_size, rotated, metrics);

    let found = spiral_search(&text, grid, config, rng)
        .map(|bbox| (bbox, PlacementTier::Spiral))
        .or_else(|| {
            random_search(&text, grid, canvas, config.placement.random_attempts, rng)
                .map(|bbox| (bbox, PlacementTier::Random))
        });

    let (bbox, font_size, tier) = match found {
        Some((bbox, tier)) => (bbox, font_size, tier),
        None if placed_count < config.placement.max_words => {
            let small_size = reduced_size(font_size, &config.sizing);
            let small = estimate_dimensions(&entry.word, small_size, rotated, metrics);
            let bbox = random_search(&small, grid, canvas, config.placement.reduced_attempts, rng)?;
            (bbox, small_size, PlacementTier::Reduced)
        }
        None => return None,
    };

    grid.insert(bbox);
    Some(Placement {
        label: PlacedLabel {
            word: entry.word.clone(),
            count: entry.count,
            font_size,
            center_x: bbox.center_x,
            center_y: bbox.center_y,
            half_width: bbox.half_width,
            half_height: bbox.half_height,
            rotated,
            reduced: tier == PlacementTier::Reduced,
        },
        tier,
    })
}

fn spiral_search<R: Rng + ?Sized>(
    text: &TextBox,
    grid: &SpatialGrid,
    config: &CloudConfig,
    rng: &mut R,
) -> Option<LabelBox> {
    let canvas = &config.canvas;
    let placement = &config.placement;
    let (center_x, center_y) = canvas.center();
    let probe = LabelBox::new(center_x, center_y, text.half_width, text.half_height);
    if !probe.can_fit(canvas) {
        return None;
    }

    for attempt in 0..placement.spiral_attempts {
        let step = attempt as f32;
        let radius = step.sqrt() * placement.spiral_radius_step;
        let jitter = if placement.spiral_jitter > 0.0 {
            rng.gen_range(-placement.spiral_jitter..=placement.spiral_jitter)
        } else {
            0.0
        };
        let angle = step * placement.spiral_angle_step + jitter;
        let candidate = LabelBox::new(
            center_x + radius * angle.cos() * placement.spiral_spread,
            center_y + radius * angle.sin() * placement.spiral_spread,
            text.half_width,
            text.half_height,
        );
        if !candidate.fits(canvas) {
            continue;
        }
        if !grid.has_collision(&candidate) {
            return Some(candidate);
        }
    }
    None
}

fn random_search<R: Rng + ?Sized>(
    text: &TextBox,
    grid: &SpatialGrid,
    canvas: &Canvas,
    attempts: usize,
    rng: &mut R,
) -> Option<LabelBox> {
    let min_x = canvas.margin + text.half_width;
    let max_x = canvas.width - canvas.margin - text.half_width;
    let min_y = canvas.margin + text.half_height;
    let max_y = canvas.height - canvas.margin - text.half_height;
    if min_x > max_x || min_y > max_y {
        return None;
    }

    for _ in 0..attempts {
        let candidate = LabelBox::new(
            rng.gen_range(min_x..=max_x),
            rng.gen_range(min_y..=max_y),
            text.half_width,
            text.half_height,
        );
        if candidate.fits(canvas) && !grid.has_collision(&candidate) {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_metrics::EstimatedMetrics;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn entry(word: &str, count: u32) -> WordFrequency {
        WordFrequency {
            word: word.to_string(),
            count,
        }
    }

    fn setup() -> (CloudConfig, SpatialGrid, StdRng) {
        let config = CloudConfig::default();
        let grid = SpatialGrid::new(
            &config.canvas,
            config.placement.grid_size,
            config.placement.collision_padding,
        );
        (config, grid, StdRng::seed_from_u64(7))
    }

    #[test]
    fn rotation_pattern() {
        let rotated: Vec<usize> = (0..15).filter(|&i| is_rotated(i)).collect();
        assert_eq!(rotated, vec![0, 1, 4, 7, 10, 13, 14]);
    }

    #[test]
    fn first_word_lands_near_center() {
        let (config, mut grid, mut rng) = setup();
        let metrics = EstimatedMetrics::default();
        let placement = place(
            &entry("headline", 10),
            40.0,
            2,
            0,
            &mut grid,
            &config,
            &metrics,
            &mut rng,
        )
        .unwrap();
        assert_eq!(placement.tier, PlacementTier::Spiral);
        assert!((placement.label.center_x - 600.0).abs() < 1.0);
        assert!((placement.label.center_y - 300.0).abs() < 1.0);
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn crowded_center_falls_back_to_random_search() {
        let (config, mut grid, mut rng) = setup();
        let metrics = EstimatedMetrics::default();
        grid.insert(LabelBox::new(600.0, 300.0, 100.0, 60.0));
        let placement = place(
            &entry("aside", 3),
            20.0,
            2,
            1,
            &mut grid,
            &config,
            &metrics,
            &mut rng,
        )
        .unwrap();
        assert_eq!(placement.tier, PlacementTier::Random);
        assert!(placement.label.bbox().fits(&config.canvas));
        assert!(!placement.label.bbox().overlaps(&LabelBox::new(600.0, 300.0, 100.0, 60.0), 2.0));
    }

    #[test]
    fn oversized_word_is_shrunk() {
        let (mut config, mut grid, mut rng) = setup();
        config.canvas = Canvas::new(400.0, 200.0, 10.0).unwrap();
        let metrics = EstimatedMetrics::default();
        // 10 chars * 80 * 0.58 = 464 wide: too wide until reduced to 56px.
        let placement = place(
            &entry("broadcasts", 9),
            80.0,
            2,
            0,
            &mut grid,
            &config,
            &metrics,
            &mut rng,
        )
        .unwrap();
        assert_eq!(placement.tier, PlacementTier::Reduced);
        assert!(placement.label.reduced);
        assert!((placement.label.font_size - 56.0).abs() < 1e-4);
        assert!(placement.label.bbox().fits(&config.canvas));
    }

    #[test]
    fn full_canvas_returns_none() {
        let (config, mut grid, mut rng) = setup();
        let metrics = EstimatedMetrics::default();
        grid.insert(LabelBox::new(600.0, 300.0, 600.0, 300.0));
        let placement = place(
            &entry("nowhere", 1),
            10.0,
            2,
            1,
            &mut grid,
            &config,
            &metrics,
            &mut rng,
        );
        assert!(placement.is_none());
        assert_eq!(grid.len(), 1);
    }
}
