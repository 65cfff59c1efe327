// Post-placement cleanup: force-directed relaxation pushes residual overlaps
// apart, then a greedy validation pass guarantees a collision-free result by
// dropping the smaller label of any pair that still touches.

use super::grid::SpatialGrid;
use super::types::PlacedLabel;
use crate::config::{Canvas, CloudConfig};
use rand::Rng;
use std::f32::consts::TAU;

const COINCIDENT_EPS: f32 = 1e-4;

#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveStats {
    pub passes: usize,
    pub iterations: usize,
    pub pushed: usize,
    pub dropped: usize,
}

pub fn resolve<R: Rng + ?Sized>(
    mut labels: Vec<PlacedLabel>,
    config: &CloudConfig,
    rng: &mut R,
) -> (Vec<PlacedLabel>, ResolveStats) {
    let mut stats = ResolveStats::default();
    let mut grid = SpatialGrid::new(
        &config.canvas,
        config.placement.grid_size,
        config.placement.collision_padding,
    );

    for pass in 0..config.relax.passes.max(1) {
        let before = labels.len();
        stats.iterations += relax(&mut labels, &mut grid, config, rng);
        stats.pushed += push_apart(&mut labels, &mut grid, config, rng);
        labels = validate(labels, &mut grid, &config.canvas);
        stats.dropped += before - labels.len();
        stats.passes += 1;
        tracing::trace!(pass, kept = labels.len(), "overlap resolution pass");
    }

    (labels, stats)
}

/// Unit vector from `a` toward `b`, random when the centers coincide.
fn separation<R: Rng + ?Sized>(a: &PlacedLabel, b: &PlacedLabel, rng: &mut R) -> (f32, f32) {
    let dx = b.center_x - a.center_x;
    let dy = b.center_y - a.center_y;
    let dist = dx.hypot(dy);
    if dist < COINCIDENT_EPS {
        let angle = rng.gen_range(0.0..TAU);
        (angle.cos(), angle.sin())
    } else {
        (dx / dist, dy / dist)
    }
}

/// Damped repulsion between overlapping pairs. Returns iterations run.
fn relax<R: Rng + ?Sized>(
    labels: &mut [PlacedLabel],
    grid: &mut SpatialGrid,
    config: &CloudConfig,
    rng: &mut R,
) -> usize {
    let padding = config.placement.collision_padding;
    let relax = &config.relax;
    let small_share = relax.small_label_share.clamp(0.0, 1.0);
    let mut offsets = vec![(0.0f32, 0.0f32); labels.len()];

    for iteration in 0..relax.max_iterations {
        grid.rebuild(labels.iter().map(PlacedLabel::bbox));
        offsets.iter_mut().for_each(|offset| *offset = (0.0, 0.0));
        let mut max_overlap = 0.0f32;

        for i in 0..labels.len() {
            let bbox = labels[i].bbox();
            for j in grid.colliding(&bbox) {
                if j <= i {
                    continue;
                }
                let overlap = bbox.overlap_amount(&labels[j].bbox(), padding);
                if overlap <= 0.0 {
                    continue;
                }
                max_overlap = max_overlap.max(overlap);

                let (ux, uy) = separation(&labels[i], &labels[j], rng);
                let force = (overlap + 2.0 * padding) * relax.damping;
                let (share_i, share_j) = if labels[i].font_size <= labels[j].font_size {
                    (small_share, 1.0 - small_share)
                } else {
                    (1.0 - small_share, small_share)
                };
                offsets[i].0 -= ux * force * share_i;
                offsets[i].1 -= uy * force * share_i;
                offsets[j].0 += ux * force * share_j;
                offsets[j].1 += uy * force * share_j;
            }
        }

        if max_overlap < relax.convergence_threshold {
            return iteration;
        }

        for (label, (dx, dy)) in labels.iter_mut().zip(&offsets) {
            label.translate(*dx, *dy);
            label.clamp_to(&config.canvas);
        }
    }
    relax.max_iterations
}

/// One sweep that shoves the smaller label of every remaining overlap well
/// clear of its neighbour. Returns the number of labels moved.
fn push_apart<R: Rng + ?Sized>(
    labels: &mut [PlacedLabel],
    grid: &mut SpatialGrid,
    config: &CloudConfig,
    rng: &mut R,
) -> usize {
    let padding = config.placement.collision_padding;
    grid.rebuild(labels.iter().map(PlacedLabel::bbox));
    let mut pushed = 0;

    for i in 0..labels.len() {
        let neighbours = grid.query(&labels[i].bbox().inflate(padding * 2.0));
        for j in neighbours {
            if j <= i {
                continue;
            }
            let overlap = labels[i].bbox().overlap_amount(&labels[j].bbox(), padding);
            if overlap <= 0.0 {
                continue;
            }
            let (ux, uy) = separation(&labels[i], &labels[j], rng);
            let distance = 2.0 * overlap + 2.0 * padding;
            if labels[i].font_size <= labels[j].font_size {
                labels[i].translate(-ux * distance, -uy * distance);
                labels[i].clamp_to(&config.canvas);
            } else {
                labels[j].translate(ux * distance, uy * distance);
                labels[j].clamp_to(&config.canvas);
            }
            pushed += 1;
        }
    }
    pushed
}

/// Keep labels largest first, skipping any that touch an already kept label
/// or leave the canvas. Ties keep their current order.
fn validate(labels: Vec<PlacedLabel>, grid: &mut SpatialGrid, canvas: &Canvas) -> Vec<PlacedLabel> {
    let mut ordered = labels;
    ordered.sort_by(|a, b| b.font_size.total_cmp(&a.font_size));

    grid.clear();
    let mut kept = Vec::with_capacity(ordered.len());
    for label in ordered {
        let bbox = label.bbox();
        if !bbox.fits(canvas) || grid.has_collision(&bbox) {
            tracing::trace!(word = %label.word, "dropping colliding label");
            continue;
        }
        grid.insert(bbox);
        kept.push(label);
    }
    kept
}
