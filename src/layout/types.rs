use crate::config::Canvas;
use serde::{Deserialize, Serialize};

/// Slack for float error when a label was clamped flush against a margin.
const BOUNDS_EPS: f32 = 1e-3;

/// Axis-aligned box stored as center and half extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelBox {
    pub center_x: f32,
    pub center_y: f32,
    pub half_width: f32,
    pub half_height: f32,
}

impl LabelBox {
    pub fn new(center_x: f32, center_y: f32, half_width: f32, half_height: f32) -> Self {
        Self {
            center_x,
            center_y,
            half_width,
            half_height,
        }
    }

    pub fn left(&self) -> f32 {
        self.center_x - self.half_width
    }

    pub fn right(&self) -> f32 {
        self.center_x + self.half_width
    }

    pub fn top(&self) -> f32 {
        self.center_y - self.half_height
    }

    pub fn bottom(&self) -> f32 {
        self.center_y + self.half_height
    }

    pub fn inflate(&self, amount: f32) -> Self {
        Self {
            half_width: self.half_width + amount,
            half_height: self.half_height + amount,
            ..*self
        }
    }

    /// Strict rectangle intersection after inflating both boxes by `padding`.
    pub fn overlaps(&self, other: &LabelBox, padding: f32) -> bool {
        let a = self.inflate(padding);
        let b = other.inflate(padding);
        a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
    }

    /// Penetration depth of the padded boxes along the shallower axis, or 0
    /// when they do not intersect.
    pub fn overlap_amount(&self, other: &LabelBox, padding: f32) -> f32 {
        let a = self.inflate(padding);
        let b = other.inflate(padding);
        let overlap_x = a.right().min(b.right()) - a.left().max(b.left());
        let overlap_y = a.bottom().min(b.bottom()) - a.top().max(b.top());
        if overlap_x > 0.0 && overlap_y > 0.0 {
            overlap_x.min(overlap_y)
        } else {
            0.0
        }
    }

    pub fn fits(&self, canvas: &Canvas) -> bool {
        self.left() >= canvas.margin - BOUNDS_EPS
            && self.right() <= canvas.width - canvas.margin + BOUNDS_EPS
            && self.top() >= canvas.margin - BOUNDS_EPS
            && self.bottom() <= canvas.height - canvas.margin + BOUNDS_EPS
    }

    /// Whether a box of this size can sit inside the canvas at all.
    pub fn can_fit(&self, canvas: &Canvas) -> bool {
        self.half_width * 2.0 <= canvas.inner_width()
            && self.half_height * 2.0 <= canvas.inner_height()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedLabel {
    pub word: String,
    pub count: u32,
    pub font_size: f32,
    pub center_x: f32,
    pub center_y: f32,
    pub half_width: f32,
    pub half_height: f32,
    /// Drawn turned 90 degrees; the half extents are already swapped.
    pub rotated: bool,
    /// Placed by the shrunken last-resort search.
    #[serde(default)]
    pub reduced: bool,
}

impl PlacedLabel {
    pub fn bbox(&self) -> LabelBox {
        LabelBox::new(
            self.center_x,
            self.center_y,
            self.half_width,
            self.half_height,
        )
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.center_x += dx;
        self.center_y += dy;
    }

    /// Pull the center back so the whole box lies inside the canvas margins.
    pub fn clamp_to(&mut self, canvas: &Canvas) {
        let min_x = canvas.margin + self.half_width;
        let max_x = canvas.width - canvas.margin - self.half_width;
        let min_y = canvas.margin + self.half_height;
        let max_y = canvas.height - canvas.margin - self.half_height;
        self.center_x = self.center_x.max(min_x).min(max_x);
        self.center_y = self.center_y.max(min_y).min(max_y);
    }
}
