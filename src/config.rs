use crate::error::CloudError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Placement bounds for a layout. Labels must lie inside
/// `[margin, width - margin] x [margin, height - margin]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 600.0,
            margin: 15.0,
        }
    }
}

impl Canvas {
    pub fn new(width: f32, height: f32, margin: f32) -> Result<Self, CloudError> {
        let canvas = Self {
            width,
            height,
            margin,
        };
        if canvas.is_valid() {
            Ok(canvas)
        } else {
            Err(CloudError::InvalidCanvas {
                width,
                height,
                margin,
            })
        }
    }

    /// A canvas is usable when its inner area (after margins) is non-empty.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite()
            && self.height.is_finite()
            && self.margin.is_finite()
            && self.margin >= 0.0
            && self.width > self.margin * 2.0
            && self.height > self.margin * 2.0
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }

    pub fn inner_width(&self) -> f32 {
        self.width - self.margin * 2.0
    }

    pub fn inner_height(&self) -> f32 {
        self.height - self.margin * 2.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizingConfig {
    pub min_font_size: f32,
    pub max_font_size: f32,
    /// Exponent below 1 stretches small values upward so size contrast
    /// concentrates at the high end.
    pub size_exponent: f32,
    pub reduced_size_factor: f32,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            min_font_size: 10.0,
            max_font_size: 80.0,
            size_exponent: 0.7,
            reduced_size_factor: 0.7,
        }
    }
}

/// Multipliers for the glyph-free text box estimate. `collision_padding`
/// assumes these overestimate rendered text; retune it when changing them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    pub char_width_factor: f32,
    pub char_height_factor: f32,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            char_width_factor: 0.58,
            char_height_factor: 0.98,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementConfig {
    pub max_words: usize,
    pub grid_size: f32,
    pub collision_padding: f32,
    pub spiral_attempts: usize,
    pub spiral_radius_step: f32,
    pub spiral_angle_step: f32,
    pub spiral_spread: f32,
    pub spiral_jitter: f32,
    pub random_attempts: usize,
    pub reduced_attempts: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            max_words: 150,
            grid_size: 50.0,
            collision_padding: 2.0,
            spiral_attempts: 800,
            spiral_radius_step: 1.2,
            spiral_angle_step: 0.15,
            spiral_spread: 0.3,
            spiral_jitter: 0.1,
            random_attempts: 500,
            reduced_attempts: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaxConfig {
    pub max_iterations: usize,
    pub damping: f32,
    pub convergence_threshold: f32,
    /// Number of relax + validate rounds.
    pub passes: usize,
    /// Share of a repulsion absorbed by the smaller label of a pair.
    pub small_label_share: f32,
}

impl Default for RelaxConfig {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            damping: 0.8,
            convergence_threshold: 0.1,
            passes: 2,
            small_label_share: 0.7,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloudConfig {
    pub canvas: Canvas,
    pub sizing: SizingConfig,
    pub text: TextConfig,
    pub placement: PlacementConfig,
    pub relax: RelaxConfig,
}

impl CloudConfig {
    pub fn with_canvas(mut self, canvas: Canvas) -> Self {
        self.canvas = canvas;
        self
    }

    pub fn validate(&self) -> Result<(), CloudError> {
        if !self.canvas.is_valid() {
            return Err(CloudError::InvalidCanvas {
                width: self.canvas.width,
                height: self.canvas.height,
                margin: self.canvas.margin,
            });
        }
        let sizing = &self.sizing;
        if !(sizing.min_font_size > 0.0 && sizing.max_font_size >= sizing.min_font_size) {
            return Err(CloudError::InvalidFontRange {
                min: sizing.min_font_size,
                max: sizing.max_font_size,
            });
        }
        let padding = self.placement.collision_padding;
        if !(padding.is_finite() && padding >= 0.0) {
            return Err(CloudError::InvalidPadding { padding });
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    width: Option<NumberOrString>,
    height: Option<NumberOrString>,
    margin: Option<NumberOrString>,
    min_font_size: Option<NumberOrString>,
    max_font_size: Option<NumberOrString>,
    size_exponent: Option<NumberOrString>,
    reduced_size_factor: Option<NumberOrString>,
    char_width_factor: Option<NumberOrString>,
    char_height_factor: Option<NumberOrString>,
    placement: Option<PlacementConfigFile>,
    relax: Option<RelaxConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PlacementConfigFile {
    max_words: Option<usize>,
    grid_size: Option<f32>,
    collision_padding: Option<f32>,
    spiral_attempts: Option<usize>,
    spiral_radius_step: Option<f32>,
    spiral_angle_step: Option<f32>,
    spiral_spread: Option<f32>,
    spiral_jitter: Option<f32>,
    random_attempts: Option<usize>,
    reduced_attempts: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RelaxConfigFile {
    max_iterations: Option<usize>,
    damping: Option<f32>,
    convergence_threshold: Option<f32>,
    passes: Option<usize>,
    small_label_share: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f32),
    String(String),
}

impl NumberOrString {
    fn as_f32(&self) -> Option<f32> {
        match self {
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => val.trim().trim_end_matches("px").parse::<f32>().ok(),
        }
    }
}

fn set_f32(target: &mut f32, value: Option<NumberOrString>) {
    if let Some(v) = value.as_ref().and_then(NumberOrString::as_f32) {
        *target = v;
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<CloudConfig> {
    let Some(path) = path else {
        return Ok(CloudConfig::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse a config document of partial overrides. Strict JSON is tried first,
/// then JSON5 for hand-written files with comments or trailing commas.
pub fn parse_config(contents: &str) -> anyhow::Result<CloudConfig> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents)
            .map_err(|_| anyhow::anyhow!("invalid config file: {json_err}"))?,
    };

    let mut config = CloudConfig::default();
    set_f32(&mut config.canvas.width, parsed.width);
    set_f32(&mut config.canvas.height, parsed.height);
    set_f32(&mut config.canvas.margin, parsed.margin);
    set_f32(&mut config.sizing.min_font_size, parsed.min_font_size);
    set_f32(&mut config.sizing.max_font_size, parsed.max_font_size);
    set_f32(&mut config.sizing.size_exponent, parsed.size_exponent);
    set_f32(
        &mut config.sizing.reduced_size_factor,
        parsed.reduced_size_factor,
    );
    set_f32(&mut config.text.char_width_factor, parsed.char_width_factor);
    set_f32(&mut config.text.char_height_factor, parsed.char_height_factor);

    if let Some(placement) = parsed.placement {
        let target = &mut config.placement;
        if let Some(v) = placement.max_words {
            target.max_words = v;
        }
        if let Some(v) = placement.grid_size {
            target.grid_size = v;
        }
        if let Some(v) = placement.collision_padding {
            target.collision_padding = v;
        }
        if let Some(v) = placement.spiral_attempts {
            target.spiral_attempts = v;
        }
        if let Some(v) = placement.spiral_radius_step {
            target.spiral_radius_step = v;
        }
        if let Some(v) = placement.spiral_angle_step {
            target.spiral_angle_step = v;
        }
        if let Some(v) = placement.spiral_spread {
            target.spiral_spread = v;
        }
        if let Some(v) = placement.spiral_jitter {
            target.spiral_jitter = v;
        }
        if let Some(v) = placement.random_attempts {
            target.random_attempts = v;
        }
        if let Some(v) = placement.reduced_attempts {
            target.reduced_attempts = v;
        }
    }

    if let Some(relax) = parsed.relax {
        let target = &mut config.relax;
        if let Some(v) = relax.max_iterations {
            target.max_iterations = v;
        }
        if let Some(v) = relax.damping {
            target.damping = v;
        }
        if let Some(v) = relax.convergence_threshold {
            target.convergence_threshold = v;
        }
        if let Some(v) = relax.passes {
            target.passes = v;
        }
        if let Some(v) = relax.small_label_share {
            target.small_label_share = v.clamp(0.0, 1.0);
        }
    }

    config.validate()?;
    Ok(config)
}
