use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wordcloud_layout::layout_dump::LayoutDump;
use wordcloud_layout::{Canvas, CloudConfig, EstimatedMetrics, WordCounts, compute_layout};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WordCloudOptions {
    width: Option<f32>,
    height: Option<f32>,
    margin: Option<f32>,
    seed: Option<u64>,
    max_words: Option<usize>,
    min_font_size: Option<f32>,
    max_font_size: Option<f32>,
}

fn build_config(options: &WordCloudOptions) -> Result<CloudConfig, String> {
    let defaults = Canvas::default();
    let canvas = Canvas::new(
        options.width.unwrap_or(defaults.width),
        options.height.unwrap_or(defaults.height),
        options.margin.unwrap_or(defaults.margin),
    )
    .map_err(|error| error.to_string())?;

    let mut config = CloudConfig::default().with_canvas(canvas);
    if let Some(max_words) = options.max_words {
        config.placement.max_words = max_words;
    }
    if let Some(size) = options.min_font_size {
        config.sizing.min_font_size = size;
    }
    if let Some(size) = options.max_font_size {
        config.sizing.max_font_size = size;
    }
    config.validate().map_err(|error| error.to_string())?;
    Ok(config)
}

fn layout_json(counts_json: &str, options: WordCloudOptions) -> Result<String, String> {
    let config = build_config(&options)?;
    let words = WordCounts::from_json(counts_json).map_err(|error| error.to_string())?;
    // getrandom's `js` feature backs the entropy source on wasm32.
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let metrics = EstimatedMetrics::from(&config.text);
    let layout = compute_layout(&words, &config, &metrics, &mut rng);
    serde_json::to_string(&LayoutDump::from_layout(&layout)).map_err(|error| error.to_string())
}

/// Lay out `counts_json` (`{"word": count}` or `{"word_counts": {...}}`) and
/// return the placed labels as JSON.
#[wasm_bindgen]
pub fn layout_word_cloud_json(
    counts_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<WordCloudOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        WordCloudOptions::default()
    };
    layout_json(counts_json, options).map_err(|error| JsValue::from_str(&error))
}
