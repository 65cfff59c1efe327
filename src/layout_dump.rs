use crate::layout::{CloudLayout, LayoutStats, PlacedLabel};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub labels: Vec<LabelDump>,
    pub stats: LayoutStats,
}

/// A placed label plus its position as a fraction of the canvas, which is
/// what an absolutely positioned renderer consumes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelDump {
    #[serde(flatten)]
    pub label: PlacedLabel,
    pub left_percent: f32,
    pub top_percent: f32,
}

impl LayoutDump {
    pub fn from_layout(layout: &CloudLayout) -> Self {
        let labels = layout
            .labels
            .iter()
            .map(|label| LabelDump {
                label: label.clone(),
                left_percent: label.center_x / layout.width * 100.0,
                top_percent: label.center_y / layout.height * 100.0,
            })
            .collect();
        LayoutDump {
            width: layout.width,
            height: layout.height,
            margin: layout.margin,
            labels,
            stats: layout.stats,
        }
    }
}

/// Write the layout as pretty JSON to `path`, or stdout when `path` is `None`.
pub fn write_layout_dump(path: Option<&Path>, layout: &CloudLayout) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout);
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_reports_percent_positions() {
        let layout = CloudLayout {
            width: 1000.0,
            height: 500.0,
            margin: 10.0,
            labels: vec![PlacedLabel {
                word: "signal".into(),
                count: 4,
                font_size: 32.0,
                center_x: 250.0,
                center_y: 400.0,
                half_width: 50.0,
                half_height: 15.0,
                rotated: true,
                reduced: false,
            }],
            stats: LayoutStats::default(),
        };
        let value = serde_json::to_value(LayoutDump::from_layout(&layout)).unwrap();
        let label = &value["labels"][0];
        assert_eq!(label["word"], "signal");
        assert_eq!(label["fontSize"], 32.0);
        assert_eq!(label["rotated"], true);
        assert_eq!(label["leftPercent"], 25.0);
        assert_eq!(label["topPercent"], 80.0);
        assert_eq!(value["stats"]["relaxIterations"], 0);
    }
}
