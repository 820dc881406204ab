use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DatasetResult;

/// One bounding box in YOLO label format.
///
/// Line shape: `class_id x_center y_center width height`, all coordinates
/// normalized to `[0, 1]` relative to the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxAnnotation {
    pub class_id: u32,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

impl BoxAnnotation {
    /// Strictly parse one label line. Returns a human-readable reason on
    /// rejection, for assembly into validation reports.
    pub fn parse(line: &str) -> Result<Self, String> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 5 {
            return Err(format!("expected 5 values, got {}", tokens.len()));
        }

        let class_id: u32 = tokens[0]
            .parse()
            .map_err(|_| format!("invalid class id: {}", tokens[0]))?;

        let mut coords = [0.0f64; 4];
        for (slot, (name, token)) in coords.iter_mut().zip(
            ["x_center", "y_center", "width", "height"]
                .iter()
                .zip(&tokens[1..]),
        ) {
            let value: f64 = token
                .parse()
                .map_err(|_| format!("{name} is not a number: {token}"))?;
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} out of range [0, 1]: {value}"));
            }
            *slot = value;
        }

        Ok(Self {
            class_id,
            x_center: coords[0],
            y_center: coords[1],
            width: coords[2],
            height: coords[3],
        })
    }

    /// Smaller of the two box sides, in normalized units.
    #[must_use]
    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }

    /// Whether any box edge hugs the image border closer than `margin`.
    #[must_use]
    pub fn touches_edge(&self, margin: f64) -> bool {
        self.x_center - self.width / 2.0 < margin
            || self.x_center + self.width / 2.0 > 1.0 - margin
            || self.y_center - self.height / 2.0 < margin
            || self.y_center + self.height / 2.0 > 1.0 - margin
    }
}

/// Lenient per-file tally used for dataset statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTally {
    /// Every non-empty line counts as one annotation.
    pub annotations: u64,
    /// Class ids of the lines whose leading token parsed; lines with an
    /// unparseable class still count toward `annotations`.
    pub class_ids: Vec<u32>,
}

/// Tally one label file's content leniently: totals must stay robust to a
/// stray malformed line, so parse failures are tolerated here and surfaced
/// by the strict validator instead.
#[must_use]
pub fn tally_label_content(content: &str) -> LabelTally {
    let mut tally = LabelTally::default();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        tally.annotations += 1;
        if let Some(token) = line.split_whitespace().next() {
            if let Ok(class_id) = token.parse::<u32>() {
                tally.class_ids.push(class_id);
            }
        }
    }
    tally
}

/// Read and tally one label file from disk.
pub fn tally_label_file(path: &Path) -> DatasetResult<LabelTally> {
    let content = std::fs::read_to_string(path)?;
    Ok(tally_label_content(&content))
}
