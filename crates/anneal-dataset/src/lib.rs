//! Anneal Dataset
//!
//! Dataset-side primitives for the annotation pipeline:
//! - Canonical layouts for annotation exports and split datasets
//! - YOLO label parsing (lenient tallies and strict audits)
//! - Content fingerprinting for change detection
//! - Train/val splitting, sanitizing, and validation reports

pub mod error;
pub mod fingerprint;
pub mod labels;
pub mod layout;
pub mod sanitize;
pub mod split;
pub mod stats;
pub mod validate;

pub use error::{DatasetError, DatasetResult};
pub use fingerprint::{fingerprint_labels, DatasetFingerprint};
pub use labels::{tally_label_file, BoxAnnotation, LabelTally};
pub use layout::{find_image_for_stem, DatasetLayout, ExportLayout, IMAGE_EXTENSIONS};
pub use sanitize::{apply_sanitize, plan_sanitize, LabeledPair, SanitizePlan};
pub use split::{split_dataset, DataConfig, SplitOptions, SplitSummary};
pub use stats::{collect_stats, DatasetStats};
pub use validate::{validate_export, ValidationReport};
