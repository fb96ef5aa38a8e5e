//! External layout-suggestion adapter and the service seams it feeds from.
//!
//! The analyzer and portrait generator are opaque collaborators behind
//! traits; the engine only consumes their results. Suggestion payloads are
//! applied per-field with no validation: present fields overwrite, absent
//! fields leave the layer untouched.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::NormPoint;
use crate::layer::{LayerId, LayerStore};

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("layout analyzer payload is not valid JSON: {0}")]
    InvalidPayload(#[from] serde_json::Error),
    #[error("layout analyzer call failed: {0}")]
    Service(String),
}

#[derive(Debug, Error)]
pub enum PortraitError {
    #[error("portrait decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("portrait generation failed: {0}")]
    Service(String),
}

/// One suggested anchor in percent of the canvas (0-100 on both axes, by
/// convention of the analyzer; out-of-range values pass through silently).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuggestedPoint {
    pub x: f32,
    pub y: f32,
}

/// Wire shape of an analyzer result. Either field may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutSuggestion {
    pub name_position: Option<SuggestedPoint>,
    pub id_position: Option<SuggestedPoint>,
}

impl LayoutSuggestion {
    pub fn from_json(payload: &str) -> Result<Self, AnalyzerError> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Overwrite each text layer whose suggestion is present, mapping the
    /// percent coordinates into the normalized model. Absent fields are
    /// skipped, never an error.
    pub fn apply(&self, store: &mut LayerStore) {
        if let Some(point) = self.name_position {
            store.set_position(LayerId::Name, NormPoint::new(point.x / 100.0, point.y / 100.0));
        }
        if let Some(point) = self.id_position {
            store.set_position(LayerId::Id, NormPoint::new(point.x / 100.0, point.y / 100.0));
        }
        tracing::debug!(
            name = self.name_position.is_some(),
            id = self.id_position.is_some(),
            "layout suggestion applied"
        );
    }
}

/// Layout analyzer collaborator: receives the current composite as an
/// encoded PNG snapshot, returns suggested text positions.
pub trait LayoutAnalyzer {
    fn analyze_layout(&self, snapshot_png: &[u8]) -> Result<LayoutSuggestion, AnalyzerError>;
}

/// Portrait generator collaborator: returns a decoded raster on success. On
/// failure the engine performs no mutation.
pub trait PortraitSource {
    fn generate_portrait(&self, prompt: &str) -> Result<RgbaImage, PortraitError>;
}
