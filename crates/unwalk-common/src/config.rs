//! Tolerances and sizing policy shared by adjacency, frame creation and Seek

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Configuration parameters for area graph processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnwalkConfig {
    /// Maximum distance between two boundary segments that still counts as shared
    pub edge_tolerance: f32,
    /// Margin added around existing content when creating a frame area
    pub frame_padding: f32,
    /// Radius (XZ) within which a position outside every area still resolves to the nearest one
    pub seek_proximity: f32,
    /// Maximum vertical distance between a position and the area it resolves to
    pub height_tolerance: f32,
}

impl Default for UnwalkConfig {
    fn default() -> Self {
        Self {
            edge_tolerance: 0.01,
            frame_padding: 1.0,
            seek_proximity: 2.0,
            height_tolerance: 2.0,
        }
    }
}

impl UnwalkConfig {
    /// Creates a new UnwalkConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from a JSON file; missing fields keep their defaults
    pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self =
            serde_json::from_str(&json).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every tolerance is finite and strictly positive
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("edge_tolerance", self.edge_tolerance),
            ("frame_padding", self.frame_padding),
            ("seek_proximity", self.seek_proximity),
            ("height_tolerance", self.height_tolerance),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        assert!(UnwalkConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive() {
        let config = UnwalkConfig {
            frame_padding: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = UnwalkConfig {
            edge_tolerance: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_json() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, r#"{{ "frame_padding": 3.5 }}"#)?;

        let config = UnwalkConfig::load_from_json(file.path())?;
        assert_eq!(config.frame_padding, 3.5);
        assert_eq!(config.edge_tolerance, UnwalkConfig::default().edge_tolerance);
        Ok(())
    }
}
