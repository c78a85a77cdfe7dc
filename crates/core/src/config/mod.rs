use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{EffectType, Result, VisualizerProps};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub audio: AudioConfig,
    pub visualiser: VisualiserConfig,
}

impl AppConfig {
    /// Reads a JSON configuration file. Missing fields fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config = serde_json::from_str(raw)?;
        Ok(config)
    }
}

/// Configuration specific to the audio analysis stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub block_size: usize,
    /// Length of the byte arrays handed to effects.
    pub bin_count: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            block_size: 1024,
            bin_count: 128,
        }
    }
}

/// Which analysis output feeds `audio_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Time-domain bytes centred on 128.
    #[default]
    Waveform,
    /// Frequency magnitude bytes.
    Spectrum,
}

/// Starting values for the per-frame visualiser properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualiserConfig {
    pub effect: EffectType,
    pub detail_level: usize,
    pub movement_speed: f32,
    pub color_intensity: f32,
    pub bpm: f32,
    pub is_animating: bool,
    pub source: DataSource,
}

impl Default for VisualiserConfig {
    fn default() -> Self {
        Self {
            effect: EffectType::Waveform,
            detail_level: 64,
            movement_speed: 1.0,
            color_intensity: 1.0,
            bpm: 120.0,
            is_animating: true,
            source: DataSource::Waveform,
        }
    }
}

impl VisualiserConfig {
    /// Builds a frame snapshot around the provided audio bytes.
    pub fn props(&self, audio_data: Vec<u8>) -> VisualizerProps {
        VisualizerProps {
            effect_type: self.effect,
            detail_level: self.detail_level,
            movement_speed: self.movement_speed,
            color_intensity: self.color_intensity,
            bpm: self.bpm,
            audio_data,
            is_animating: self.is_animating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = AppConfig::from_json(
            r#"{ "visualiser": { "effect": "Ripple", "detail_level": 12, "source": "spectrum" } }"#,
        )
        .unwrap();

        assert_eq!(config.visualiser.effect, EffectType::Ripple);
        assert_eq!(config.visualiser.detail_level, 12);
        assert_eq!(config.visualiser.source, DataSource::Spectrum);
        assert_eq!(config.visualiser.bpm, 120.0);
        assert_eq!(config.audio, AudioConfig::default());
    }

    #[test]
    fn rejects_unknown_effect_names() {
        let err = AppConfig::from_json(r#"{ "visualiser": { "effect": "Lasers" } }"#).unwrap_err();
        assert!(format!("{err}").contains("Lasers"));
    }

    #[test]
    fn builds_props_from_config() {
        let config = VisualiserConfig::default();
        let props = config.props(vec![128; 8]);
        assert_eq!(props.effect_type, EffectType::Waveform);
        assert_eq!(props.audio_data.len(), 8);
        assert!(props.validate().is_ok());
    }
}
