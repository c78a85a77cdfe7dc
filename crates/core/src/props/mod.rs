use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Result, VisualiserError};

/// Scale applied to normalised samples before they displace geometry.
pub const DISPLACEMENT_AMPLITUDE: f32 = 50.0;

/// Closed set of effect kinds a host can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectType {
    Waveform,
    Bars,
    Circle,
    Particles,
    Spectrum,
    Terrain,
    Grid,
    Flow,
    Ripple,
    Fractal,
}

impl EffectType {
    /// Every effect in declaration order.
    pub const ALL: [EffectType; 10] = [
        EffectType::Waveform,
        EffectType::Bars,
        EffectType::Circle,
        EffectType::Particles,
        EffectType::Spectrum,
        EffectType::Terrain,
        EffectType::Grid,
        EffectType::Flow,
        EffectType::Ripple,
        EffectType::Fractal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EffectType::Waveform => "Waveform",
            EffectType::Bars => "Bars",
            EffectType::Circle => "Circle",
            EffectType::Particles => "Particles",
            EffectType::Spectrum => "Spectrum",
            EffectType::Terrain => "Terrain",
            EffectType::Grid => "Grid",
            EffectType::Flow => "Flow",
            EffectType::Ripple => "Ripple",
            EffectType::Fractal => "Fractal",
        }
    }

    /// The effect that follows this one, wrapping around at the end.
    pub fn next(self) -> Self {
        let index = Self::ALL
            .iter()
            .position(|kind| *kind == self)
            .unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for EffectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffectType {
    type Err = VisualiserError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| VisualiserError::UnknownEffect(s.to_string()))
    }
}

/// Per-frame snapshot handed to the active effect. Built fresh by the host
/// every frame and never mutated by an effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizerProps {
    pub effect_type: EffectType,
    /// Point or segment count; at least two.
    pub detail_level: usize,
    pub movement_speed: f32,
    pub color_intensity: f32,
    pub bpm: f32,
    /// One unsigned byte per frequency or amplitude bin.
    pub audio_data: Vec<u8>,
    pub is_animating: bool,
}

impl VisualizerProps {
    /// Checks the contract effects rely on. Hosts call this once per frame
    /// before handing the snapshot to an effect.
    pub fn validate(&self) -> Result<()> {
        if self.detail_level < 2 {
            return Err(VisualiserError::InvalidProps(format!(
                "detail level must be at least 2, got {}",
                self.detail_level
            )));
        }
        if self.audio_data.is_empty() {
            return Err(VisualiserError::InvalidProps(
                "audio data must contain at least one sample".to_string(),
            ));
        }
        if !self.movement_speed.is_finite() || self.movement_speed < 0.0 {
            return Err(VisualiserError::InvalidProps(format!(
                "movement speed must be a non-negative number, got {}",
                self.movement_speed
            )));
        }
        if !self.color_intensity.is_finite() || self.color_intensity < 0.0 {
            return Err(VisualiserError::InvalidProps(format!(
                "color intensity must be a non-negative number, got {}",
                self.color_intensity
            )));
        }
        if !self.bpm.is_finite() || self.bpm <= 0.0 {
            return Err(VisualiserError::InvalidProps(format!(
                "bpm must be positive, got {}",
                self.bpm
            )));
        }
        Ok(())
    }

    /// Sample feeding output point `i` of `points` evenly spread points.
    pub fn sample_for(&self, i: usize, points: usize) -> u8 {
        self.audio_data[sample_index(i, points, self.audio_data.len())]
    }

    /// Perpendicular offset for output point `i` of `detail_level` points.
    pub fn displacement_at(&self, i: usize) -> f32 {
        normalize_sample(self.sample_for(i, self.detail_level))
            * DISPLACEMENT_AMPLITUDE
            * self.color_intensity
    }

    /// Average sample level in `[0, 1]`.
    pub fn mean_level(&self) -> f32 {
        if self.audio_data.is_empty() {
            return 0.0;
        }
        let sum: u32 = self.audio_data.iter().map(|&sample| u32::from(sample)).sum();
        sum as f32 / (self.audio_data.len() as f32 * 255.0)
    }

    pub fn hue(&self) -> f32 {
        hue_for_intensity(self.color_intensity)
    }
}

/// Maps output point `i` of `points` onto a bin of a `len`-long sample array:
/// `floor(i / points * len)`. Integer arithmetic keeps the result exact, so
/// it stays below `len` for every `i < points`.
pub fn sample_index(i: usize, points: usize, len: usize) -> usize {
    if points == 0 || len == 0 {
        return 0;
    }
    (i * len / points).min(len - 1)
}

/// Maps a byte sample from `[0, 255]` onto roughly `[-1, 1]`, with 128 at zero.
pub fn normalize_sample(sample: u8) -> f32 {
    f32::from(sample) / 128.0 - 1.0
}

/// Hue in `[0, 1)` derived from the colour intensity.
pub fn hue_for_intensity(color_intensity: f32) -> f32 {
    let hue = (color_intensity * 100.0).rem_euclid(360.0) / 360.0;
    if hue.is_finite() && hue < 1.0 {
        hue
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn props(detail_level: usize, audio_data: Vec<u8>) -> VisualizerProps {
        VisualizerProps {
            effect_type: EffectType::Waveform,
            detail_level,
            movement_speed: 1.0,
            color_intensity: 1.0,
            bpm: 120.0,
            audio_data,
            is_animating: true,
        }
    }

    #[test]
    fn parses_every_effect_name() {
        for kind in EffectType::ALL {
            assert_eq!(kind.as_str().parse::<EffectType>().unwrap(), kind);
        }
        let err = "Lasers".parse::<EffectType>().unwrap_err();
        assert!(format!("{err}").contains("Lasers"));
    }

    #[test]
    fn next_cycles_through_all_effects() {
        assert_eq!(EffectType::Waveform.next(), EffectType::Bars);
        assert_eq!(EffectType::Fractal.next(), EffectType::Waveform);
    }

    #[test]
    fn rejects_contract_violations() {
        assert!(props(1, vec![128]).validate().is_err());
        assert!(props(4, Vec::new()).validate().is_err());

        let mut bad_bpm = props(4, vec![128]);
        bad_bpm.bpm = 0.0;
        assert!(bad_bpm.validate().is_err());

        let mut bad_intensity = props(4, vec![128]);
        bad_intensity.color_intensity = -0.5;
        assert!(bad_intensity.validate().is_err());

        assert!(props(2, vec![0]).validate().is_ok());
    }

    #[test]
    fn displacement_matches_reference_scenario() {
        let frame = props(4, vec![0, 128, 255, 64]);
        let displacements: Vec<f32> = (0..4).map(|i| frame.displacement_at(i)).collect();
        let expected = [-50.0, 0.0, 49.609375, -25.0];
        for (got, want) in displacements.iter().zip(expected) {
            assert!((got - want).abs() < 1e-4, "{got} != {want}");
        }
    }

    #[test]
    fn midpoint_samples_never_displace() {
        for intensity in [0.0, 0.3, 1.0, 7.5] {
            let mut frame = props(16, vec![128; 64]);
            frame.color_intensity = intensity;
            assert!((0..16).all(|i| frame.displacement_at(i) == 0.0));
        }
    }

    #[test]
    fn hue_wraps_every_three_point_six() {
        assert_eq!(hue_for_intensity(0.0), 0.0);
        assert!((hue_for_intensity(1.0) - 100.0 / 360.0).abs() < 1e-6);
        assert!((hue_for_intensity(3.6)).abs() < 1e-4 || hue_for_intensity(3.6) > 0.999);
        assert!((hue_for_intensity(4.6) - 100.0 / 360.0).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn sample_index_stays_in_bounds(points in 2usize..512, len in 1usize..4096) {
            for i in 0..points {
                let index = sample_index(i, points, len);
                prop_assert!(index < len);
                prop_assert!(index * points <= i * len);
                prop_assert!(i * len < (index + 1) * points);
            }
        }

        #[test]
        fn hue_stays_in_unit_range(intensity in 0.0f32..10_000.0) {
            let hue = hue_for_intensity(intensity);
            prop_assert!((0.0..1.0).contains(&hue));
        }
    }
}
