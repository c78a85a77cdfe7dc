use std::{f32::consts::PI, fmt, sync::Arc};

use realfft::{num_complex::Complex32, RealFftPlanner, RealToComplex};
use serde::{Deserialize, Serialize};

use crate::{config::AudioConfig, props::sample_index, Result, VisualiserError};

const BEAT_GAIN: f32 = 12.0;
const BEAT_THRESHOLD: f32 = 0.6;
const MIN_BEAT_INTERVAL: f32 = 0.2;
const MAX_BEAT_HISTORY: usize = 32;

/// Weight of the previous frame when smoothing magnitudes.
pub const SMOOTHING_TIME_CONSTANT: f32 = 0.8;
/// Decibel level mapped to byte 0.
pub const MIN_DECIBELS: f32 = -100.0;
/// Decibel level mapped to byte 255.
pub const MAX_DECIBELS: f32 = -30.0;

/// Summary of the analysis metadata accumulated so far.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalysisSummary {
    pub sample_rate: u32,
    pub tempo_bpm: Option<f32>,
    pub duration_seconds: Option<f32>,
}

/// Features for one block of samples, including the byte arrays effects
/// consume as `audio_data`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisFrame {
    pub time: f32,
    pub rms: f32,
    pub beat_confidence: f32,
    /// Time-domain bytes, 128 at silence.
    pub waveform: Vec<u8>,
    /// Smoothed frequency magnitudes mapped onto `[0, 255]`.
    pub spectrum: Vec<u8>,
}

/// Turns blocks of f32 samples into per-frame byte arrays plus a few level
/// and tempo features. Synchronous so the host loop can drive it directly.
pub struct AnalysisEngine {
    sample_rate: u32,
    bin_count: usize,
    summary: AnalysisSummary,
    latest: Option<AnalysisFrame>,
    processed_samples: usize,
    last_rms: f32,
    beat_timestamps: Vec<f32>,
    smoothed: Vec<f32>,
    fft_planner: RealFftPlanner<f32>,
    fft: Option<FftResources>,
}

impl AnalysisEngine {
    pub fn new(sample_rate: u32, bin_count: usize) -> Self {
        Self {
            sample_rate,
            bin_count: bin_count.max(1),
            summary: AnalysisSummary {
                sample_rate,
                ..Default::default()
            },
            latest: None,
            processed_samples: 0,
            last_rms: 0.0,
            beat_timestamps: Vec::new(),
            smoothed: Vec::new(),
            fft_planner: RealFftPlanner::new(),
            fft: None,
        }
    }

    pub fn from_config(config: &AudioConfig) -> Self {
        Self::new(config.sample_rate, config.bin_count)
    }

    /// Returns metadata collected so far about the analysed stream.
    pub fn summary(&self) -> &AnalysisSummary {
        &self.summary
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    /// Returns the latest frame emitted by the engine, if any.
    pub fn latest_frame(&self) -> Option<&AnalysisFrame> {
        self.latest.as_ref()
    }

    /// Clears the accumulated state while preserving configuration.
    pub fn reset(&mut self) {
        self.summary = AnalysisSummary {
            sample_rate: self.sample_rate,
            ..Default::default()
        };
        self.latest = None;
        self.processed_samples = 0;
        self.last_rms = 0.0;
        self.beat_timestamps.clear();
        self.smoothed.clear();
    }

    /// Consumes audio samples and produces the frame for this block.
    pub fn process_block(&mut self, samples: &[f32]) -> Result<AnalysisFrame> {
        if samples.len() < 2 {
            return Err(VisualiserError::InvalidInput(
                "analysis requires blocks with at least two samples",
            ));
        }

        let block_size = samples.len();
        let sample_rate = self.sample_rate.max(1) as f32;
        let start_time = self.processed_samples as f32 / sample_rate;
        let end_time = (self.processed_samples + block_size) as f32 / sample_rate;
        let timestamp = start_time + (end_time - start_time) * 0.5;

        let rms = compute_rms(samples);
        let beat_confidence = self.update_beats(timestamp, rms);
        let spectrum = self.frequency_bytes(samples)?;
        let waveform = time_domain_bytes(samples, self.bin_count);

        self.processed_samples += block_size;
        self.summary.duration_seconds = Some(
            self.summary
                .duration_seconds
                .map(|d| d.max(end_time))
                .unwrap_or(end_time),
        );

        let frame = AnalysisFrame {
            time: timestamp,
            rms,
            beat_confidence,
            waveform,
            spectrum,
        };
        self.latest = Some(frame.clone());
        Ok(frame)
    }

    fn update_beats(&mut self, timestamp: f32, rms: f32) -> f32 {
        let delta = (rms - self.last_rms).max(0.0);
        self.last_rms = rms;
        let confidence = (delta * BEAT_GAIN).clamp(0.0, 1.0);

        if confidence >= BEAT_THRESHOLD
            && self
                .beat_timestamps
                .last()
                .map(|last| timestamp - last >= MIN_BEAT_INTERVAL)
                .unwrap_or(true)
        {
            self.beat_timestamps.push(timestamp);
            if self.beat_timestamps.len() > MAX_BEAT_HISTORY {
                let overflow = self.beat_timestamps.len() - MAX_BEAT_HISTORY;
                self.beat_timestamps.drain(0..overflow);
            }
            self.update_tempo_estimate();
        }

        confidence
    }

    fn update_tempo_estimate(&mut self) {
        if self.beat_timestamps.len() < 2 {
            return;
        }

        let mut sum = 0.0;
        let mut count = 0;
        for window in self.beat_timestamps.windows(2) {
            let interval = window[1] - window[0];
            if interval > f32::EPSILON {
                sum += interval;
                count += 1;
            }
        }

        if count > 0 {
            let average_interval = sum / count as f32;
            if average_interval > 0.0 {
                self.summary.tempo_bpm = Some(60.0 / average_interval);
            }
        }
    }

    /// Blackman-windowed magnitudes, smoothed over time and mapped from the
    /// decibel window onto bytes.
    fn frequency_bytes(&mut self, samples: &[f32]) -> Result<Vec<u8>> {
        let len = samples.len();
        let fft = self.prepare_fft(len)?;

        for (index, value) in samples.iter().enumerate() {
            fft.input[index] = *value * blackman_value(index, len);
        }

        fft.plan
            .process_with_scratch(&mut fft.input, &mut fft.spectrum, &mut fft.scratch)?;

        let bins = (len / 2).max(1);
        let magnitudes: Vec<f32> = fft
            .spectrum
            .iter()
            .take(bins)
            .map(|bin| bin.norm() / len as f32)
            .collect();

        if self.smoothed.len() != magnitudes.len() {
            self.smoothed = vec![0.0; magnitudes.len()];
        }
        for (smoothed, magnitude) in self.smoothed.iter_mut().zip(&magnitudes) {
            *smoothed = SMOOTHING_TIME_CONSTANT * *smoothed + (1.0 - SMOOTHING_TIME_CONSTANT) * magnitude;
        }

        let bytes = (0..self.bin_count)
            .map(|i| {
                let magnitude = self.smoothed[sample_index(i, self.bin_count, self.smoothed.len())];
                decibels_to_byte(20.0 * magnitude.max(f32::MIN_POSITIVE).log10())
            })
            .collect();
        Ok(bytes)
    }

    fn prepare_fft(&mut self, size: usize) -> Result<&mut FftResources> {
        let rebuild = self
            .fft
            .as_ref()
            .map(|fft| fft.size != size)
            .unwrap_or(true);

        if rebuild {
            let plan = self.fft_planner.plan_fft_forward(size);
            let scratch = plan.make_scratch_vec();
            let spectrum = plan.make_output_vec();
            let input = plan.make_input_vec();
            self.fft = Some(FftResources {
                size,
                plan,
                scratch,
                spectrum,
                input,
            });
        }

        self.fft
            .as_mut()
            .ok_or_else(|| VisualiserError::msg("fft resources were not initialised"))
    }
}

struct FftResources {
    size: usize,
    plan: Arc<dyn RealToComplex<f32>>,
    scratch: Vec<Complex32>,
    spectrum: Vec<Complex32>,
    input: Vec<f32>,
}

impl fmt::Debug for AnalysisEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisEngine")
            .field("sample_rate", &self.sample_rate)
            .field("bin_count", &self.bin_count)
            .field("summary", &self.summary)
            .field("processed_samples", &self.processed_samples)
            .field("last_rms", &self.last_rms)
            .field("beat_timestamps", &self.beat_timestamps.len())
            .finish()
    }
}

impl fmt::Debug for FftResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftResources")
            .field("size", &self.size)
            .finish()
    }
}

/// Time-domain samples as bytes, `128 * (1 + sample)` clamped to `[0, 255]`.
pub fn time_domain_bytes(samples: &[f32], bin_count: usize) -> Vec<u8> {
    (0..bin_count)
        .map(|i| {
            let sample = samples[sample_index(i, bin_count, samples.len())];
            (128.0 * (1.0 + sample)).floor().clamp(0.0, 255.0) as u8
        })
        .collect()
}

/// Maps a level in decibels onto `[0, 255]` across the decibel window.
pub fn decibels_to_byte(db: f32) -> u8 {
    let scaled = (db - MIN_DECIBELS) / (MAX_DECIBELS - MIN_DECIBELS) * 255.0;
    scaled.floor().clamp(0.0, 255.0) as u8
}

fn compute_rms(samples: &[f32]) -> f32 {
    let sum: f32 = samples.iter().map(|sample| sample * sample).sum();
    (sum / samples.len() as f32).sqrt()
}

fn blackman_value(index: usize, len: usize) -> f32 {
    const ALPHA: f32 = 0.16;
    let a0 = 0.5 * (1.0 - ALPHA);
    let a1 = 0.5;
    let a2 = 0.5 * ALPHA;
    let x = index as f32 / len as f32;
    a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
}
