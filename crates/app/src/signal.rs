use std::f32::consts::TAU;

const BASS_HZ: f32 = 110.0;
const LEAD_HZ: f32 = 440.0;
/// How fast the kick envelope decays after each beat, per second.
const KICK_DECAY: f32 = 8.0;

/// Deterministic test signal: a bass tone pumped by a kick on every beat
/// plus a steady lead tone. Stands in for captured audio.
#[derive(Debug, Clone)]
pub struct TestSignal {
    sample_rate: u32,
    beat_seconds: f32,
    position: u64,
}

impl TestSignal {
    pub fn new(sample_rate: u32, bpm: f32) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            beat_seconds: 60.0 / bpm.max(1.0),
            position: 0,
        }
    }

    pub fn next_block(&mut self, len: usize) -> Vec<f32> {
        let block = (0..len as u64)
            .map(|offset| self.sample_at(self.position + offset))
            .collect();
        self.position += len as u64;
        block
    }

    fn sample_at(&self, index: u64) -> f32 {
        let t = index as f32 / self.sample_rate as f32;
        let since_beat = t % self.beat_seconds;
        let kick = (-since_beat * KICK_DECAY).exp();
        let bass = (TAU * BASS_HZ * t).sin() * (0.4 + 0.6 * kick);
        let lead = (TAU * LEAD_HZ * t).sin();
        (0.5 * bass + 0.2 * lead).clamp(-1.0, 1.0)
    }
}
