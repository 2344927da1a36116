use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rodio::Source;
use std::f32::consts::PI;
use std::time::Duration;

/// Urgent pulsing buzzer: a gated low tone with a little noise grit so it
/// cuts through ambient sound.
pub struct PulseTone {
    sample_rate: u32,
    num_sample: usize,
    rng: StdRng,
}

impl PulseTone {
    pub fn new() -> Self {
        Self {
            sample_rate: 44100,
            num_sample: 0,
            rng: StdRng::from_entropy(),
        }
    }
}

impl Iterator for PulseTone {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        self.num_sample = self.num_sample.wrapping_add(1);

        let t = self.num_sample as f32 / self.sample_rate as f32;

        // 150 ms on, 150 ms off
        if (t * 6.66) as u64 % 2 == 1 {
            return Some(0.0);
        }

        let tone = (2.0 * PI * 440.0 * t).sin();
        let grit: f32 = self.rng.gen_range(-1.0..1.0) * 0.05;

        Some((tone + grit) * 0.25)
    }
}

impl Source for PulseTone {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
