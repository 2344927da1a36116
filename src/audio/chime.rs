use rodio::Source;
use std::f32::consts::PI;
use std::time::Duration;

/// Soft bell chime: a decaying fundamental plus one overtone, re-struck
/// every 1.5 seconds.
pub struct ChimeTone {
    sample_rate: u32,
    num_sample: usize,
}

impl ChimeTone {
    pub fn new() -> Self {
        Self {
            sample_rate: 44100,
            num_sample: 0,
        }
    }
}

impl Iterator for ChimeTone {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        self.num_sample = self.num_sample.wrapping_add(1);

        let t = self.num_sample as f32 / self.sample_rate as f32;
        let strike_t = t % 1.5;

        // Exponential decay after each strike keeps the bell character
        let envelope = (-3.0 * strike_t).exp();
        let fundamental = (2.0 * PI * 880.0 * strike_t).sin() * 0.7;
        let overtone = (2.0 * PI * 1760.0 * strike_t).sin() * 0.3;

        Some((fundamental + overtone) * envelope * 0.25)
    }
}

impl Source for ChimeTone {
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
