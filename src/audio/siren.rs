use rodio::Source;
use std::f32::consts::PI;
use std::time::Duration;

/// Classic two-tone alarm siren, alternating between a high and a low pitch
/// twice per second.
pub struct SirenTone {
    sample_rate: u32,
    num_sample: usize,
}

impl SirenTone {
    pub fn new() -> Self {
        Self {
            sample_rate: 44100,
            num_sample: 0,
        }
    }
}

impl Iterator for SirenTone {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        self.num_sample = self.num_sample.wrapping_add(1);

        let t = self.num_sample as f32 / self.sample_rate as f32;

        // Switch pitch every 250 ms
        let freq = if (t * 4.0) as u64 % 2 == 0 { 880.0 } else { 660.0 };
        let sample = (2.0 * PI * freq * t).sin();

        Some(sample * 0.2)
    }
}

impl Source for SirenTone {
    fn current_frame_len(&self) -> Option<usize> {
        None // Infinite stream
    }

    fn channels(&self) -> u16 {
        1 // Mono
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None // Infinite
    }
}
