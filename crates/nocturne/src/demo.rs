use std::f64::consts::PI;

use nocturne_core::{Frame, Signal};

/// Deterministic stand-in for the audio analysis chain: oscillators at
/// musically-plausible periods, with a sustained-low hold every couple of
/// minutes so scheduled shifts have something to gate on.
pub struct DemoSignalSource;

impl DemoSignalSource {
    pub fn new() -> Self {
        DemoSignalSource
    }

    pub fn frame(&mut self, now: f64) -> Frame {
        let beat = half_sine(now, 0.5);
        let bar = half_sine(now, 2.0);
        let phrase = half_sine(now, 16.0);

        // Hold the sustained-low channel high for 20s out of every 120s.
        let sustained_low = if now % 120.0 < 20.0 { 0.9 } else { 0.05 };

        Frame::with(
            now,
            &[
                (Signal::FreqAll, beat),
                (Signal::FreqHigh, beat * 0.8 + bar * 0.2),
                (Signal::FreqLow, bar),
                (Signal::SustainedLow, sustained_low),
                (Signal::SustainedHigh, phrase),
                (Signal::Drop, if now % 32.0 < 0.5 { 1.0 } else { 0.0 }),
                (Signal::Strobe, if bar > 0.95 { beat } else { 0.0 }),
                (Signal::Pulse, half_sine(now, 4.0)),
            ],
        )
    }
}

fn half_sine(now: f64, period: f64) -> f32 {
    ((now * 2.0 * PI / period).sin() * 0.5 + 0.5) as f32
}
