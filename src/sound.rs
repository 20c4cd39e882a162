//! Key click feedback.
//!
//! The output stream is opened lazily on the first click and at most once; a
//! failed open is remembered so later clicks stay silent without retrying.
//! Without the `sound` feature the player only tracks its enabled flag.

use thiserror::Error;

const CLICK_SECS: f32 = 0.08;
const START_HZ: f32 = 800.0;
const END_HZ: f32 = 100.0;
const START_GAIN: f32 = 0.1;
const END_GAIN: f32 = 0.001;

#[derive(Debug, Error)]
pub enum SoundError {
    #[error("built without audio support")]
    Unsupported,
    #[cfg(feature = "sound")]
    #[error(transparent)]
    Stream(#[from] rodio::StreamError),
    #[cfg(feature = "sound")]
    #[error(transparent)]
    Play(#[from] rodio::PlayError),
}

/// Mono samples of a short triangle-wave click whose pitch and gain both fall
/// exponentially.
pub fn click_waveform(sample_rate: u32) -> Vec<f32> {
    let len = (sample_rate as f32 * CLICK_SECS) as usize;
    let mut phase = 0.0f32;
    (0..len)
        .map(|i| {
            let t = i as f32 / len as f32;
            let freq = START_HZ * (END_HZ / START_HZ).powf(t);
            let gain = START_GAIN * (END_GAIN / START_GAIN).powf(t);
            let triangle = 4.0 * (phase - 0.5).abs() - 1.0;
            phase = (phase + freq / sample_rate as f32).fract();
            triangle * gain
        })
        .collect()
}

#[cfg(feature = "sound")]
struct AudioOutput {
    _stream: rodio::OutputStream,
    handle: rodio::OutputStreamHandle,
}

#[cfg(feature = "sound")]
impl AudioOutput {
    fn open() -> Result<Self, SoundError> {
        let (stream, handle) = rodio::OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    fn play(&self, samples: &[f32], sample_rate: u32) -> Result<(), SoundError> {
        let sink = rodio::Sink::try_new(&self.handle)?;
        sink.append(rodio::buffer::SamplesBuffer::new(1, sample_rate, samples.to_vec()));
        sink.detach();
        Ok(())
    }
}

pub struct ClickSound {
    enabled: bool,
    #[cfg(feature = "sound")]
    samples: Vec<f32>,
    #[cfg(feature = "sound")]
    output: std::cell::OnceCell<Option<AudioOutput>>,
}

#[cfg(feature = "sound")]
const SAMPLE_RATE: u32 = 44_100;

impl ClickSound {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            #[cfg(feature = "sound")]
            samples: click_waveform(SAMPLE_RATE),
            #[cfg(feature = "sound")]
            output: std::cell::OnceCell::new(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    /// Play one click if enabled. Failures are logged and otherwise ignored.
    pub fn click(&self) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.try_click() {
            tracing::debug!(target: "sound", error = %e, "click_failed");
        }
    }

    #[cfg(feature = "sound")]
    fn try_click(&self) -> Result<(), SoundError> {
        let output = self.output.get_or_init(|| match AudioOutput::open() {
            Ok(output) => Some(output),
            Err(e) => {
                tracing::warn!(target: "sound", error = %e, "audio_disabled");
                None
            }
        });
        match output {
            Some(output) => output.play(&self.samples, SAMPLE_RATE),
            None => Ok(()),
        }
    }

    #[cfg(not(feature = "sound"))]
    fn try_click(&self) -> Result<(), SoundError> {
        Err(SoundError::Unsupported)
    }
}

impl std::fmt::Debug for ClickSound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickSound")
            .field("enabled", &self.enabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waveform_length_and_decay() {
        let samples = click_waveform(10_000);
        assert_eq!(samples.len(), 800);

        let head = samples[..100].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let tail = samples[700..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(head <= START_GAIN + f32::EPSILON);
        assert!(tail < head / 10.0);
    }

    #[test]
    fn toggle_flips_enabled() {
        let mut click = ClickSound::new(true);
        assert!(!click.toggle());
        assert!(!click.enabled());
        click.click();
        assert!(click.toggle());
    }
}
