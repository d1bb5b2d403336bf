//! # Audio Capture Module
//!
//! Live microphone capture using CPAL (Cross-Platform Audio Library).
//! Incoming callback buffers are downmixed to mono, accumulated, and sent
//! to the analysis thread as fixed-size windows stamped with their position
//! in the stream.

use anyhow::{Context, Result, anyhow};
use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;

/// Sample rate requested from the input device.
const TARGET_SAMPLE_RATE: u32 = 44100;

/// One analysis window cut from the live stream.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedWindow {
    /// Index of the first sample since capture started. Dropped windows
    /// still advance this counter.
    pub start_sample: u64,
    pub samples: Vec<f32>,
}

impl CapturedWindow {
    /// Stream time in milliseconds at which the last sample arrived.
    pub fn end_ms(&self, sample_rate: u32) -> f64 {
        (self.start_sample + self.samples.len() as u64) as f64 * 1000.0 / sample_rate as f64
    }
}

/// Downmixes interleaved callback buffers and cuts them into windows.
struct WindowChunker {
    channels: usize,
    window_size: usize,
    buffer: Vec<f32>,
    next_start: u64,
}

impl WindowChunker {
    fn new(channels: usize, window_size: usize) -> Self {
        WindowChunker {
            channels,
            window_size,
            buffer: Vec::with_capacity(window_size * 2),
            next_start: 0,
        }
    }

    fn push(&mut self, interleaved: &[f32], mut emit: impl FnMut(CapturedWindow)) {
        let channels = self.channels;
        self.buffer.extend(
            interleaved
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32),
        );

        while self.buffer.len() >= self.window_size {
            emit(CapturedWindow {
                start_sample: self.next_start,
                samples: self.buffer[..self.window_size].to_vec(),
            });
            self.next_start += self.window_size as u64;
            self.buffer.drain(..self.window_size);
        }
    }
}

/// Starts audio capture from the default input device.
///
/// # Arguments
/// * `sender` - Channel sender receiving one [`CapturedWindow`] per full window
/// * `window_size` - Number of mono samples per window
///
/// # Returns
/// * `Ok((stream, sample_rate))` - Running stream handle and its sample rate
/// * `Err(e)` - No usable input device or configuration
pub fn start_audio_capture(
    sender: Sender<CapturedWindow>,
    window_size: usize,
) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No input device available"))?;

    log::info!("Using audio input device: {}", device.name()?);

    let configs = device
        .supported_input_configs()
        .context("Failed to query input configurations")?
        .collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, TARGET_SAMPLE_RATE)
        .ok_or_else(|| anyhow!("No suitable f32 input format found"))?;

    let sample_rate = cpal::SampleRate(TARGET_SAMPLE_RATE)
        .clamp(supported_config.min_sample_rate(), supported_config.max_sample_rate());
    let config = supported_config.with_sample_rate(sample_rate);

    let sample_rate_val = config.sample_rate().0;
    let channels = config.channels() as usize;
    let config: cpal::StreamConfig = config.into();

    log::info!(
        "Selected sample rate: {} Hz, {} channel(s)",
        sample_rate_val,
        channels
    );

    let err_fn = |err| log::error!("An error occurred on the audio stream: {}", err);

    let mut chunker = WindowChunker::new(channels, window_size);

    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            chunker.push(data, |window| {
                // Drop the window if the analysis thread is behind.
                let _ = sender.try_send(window);
            });
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok((stream, sample_rate_val))
}

/// Picks the f32 configuration whose sample rate range is closest to
/// `target_rate`, preferring mono devices.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let supported = c.min_sample_rate().0..=c.max_sample_rate().0;
            let rate_distance = if supported.contains(&target_rate) {
                0
            } else {
                let min_diff = (c.min_sample_rate().0 as i64 - target_rate as i64).abs();
                let max_diff = (c.max_sample_rate().0 as i64 - target_rate as i64).abs();
                min_diff.min(max_diff)
            };
            (rate_distance, c.channels())
        })
}
