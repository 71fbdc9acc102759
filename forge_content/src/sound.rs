//! Runtime loader for audio clips.
//!
//! The pipeline stores audio as plain WAV containers with 8-bit unsigned PCM
//! samples; anything else is rejected at load time.

use std::path::Path;

use forge_shared::log::info;

use crate::common::{Error, Result};

/// An audio clip decoded into a playback-ready sample buffer.
///
/// `Default` is the unloaded state; [`Sound::load`] is the only way to a
/// loaded one.
#[derive(Debug, Default)]
pub struct Sound {
    channels: u16,
    sample_rate: u32,
    data: Vec<u8>,
    loaded: bool,
}

impl Sound {
    /// Loads a WAV file containing 8-bit unsigned PCM samples.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = hound::WavReader::open(path).map_err(wav_error)?;
        let spec = reader.spec();

        if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 8 {
            return Err(Error::Format(format!(
                "only 8-bit unsigned PCM is supported, found {bits}-bit {format:?}",
                bits = spec.bits_per_sample,
                format = spec.sample_format
            )));
        }

        // hound centers 8-bit samples around zero; the playback buffer keeps
        // the container's unsigned encoding.
        let data = reader
            .samples::<i8>()
            .map(|sample| sample.map(|sample| (sample as i16 + 128) as u8))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(wav_error)?;

        info! {
            "Loaded sound '{}' with {samples} samples at {rate} Hz",
            path.display(),
            samples = data.len(),
            rate = spec.sample_rate
        }

        Ok(Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            data,
            loaded: true,
        })
    }

    /// Releases the sample buffer. Calling this on an already unloaded sound
    /// is a no-op.
    pub fn unload(&mut self) {
        self.data = Vec::new();
        self.loaded = false;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Unsigned 8-bit samples, channels interleaved.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of samples across all channels.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn wav_error(err: hound::Error) -> Error {
    match err {
        hound::Error::IoError(err) => Error::Io(err),
        other => Error::Format(other.to_string()),
    }
}
