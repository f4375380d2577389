//! Reading and writing WAV files as normalized [`AudioBuffer`]s.
//!
//! Integer samples are normalized by the largest positive value of their bit depth, so a 16 bit
//! `32767` reads as `1.0`. Writing goes the other way and truncates toward zero, which lets a
//! file be limited and written back in the format it came in.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path;
use std::sync::Arc;

use hound::{SampleFormat, WavSpec};

use crate::buffer::{AudioBuffer, BufferError};
use crate::common::{assert_error_traits, Sample};

/// Error reading or writing a WAV file.
#[allow(missing_docs)]
#[derive(Debug, thiserror::Error, Clone)]
pub enum WavError {
    #[error("Opening file")]
    OpenFile(#[source] Arc<io::Error>),
    #[error("Could not read wav data")]
    Reading(#[source] Arc<hound::Error>),
    #[error("Unsupported wav format: {bits_per_sample} bit {sample_format:?}")]
    UnsupportedFormat {
        /// Bit depth of the file
        bits_per_sample: u16,
        /// Integer or float encoding of the file
        sample_format: SampleFormat,
    },
    #[error("Could not create wav writer")]
    Creating(#[source] Arc<hound::Error>),
    #[error("Failed to write samples writer")]
    Writing(#[source] Arc<hound::Error>),
    #[error("Failed to update the wav header")]
    Finishing(#[source] Arc<hound::Error>),
    #[error("Failed to flush all bytes to writer")]
    Flushing(#[source] Arc<io::Error>),
    #[error("Wav data does not form a valid buffer")]
    Buffer(#[source] BufferError),
}
assert_error_traits!(WavError);

/// Sample encoding of a WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Signed integer PCM of the given bit depth (8, 16, 24 or 32)
    Int {
        /// Bits per sample
        bits_per_sample: u16,
    },
    /// 32 bit IEEE float
    Float,
}

impl WavFormat {
    fn from_spec(spec: &WavSpec) -> Result<Self, WavError> {
        match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, bits @ (8 | 16 | 24 | 32)) => Ok(WavFormat::Int {
                bits_per_sample: bits,
            }),
            (SampleFormat::Float, 32) => Ok(WavFormat::Float),
            (sample_format, bits_per_sample) => Err(WavError::UnsupportedFormat {
                bits_per_sample,
                sample_format,
            }),
        }
    }

    fn spec(&self, buffer: &AudioBuffer) -> WavSpec {
        let (bits_per_sample, sample_format) = match *self {
            WavFormat::Int { bits_per_sample } => (bits_per_sample, SampleFormat::Int),
            WavFormat::Float => (32, SampleFormat::Float),
        };
        WavSpec {
            channels: buffer.channels(),
            sample_rate: buffer.sample_rate(),
            bits_per_sample,
            sample_format,
        }
    }
}

/// Largest positive integer sample of a bit depth, as a float.
fn full_scale(bits_per_sample: u16) -> f32 {
    ((1i64 << (bits_per_sample - 1)) - 1) as f32
}

/// Decoded audio together with the format it was stored in.
#[derive(Debug, Clone, PartialEq)]
pub struct WavAudio {
    /// Normalized samples
    pub buffer: AudioBuffer,
    /// Encoding of the source file
    pub format: WavFormat,
}

/// Reads a WAV file into a normalized buffer.
pub fn read_wav(wav_file: impl AsRef<path::Path>) -> Result<WavAudio, WavError> {
    let file = File::open(wav_file)
        .map_err(Arc::new)
        .map_err(WavError::OpenFile)?;
    read_wav_from(BufReader::new(file))
}

/// Reads WAV data from a reader into a normalized buffer.
pub fn read_wav_from(reader: impl io::Read) -> Result<WavAudio, WavError> {
    let reader = hound::WavReader::new(reader)
        .map_err(Arc::new)
        .map_err(WavError::Reading)?;
    let spec = reader.spec();
    let format = WavFormat::from_spec(&spec)?;

    let samples: Result<Vec<Sample>, hound::Error> = match format {
        WavFormat::Int { bits_per_sample } => {
            let full_scale = full_scale(bits_per_sample);
            reader
                .into_samples::<i32>()
                .map(|sample| sample.map(|s| s as f32 / full_scale))
                .collect()
        }
        WavFormat::Float => reader.into_samples::<f32>().collect(),
    };
    let samples = samples.map_err(Arc::new).map_err(WavError::Reading)?;

    let buffer = AudioBuffer::new(spec.channels, spec.sample_rate, samples)
        .map_err(WavError::Buffer)?;
    Ok(WavAudio { buffer, format })
}

/// Writes a buffer to a WAV file in the given format.
///
/// If the file already exists it will be overwritten.
///
/// # Note
/// This is a convenience wrapper around [`write_wav_to`]
pub fn write_wav(
    wav_file: impl AsRef<path::Path>,
    buffer: &AudioBuffer,
    format: WavFormat,
) -> Result<(), WavError> {
    let mut file = File::create(wav_file)
        .map_err(Arc::new)
        .map_err(WavError::OpenFile)?;
    write_wav_to(&mut file, buffer, format)
}

/// Writes a buffer as WAV data into a writer.
///
/// Integer formats scale by the bit depth's full scale and truncate toward zero; samples beyond
/// full scale saturate.
///
/// # Example
/// ```rust
/// # use brickwall::AudioBuffer;
/// # use brickwall::wav::{read_wav_from, write_wav_to, WavFormat};
/// let buffer = AudioBuffer::mono(44_100, vec![0.0, 0.5, -1.0]).unwrap();
/// let mut writer = std::io::Cursor::new(Vec::new());
/// write_wav_to(&mut writer, &buffer, WavFormat::Float)?;
///
/// let wav_bytes: Vec<u8> = writer.into_inner();
/// let decoded = read_wav_from(&wav_bytes[..])?;
/// assert_eq!(decoded.buffer, buffer);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn write_wav_to(
    writer: &mut (impl io::Write + io::Seek),
    buffer: &AudioBuffer,
    format: WavFormat,
) -> Result<(), WavError> {
    let spec = format.spec(buffer);
    let mut writer = io::BufWriter::new(writer);
    {
        let mut writer = hound::WavWriter::new(&mut writer, spec)
            .map_err(Arc::new)
            .map_err(WavError::Creating)?;
        match format {
            WavFormat::Int { bits_per_sample } => {
                let full_scale = full_scale(bits_per_sample);
                for &sample in buffer.samples() {
                    let scaled = (sample * full_scale).clamp(-full_scale, full_scale) as i32;
                    writer
                        .write_sample(scaled)
                        .map_err(Arc::new)
                        .map_err(WavError::Writing)?;
                }
            }
            WavFormat::Float => {
                for &sample in buffer.samples() {
                    writer
                        .write_sample(sample)
                        .map_err(Arc::new)
                        .map_err(WavError::Writing)?;
                }
            }
        }
        writer
            .finalize()
            .map_err(Arc::new)
            .map_err(WavError::Finishing)?;
    }
    writer
        .flush()
        .map_err(Arc::new)
        .map_err(WavError::Flushing)?;
    Ok(())
}
