//! WAV import and export
//!
//! Import accepts integer and float PCM of common bit depths, mixes
//! stereo down to mono and resamples to [`TARGET_SAMPLE_RATE`]. Export
//! writes the canonical container for kit samples: mono, unsigned 8-bit,
//! 11468 Hz, each stored nibble pair expanding to two PCM bytes.

use std::path::Path;

use crate::sample::{SampleError, TARGET_SAMPLE_RATE};

/// Read a WAV file into mono signed 16-bit PCM at [`TARGET_SAMPLE_RATE`]
pub fn read_wav(path: impl AsRef<Path>) -> Result<Vec<i16>, SampleError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<i16> = match spec.sample_format {
        hound::SampleFormat::Int => match spec.bits_per_sample {
            16 => reader.samples::<i16>().collect::<Result<_, _>>()?,
            8 => reader
                .samples::<i8>()
                .map(|s| s.map(|s| i16::from(s) << 8))
                .collect::<Result<_, _>>()?,
            24 | 32 => reader
                .samples::<i32>()
                .map(|s| s.map(|s| (s >> (spec.bits_per_sample - 16)) as i16))
                .collect::<Result<_, _>>()?,
            bits => return Err(SampleError::UnsupportedBitDepth(bits)),
        },
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(|s| (s * 32767.0) as i16))
            .collect::<Result<_, _>>()?,
    };

    let mono: Vec<i16> = match spec.channels {
        1 => samples,
        2 => samples
            .chunks(2)
            .map(|pair| ((i32::from(pair[0]) + i32::from(pair[1])) / 2) as i16)
            .collect(),
        channels => return Err(SampleError::UnsupportedChannels(channels)),
    };

    if spec.sample_rate == TARGET_SAMPLE_RATE {
        Ok(mono)
    } else {
        Ok(resample(&mono, spec.sample_rate, TARGET_SAMPLE_RATE))
    }
}

/// Write nibble-pair bytes as a mono 8-bit WAV at [`TARGET_SAMPLE_RATE`]
pub fn write_wav(path: impl AsRef<Path>, nibbles: &[u8]) -> Result<(), SampleError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: TARGET_SAMPLE_RATE,
        bits_per_sample: 8,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &byte in nibbles {
        // hound stores 8-bit samples with the usual 128 offset
        writer.write_sample((i16::from(byte & 0xf0) + 8 - 128) as i8)?;
        writer.write_sample((i16::from(byte << 4) + 8 - 128) as i8)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Simple linear resampling
fn resample(samples: &[i16], src_rate: u32, dst_rate: u32) -> Vec<i16> {
    if samples.is_empty() {
        return Vec::new();
    }
    let ratio = f64::from(src_rate) / f64::from(dst_rate);
    let output_len = (samples.len() as f64 / ratio) as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 * ratio;
        let src_idx = src_pos as usize;
        let frac = src_pos - src_idx as f64;

        let sample = if src_idx + 1 < samples.len() {
            let a = f64::from(samples[src_idx]);
            let b = f64::from(samples[src_idx + 1]);
            (a + (b - a) * frac) as i16
        } else {
            samples[src_idx.min(samples.len() - 1)]
        };

        output.push(sample);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Sample;

    #[test]
    fn wav_roundtrip_reproduces_nibbles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.wav");

        let nibbles: Vec<u8> = (0..512u32).map(|i| (i * 37 % 256) as u8).collect();
        write_wav(&path, &nibbles).unwrap();

        let pcm = read_wav(&path).unwrap();
        assert_eq!(pcm.len(), nibbles.len() * 2);

        let reencoded = Sample::from_pcm(pcm, "RND");
        assert_eq!(reencoded.nibbles(), &nibbles[..]);
    }

    #[test]
    fn exported_header_is_canonical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("header.wav");
        write_wav(&path, &[0x12, 0x34]).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        // Mono, 8-bit, 11468 Hz
        assert_eq!(u16::from_le_bytes([bytes[22], bytes[23]]), 1);
        assert_eq!(
            u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]),
            TARGET_SAMPLE_RATE
        );
        assert_eq!(u16::from_le_bytes([bytes[34], bytes[35]]), 8);
        // Payload: two bytes per nibble pair, high nibble first, n*16+8
        assert_eq!(&bytes[44..48], &[0x18, 0x28, 0x38, 0x48]);
        // Chunk sizes derive from the payload length
        assert_eq!(
            u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            36 + 4
        );
        assert_eq!(
            u32::from_le_bytes([bytes[40], bytes[41], bytes[42], bytes[43]]),
            4
        );
    }

    #[test]
    fn stereo_and_16bit_input_is_converted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: TARGET_SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..100i16 {
            writer.write_sample(i * 100).unwrap();
            writer.write_sample(i * 300).unwrap();
        }
        writer.finalize().unwrap();

        let pcm = read_wav(&path).unwrap();
        assert_eq!(pcm.len(), 100);
        assert_eq!(pcm[10], 10 * 200);
    }
}
