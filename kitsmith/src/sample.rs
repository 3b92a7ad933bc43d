//! Sample codec: 4-bit packed PCM
//!
//! Kit samples are stored as nibble pairs, two 4-bit samples per byte
//! with the earlier sample in the high nibble. Playback expands nibble
//! `n` to the unsigned 8-bit value `n * 16 + 8`.
//!
//! A [`Sample`] comes from one of two places:
//!
//! - decoded from ROM nibble bytes: only the encoded form exists, so
//!   volume and dither adjustments are silent no-ops;
//! - encoded from an external waveform: the source PCM (at
//!   [`TARGET_SAMPLE_RATE`]) is retained, and volume/dither changes
//!   re-encode from it losslessly.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Output sample rate of the target hardware, in Hz
pub const TARGET_SAMPLE_RATE: u32 = 11468;

/// One 4-bit quantization step in the signed 16-bit domain
const QUANT_STEP: i32 = 4096;

/// Fixed dither RNG seed, so re-encoding a sample is reproducible
const DITHER_SEED: u64 = 0x4b49_5453_4d49_5448;

/// Sample file errors (WAV import/export)
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
    #[error("unsupported channel count: {0}")]
    UnsupportedChannels(u16),
    #[error("unsupported bit depth: {0}")]
    UnsupportedBitDepth(u16),
}

/// One kit sample: encoded nibble pairs plus, when available, the source
/// waveform they were encoded from.
#[derive(Debug, Clone)]
pub struct Sample {
    name: String,
    nibbles: Vec<u8>,
    /// Source PCM at [`TARGET_SAMPLE_RATE`]; present only for samples
    /// encoded from an external waveform
    source: Option<Vec<i16>>,
    volume_db: i32,
    dither_db: Option<i32>,
}

impl Sample {
    /// Wrap nibble bytes read from a ROM bank. Not volume-adjustable.
    pub fn from_nibbles(nibbles: Vec<u8>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nibbles,
            source: None,
            volume_db: 0,
            dither_db: None,
        }
    }

    /// Encode a waveform (signed 16-bit PCM at [`TARGET_SAMPLE_RATE`]).
    /// The source is retained so volume and dither can be re-applied from
    /// it at any time.
    pub fn from_pcm(pcm: Vec<i16>, name: impl Into<String>) -> Self {
        let mut sample = Self {
            name: name.into(),
            nibbles: Vec::new(),
            source: Some(pcm),
            volume_db: 0,
            dither_db: None,
        };
        sample.reencode();
        sample
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Encoded nibble-pair bytes
    pub fn nibbles(&self) -> &[u8] {
        &self.nibbles
    }

    /// Size of the encoded form, for bank capacity accounting
    pub fn length_in_bytes(&self) -> usize {
        self.nibbles.len()
    }

    /// Whether volume/dither adjustment is possible (a source waveform
    /// was retained)
    pub fn can_adjust_volume(&self) -> bool {
        self.source.is_some()
    }

    pub fn volume_db(&self) -> i32 {
        self.volume_db
    }

    pub fn dither_db(&self) -> Option<i32> {
        self.dither_db
    }

    /// Re-encode with a linear gain of `10^(db/20)`. No-op for samples
    /// decoded from ROM.
    pub fn set_volume_db(&mut self, db: i32) {
        if self.source.is_none() {
            tracing::debug!("ignoring volume change for ROM sample {:?}", self.name);
            return;
        }
        self.volume_db = db;
        self.reencode();
    }

    /// Re-encode with triangular dither noise scaled by `10^(db/20)` of
    /// one quantization step. No-op for samples decoded from ROM.
    pub fn set_dither_db(&mut self, db: i32) {
        if self.source.is_none() {
            tracing::debug!("ignoring dither change for ROM sample {:?}", self.name);
            return;
        }
        self.dither_db = Some(db);
        self.reencode();
    }

    /// Expand the encoded form to unsigned 8-bit PCM, exactly as the
    /// hardware plays it (and as WAV export stores it).
    pub fn to_pcm_u8(&self) -> Vec<u8> {
        let mut pcm = Vec::with_capacity(self.nibbles.len() * 2);
        for &byte in &self.nibbles {
            pcm.push((byte & 0xf0) | 8);
            pcm.push((byte << 4) | 8);
        }
        pcm
    }

    fn reencode(&mut self) {
        let Some(source) = &self.source else {
            return;
        };
        let gain = f64::powf(10.0, f64::from(self.volume_db) / 20.0);
        let dither = self
            .dither_db
            .map(|db| f64::powf(10.0, f64::from(db) / 20.0) * f64::from(QUANT_STEP));
        let mut rng = Pcg32::seed_from_u64(DITHER_SEED);

        let mut quantize = |s: i16| -> u8 {
            let mut v = f64::from(s) * gain;
            if let Some(amplitude) = dither {
                // Triangular probability density
                v += (rng.random::<f64>() - rng.random::<f64>()) * amplitude;
            }
            let level = ((v + 32768.0) / f64::from(QUANT_STEP)).floor();
            level.clamp(0.0, 15.0) as u8
        };

        self.nibbles = source
            .chunks_exact(2)
            .map(|pair| (quantize(pair[0]) << 4) | quantize(pair[1]))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unsigned 8-bit PCM -> centered i16, as WAV import produces
    fn pcm_u8_to_i16(pcm: &[u8]) -> Vec<i16> {
        pcm.iter().map(|&s| (i16::from(s) - 128) << 8).collect()
    }

    #[test]
    fn decode_expands_nibbles() {
        let sample = Sample::from_nibbles(vec![0x0f, 0x80], "KCK");
        assert_eq!(sample.to_pcm_u8(), vec![8, 0xf8, 0x88, 8]);
        assert_eq!(sample.length_in_bytes(), 2);
    }

    #[test]
    fn decode_encode_roundtrip_is_exact() {
        let nibbles: Vec<u8> = (0..=255).collect();
        let rom_sample = Sample::from_nibbles(nibbles.clone(), "SNR");
        let pcm = pcm_u8_to_i16(&rom_sample.to_pcm_u8());
        let reencoded = Sample::from_pcm(pcm, "SNR");
        assert_eq!(reencoded.nibbles(), &nibbles[..]);
    }

    #[test]
    fn rom_samples_ignore_adjustment() {
        let mut sample = Sample::from_nibbles(vec![0x12, 0x34], "HAT");
        assert!(!sample.can_adjust_volume());
        sample.set_volume_db(6);
        sample.set_dither_db(-12);
        assert_eq!(sample.nibbles(), &[0x12, 0x34]);
        assert_eq!(sample.volume_db(), 0);
        assert_eq!(sample.dither_db(), None);
    }

    #[test]
    fn volume_rescales_from_source() {
        let pcm: Vec<i16> = (0..2000).map(|i| ((i % 64) as i16 - 32) * 512).collect();
        let mut sample = Sample::from_pcm(pcm.clone(), "BAS");
        let flat = sample.nibbles().to_vec();

        sample.set_volume_db(-20);
        assert_ne!(sample.nibbles(), &flat[..]);

        // Re-applying 0 dB restores the original encoding exactly
        sample.set_volume_db(0);
        assert_eq!(sample.nibbles(), &flat[..]);
        assert!(sample.can_adjust_volume());
    }

    #[test]
    fn dither_is_reproducible() {
        let pcm: Vec<i16> = (0..1000).map(|i| (i as i16).wrapping_mul(31)).collect();
        let mut a = Sample::from_pcm(pcm.clone(), "A");
        let mut b = Sample::from_pcm(pcm, "B");
        a.set_dither_db(0);
        b.set_dither_db(0);
        assert_eq!(a.nibbles(), b.nibbles());
    }

    #[test]
    fn odd_trailing_sample_is_dropped() {
        let sample = Sample::from_pcm(vec![0; 5], "X");
        assert_eq!(sample.length_in_bytes(), 2);
    }
}
