//! Kit banks: layout, scanning and the sample compiler
//!
//! A kit occupies one ROM bank. Layout:
//!
//! ```text
//! 0x00  signature [0x60, 0x40] (empty banks carry [0xff, 0xff])
//! 0x02  15 little-endian end addresses, one per sample slot
//! 0x22  15 instrument names, 3 bytes each
//! 0x52  kit name, 6 bytes
//! 0x5c  forced-loop flags (cleared by the compiler)
//! 0x60  packed sample data
//! ```
//!
//! Sample addresses are virtual: the bank is mapped at 0x4000, so the
//! first sample always starts at 0x4060 — which is why the signature
//! bytes double as the first start address. A slot's nibbles run from the
//! previous slot's end address to its own; `stop <= start` marks an empty
//! slot.

use crate::BANK_SIZE;
use crate::sample::Sample;

// =============================================================================
// Constants
// =============================================================================

/// Sample slots per kit
pub const MAX_SAMPLES: usize = 15;

/// Signature of a populated kit bank
pub const KIT_SIGNATURE: [u8; 2] = [0x60, 0x40];

/// Signature of an empty (never-written) kit bank
pub const EMPTY_SIGNATURE: [u8; 2] = [0xff, 0xff];

/// Offset of the instrument name table
pub const INSTRUMENT_NAME_OFFSET: usize = 0x22;

/// Bytes per instrument name
pub const INSTRUMENT_NAME_SIZE: usize = 3;

/// Offset of the kit name
pub const KIT_NAME_OFFSET: usize = 0x52;

/// Bytes in the kit name
pub const KIT_NAME_SIZE: usize = 6;

/// Forced-loop flag bytes, reset on every compile
const LOOP_FLAGS_OFFSET: usize = 0x5c;

/// Offset of the packed sample data
pub const SAMPLE_DATA_OFFSET: usize = 0x60;

/// Sample payload budget per bank
pub const MAX_SAMPLE_SPACE: usize = BANK_SIZE - SAMPLE_DATA_OFFSET;

/// Virtual address the bank is mapped at
const BANK_BASE_ADDRESS: usize = 0x4000;

// =============================================================================
// Errors
// =============================================================================

/// Kit bank errors
#[derive(Debug, thiserror::Error)]
pub enum KitError {
    /// Sample payload does not fit the bank; nothing was written
    #[error("kit data is {size:#x} bytes, over the {budget:#x} byte budget by {:#x}", .size - .budget)]
    CapacityExceeded { size: usize, budget: usize },
    /// Bank signature is neither a kit nor empty
    #[error("bank is not a kit bank (foreign signature)")]
    ForeignBank,
    /// All 15 slots are occupied
    #[error("kit is full")]
    KitFull,
    #[error("slot index {} out of range (max {})", .0, MAX_SAMPLES - 1)]
    BadSlot(usize),
    #[error("bank slice is {0:#x} bytes (expected {BANK_SIZE:#x})")]
    BadBankSize(usize),
    #[error("kit file is {0:#x} bytes (expected {BANK_SIZE:#x})")]
    BadKitFile(usize),
}

// =============================================================================
// Bank scanning helpers
// =============================================================================

/// Whether a bank starts with the kit signature
pub fn is_kit_bank(bank: &[u8]) -> bool {
    bank.len() >= 2 && bank[0..2] == KIT_SIGNATURE
}

/// Whether a bank starts with the empty-kit signature
pub fn is_empty_kit_bank(bank: &[u8]) -> bool {
    bank.len() >= 2 && bank[0..2] == EMPTY_SIGNATURE
}

/// Copy a `.kit` file (one raw bank dump) into a bank
pub fn import_kit(bank: &mut [u8], data: &[u8]) -> Result<(), KitError> {
    if bank.len() != BANK_SIZE {
        return Err(KitError::BadBankSize(bank.len()));
    }
    if data.len() != BANK_SIZE {
        return Err(KitError::BadKitFile(data.len()));
    }
    bank.copy_from_slice(data);
    Ok(())
}

// =============================================================================
// Kit bank view
// =============================================================================

/// Mutable view of one kit bank inside the ROM buffer
pub struct KitBank<'a> {
    bank: &'a mut [u8],
}

impl<'a> KitBank<'a> {
    /// Wrap a bank slice; it must be exactly [`BANK_SIZE`] bytes
    pub fn new(bank: &'a mut [u8]) -> Result<Self, KitError> {
        if bank.len() != BANK_SIZE {
            return Err(KitError::BadBankSize(bank.len()));
        }
        Ok(Self { bank })
    }

    pub fn is_kit(&self) -> bool {
        is_kit_bank(self.bank)
    }

    pub fn is_empty(&self) -> bool {
        is_empty_kit_bank(self.bank)
    }

    /// Raw bank bytes (the `.kit` file form)
    pub fn as_bytes(&self) -> &[u8] {
        self.bank
    }

    /// Kit name, trailing padding trimmed
    pub fn kit_name(&self) -> String {
        self.bank[KIT_NAME_OFFSET..KIT_NAME_OFFSET + KIT_NAME_SIZE]
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| b as char)
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    /// Write the kit name, upper-cased and space padded to 6 bytes
    pub fn set_kit_name(&mut self, name: &str) {
        let name = name.to_uppercase();
        let mut bytes = name.bytes().chain(std::iter::repeat(b' '));
        for slot in &mut self.bank[KIT_NAME_OFFSET..KIT_NAME_OFFSET + KIT_NAME_SIZE] {
            *slot = bytes.next().unwrap_or(b' ');
        }
    }

    /// Instrument name of a slot (up to 3 characters)
    pub fn instrument_name(&self, slot: usize) -> Result<String, KitError> {
        if slot >= MAX_SAMPLES {
            return Err(KitError::BadSlot(slot));
        }
        let offset = INSTRUMENT_NAME_OFFSET + slot * INSTRUMENT_NAME_SIZE;
        Ok(self.bank[offset..offset + INSTRUMENT_NAME_SIZE]
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| b as char)
            .collect())
    }

    /// Write an instrument name, upper-cased and `-` padded to 3 bytes
    pub fn set_instrument_name(&mut self, slot: usize, name: &str) -> Result<(), KitError> {
        if slot >= MAX_SAMPLES {
            return Err(KitError::BadSlot(slot));
        }
        let offset = INSTRUMENT_NAME_OFFSET + slot * INSTRUMENT_NAME_SIZE;
        let name = name.to_uppercase();
        let mut bytes = name.bytes().chain(std::iter::repeat(b'-'));
        for dst in &mut self.bank[offset..offset + INSTRUMENT_NAME_SIZE] {
            *dst = bytes.next().unwrap_or(b'-');
        }
        Ok(())
    }

    /// Encoded nibble bytes of a slot, or `None` for an empty slot.
    ///
    /// Start and stop come from the adjacent end-address pairs; addresses
    /// outside the bank window are treated as empty rather than trusted.
    pub fn sample_nibbles(&self, slot: usize) -> Option<&[u8]> {
        if slot >= MAX_SAMPLES {
            return None;
        }
        let start = self.read_addr(slot * 2) as usize;
        let stop = self.read_addr(slot * 2 + 2) as usize;
        if stop <= start
            || start < BANK_BASE_ADDRESS
            || stop > BANK_BASE_ADDRESS + BANK_SIZE
        {
            return None;
        }
        Some(&self.bank[start - BANK_BASE_ADDRESS..stop - BANK_BASE_ADDRESS])
    }

    fn read_addr(&self, offset: usize) -> u16 {
        u16::from_le_bytes([self.bank[offset], self.bank[offset + 1]])
    }

    /// Decode every populated slot into a [`Sample`] (named from the
    /// instrument table). Fails on a foreign signature.
    pub fn read_samples(&self) -> Result<[Option<Sample>; MAX_SAMPLES], KitError> {
        if !self.is_kit() && !self.is_empty() {
            return Err(KitError::ForeignBank);
        }
        let mut samples: [Option<Sample>; MAX_SAMPLES] = Default::default();
        if self.is_empty() {
            return Ok(samples);
        }
        for (slot, out) in samples.iter_mut().enumerate() {
            if let Some(nibbles) = self.sample_nibbles(slot) {
                let name = self.instrument_name(slot)?;
                *out = Some(Sample::from_nibbles(nibbles.to_vec(), name));
            }
        }
        Ok(samples)
    }

    /// Initialize the bank body for a fresh kit: zero everything after
    /// the signature, blank the kit name and the instrument names. The
    /// signature itself is only written by a successful [`Self::compile`].
    pub fn format(&mut self) {
        self.bank[2..].fill(0);
        self.bank[KIT_NAME_OFFSET..KIT_NAME_OFFSET + KIT_NAME_SIZE].fill(b' ');
        for slot in 0..MAX_SAMPLES {
            let offset = INSTRUMENT_NAME_OFFSET + slot * INSTRUMENT_NAME_SIZE;
            self.bank[offset..offset + INSTRUMENT_NAME_SIZE].copy_from_slice(&[0, b'-', b'-']);
        }
    }

    /// First unoccupied slot
    pub fn first_free_slot(samples: &[Option<Sample>; MAX_SAMPLES]) -> Option<usize> {
        samples.iter().position(Option::is_none)
    }

    /// Total encoded payload of a slot set
    pub fn total_sample_size(samples: &[Option<Sample>; MAX_SAMPLES]) -> usize {
        samples.iter().flatten().map(Sample::length_in_bytes).sum()
    }

    /// Pack the samples into the bank.
    ///
    /// Writes the kit signature, the cumulative end-address table (`0,0`
    /// for empty slots), the packed nibble data from
    /// [`SAMPLE_DATA_OFFSET`] and zero fill to the bank end, and clears
    /// the forced-loop flags. Returns the per-slot byte lengths.
    ///
    /// The total size is validated first: on [`KitError::CapacityExceeded`]
    /// the bank is byte-identical to before the call.
    pub fn compile(
        &mut self,
        samples: &[Option<Sample>; MAX_SAMPLES],
    ) -> Result<[usize; MAX_SAMPLES], KitError> {
        let mut lengths = [0usize; MAX_SAMPLES];
        for (len, sample) in lengths.iter_mut().zip(samples) {
            *len = sample.as_ref().map_or(0, Sample::length_in_bytes);
        }
        let total: usize = lengths.iter().sum();
        if total > MAX_SAMPLE_SPACE {
            return Err(KitError::CapacityExceeded {
                size: total,
                budget: MAX_SAMPLE_SPACE,
            });
        }

        self.bank[0..2].copy_from_slice(&KIT_SIGNATURE);

        let mut end_addr = (BANK_BASE_ADDRESS + SAMPLE_DATA_OFFSET) as u16;
        for (slot, &len) in lengths.iter().enumerate() {
            end_addr += len as u16;
            let entry = 2 + slot * 2;
            let pair = if len != 0 { end_addr.to_le_bytes() } else { [0, 0] };
            self.bank[entry..entry + 2].copy_from_slice(&pair);
        }

        let mut pos = SAMPLE_DATA_OFFSET;
        for sample in samples.iter().flatten() {
            let nibbles = sample.nibbles();
            self.bank[pos..pos + nibbles.len()].copy_from_slice(nibbles);
            pos += nibbles.len();
        }
        self.bank[pos..].fill(0);

        self.bank[LOOP_FLAGS_OFFSET] = 0;
        self.bank[LOOP_FLAGS_OFFSET + 1] = 0;

        tracing::debug!(
            "compiled kit {:?}: {:#x}/{:#x} bytes",
            self.kit_name(),
            total,
            MAX_SAMPLE_SPACE
        );
        Ok(lengths)
    }

    /// Append a sample to the first free slot and recompile. Formats the
    /// bank first when it is empty. The capacity check runs before any
    /// mutation.
    pub fn add_sample(
        &mut self,
        samples: &mut [Option<Sample>; MAX_SAMPLES],
        sample: Sample,
    ) -> Result<usize, KitError> {
        let slot = Self::first_free_slot(samples).ok_or(KitError::KitFull)?;
        let total = Self::total_sample_size(samples) + sample.length_in_bytes();
        if total > MAX_SAMPLE_SPACE {
            return Err(KitError::CapacityExceeded {
                size: total,
                budget: MAX_SAMPLE_SPACE,
            });
        }
        if self.is_empty() {
            self.format();
        }
        let name = sample.name().to_string();
        self.set_instrument_name(slot, &name)?;
        samples[slot] = Some(sample);
        self.compile(samples)?;
        Ok(slot)
    }

    /// Remove the given slots: every higher slot (and its instrument
    /// name) shifts down one place, slot 14 becomes empty, and the bank
    /// is recompiled. Indices are processed lowest first with renumbering
    /// in between, so multiple simultaneous drops behave as expected.
    pub fn drop_slots(
        &mut self,
        samples: &mut [Option<Sample>; MAX_SAMPLES],
        indices: &[usize],
    ) -> Result<[usize; MAX_SAMPLES], KitError> {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        if let Some(&bad) = sorted.iter().find(|&&i| i >= MAX_SAMPLES) {
            return Err(KitError::BadSlot(bad));
        }

        for (removed, &index) in sorted.iter().enumerate() {
            let index = index - removed;
            for slot in index..MAX_SAMPLES - 1 {
                samples[slot] = samples[slot + 1].take();
                let dst = INSTRUMENT_NAME_OFFSET + slot * INSTRUMENT_NAME_SIZE;
                self.bank
                    .copy_within(dst + INSTRUMENT_NAME_SIZE..dst + 2 * INSTRUMENT_NAME_SIZE, dst);
            }
            samples[MAX_SAMPLES - 1] = None;
            let last = INSTRUMENT_NAME_OFFSET + (MAX_SAMPLES - 1) * INSTRUMENT_NAME_SIZE;
            self.bank[last..last + INSTRUMENT_NAME_SIZE].copy_from_slice(&[0, b'-', b'-']);
        }

        self.compile(samples)
    }
}
