//! Flash-backed storage for calibration and brightness.
//!
//! The record occupies the last erase sector of internal flash: MAGIC,
//! version, the two values, then a CRC32 over the payload. Anything that
//! fails framing, versioning, or range validation loads as defaults and
//! is rewritten on the spot, so corrupted storage never reaches the user.

use crc32fast::Hasher;
use embassy_rp::flash::{Blocking, ERASE_SIZE, Flash};
use embassy_rp::peripherals::FLASH;

use crate::config::ClockConfig;
use crate::error::{Error, Result};
use crate::params::{ParamStore, Params, validate_loaded};

/// Size of the Pico's internal flash.
pub const INTERNAL_FLASH_SIZE: usize = 2 * 1024 * 1024;

const STORAGE_SIZE: usize = ERASE_SIZE;
const MAGIC: u32 = 0x4C43_5052; // 'LCPR'
const VERSION: u16 = 1;
const VERSION_OFFSET: usize = 4;
const CALIBRATION_OFFSET: usize = 6;
const BRIGHTNESS_OFFSET: usize = 8;
const CRC_OFFSET: usize = 12;

/// Parameter store persisted in the last internal-flash sector.
pub struct FlashParams {
    flash: Flash<'static, FLASH, Blocking, INTERNAL_FLASH_SIZE>,
    config: ClockConfig,
}

impl FlashParams {
    #[must_use]
    pub fn new(flash: FLASH, config: ClockConfig) -> Self {
        Self {
            flash: Flash::new_blocking(flash),
            config,
        }
    }

    /// Read the stored record, if it frames and checksums correctly.
    ///
    /// # Errors
    ///
    /// Returns an error only for flash access failures; a malformed record
    /// is `Ok(None)`.
    #[expect(
        clippy::indexing_slicing,
        reason = "All field offsets are inside the statically sized buffer."
    )]
    fn read_record(&mut self) -> Result<Option<Params>> {
        let offset = self.storage_offset();
        let mut buffer = [0u8; STORAGE_SIZE];
        self.flash
            .blocking_read(offset, &mut buffer)
            .map_err(Error::Flash)?;

        if u32::from_le_bytes(buffer[..VERSION_OFFSET].try_into().unwrap_or_default()) != MAGIC {
            return Ok(None);
        }

        let version = u16::from_le_bytes(
            buffer[VERSION_OFFSET..CALIBRATION_OFFSET]
                .try_into()
                .unwrap_or_default(),
        );
        if version != VERSION {
            return Ok(None);
        }

        let crc_stored =
            u32::from_le_bytes(buffer[CRC_OFFSET..CRC_OFFSET + 4].try_into().unwrap_or_default());
        if compute_crc(&buffer[VERSION_OFFSET..CRC_OFFSET]) != crc_stored {
            return Ok(None);
        }

        let calibration = i16::from_le_bytes(
            buffer[CALIBRATION_OFFSET..BRIGHTNESS_OFFSET]
                .try_into()
                .unwrap_or_default(),
        );
        let brightness = buffer[BRIGHTNESS_OFFSET];
        Ok(Some(Params {
            calibration,
            brightness,
        }))
    }

    /// Write the record: erase the sector, then program it.
    ///
    /// # Errors
    ///
    /// Returns an error for flash access failures.
    #[expect(
        clippy::indexing_slicing,
        reason = "All field offsets are inside the statically sized buffer."
    )]
    fn write_record(&mut self, params: &Params) -> Result<()> {
        let offset = self.storage_offset();
        let mut buffer = [0xFFu8; STORAGE_SIZE];
        buffer[..VERSION_OFFSET].copy_from_slice(&MAGIC.to_le_bytes());
        buffer[VERSION_OFFSET..CALIBRATION_OFFSET].copy_from_slice(&VERSION.to_le_bytes());
        buffer[CALIBRATION_OFFSET..BRIGHTNESS_OFFSET]
            .copy_from_slice(&params.calibration.to_le_bytes());
        buffer[BRIGHTNESS_OFFSET] = params.brightness;
        buffer[BRIGHTNESS_OFFSET + 1..CRC_OFFSET].fill(0);

        let crc = compute_crc(&buffer[VERSION_OFFSET..CRC_OFFSET]);
        buffer[CRC_OFFSET..CRC_OFFSET + 4].copy_from_slice(&crc.to_le_bytes());

        self.flash
            .blocking_erase(offset, offset + STORAGE_SIZE as u32)
            .map_err(Error::Flash)?;
        self.flash
            .blocking_write(offset, &buffer)
            .map_err(Error::Flash)?;
        Ok(())
    }

    fn storage_offset(&self) -> u32 {
        let capacity = self.flash.capacity() as u32;
        capacity - STORAGE_SIZE as u32
    }
}

impl ParamStore for FlashParams {
    fn load(&mut self) -> Params {
        let stored = self.read_record().ok().flatten();
        let (params, rewrite) = validate_loaded(stored, &self.config);
        if rewrite {
            self.save(&params);
        }
        params
    }

    fn save(&mut self, params: &Params) {
        // A failed write is accepted data loss; the record is written
        // again on the next mode exit.
        if self.write_record(params).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("parameter save failed");
        }
    }
}

fn compute_crc(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}
