//! Editable, persisted appliance parameters.

use crate::config::ClockConfig;

/// Calibration offset and brightness level, persisted as one record.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    /// Rate trim in roughly-ppm units, clamped to the configured limit.
    pub calibration: i16,
    /// Panel brightness level, 0 through the configured maximum.
    pub brightness: u8,
}

impl Params {
    /// Factory values: no rate trim, brightest panel.
    #[must_use]
    pub const fn defaults() -> Self {
        Self {
            calibration: 0,
            brightness: 7,
        }
    }

    /// Both fields forced into their configured legal ranges.
    #[must_use]
    pub fn clamped(self, config: &ClockConfig) -> Self {
        Self {
            calibration: self
                .calibration
                .clamp(-config.calibration_limit, config.calibration_limit),
            brightness: self.brightness.min(config.brightness_max),
        }
    }

    /// Saturating calibration edit; never wraps past the limit.
    pub fn adjust_calibration(&mut self, delta: i16, config: &ClockConfig) {
        self.calibration = self
            .calibration
            .saturating_add(delta)
            .clamp(-config.calibration_limit, config.calibration_limit);
    }

    /// Saturating brightness edit; never wraps past 0 or the maximum.
    pub fn adjust_brightness(&mut self, delta: i8, config: &ClockConfig) {
        self.brightness = self
            .brightness
            .saturating_add_signed(delta)
            .min(config.brightness_max);
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Where calibration and brightness survive power loss.
///
/// Loads return already-validated, range-clamped values; saves cover both
/// fields atomically from this core's perspective. Storage failures are
/// not surfaced here: a bad load degrades to defaults and a failed save is
/// accepted data loss.
pub trait ParamStore {
    fn load(&mut self) -> Params;
    fn save(&mut self, params: &Params);
}

/// Validation applied to a loaded record: missing or out-of-range data
/// becomes clamped defaults. The second value tells the caller to
/// re-persist the cleaned record.
#[must_use]
pub fn validate_loaded(stored: Option<Params>, config: &ClockConfig) -> (Params, bool) {
    match stored {
        Some(params) => {
            let clamped = params.clamped(config);
            (clamped, clamped != params)
        }
        None => (Params::defaults(), true),
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::{Params, validate_loaded};
    use crate::config::ClockConfig;

    #[test]
    fn edits_saturate_at_the_bounds() {
        let config = ClockConfig::DEFAULT;
        let mut params = Params {
            calibration: config.calibration_limit,
            brightness: config.brightness_max,
        };
        params.adjust_calibration(1, &config);
        assert_eq!(params.calibration, config.calibration_limit);
        params.adjust_brightness(1, &config);
        assert_eq!(params.brightness, config.brightness_max);

        params.calibration = -config.calibration_limit;
        params.brightness = 0;
        params.adjust_calibration(-1, &config);
        assert_eq!(params.calibration, -config.calibration_limit);
        params.adjust_brightness(-1, &config);
        assert_eq!(params.brightness, 0);
    }

    #[test]
    fn out_of_range_record_loads_as_clamped_and_wants_a_rewrite() {
        let config = ClockConfig::DEFAULT;
        let stored = Params {
            calibration: 30_000,
            brightness: 200,
        };
        let (params, rewrite) = validate_loaded(Some(stored), &config);
        assert_eq!(params.calibration, config.calibration_limit);
        assert_eq!(params.brightness, config.brightness_max);
        assert!(rewrite);
    }

    #[test]
    fn valid_record_loads_untouched() {
        let config = ClockConfig::DEFAULT;
        let stored = Params {
            calibration: -250,
            brightness: 3,
        };
        let (params, rewrite) = validate_loaded(Some(stored), &config);
        assert_eq!(params, stored);
        assert!(!rewrite);
    }

    #[test]
    fn missing_record_loads_defaults_and_wants_a_rewrite() {
        let (params, rewrite) = validate_loaded(None, &ClockConfig::DEFAULT);
        assert_eq!(params, Params::defaults());
        assert!(rewrite);
    }
}
