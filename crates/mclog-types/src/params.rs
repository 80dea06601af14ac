use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::TypeError;

/// Default modulation ceiling: `2^16 / sqrt(3) - 200`.
pub const DEFAULT_MODULATION_MAX: f64 = 65536.0 / 1.732_050_807_568_877_2 - 200.0;

/// Sample frequency implied by the legacy `pwmfrq` parameter.
pub const LEGACY_FREQUENCY_HZ: u32 = 8789;

/// PWM maximum for each legacy `pwmfrq` setting (17k6, 8k8, 4k4).
pub const LEGACY_PWM_MAX: [u32; 3] = [4096, 8192, 16348];

/// Parameter keys with a decode meaning.
pub mod keys {
    pub const FREQUENCY: &str = "pwmirqfrq";
    pub const PWM_MAX: &str = "pwmmax";
    pub const MODULATION_MAX: &str = "modmax";
    pub const LEGACY_PWM_FREQUENCY: &str = "pwmfrq";
    pub const VERSION: &str = "version";

    /// Per-entry key carrying a spot-lookup slot index.
    pub const SPOT_INDEX: &str = "si";
    /// Per-entry key carrying the parameter value.
    pub const VALUE: &str = "value";
}

/// Constants for one decode run, fixed once the parameter block is parsed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecodeParameters {
    /// Record rate; every valid record advances time by `1 / frequency_hz`.
    pub frequency_hz: u32,
    /// Full-scale PWM count. Duty fields are centred on half of this.
    pub pwm_max: u32,
    /// Modulation ceiling used to express `ud`/`uq` as a percentage.
    pub modulation_max: f64,
}

impl DecodeParameters {
    /// Elapsed time of the record with the given zero-based index.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn time_of(&self, index: u64) -> f64 {
        index as f64 / f64::from(self.frequency_hz)
    }

    #[must_use]
    pub fn half_pwm(&self) -> f64 {
        f64::from(self.pwm_max) / 2.0
    }
}

/// Slot index → display name for the low-rate spot channel.
///
/// Iteration is in ascending slot order, which is also the column order of
/// the spot-values output.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpotLookup(BTreeMap<u32, String>);

impl SpotLookup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` under `slot`. A later entry for the same slot wins.
    pub fn insert(&mut self, slot: u32, name: impl Into<String>) {
        self.0.insert(slot, name.into());
    }

    #[must_use]
    pub fn get(&self, slot: u32) -> Option<&str> {
        self.0.get(&slot).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, slot: u32) -> bool {
        self.0.contains_key(&slot)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.0.iter().map(|(&slot, name)| (slot, name.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }

    pub fn slots(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.keys().copied()
    }
}

/// The interpreted parameter block: decode constants plus the spot lookup.
///
/// The block is an object of named entries, each itself an object that may
/// carry an `si` slot index and/or a `value`:
///
/// ```json
/// {
///   "version":   { "value": 3 },
///   "pwmirqfrq": { "value": 8789 },
///   "pwmmax":    { "value": 8192 },
///   "vbus":      { "si": 0, "value": 0 },
///   "temp":      { "si": 1 }
/// }
/// ```
///
/// ```text
/// ┌───────────┬─────────────────────────────────────────────────────────┐
/// │ Key       │ Effect                                                  │
/// ├───────────┼─────────────────────────────────────────────────────────┤
/// │ any + si  │ spot lookup slot si → key (except "version")            │
/// │ pwmirqfrq │ record frequency in Hz                                  │
/// │ pwmmax    │ PWM full-scale count                                    │
/// │ modmax    │ modulation ceiling (default 2^16/√3 − 200)              │
/// │ pwmfrq    │ legacy: 0/1/2 → 8789 Hz with pwmmax 4096/8192/16348     │
/// └───────────┴─────────────────────────────────────────────────────────┘
/// ```
///
/// When a legacy `pwmfrq` entry and direct `pwmirqfrq`/`pwmmax` entries are
/// both present, the direct values win.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterBlock {
    pub parameters: DecodeParameters,
    pub spot_lookup: SpotLookup,
}

impl ParameterBlock {
    /// Parse the raw parameter block text.
    ///
    /// # Errors
    ///
    /// - [`TypeError::MalformedJson`] if the text is not valid JSON.
    /// - [`TypeError::MissingRequiredParameter`] if the frequency or PWM
    ///   maximum cannot be resolved.
    pub fn parse(text: &[u8]) -> Result<Self, TypeError> {
        let value: Value = serde_json::from_slice(text).map_err(|source| TypeError::MalformedJson {
            block: "parameter",
            source,
        })?;
        Self::from_value(&value)
    }

    /// Interpret an already-parsed parameter object. A non-object root is
    /// treated as an empty block.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::MissingRequiredParameter`] if the frequency or
    /// PWM maximum cannot be resolved.
    pub fn from_value(value: &Value) -> Result<Self, TypeError> {
        let empty = Map::new();
        let entries = value.as_object().unwrap_or(&empty);

        let mut spot_lookup = SpotLookup::new();
        let mut frequency = None;
        let mut pwm_max = None;
        let mut legacy: Option<(u32, Option<u32>)> = None;
        let mut modulation_max = DEFAULT_MODULATION_MAX;

        for (key, entry) in entries {
            let Some(entry) = entry.as_object() else {
                continue;
            };

            if key != keys::VERSION
                && let Some(slot) = entry.get(keys::SPOT_INDEX).and_then(as_u32)
            {
                spot_lookup.insert(slot, key.as_str());
            }

            let Some(value) = entry.get(keys::VALUE) else {
                continue;
            };
            match key.as_str() {
                keys::FREQUENCY => frequency = as_u32(value),
                keys::PWM_MAX => pwm_max = as_u32(value),
                keys::MODULATION_MAX => {
                    if let Some(m) = value.as_f64() {
                        modulation_max = m;
                    }
                }
                keys::LEGACY_PWM_FREQUENCY => {
                    let pwm = as_u32(value)
                        .and_then(|setting| LEGACY_PWM_MAX.get(setting as usize).copied());
                    legacy = Some((LEGACY_FREQUENCY_HZ, pwm));
                }
                _ => {}
            }
        }

        if let Some((legacy_frequency, legacy_pwm)) = legacy {
            frequency = frequency.filter(|&f| f != 0).or(Some(legacy_frequency));
            pwm_max = pwm_max.filter(|&p| p != 0).or(legacy_pwm);
        }

        let frequency_hz = frequency
            .filter(|&f| f != 0)
            .ok_or(TypeError::MissingRequiredParameter { name: keys::FREQUENCY })?;
        let pwm_max = pwm_max
            .filter(|&p| p != 0)
            .ok_or(TypeError::MissingRequiredParameter { name: keys::PWM_MAX })?;

        Ok(Self {
            parameters: DecodeParameters {
                frequency_hz,
                pwm_max,
                modulation_max,
            },
            spot_lookup,
        })
    }
}

/// Integer parameter values may arrive as JSON integers or floats.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_u32(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && *f >= 0.0 && *f <= f64::from(u32::MAX))
        .map(|f| f as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_parameters() {
        let block = ParameterBlock::parse(
            br#"{"pwmirqfrq":{"value":8000},"pwmmax":{"value":4096},"modmax":{"value":30000.5}}"#,
        )
        .unwrap();
        assert_eq!(block.parameters.frequency_hz, 8000);
        assert_eq!(block.parameters.pwm_max, 4096);
        assert!((block.parameters.modulation_max - 30000.5).abs() < f64::EPSILON);
        assert!(block.spot_lookup.is_empty());
    }

    #[test]
    fn modulation_max_defaults() {
        let block =
            ParameterBlock::parse(br#"{"pwmirqfrq":{"value":8000},"pwmmax":{"value":4096}}"#)
                .unwrap();
        let expected = 65536.0 / 3f64.sqrt() - 200.0;
        assert!((block.parameters.modulation_max - expected).abs() < 1e-9);
    }

    #[test]
    fn legacy_pwm_frequency_settings() {
        for (setting, pwm) in [(0, 4096), (1, 8192), (2, 16348)] {
            let text = format!(r#"{{"pwmfrq":{{"value":{setting}}}}}"#);
            let block = ParameterBlock::parse(text.as_bytes()).unwrap();
            assert_eq!(block.parameters.frequency_hz, 8789);
            assert_eq!(block.parameters.pwm_max, pwm);
        }
    }

    #[test]
    fn legacy_unknown_setting_leaves_pwm_max_unset() {
        let result = ParameterBlock::parse(br#"{"pwmfrq":{"value":7}}"#);
        assert!(matches!(
            result,
            Err(TypeError::MissingRequiredParameter { name: "pwmmax" })
        ));
    }

    #[test]
    fn direct_values_override_legacy() {
        let block = ParameterBlock::parse(
            br#"{"pwmfrq":{"value":1},"pwmirqfrq":{"value":10000},"pwmmax":{"value":2048}}"#,
        )
        .unwrap();
        assert_eq!(block.parameters.frequency_hz, 10000);
        assert_eq!(block.parameters.pwm_max, 2048);
    }

    #[test]
    fn missing_pwm_max() {
        let result = ParameterBlock::parse(br#"{"pwmirqfrq":{"value":8000}}"#);
        assert!(matches!(
            result,
            Err(TypeError::MissingRequiredParameter { name: "pwmmax" })
        ));
    }

    #[test]
    fn missing_frequency() {
        let result = ParameterBlock::parse(br#"{"pwmmax":{"value":8192}}"#);
        assert!(matches!(
            result,
            Err(TypeError::MissingRequiredParameter { name: "pwmirqfrq" })
        ));
    }

    #[test]
    fn zero_frequency_counts_as_missing() {
        let result =
            ParameterBlock::parse(br#"{"pwmirqfrq":{"value":0},"pwmmax":{"value":8192}}"#);
        assert!(matches!(
            result,
            Err(TypeError::MissingRequiredParameter { name: "pwmirqfrq" })
        ));
    }

    #[test]
    fn spot_lookup_from_si_keys() {
        let block = ParameterBlock::parse(
            br#"{
                "version":{"si":9,"value":3},
                "temp":{"si":1},
                "vbus":{"si":0,"value":0},
                "pwmirqfrq":{"value":8000.0},
                "pwmmax":{"value":4096}
            }"#,
        )
        .unwrap();
        let lookup = &block.spot_lookup;
        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.get(0), Some("vbus"));
        assert_eq!(lookup.get(1), Some("temp"));
        assert!(!lookup.contains(9));
        assert_eq!(lookup.names().collect::<Vec<_>>(), ["vbus", "temp"]);
        assert_eq!(block.parameters.frequency_hz, 8000);
    }

    #[test]
    fn malformed_json() {
        assert!(matches!(
            ParameterBlock::parse(b"{\"k\":\"}"),
            Err(TypeError::MalformedJson { block: "parameter", .. })
        ));
    }

    #[test]
    fn time_of_record_index() {
        let p = DecodeParameters {
            frequency_hz: 4,
            pwm_max: 100,
            modulation_max: DEFAULT_MODULATION_MAX,
        };
        assert!((p.time_of(3) - 0.75).abs() < f64::EPSILON);
        assert!((p.half_pwm() - 50.0).abs() < f64::EPSILON);
    }
}
