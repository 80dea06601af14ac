use mclog_types::{DecodeParameters, FieldDefinition, Transform};

use crate::raw::RawValue;

/// Full-scale angle count.
const ANGLE_FULL_SCALE: f64 = 65535.0;

/// Apply a field's post-scaling rule to an already scaled value.
#[must_use]
pub fn apply(transform: Transform, scaled: f64, params: &DecodeParameters) -> f64 {
    match transform {
        Transform::Linear => scaled,
        Transform::AngleDegrees => 360.0 * (scaled / ANGLE_FULL_SCALE),
        Transform::ModulationPercent => 100.0 * (scaled / params.modulation_max),
        Transform::PwmDutyPercent => {
            let half = params.half_pwm();
            100.0 * ((scaled - half) / half)
        }
    }
}

/// Second decode phase for one wire field: `raw * scale`, then the
/// field's transform.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn physical_value(field: &FieldDefinition, raw: RawValue, params: &DecodeParameters) -> f64 {
    apply(field.transform, raw.value as f64 * field.scale, params)
}
