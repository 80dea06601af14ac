/// `sqrt(3)`, spelled out so it can live in a const.
const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Rotor-frame currents computed from two phase currents and the rotor
/// angle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DqCurrents {
    pub iq: f64,
    pub id: f64,
}

/// Clarke/Park-style transform of one record's `i1`, `i2` and `angle`.
///
/// ```text
/// ib = (i1 + 2·i2) / √3
/// iq = −i1·sin θ + ib·cos θ
/// id =  i1·cos θ + ib·sin θ        θ = angle in radians
/// ```
///
/// Both outputs come from the same inputs; nothing carries over between
/// records.
#[must_use]
pub fn dq_currents(angle_degrees: f64, i1: f64, i2: f64) -> DqCurrents {
    let ib = (i1 + 2.0 * i2) / SQRT_3;
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    DqCurrents {
        iq: -i1 * sin + ib * cos,
        id: i1 * cos + ib * sin,
    }
}
