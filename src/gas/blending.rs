use crate::error::{GasError, GasResult};
use crate::models::GasMix;
use crate::physics::{
    AIR_N2_FRACTION, AIR_O2_FRACTION, check_finite, check_non_negative, check_positive,
};
use serde::Serialize;

/// Partial-pressure fill sequence for a trimix (or nitrox) blend.
///
/// Pressures share the unit of `fill_pressure` (psi or bar). The fill order
/// is helium, then oxygen, then air to the final pressure.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FillPlan {
    pub mix: String,
    pub fill_pressure: f64,
    pub helium_to_add: f64,
    pub oxygen_partial_pressure: f64,
    pub nitrox_pressure: f64,
    pub nitrox_fo2: f64,
    pub oxygen_to_add: f64,
    pub air_to_add: f64,
}

/// Pressure of pure O2 to add before topping with air so that `pressure`
/// worth of gas ends up at `target_fo2`.
pub fn oxygen_to_add(target_fo2: f64, pressure: f64) -> GasResult<f64> {
    check_finite("Target O2 fraction", target_fo2)?;
    if !(AIR_O2_FRACTION..=1.0).contains(&target_fo2) {
        return Err(GasError::InvalidFraction {
            name: "Target O2 fraction",
            value: target_fo2,
            range: "[0.21, 1]",
        });
    }
    let pressure = check_non_negative("Fill pressure", pressure)?;
    Ok((target_fo2 - AIR_O2_FRACTION) / AIR_N2_FRACTION * pressure)
}

/// Plan a fill of `mix` to `fill_pressure` by partial pressure.
///
/// Helium goes in first; the rest of the tank is treated as a nitrox blend
/// whose O2 fraction carries all of the mix's oxygen. Mixes whose nitrox
/// portion would need less oxygen than air cannot be made this way.
pub fn trimix_fill_plan(mix: &GasMix, fill_pressure: f64) -> GasResult<FillPlan> {
    let fill_pressure = check_positive("Fill pressure", fill_pressure)?;

    let helium_to_add = mix.he() * fill_pressure;
    let oxygen_partial_pressure = mix.o2() * fill_pressure;
    let nitrox_pressure = fill_pressure - helium_to_add;
    let nitrox_fo2 = oxygen_partial_pressure / nitrox_pressure;

    // Float noise lands just outside [0.21, 1] on air-like nitrox portions
    // (e.g. 21/35) and on heliox (e.g. 7/93).
    if nitrox_fo2 < AIR_O2_FRACTION - 1e-9 {
        return Err(GasError::UnblendableMix {
            mix: mix.label(),
            fo2: nitrox_fo2,
        });
    }
    let nitrox_fo2 = nitrox_fo2.clamp(AIR_O2_FRACTION, 1.0);
    let oxygen = oxygen_to_add(nitrox_fo2, nitrox_pressure)?;
    log::debug!(
        "fill {}: He {helium_to_add} O2 {oxygen:.1} nitrox FO2 {nitrox_fo2:.3}",
        mix.label()
    );

    Ok(FillPlan {
        mix: mix.label(),
        fill_pressure,
        helium_to_add,
        oxygen_partial_pressure,
        nitrox_pressure,
        nitrox_fo2,
        oxygen_to_add: oxygen,
        air_to_add: nitrox_pressure - oxygen,
    })
}
