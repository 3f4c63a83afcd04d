//! Physics module: constants and pure conversions between depth, ambient
//! pressure and gas partial pressures.
//!
//! This module provides:
//! - Water column constants for salt and fresh water in both unit systems
//! - Depth ↔ ambient pressure conversion (exact and GUE table rounding)
//! - Partial pressure of a gas fraction, PPO2 at depth
//! - Maximum operating depth (MOD), equivalent narcotic depth (END) and
//!   equivalent air depth (EAD)
//!
//! Units conventions:
//! - Imperial depths are feet of water and pressures are ATA
//! - Metric depths are metres of water and pressures are bar
//! - Surface pressure is taken as exactly 1 in both systems
//!
//! Design notes:
//! - Invalid inputs are rejected with [`GasError`], never clamped
//! - Derived depths (MOD/END/EAD) are truncated toward zero to whole units
//!   once float noise is rounded away, which keeps MOD on the shallow side
//! - O2 is treated as narcotic when computing END
//!
//! # Examples
//! ```rust
//! use gue_gas_rs::models::{GasMix, Units, Water};
//! use gue_gas_rs::physics::{depth_to_pressure, max_operating_depth};
//!
//! let bar = depth_to_pressure(30.0, Units::Metric, Water::Salt).unwrap();
//! assert_eq!(bar, 4.0);
//!
//! let ean32 = GasMix::nitrox(0.32).unwrap();
//! let mod_ft = max_operating_depth(&ean32, 1.4, Units::Imperial, Water::Salt).unwrap();
//! assert_eq!(mod_ft, 111.0);
//! ```
//!
//! # Limitations
//! Surface pressure is fixed at sea level; altitude diving is not modelled.
use crate::error::{GasError, GasResult};
use crate::models::{GasMix, Units, Water};

/// Feet of sea water per atmosphere.
pub const FSW_PER_ATA: f64 = 33.0;
/// Feet of fresh water per atmosphere.
pub const FFW_PER_ATA: f64 = 34.0;
/// Metres of sea water per bar.
pub const MSW_PER_BAR: f64 = 10.0;
/// Metres of fresh water per bar.
pub const MFW_PER_BAR: f64 = 10.3;
/// Ambient pressure at the surface (ATA or bar).
pub const SURFACE_PRESSURE: f64 = 1.0;

pub const AIR_O2_FRACTION: f64 = 0.21;
pub const AIR_N2_FRACTION: f64 = 0.79;

pub const DEFAULT_PPO2_LIMIT: f64 = 1.4;

/// Stressed team consumption used for minimum gas (two divers at 0.75 cf/min).
pub const TEAM_SAC_CF_MIN: f64 = 1.5;
/// Metric counterpart of [`TEAM_SAC_CF_MIN`] (two divers at 20 L/min).
pub const TEAM_SAC_L_MIN: f64 = 40.0;
/// Average ascent rate for minimum gas planning.
pub const ASCENT_RATE_FT_MIN: f64 = 10.0;
pub const ASCENT_RATE_M_MIN: f64 = 3.0;

/// Depth of water that adds one unit of pressure for the given units and water.
pub fn depth_per_pressure(units: Units, water: Water) -> f64 {
    match (units, water) {
        (Units::Imperial, Water::Salt) => FSW_PER_ATA,
        (Units::Imperial, Water::Fresh) => FFW_PER_ATA,
        (Units::Metric, Water::Salt) => MSW_PER_BAR,
        (Units::Metric, Water::Fresh) => MFW_PER_BAR,
    }
}

pub(crate) fn check_finite(name: &'static str, value: f64) -> GasResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(GasError::NonFinite { name, value })
    }
}

pub(crate) fn check_positive(name: &'static str, value: f64) -> GasResult<f64> {
    check_finite(name, value)?;
    if value <= 0.0 {
        return Err(GasError::NonPositiveRate { name, value });
    }
    Ok(value)
}

pub(crate) fn check_non_negative(name: &'static str, value: f64) -> GasResult<f64> {
    check_finite(name, value)?;
    if value < 0.0 {
        return Err(GasError::NegativeValue { name, value });
    }
    Ok(value)
}

pub(crate) fn check_depth(depth: f64) -> GasResult<f64> {
    check_finite("Depth", depth)?;
    if depth < 0.0 {
        return Err(GasError::NegativeDepth(depth));
    }
    Ok(depth)
}

pub(crate) fn check_ambient(pressure: f64) -> GasResult<f64> {
    check_finite("Ambient pressure", pressure)?;
    if pressure < SURFACE_PRESSURE {
        return Err(GasError::PressureBelowSurface(pressure));
    }
    Ok(pressure)
}

pub(crate) fn check_fraction(name: &'static str, value: f64) -> GasResult<f64> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(GasError::InvalidFraction {
            name,
            value,
            range: "[0, 1]",
        })
    }
}

/// Ambient pressure at `depth`: one unit at the surface plus one unit per
/// [`depth_per_pressure`] of water.
///
/// Returns ATA for imperial depths (feet) and bar for metric depths (metres).
pub fn depth_to_pressure(depth: f64, units: Units, water: Water) -> GasResult<f64> {
    let depth = check_depth(depth)?;
    Ok(SURFACE_PRESSURE + depth / depth_per_pressure(units, water))
}

/// Inverse of [`depth_to_pressure`].
pub fn pressure_to_depth(pressure: f64, units: Units, water: Water) -> GasResult<f64> {
    let pressure = check_ambient(pressure)?;
    Ok((pressure - SURFACE_PRESSURE) * depth_per_pressure(units, water))
}

/// Ambient pressure rounded to one decimal, as quoted in GUE gas tables.
///
/// Minimum gas is computed from these rounded values so results match the
/// published tables (e.g. 100 ft reads as 4.0 ATA, not 4.03).
pub fn table_ata(depth: f64, units: Units, water: Water) -> GasResult<f64> {
    depth_to_pressure(depth, units, water).map(|p| round_to(p, 1))
}

/// Partial pressure of a gas making up `fraction` of the mix at `ambient` pressure.
pub fn partial_pressure(ambient: f64, fraction: f64) -> GasResult<f64> {
    let ambient = check_ambient(ambient)?;
    let fraction = check_fraction("Gas fraction", fraction)?;
    Ok(ambient * fraction)
}

pub fn ppo2_at_depth(depth: f64, mix: &GasMix, units: Units, water: Water) -> GasResult<f64> {
    let ambient = depth_to_pressure(depth, units, water)?;
    partial_pressure(ambient, mix.o2())
}

/// Deepest depth (whole units, truncated) at which `mix` stays within `ppo2_limit`.
///
/// Fails with [`GasError::PressureBelowSurface`] when the mix already exceeds
/// the limit at the surface.
pub fn max_operating_depth(
    mix: &GasMix,
    ppo2_limit: f64,
    units: Units,
    water: Water,
) -> GasResult<f64> {
    check_positive("PPO2 limit", ppo2_limit)?;
    let ata = check_ambient(ppo2_limit / mix.o2())?;
    Ok(whole_units((ata - SURFACE_PRESSURE) * depth_per_pressure(units, water)))
}

/// Equivalent narcotic depth, treating both N2 and O2 as narcotic.
///
/// The result is truncated toward zero and may be negative for shallow
/// depths on helium-rich mixes.
pub fn equivalent_narcotic_depth(
    depth: f64,
    mix: &GasMix,
    units: Units,
    water: Water,
) -> GasResult<f64> {
    let ata = depth_to_pressure(depth, units, water)?;
    let narcotic_ata = ata * (1.0 - mix.he());
    Ok(whole_units((narcotic_ata - SURFACE_PRESSURE) * depth_per_pressure(units, water)))
}

/// Depth on air giving the same N2 partial pressure as `mix` at `depth`.
pub fn equivalent_air_depth(
    depth: f64,
    mix: &GasMix,
    units: Units,
    water: Water,
) -> GasResult<f64> {
    let ata = depth_to_pressure(depth, units, water)?;
    let ead_ata = ata * (mix.n2() / AIR_N2_FRACTION);
    Ok(whole_units((ead_ata - SURFACE_PRESSURE) * depth_per_pressure(units, water)))
}

/// Truncate a derived depth toward zero after dropping float noise, so that
/// e.g. 20.999999999999996 counts as 21.
fn whole_units(x: f64) -> f64 {
    round_to(x, 9).trunc()
}

/// Round `x` to `digits` decimals (half away from zero).
pub fn round_to(x: f64, digits: i32) -> f64 {
    let p = 10f64.powi(digits);
    (x * p).round() / p
}
