use crate::error::{GasError, GasResult};
use crate::models::{AscentStage, GasRule, PlanAssumptions, Tank, Units, Water};
use crate::physics::{
    check_ambient, check_depth, check_finite, check_fraction, check_non_negative, check_positive,
    depth_to_pressure, round_to, table_ata,
};
use serde::Serialize;

/// Gas reserve needed to bring the team up from depth.
///
/// Fields:
/// - `ascent_gas`: volume breathed across the ascent profile
/// - `safety_margin`: extra volume from `reserve_fraction`
/// - `total_volume`: `ascent_gas + safety_margin`
/// - `reserve_pressure`: `total_volume` expressed as tank pressure
/// - `starting_pressure`: pressure the calculation was checked against
/// - `usable_pressure`: `starting_pressure - reserve_pressure`
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RockBottom {
    pub ascent_gas: f64,
    pub safety_margin: f64,
    pub total_volume: f64,
    pub reserve_pressure: f64,
    pub starting_pressure: f64,
    pub usable_pressure: f64,
}

/// Bottom time available on a tank once minimum gas is held back.
///
/// `minimum_gas_pressure` and `usable_pressure` are gauge readings in the
/// tank's units; `usable_volume` is the gas behind `usable_pressure`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BottomTime {
    pub ata: f64,
    pub tank_factor: f64,
    pub minimum_gas: f64,
    pub minimum_gas_pressure: f64,
    pub usable_pressure: f64,
    pub usable_volume: f64,
    pub minutes: f64,
}

/// Everything a team briefs for one depth and tank.
#[derive(Serialize, Debug, Clone)]
pub struct PlanSummary {
    pub tank: String,
    pub depth: f64,
    pub units: Units,
    pub water: Water,
    pub gas_rule: GasRule,
    pub ambient_pressure: f64,
    pub time_to_surface: u32,
    pub minimum_gas: f64,
    pub rock_bottom_pressure: f64,
    pub turn_pressure: f64,
    pub bottom_time: BottomTime,
}

fn check_duration(minutes: f64) -> GasResult<f64> {
    check_finite("Duration", minutes)?;
    if minutes < 0.0 {
        return Err(GasError::NegativeDuration(minutes));
    }
    Ok(minutes)
}

fn check_units(tank: &Tank, ass: &PlanAssumptions) -> GasResult<()> {
    if tank.units != ass.units {
        return Err(GasError::UnitsMismatch {
            tank: tank.name.clone(),
            tank_units: tank.units.name(),
            plan_units: ass.units.name(),
        });
    }
    Ok(())
}

/// Gas volume breathed at `pressure` for `duration` minutes.
///
/// `sac_rate` is volume per minute at the surface; the result is in the same
/// volume unit. A zero duration yields zero.
pub fn gas_used(sac_rate: f64, pressure: f64, duration: f64) -> GasResult<f64> {
    let sac_rate = check_positive("SAC rate", sac_rate)?;
    let pressure = check_ambient(pressure)?;
    let duration = check_duration(duration)?;
    Ok(sac_rate * pressure * duration)
}

/// Surface consumption rate from a measured segment: volume / pressure / minutes.
pub fn sac_rate(volume_consumed: f64, pressure: f64, minutes: f64) -> GasResult<f64> {
    let volume_consumed = check_non_negative("Volume consumed", volume_consumed)?;
    let pressure = check_ambient(pressure)?;
    check_finite("Duration", minutes)?;
    if minutes <= 0.0 {
        return Err(GasError::NonPositiveDuration(minutes));
    }
    Ok(volume_consumed / pressure / minutes)
}

/// Whole minutes to ascend from `depth` to the surface or to a gas switch.
///
/// Ascent time at the planned rate, plus time to solve the problem at depth,
/// plus time for the switch when `switch_depth > 0`. Truncated to whole
/// minutes; [`GasError::TimeOutOfRange`] when that does not fit a `u32`.
pub fn time_to_stop(depth: f64, switch_depth: f64, ass: &PlanAssumptions) -> GasResult<u32> {
    ass.validate()?;
    let depth = check_depth(depth)?;
    let switch_depth = check_depth(switch_depth)?;
    if switch_depth > depth {
        return Err(GasError::SwitchDeeperThanDepth {
            depth,
            switch_depth,
        });
    }
    let rate = check_positive("Ascent rate", ass.ascent_rate())?;
    let mut minutes = (depth - switch_depth) / rate + ass.problem_solving_min;
    if switch_depth > 0.0 {
        minutes += ass.gas_switch_min;
    }
    let minutes = minutes.trunc();
    if minutes > f64::from(u32::MAX) {
        return Err(GasError::TimeOutOfRange(minutes));
    }
    Ok(minutes as u32)
}

/// GUE minimum gas: consumption × average table ATA × time to stop.
///
/// Rounded half up to a whole volume unit (cubic feet or litres).
pub fn minimum_gas(depth: f64, switch_depth: f64, ass: &PlanAssumptions) -> GasResult<f64> {
    let c = check_positive("SAC rate", ass.sac_rate())?;
    let t = time_to_stop(depth, switch_depth, ass)?;
    let a = (table_ata(depth, ass.units, ass.water)? + table_ata(switch_depth, ass.units, ass.water)?)
        / 2.0;
    let mg = c * a * f64::from(t);
    log::debug!("minimum gas: consumption={c} average_ata={a} time={t} -> {mg}");
    Ok((mg + 0.5).floor())
}

/// Single-stage GUE ascent: the mean depth between `depth` and the switch,
/// held for [`time_to_stop`] minutes.
pub fn gue_ascent_profile(
    depth: f64,
    switch_depth: f64,
    ass: &PlanAssumptions,
) -> GasResult<Vec<AscentStage>> {
    let minutes = time_to_stop(depth, switch_depth, ass)?;
    Ok(vec![AscentStage {
        depth: (depth + switch_depth) / 2.0,
        minutes: f64::from(minutes),
    }])
}

/// Rock bottom for `tank` starting at `starting_pressure`.
///
/// Sums `sac_rate × ambient pressure × minutes` over each stage of the
/// ascent profile, adds `reserve_fraction` of that as a margin and converts
/// the total to tank pressure. The assumptions supply the SAC rate, the
/// margin, the units and the water type.
///
/// Returns [`GasError::InsufficientGas`] when the reserve alone exceeds the
/// starting pressure.
pub fn rock_bottom(
    tank: &Tank,
    starting_pressure: f64,
    stages: &[AscentStage],
    ass: &PlanAssumptions,
) -> GasResult<RockBottom> {
    ass.validate()?;
    check_units(tank, ass)?;
    let starting_pressure = check_positive("Starting pressure", starting_pressure)?;
    let sac = check_positive("SAC rate", ass.sac_rate())?;
    let reserve_fraction = check_fraction("Reserve fraction", ass.reserve_fraction)?;
    if stages.is_empty() {
        return Err(GasError::EmptyProfile);
    }

    let mut ascent_gas = 0.0;
    for stage in stages {
        let ambient = depth_to_pressure(stage.depth, ass.units, ass.water)?;
        ascent_gas += gas_used(sac, ambient, stage.minutes)?;
    }
    let safety_margin = ascent_gas * reserve_fraction;
    let total_volume = ascent_gas + safety_margin;
    let reserve_pressure = pressure_for_volume(tank, total_volume)?;
    log::debug!(
        "rock bottom on {}: ascent_gas={ascent_gas:.2} margin={safety_margin:.2} reserve={reserve_pressure:.1}",
        tank.name
    );

    if reserve_pressure > starting_pressure {
        log::warn!(
            "{} at {starting_pressure} cannot cover a reserve of {reserve_pressure:.1}",
            tank.name
        );
        return Err(GasError::InsufficientGas {
            required: reserve_pressure,
            available: starting_pressure,
        });
    }

    Ok(RockBottom {
        ascent_gas,
        safety_margin,
        total_volume,
        reserve_pressure,
        starting_pressure,
        usable_pressure: starting_pressure - reserve_pressure,
    })
}

/// Fractional threshold of the starting pressure, rounded to two decimals.
///
/// `turn_pressure(200.0, 1.0 / 3.0)` gives `66.67`.
pub fn turn_pressure(starting_pressure: f64, fraction: f64) -> GasResult<f64> {
    let starting_pressure = check_positive("Starting pressure", starting_pressure)?;
    check_finite("Turn fraction", fraction)?;
    if fraction <= 0.0 || fraction > 1.0 {
        return Err(GasError::InvalidFraction {
            name: "Turn fraction",
            value: fraction,
            range: "(0, 1]",
        });
    }
    Ok(round_to(starting_pressure * fraction, 2))
}

/// Gas above the reserve that the rule allows for the way in.
pub fn usable_gas(current_pressure: f64, reserve_pressure: f64, rule: GasRule) -> GasResult<f64> {
    let current = check_positive("Current pressure", current_pressure)?;
    let reserve_pressure = check_non_negative("Reserve pressure", reserve_pressure)?;
    if reserve_pressure > current {
        return Err(GasError::ReserveExceedsPressure {
            reserve: reserve_pressure,
            current,
        });
    }
    Ok((current - reserve_pressure) / rule.divisor())
}

/// Gauge reading at which to turn: the starting pressure less the usable share.
pub fn turn_pressure_for_rule(
    starting_pressure: f64,
    reserve_pressure: f64,
    rule: GasRule,
) -> GasResult<f64> {
    let usable = usable_gas(starting_pressure, reserve_pressure, rule)?;
    Ok(starting_pressure - usable)
}

/// GUE tank factor.
///
/// Imperial tanks: cubic feet per 100 psi, rounded to the nearest 0.5.
/// Metric tanks: litres per bar, i.e. the water capacity.
pub fn tank_factor(tank: &Tank) -> f64 {
    match tank.units {
        Units::Imperial => (tank.volume_per_pressure() * 100.0 * 2.0).round() / 2.0,
        Units::Metric => tank.volume_per_pressure(),
    }
}

pub fn volume_at_pressure(tank: &Tank, pressure: f64) -> GasResult<f64> {
    let pressure = check_non_negative("Tank pressure", pressure)?;
    Ok(pressure * tank.volume_per_pressure())
}

pub fn pressure_for_volume(tank: &Tank, volume: f64) -> GasResult<f64> {
    let volume = check_non_negative("Gas volume", volume)?;
    Ok(volume / tank.volume_per_pressure())
}

/// Gauge pressure for `volume` using a tank factor, in whole gauge steps.
///
/// Imperial readings step by 100 psi, metric readings by 10 bar; partial
/// steps are dropped.
pub fn gauge_pressure_for(tank_factor: f64, volume: f64, units: Units) -> GasResult<f64> {
    let tf = check_positive("Tank factor", tank_factor)?;
    check_finite("Gas volume", volume)?;
    Ok(match units {
        Units::Imperial => (volume / tf).trunc() * 100.0,
        Units::Metric => (volume / tf / 10.0).trunc() * 10.0,
    })
}

/// Volume behind a gauge reading, using a tank factor.
pub fn volume_for_gauge_pressure(tank_factor: f64, pressure: f64, units: Units) -> GasResult<f64> {
    let tf = check_positive("Tank factor", tank_factor)?;
    check_finite("Tank pressure", pressure)?;
    Ok(match units {
        Units::Imperial => pressure * tf / 100.0,
        Units::Metric => pressure * tf,
    })
}

/// Minutes at `depth` on a full `tank` before the rule's share is spent.
///
/// Minimum gas for a direct ascent is held back as a gauge reading; the
/// rule's share of what remains is converted to volume and divided by the
/// consumption at the table ATA.
pub fn bottom_time(depth: f64, tank: &Tank, ass: &PlanAssumptions) -> GasResult<BottomTime> {
    ass.validate()?;
    check_units(tank, ass)?;
    let sac = check_positive("SAC rate", ass.sac_rate())?;
    let ata = table_ata(depth, ass.units, ass.water)?;
    let tf = tank_factor(tank);
    let mg = minimum_gas(depth, 0.0, ass)?;
    let mg_pressure = gauge_pressure_for(tf, mg, ass.units)?;
    let usable = usable_gas(tank.rated_pressure, mg_pressure, ass.gas_rule)?;
    let usable_volume = volume_for_gauge_pressure(tf, usable, ass.units)?;
    let minutes = usable_volume / (sac * ata);
    log::debug!(
        "bottom time on {} at {depth}: usable={usable} ({usable_volume:.1}) -> {minutes:.1} min",
        tank.name
    );

    Ok(BottomTime {
        ata,
        tank_factor: tf,
        minimum_gas: mg,
        minimum_gas_pressure: mg_pressure,
        usable_pressure: usable,
        usable_volume,
        minutes,
    })
}

/// Compute a [`PlanSummary`] for a direct ascent from `depth` on a full `tank`.
pub fn plan_summary(depth: f64, tank: &Tank, ass: &PlanAssumptions) -> GasResult<PlanSummary> {
    let ambient_pressure = depth_to_pressure(depth, ass.units, ass.water)?;
    let time_to_surface = time_to_stop(depth, 0.0, ass)?;
    let profile = gue_ascent_profile(depth, 0.0, ass)?;
    let rb = rock_bottom(tank, tank.rated_pressure, &profile, ass)?;
    let bt = bottom_time(depth, tank, ass)?;
    let turn = turn_pressure_for_rule(tank.rated_pressure, bt.minimum_gas_pressure, ass.gas_rule)?;
    log::info!(
        "plan for {} at {depth} {}: turn at {turn}",
        tank.name,
        ass.units.depth_label()
    );

    Ok(PlanSummary {
        tank: tank.name.clone(),
        depth,
        units: ass.units,
        water: ass.water,
        gas_rule: ass.gas_rule,
        ambient_pressure,
        time_to_surface,
        minimum_gas: bt.minimum_gas,
        rock_bottom_pressure: rb.reserve_pressure,
        turn_pressure: turn,
        bottom_time: bt,
    })
}
