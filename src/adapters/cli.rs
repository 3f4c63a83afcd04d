use clap::{Parser, Subcommand};
use log::{Level, LevelFilter, Metadata, Record};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};

use crate::error::{AppError, GasError};
use crate::gas::blending::{FillPlan, trimix_fill_plan};
use crate::gas::planner::{
    BottomTime, PlanSummary, RockBottom, bottom_time, gas_used, gue_ascent_profile, minimum_gas,
    plan_summary, rock_bottom, sac_rate, tank_factor, time_to_stop, turn_pressure,
};
use crate::models::{AscentStage, GasMix, GasRule, PlanAssumptions, Tank, Units, Water};
use crate::physics::{
    depth_to_pressure, equivalent_air_depth, equivalent_narcotic_depth, max_operating_depth,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "GUE gas planning calculator — optional JSON output", long_about = None)]
pub struct Args {
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, global = true, value_enum, help = "Unit system (overrides assumptions)")]
    units: Option<Units>,
    #[arg(long, global = true, value_enum, help = "Water type (overrides assumptions)")]
    water: Option<Water>,
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        help = "JSON file with planning assumptions; '-' reads from stdin"
    )]
    assumptions: Option<String>,
    #[arg(
        long,
        global = true,
        value_name = "JSON",
        help = "Inline JSON for planning assumptions (overrides --assumptions)"
    )]
    assumptions_json: Option<String>,
    #[arg(short, long, global = true, help = "Log intermediate values to stderr")]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ambient pressure at depth
    Pressure {
        #[arg(allow_negative_numbers = true)]
        depth: f64,
    },
    /// Gas volume breathed at depth for a number of minutes
    GasUsed {
        #[arg(allow_negative_numbers = true)]
        sac_rate: f64,
        #[arg(allow_negative_numbers = true)]
        depth: f64,
        #[arg(allow_negative_numbers = true)]
        minutes: f64,
    },
    /// Surface consumption rate from a measured segment
    Sac {
        #[arg(allow_negative_numbers = true)]
        volume: f64,
        #[arg(allow_negative_numbers = true)]
        depth: f64,
        #[arg(allow_negative_numbers = true)]
        minutes: f64,
    },
    /// GUE minimum gas for an ascent to the surface or a gas switch
    #[command(alias = "min_gas")]
    MinGas {
        #[arg(allow_negative_numbers = true)]
        depth: f64,
        #[arg(default_value_t = 0.0, allow_negative_numbers = true)]
        switch_depth: f64,
    },
    /// Rock bottom reserve pressure for a tank
    RockBottom {
        tank: String,
        #[arg(allow_negative_numbers = true)]
        depth: Option<f64>,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true, help = "Gas switch depth")]
        switch: f64,
        #[arg(
            long,
            allow_negative_numbers = true,
            help = "Starting pressure (default: the tank's rated pressure)"
        )]
        start: Option<f64>,
        #[arg(
            long = "stage",
            value_name = "DEPTH:MINUTES",
            value_parser = parse_stage,
            help = "Explicit ascent stage; repeat for a multi-level profile"
        )]
        stages: Vec<AscentStage>,
    },
    /// Turn pressure as a fraction of the starting pressure
    Turn {
        #[arg(allow_negative_numbers = true)]
        start: f64,
        #[arg(long, conflicts_with = "rule", allow_negative_numbers = true)]
        fraction: Option<f64>,
        #[arg(long, value_enum, help = "Gas rule to take the fraction from (default: thirds)")]
        rule: Option<GasRule>,
    },
    /// Bottom time available on a full tank
    BottomTime {
        #[arg(allow_negative_numbers = true)]
        depth: f64,
        #[arg(long, default_value = "2xAL80")]
        tank: String,
        #[arg(long, value_enum)]
        rule: Option<GasRule>,
    },
    /// Full gas plan for one depth and tank
    Plan {
        #[arg(allow_negative_numbers = true)]
        depth: f64,
        #[arg(long, default_value = "2xAL80")]
        tank: String,
    },
    /// Maximum operating depth
    Mod {
        #[arg(allow_negative_numbers = true)]
        f_o2: f64,
        #[arg(
            long,
            allow_negative_numbers = true,
            help = "PPO2 limit (default: from assumptions, 1.4)"
        )]
        ppo2: Option<f64>,
    },
    /// Equivalent narcotic depth
    End {
        #[arg(allow_negative_numbers = true)]
        depth: f64,
        #[arg(allow_negative_numbers = true)]
        f_he: f64,
    },
    /// Equivalent air depth
    Ead {
        #[arg(allow_negative_numbers = true)]
        depth: f64,
        #[arg(allow_negative_numbers = true)]
        f_o2: f64,
    },
    /// Show tank specifications
    Tank { tank_name: String },
    /// List the built-in tanks
    Tanks,
    /// Partial-pressure trimix fill plan
    Blend {
        #[arg(allow_negative_numbers = true)]
        f_o2: f64,
        #[arg(default_value_t = 0.0, allow_negative_numbers = true)]
        f_he: f64,
        #[arg(
            long,
            allow_negative_numbers = true,
            help = "Final fill pressure (default: 3000 psi / 200 bar)"
        )]
        pressure: Option<f64>,
    },
}

fn parse_stage(s: &str) -> Result<AscentStage, String> {
    let (depth, minutes) = s
        .split_once(':')
        .ok_or_else(|| format!("expected DEPTH:MINUTES, got '{s}'"))?;
    let depth = depth
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid depth '{depth}': {e}"))?;
    let minutes = minutes
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid minutes '{minutes}': {e}"))?;
    Ok(AscentStage { depth, minutes })
}

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

pub fn init_logging(verbose: bool) -> Result<(), AppError> {
    log::set_logger(&LOGGER).map_err(|e| AppError::Other(e.to_string()))?;
    log::set_max_level(if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });
    Ok(())
}

fn parse_assumptions_doc(doc: &str) -> Result<PlanAssumptions, AppError> {
    serde_json::from_str(doc).map_err(|source| AppError::ParseAssumptionsDoc { source })
}

pub fn load_assumptions(args: &Args) -> Result<PlanAssumptions, AppError> {
    let mut ass = match (&args.assumptions_json, &args.assumptions) {
        (Some(json), _) => serde_json::from_str::<PlanAssumptions>(json)
            .map_err(|source| AppError::ParseAssumptionsJson { source })?,
        (None, Some(path)) if path == "-" => {
            let mut s = String::new();
            io::stdin()
                .read_to_string(&mut s)
                .map_err(|source| AppError::ReadStdin { source })?;
            parse_assumptions_doc(&s)?
        }
        (None, Some(path)) => {
            let s = fs::read_to_string(path).map_err(|source| AppError::ReadFile {
                path: path.clone(),
                source,
            })?;
            parse_assumptions_doc(&s)?
        }
        (None, None) => PlanAssumptions::default(),
    };

    if let Some(units) = args.units {
        ass.units = units;
    }
    if let Some(water) = args.water {
        ass.water = water;
    }
    let ass = ass.normalized();
    ass.validate()?;
    Ok(ass)
}

#[derive(Serialize, Debug, Clone)]
pub struct PressureReport {
    pub depth: f64,
    pub units: Units,
    pub water: Water,
    pub pressure: f64,
}

#[derive(Serialize, Debug, Clone)]
pub struct GasUsedReport {
    pub sac_rate: f64,
    pub depth: f64,
    pub ambient_pressure: f64,
    pub minutes: f64,
    pub volume: f64,
}

#[derive(Serialize, Debug, Clone)]
pub struct SacReport {
    pub volume: f64,
    pub depth: f64,
    pub ambient_pressure: f64,
    pub minutes: f64,
    pub sac_rate: f64,
}

#[derive(Serialize, Debug, Clone)]
pub struct MinGasReport {
    pub depth: f64,
    pub switch_depth: f64,
    pub time_to_stop: u32,
    pub minimum_gas: f64,
}

#[derive(Serialize, Debug, Clone)]
pub struct RockBottomReport {
    pub tank: String,
    pub stages: Vec<AscentStage>,
    #[serde(flatten)]
    pub result: RockBottom,
}

#[derive(Serialize, Debug, Clone)]
pub struct TurnReport {
    pub starting_pressure: f64,
    pub fraction: f64,
    pub turn_pressure: f64,
}

#[derive(Serialize, Debug, Clone)]
pub struct BottomTimeReport {
    pub tank: String,
    pub depth: f64,
    pub gas_rule: GasRule,
    #[serde(flatten)]
    pub result: BottomTime,
}

#[derive(Serialize, Debug, Clone)]
pub struct DepthReport {
    pub quantity: &'static str,
    pub mix: String,
    pub depth: f64,
    pub water: Water,
}

#[derive(Serialize, Debug, Clone)]
pub struct TankReport {
    #[serde(flatten)]
    pub tank: Tank,
    pub tank_factor: f64,
}

#[derive(Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum Report {
    Pressure(PressureReport),
    GasUsed(GasUsedReport),
    Sac(SacReport),
    MinGas(MinGasReport),
    RockBottom(RockBottomReport),
    Turn(TurnReport),
    BottomTime(BottomTimeReport),
    Plan(PlanSummary),
    Depth(DepthReport),
    Tank(TankReport),
    Tanks(Vec<TankReport>),
    Blend(FillPlan),
}

fn tank_report(tank: Tank) -> TankReport {
    let tank_factor = tank_factor(&tank);
    TankReport { tank, tank_factor }
}

pub fn execute(command: &Command, ass: &PlanAssumptions) -> Result<Report, AppError> {
    let (units, water) = (ass.units, ass.water);
    let report = match command {
        Command::Pressure { depth } => Report::Pressure(PressureReport {
            depth: *depth,
            units,
            water,
            pressure: depth_to_pressure(*depth, units, water)?,
        }),
        Command::GasUsed {
            sac_rate,
            depth,
            minutes,
        } => {
            let ambient_pressure = depth_to_pressure(*depth, units, water)?;
            Report::GasUsed(GasUsedReport {
                sac_rate: *sac_rate,
                depth: *depth,
                ambient_pressure,
                minutes: *minutes,
                volume: gas_used(*sac_rate, ambient_pressure, *minutes)?,
            })
        }
        Command::Sac {
            volume,
            depth,
            minutes,
        } => {
            let ambient_pressure = depth_to_pressure(*depth, units, water)?;
            Report::Sac(SacReport {
                volume: *volume,
                depth: *depth,
                ambient_pressure,
                minutes: *minutes,
                sac_rate: sac_rate(*volume, ambient_pressure, *minutes)?,
            })
        }
        Command::MinGas {
            depth,
            switch_depth,
        } => Report::MinGas(MinGasReport {
            depth: *depth,
            switch_depth: *switch_depth,
            time_to_stop: time_to_stop(*depth, *switch_depth, ass)?,
            minimum_gas: minimum_gas(*depth, *switch_depth, ass)?,
        }),
        Command::RockBottom {
            tank,
            depth,
            switch,
            start,
            stages,
        } => {
            let tank = Tank::lookup(tank)?;
            let stages = match (stages.is_empty(), depth) {
                (false, _) => stages.clone(),
                (true, Some(d)) => gue_ascent_profile(*d, *switch, ass)?,
                (true, None) => return Err(GasError::EmptyProfile.into()),
            };
            let start = start.unwrap_or(tank.rated_pressure);
            let result = rock_bottom(&tank, start, &stages, ass)?;
            Report::RockBottom(RockBottomReport {
                tank: tank.name,
                stages,
                result,
            })
        }
        Command::Turn {
            start,
            fraction,
            rule,
        } => {
            let fraction =
                fraction.unwrap_or_else(|| rule.unwrap_or(GasRule::Thirds).fraction());
            Report::Turn(TurnReport {
                starting_pressure: *start,
                fraction,
                turn_pressure: turn_pressure(*start, fraction)?,
            })
        }
        Command::BottomTime { depth, tank, rule } => {
            let tank = Tank::lookup(tank)?;
            let mut ass = ass.clone();
            if let Some(rule) = rule {
                ass.gas_rule = *rule;
            }
            let result = bottom_time(*depth, &tank, &ass)?;
            Report::BottomTime(BottomTimeReport {
                tank: tank.name,
                depth: *depth,
                gas_rule: ass.gas_rule,
                result,
            })
        }
        Command::Plan { depth, tank } => {
            let tank = Tank::lookup(tank)?;
            Report::Plan(plan_summary(*depth, &tank, ass)?)
        }
        Command::Mod { f_o2, ppo2 } => {
            let mix = GasMix::nitrox(*f_o2)?;
            let limit = ppo2.unwrap_or(ass.ppo2_limit);
            Report::Depth(DepthReport {
                quantity: "MOD",
                mix: format!("{} @ {limit} PPO2", mix.label()),
                depth: max_operating_depth(&mix, limit, units, water)?,
                water,
            })
        }
        Command::End { depth, f_he } => {
            // END only depends on helium; any valid O2 share will do.
            let mix = GasMix::with_helium(*f_he)?;
            Report::Depth(DepthReport {
                quantity: "END",
                mix: format!("{}% He", (f_he * 100.0).round()),
                depth: equivalent_narcotic_depth(*depth, &mix, units, water)?,
                water,
            })
        }
        Command::Ead { depth, f_o2 } => {
            let mix = GasMix::nitrox(*f_o2)?;
            Report::Depth(DepthReport {
                quantity: "EAD",
                mix: mix.label(),
                depth: equivalent_air_depth(*depth, &mix, units, water)?,
                water,
            })
        }
        Command::Tank { tank_name } => Report::Tank(tank_report(Tank::lookup(tank_name)?)),
        Command::Tanks => Report::Tanks(Tank::catalog().into_iter().map(tank_report).collect()),
        Command::Blend {
            f_o2,
            f_he,
            pressure,
        } => {
            let mix = GasMix::new(*f_o2, *f_he)?;
            let pressure = pressure.unwrap_or(match units {
                Units::Imperial => 3000.0,
                Units::Metric => 200.0,
            });
            Report::Blend(trimix_fill_plan(&mix, pressure)?)
        }
    };
    Ok(report)
}

fn render_text(out: &Report, units: Units) -> String {
    let d = units.depth_label();
    let v = units.volume_label();
    match out {
        Report::Pressure(r) => format!(
            "Ambient pressure at {} {d} ({}): {:.2} {}",
            r.depth,
            r.water.name(),
            r.pressure,
            match r.units {
                Units::Imperial => "ATA",
                Units::Metric => "bar",
            }
        ),
        Report::GasUsed(r) => format!(
            "Gas used at {} {d} for {} min: {:.1} {v}",
            r.depth, r.minutes, r.volume
        ),
        Report::Sac(r) => format!("SAC rate: {:.2} {v}/min", r.sac_rate),
        Report::MinGas(r) => {
            let switch = if r.switch_depth > 0.0 {
                format!(" with switch at {} {d}", r.switch_depth)
            } else {
                String::new()
            };
            format!(
                "Minimum Gas for {} {d}{switch}: {} {v}",
                r.depth, r.minimum_gas
            )
        }
        Report::RockBottom(r) => format!(
            "Rock bottom on {}: {:.1} {v} ({:.0} {p})\nUsable from {}: {:.0} {p}",
            r.tank,
            r.result.total_volume,
            r.result.reserve_pressure,
            r.result.starting_pressure,
            r.result.usable_pressure,
            p = units.pressure_label()
        ),
        Report::Turn(r) => format!(
            "Turn pressure for {} at {:.4}: {}",
            r.starting_pressure, r.fraction, r.turn_pressure
        ),
        Report::BottomTime(r) => format!(
            "Bottom time on {} at {} {d}: {:.1} min\n  Minimum gas: {} {v} ({} {p})\n  Usable: {} {p}",
            r.tank,
            r.depth,
            r.result.minutes,
            r.result.minimum_gas,
            r.result.minimum_gas_pressure,
            r.result.usable_pressure,
            p = units.pressure_label()
        ),
        Report::Plan(s) => format!(
            "Plan for {} at {} {d} ({}, {:?} rule)\n  Ambient pressure: {:.2}\n  Time to surface: {} min\n  Minimum gas: {} {v}\n  Rock bottom: {:.0} {p}\n  Turn pressure: {} {p}\n  Bottom time: {:.1} min",
            s.tank,
            s.depth,
            s.water.name(),
            s.gas_rule,
            s.ambient_pressure,
            s.time_to_surface,
            s.minimum_gas,
            s.rock_bottom_pressure,
            s.turn_pressure,
            s.bottom_time.minutes,
            p = units.pressure_label()
        ),
        Report::Depth(r) => format!(
            "{} for {} ({}): {} {d}",
            r.quantity,
            r.mix,
            r.water.name(),
            r.depth
        ),
        Report::Tank(t) => render_tank(t),
        Report::Tanks(ts) => ts.iter().map(render_tank).collect::<Vec<_>>().join("\n"),
        Report::Blend(f) => format!(
            "For {} to {}:\n  add He: {:.0}\n  add O2: {:.0}\n  fill with air: {:.0}",
            f.mix, f.fill_pressure, f.helium_to_add, f.oxygen_to_add, f.air_to_add
        ),
    }
}

fn render_tank(t: &TankReport) -> String {
    let u = t.tank.units;
    let factor_unit = match u {
        Units::Imperial => "cf/100psi",
        Units::Metric => "L/bar",
    };
    format!(
        "Tank: {}\n  Rated Volume: {} {}\n  Rated Pressure: {} {}\n  Tank Factor: {} {factor_unit}",
        t.tank.name,
        t.tank.rated_volume,
        u.volume_label(),
        t.tank.rated_pressure,
        u.pressure_label(),
        t.tank_factor
    )
}

pub fn print_output(out: &Report, args: &Args, ass: &PlanAssumptions) -> Result<(), AppError> {
    if args.json {
        let s = serde_json::to_string_pretty(&out)
            .map_err(|source| AppError::SerializeOutput { source })?;
        println!("{}", s);
    } else {
        println!("{}", render_text(out, ass.units));
    }

    Ok(())
}
