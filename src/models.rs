use serde::{Deserialize, Serialize};

use crate::error::{GasError, GasResult};
use crate::physics::{
    AIR_N2_FRACTION, AIR_O2_FRACTION, ASCENT_RATE_FT_MIN, ASCENT_RATE_M_MIN, DEFAULT_PPO2_LIMIT,
    TEAM_SAC_CF_MIN, TEAM_SAC_L_MIN, check_fraction, check_non_negative, check_positive,
};

/// Measurement system for depth, pressure and gas volume.
///
/// - `Imperial`: feet, ATA / psi, cubic feet
/// - `Metric`: metres, bar, litres
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Imperial,
    Metric,
}

impl Units {
    pub fn depth_label(self) -> &'static str {
        match self {
            Units::Imperial => "ft",
            Units::Metric => "m",
        }
    }

    pub fn volume_label(self) -> &'static str {
        match self {
            Units::Imperial => "cf",
            Units::Metric => "L",
        }
    }

    pub fn pressure_label(self) -> &'static str {
        match self {
            Units::Imperial => "psi",
            Units::Metric => "bar",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Units::Imperial => "imperial",
            Units::Metric => "metric",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Water {
    #[default]
    Salt,
    Fresh,
}

impl Water {
    pub fn name(self) -> &'static str {
        match self {
            Water::Salt => "salt",
            Water::Fresh => "fresh",
        }
    }
}

/// How much of the gas above the reserve may be spent on the way in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum GasRule {
    #[default]
    All,
    Half,
    Thirds,
}

impl GasRule {
    pub fn divisor(self) -> f64 {
        match self {
            GasRule::All => 1.0,
            GasRule::Half => 2.0,
            GasRule::Thirds => 3.0,
        }
    }

    /// Share of the starting gas a rule allows for the way in.
    pub fn fraction(self) -> f64 {
        1.0 / self.divisor()
    }
}

/// Breathing gas as O2 and He fractions; the remainder is nitrogen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GasMix {
    o2: f64,
    he: f64,
}

fn check_helium(he: f64) -> GasResult<f64> {
    if !he.is_finite() || !(0.0..1.0).contains(&he) {
        return Err(GasError::InvalidFraction {
            name: "He fraction",
            value: he,
            range: "[0, 1)",
        });
    }
    Ok(he)
}

impl GasMix {
    pub fn new(o2: f64, he: f64) -> GasResult<Self> {
        if !o2.is_finite() || o2 <= 0.0 || o2 > 1.0 {
            return Err(GasError::InvalidFraction {
                name: "O2 fraction",
                value: o2,
                range: "(0, 1]",
            });
        }
        let he = check_helium(he)?;
        let total = o2 + he;
        // Allow for the float noise in mixes like 0.21 + 0.79.
        if total > 1.0 + 1e-9 {
            return Err(GasError::MixExceedsWhole(total));
        }
        Ok(Self { o2, he })
    }

    /// Build a mix from whole percentages, e.g. `from_percent(21.0, 35.0)` for 21/35.
    pub fn from_percent(o2_pct: f64, he_pct: f64) -> GasResult<Self> {
        let total = o2_pct + he_pct;
        if total > 100.0 {
            return Err(GasError::MixExceedsWhole(total / 100.0));
        }
        Self::new(o2_pct / 100.0, he_pct / 100.0)
    }

    pub fn air() -> Self {
        Self {
            o2: AIR_O2_FRACTION,
            he: 0.0,
        }
    }

    /// Trimix with `he` helium and air-like O2 (at most 21%) for the rest.
    ///
    /// The helium fraction is checked before the O2 share is derived from it.
    pub fn with_helium(he: f64) -> GasResult<Self> {
        let he = check_helium(he)?;
        Self::new((1.0 - he).min(AIR_O2_FRACTION), he)
    }

    pub fn nitrox(o2: f64) -> GasResult<Self> {
        Self::new(o2, 0.0)
    }

    pub fn o2(&self) -> f64 {
        self.o2
    }

    pub fn he(&self) -> f64 {
        self.he
    }

    pub fn n2(&self) -> f64 {
        (1.0 - self.o2 - self.he).max(0.0)
    }

    pub fn is_air(&self) -> bool {
        self.he == 0.0 && (self.n2() - AIR_N2_FRACTION).abs() < 1e-9
    }

    /// Conventional name: "Air", "EAN32", "Trimix 18/45".
    pub fn label(&self) -> String {
        let o2 = (self.o2 * 100.0).round() as u32;
        let he = (self.he * 100.0).round() as u32;
        if self.is_air() {
            "Air".to_string()
        } else if he == 0 {
            format!("EAN{o2}")
        } else {
            format!("Trimix {o2}/{he}")
        }
    }
}

/// A cylinder (or manifolded doubles).
///
/// `rated_volume` is the gas volume held at `rated_pressure`: cubic feet at
/// psi for imperial tanks, litres at bar for metric tanks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    pub name: String,
    pub rated_volume: f64,
    pub rated_pressure: f64,
    pub units: Units,
}

/// Built-in tank catalog: (name, rated volume, rated pressure, units).
pub const TANK_CATALOG: &[(&str, f64, f64, Units)] = &[
    ("AL80", 77.0, 3000.0, Units::Imperial),
    ("2xAL80", 154.0, 3000.0, Units::Imperial),
    ("AL40", 40.0, 3000.0, Units::Imperial),
    ("2xLP85", 170.0, 2640.0, Units::Imperial),
    ("2xHP100", 200.0, 3442.0, Units::Imperial),
    ("2xHP133", 266.0, 3442.0, Units::Imperial),
    ("12L", 2784.0, 232.0, Units::Metric),
    ("D12", 5568.0, 232.0, Units::Metric),
    ("D7", 4200.0, 300.0, Units::Metric),
];

impl Tank {
    pub fn new(
        name: impl Into<String>,
        rated_volume: f64,
        rated_pressure: f64,
        units: Units,
    ) -> GasResult<Self> {
        for (label, value) in [
            ("Rated volume", rated_volume),
            ("Rated pressure", rated_pressure),
        ] {
            if !value.is_finite() {
                return Err(GasError::NonFinite { name: label, value });
            }
            if value <= 0.0 {
                return Err(GasError::NonPositiveRate { name: label, value });
            }
        }
        Ok(Self {
            name: name.into(),
            rated_volume,
            rated_pressure,
            units,
        })
    }

    /// Look a tank up in [`TANK_CATALOG`] by exact name.
    pub fn lookup(name: &str) -> GasResult<Self> {
        TANK_CATALOG
            .iter()
            .find(|(n, ..)| *n == name)
            .map(|&(n, vol, p, units)| Self {
                name: n.to_string(),
                rated_volume: vol,
                rated_pressure: p,
                units,
            })
            .ok_or_else(|| GasError::UnknownTank {
                name: name.to_string(),
                available: Self::catalog_names().join(", "),
            })
    }

    pub fn catalog() -> Vec<Self> {
        TANK_CATALOG
            .iter()
            .map(|&(n, vol, p, units)| Self {
                name: n.to_string(),
                rated_volume: vol,
                rated_pressure: p,
                units,
            })
            .collect()
    }

    pub fn catalog_names() -> Vec<&'static str> {
        TANK_CATALOG.iter().map(|(n, ..)| *n).collect()
    }

    /// Gas volume per unit of pressure (cf/psi or L/bar).
    pub fn volume_per_pressure(&self) -> f64 {
        self.rated_volume / self.rated_pressure
    }
}

/// One leg of an ascent: time spent around a given depth.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AscentStage {
    pub depth: f64,
    pub minutes: f64,
}

/// Planning conventions used by the gas calculations.
///
/// Unit-dependent values (`sac_rate`, `ascent_rate`) may be left out and are
/// filled for the chosen `units` by [`PlanAssumptions::normalized`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanAssumptions {
    pub units: Units,
    pub water: Water,
    /// Surface consumption used for reserves, per minute at 1 ATA.
    #[serde(alias = "scr")]
    pub sac_rate: Option<f64>,
    /// Depth units per minute.
    pub ascent_rate: Option<f64>,
    pub problem_solving_min: f64,
    pub gas_switch_min: f64,
    /// Extra fraction of the ascent gas kept as a safety margin in rock bottom.
    pub reserve_fraction: f64,
    pub gas_rule: GasRule,
    pub ppo2_limit: f64,
}

impl Default for PlanAssumptions {
    fn default() -> Self {
        Self {
            units: Units::Imperial,
            water: Water::Salt,
            sac_rate: None,
            ascent_rate: None,
            problem_solving_min: 1.0,
            gas_switch_min: 1.0,
            reserve_fraction: 0.0,
            gas_rule: GasRule::All,
            ppo2_limit: DEFAULT_PPO2_LIMIT,
        }
    }
}

impl PlanAssumptions {
    pub fn metric() -> Self {
        Self {
            units: Units::Metric,
            ..Default::default()
        }
    }

    pub fn normalized(mut self) -> Self {
        if self.sac_rate.is_none() {
            self.sac_rate = Some(self.default_sac_rate());
        }
        if self.ascent_rate.is_none() {
            self.ascent_rate = Some(self.default_ascent_rate());
        }
        self
    }

    /// Reject conventions no plan can use: negative times, non-positive
    /// rates or PPO2 limit, and a reserve margin outside `[0, 1]`.
    pub fn validate(&self) -> GasResult<()> {
        if let Some(sac) = self.sac_rate {
            check_positive("SAC rate", sac)?;
        }
        if let Some(rate) = self.ascent_rate {
            check_positive("Ascent rate", rate)?;
        }
        check_non_negative("Problem-solving time", self.problem_solving_min)?;
        check_non_negative("Gas switch time", self.gas_switch_min)?;
        check_fraction("Reserve fraction", self.reserve_fraction)?;
        check_positive("PPO2 limit", self.ppo2_limit)?;
        Ok(())
    }

    pub fn sac_rate(&self) -> f64 {
        self.sac_rate.unwrap_or_else(|| self.default_sac_rate())
    }

    pub fn ascent_rate(&self) -> f64 {
        self.ascent_rate
            .unwrap_or_else(|| self.default_ascent_rate())
    }

    fn default_sac_rate(&self) -> f64 {
        match self.units {
            Units::Imperial => TEAM_SAC_CF_MIN,
            Units::Metric => TEAM_SAC_L_MIN,
        }
    }

    fn default_ascent_rate(&self) -> f64 {
        match self.units {
            Units::Imperial => ASCENT_RATE_FT_MIN,
            Units::Metric => ASCENT_RATE_M_MIN,
        }
    }
}
