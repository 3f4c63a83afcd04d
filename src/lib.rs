pub mod adapters;
pub mod error;
pub mod gas;
pub mod models;
pub mod physics;

pub use crate::error::{AppError, GasError, GasResult};
pub use crate::gas::blending::{FillPlan, oxygen_to_add, trimix_fill_plan};
pub use crate::gas::planner::{
    BottomTime, PlanSummary, RockBottom, bottom_time, gas_used, gauge_pressure_for,
    gue_ascent_profile, minimum_gas, plan_summary, pressure_for_volume, rock_bottom, sac_rate,
    tank_factor, time_to_stop, turn_pressure, turn_pressure_for_rule, usable_gas,
    volume_at_pressure, volume_for_gauge_pressure,
};
pub use crate::models::{AscentStage, GasMix, GasRule, PlanAssumptions, Tank, Units, Water};
pub use crate::physics::{
    depth_to_pressure, equivalent_air_depth, equivalent_narcotic_depth, max_operating_depth,
    partial_pressure, ppo2_at_depth, pressure_to_depth, table_ata,
};
