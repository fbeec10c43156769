//! Pure engineering formulas quoted by the baseline rules. Everything here is
//! a function of its arguments; model access stays in the rule modules.

pub mod condenser;
pub mod efficiency;
pub mod fans;
pub mod motors;
pub mod plant_counts;
pub mod pumps;
