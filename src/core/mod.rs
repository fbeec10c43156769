pub mod access;
pub mod compare;
pub mod formulas;
pub mod rules;
pub mod system_type;
pub mod units;
