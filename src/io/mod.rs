//! CSV inputs and outputs of a scenario.

pub mod buildings;
pub mod demand;
pub mod table;
