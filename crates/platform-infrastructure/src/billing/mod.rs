//! Billing adapter (AWS Cost Explorer)

pub mod cost_explorer;

pub use cost_explorer::CostExplorerBilling;
