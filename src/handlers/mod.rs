pub mod contributions;
pub mod web;

pub use contributions::{get_contribution, ContributionSummary};
