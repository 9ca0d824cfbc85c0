pub mod balance;
pub mod cli;
pub mod data;
pub mod error;
pub mod logging;
pub mod parallel;
pub mod server;

pub use balance::attributes::{Attribute, BalanceWeight, Player, PlayerRatings, PositionGroup, WeightGroup};
pub use balance::report::BalanceReport;
pub use balance::slots::{SlotAssignment, Team};
pub use balance::template::PositionTemplate;
pub use balance::{balance_roster, balance_scenario, BalanceScenario, SearchStrategy};
pub use error::{BalanceError, DataError};
