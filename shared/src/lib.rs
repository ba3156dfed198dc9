//! Types and constants shared between the GrainTrack relay, the auth client,
//! and the rest of the portal.

pub mod api;
pub mod constants;
pub mod models;

pub use constants::*;
pub use models::{ContractType, OptionType, ParseEnumError, PositionType, StrategyType};
