//! Shared domain model for campaign launches: campaigns, platform launch
//! configs, media, credentials, configuration, and the error taxonomy.

pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use error::{CampaignError, CampaignResult};
pub use types::*;
