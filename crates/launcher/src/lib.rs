//! Platform launch orchestration: materializes a campaign as remote
//! resources on each advertising platform and rolls back everything it
//! created when a step fails.

pub mod allocation;
pub mod audit;
pub mod launcher;
pub mod ledger;
pub mod media;
pub mod memory;
pub mod platforms;
pub mod ports;
pub mod registry;
pub mod result;
pub mod saga;
pub mod targeting;
pub mod validation;

pub use audit::{AuditSink, InMemoryAuditSink, LaunchEvent, LaunchEventKind, TracingAuditSink};
pub use launcher::{LaunchServices, PlatformLauncher};
pub use ledger::{ResourceKind, ResourceLedger};
pub use platforms::{ShortVideoLauncher, SocialGraphLauncher};
pub use registry::{LauncherRegistry, PlatformOutcome};
pub use result::{LaunchResult, RollbackResult, ValidationReport};
