pub mod archive;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod identity;
pub mod layout;
pub mod logging;
pub mod reporter;
pub mod sync;
pub mod transfer;
pub mod util;

pub use error::SyncError;
pub use error::TransferError;
pub use layout::LayoutMode;
pub use reporter::{Reporter, SilentReporter, TracingReporter};
pub use transfer::{CollisionPolicy, TransferOptions, TransferPair, plan, plan_with_env};
