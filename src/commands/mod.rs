//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod inspect;
pub mod models;
pub mod pack;
pub mod profile;
pub mod utils;

// Re-export main command functions
pub use inspect::{execute_events, execute_goroutine, execute_goroutines, execute_info};
pub use models::{EventsArgs, PackArgs, ProfileArgs};
pub use pack::{execute_pack, validate_pack_args};
pub use profile::{execute_profile, validate_profile_args};
pub use utils::{display_schema, display_version, validate_report_file};
