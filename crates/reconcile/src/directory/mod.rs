//! Access to the remote workspace directory.

mod memory;
mod pagination;
mod slack;
pub mod traits;

pub use memory::{Call, MemoryDirectory};
pub use pagination::{all_channels, channel_ids_by_name, channels, paginate};
pub use slack::{SlackDirectory, DEFAULT_API_BASE};
pub use traits::{Page, WorkspaceDirectory};

#[cfg(test)]
pub use traits::MockWorkspaceDirectory;
