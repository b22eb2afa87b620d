// Browse view: URL-backed filters over the remote hotel list

pub mod filter_state;
pub mod handlers;

pub use filter_state::{ChipKind, FilterChange, FilterChip, FilterState, BROWSE_PAGE_SIZE};
