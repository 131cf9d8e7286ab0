//! Document-side state: coordinates, edits and the tree store.

pub mod coords;
pub mod edit;
pub mod store;

pub use coords::{PositionEncoding, to_host_position, to_host_range, to_point};
pub use edit::{CoalescedEdit, EditDescriptor, TreeEdit, coalesce};
pub use store::{DocumentId, StoredDocument, SyntaxTree, TreeStore};
