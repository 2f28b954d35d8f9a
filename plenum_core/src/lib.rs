//! View-model engine for threaded deliberation discussions: rebuilds the
//! reply tree from the flat post list the data layer delivers, tracks
//! per-node expansion and locale selection, and positions "nugget" overlays
//! so consecutive annotations never collide.

pub mod layout;
pub mod models;
pub mod nuggets;
pub mod tree;
pub mod view;

pub use layout::{LayoutBus, LayoutChange, LayoutReason};
pub use models::{Post, PublicationState, SentimentCounts, SentimentKind};
pub use nuggets::{AnchorMetrics, NuggetPosition, NuggetRegistry, NUGGET_SPACER};
pub use tree::{build_post_tree, flatten_tree, PostNode};
pub use view::{PostRow, PostsFilter, RowKind, ThreadView};
