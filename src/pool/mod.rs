//! The sans-I/O connection-pool node state machine. The pool's own timers,
//! admission control, and channel plumbing are external collaborators.

mod node;
mod sizing;

pub use node::{CollectionState, NextConnectionAction, NodeHooks, NodeStatus, SansioConnectionNode};
pub use sizing::num_connections_to_create;
