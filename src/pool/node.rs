//! Sans-I/O connection-pool node state machine.
//!
//! Grounded on `sansio_connection_node<Derived>` in
//! `boost/mysql/impl/internal/connection_pool/sansio_connection_node.hpp`.
//! Rust has no CRTP; the "derived implements hooks" shape becomes a plain
//! trait (`NodeHooks`) the node is generic over, called by reference instead
//! of `static_cast<Derived&>(*this)`.

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    Initial,
    ConnectInProgress,
    SleepConnectFailedInProgress,
    ResetInProgress,
    PingInProgress,
    Idle,
    InUse,
    Terminated,
}

impl NodeStatus {
    fn is_pending(self) -> bool {
        !matches!(
            self,
            NodeStatus::Initial | NodeStatus::Idle | NodeStatus::InUse | NodeStatus::Terminated
        )
    }

    fn to_action(self) -> NextConnectionAction {
        match self {
            NodeStatus::ConnectInProgress => NextConnectionAction::Connect,
            NodeStatus::SleepConnectFailedInProgress => NextConnectionAction::SleepConnectFailed,
            NodeStatus::PingInProgress => NextConnectionAction::Ping,
            NodeStatus::ResetInProgress => NextConnectionAction::Reset,
            NodeStatus::Idle | NodeStatus::InUse => NextConnectionAction::IdleWait,
            _ => NextConnectionAction::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextConnectionAction {
    None,
    Connect,
    SleepConnectFailed,
    IdleWait,
    Reset,
    Ping,
}

/// Whether an in-use connection was returned to the pool, and if so whether
/// it needs a reset before becoming idle again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionState {
    None,
    NeedsCollect,
    NeedsCollectWithReset,
}

/// Hooks the pool's surrounding driver implements to maintain counters of
/// idle/pending connections; fired on every status transition that crosses
/// an `idle` or `pending`-subset boundary.
pub trait NodeHooks {
    fn entering_idle(&mut self) {}
    fn exiting_idle(&mut self) {}
    fn entering_pending(&mut self) {}
    fn exiting_pending(&mut self) {}
}

#[derive(Debug)]
pub struct SansioConnectionNode<H: NodeHooks> {
    status: NodeStatus,
    hooks: H,
}

impl<H: NodeHooks> SansioConnectionNode<H> {
    pub fn new(hooks: H) -> Self {
        SansioConnectionNode {
            status: NodeStatus::Initial,
            hooks,
        }
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    fn set_status(&mut self, new_status: NodeStatus) -> NextConnectionAction {
        if new_status == NodeStatus::Idle && self.status != NodeStatus::Idle {
            self.hooks.entering_idle();
        } else if new_status != NodeStatus::Idle && self.status == NodeStatus::Idle {
            self.hooks.exiting_idle();
        }

        if !self.status.is_pending() && new_status.is_pending() {
            self.hooks.entering_pending();
        } else if self.status.is_pending() && !new_status.is_pending() {
            self.hooks.exiting_pending();
        }

        self.status = new_status;
        new_status.to_action()
    }

    pub fn mark_as_in_use(&mut self) {
        debug_assert_eq!(self.status, NodeStatus::Idle);
        self.set_status(NodeStatus::InUse);
    }

    pub fn cancel(&mut self) {
        self.set_status(NodeStatus::Terminated);
    }

    pub fn resume(&mut self, error: Option<&Error>, collection: CollectionState) -> NextConnectionAction {
        match self.status {
            NodeStatus::Initial => self.set_status(NodeStatus::ConnectInProgress),
            NodeStatus::ConnectInProgress => {
                if error.is_some() {
                    self.set_status(NodeStatus::SleepConnectFailedInProgress)
                } else {
                    self.set_status(NodeStatus::Idle)
                }
            }
            NodeStatus::SleepConnectFailedInProgress => self.set_status(NodeStatus::ConnectInProgress),
            NodeStatus::Idle => self.set_status(NodeStatus::PingInProgress),
            NodeStatus::InUse => match collection {
                CollectionState::NeedsCollect => self.set_status(NodeStatus::Idle),
                CollectionState::NeedsCollectWithReset => self.set_status(NodeStatus::ResetInProgress),
                CollectionState::None => NextConnectionAction::IdleWait,
            },
            NodeStatus::PingInProgress | NodeStatus::ResetInProgress => {
                if error.is_some() {
                    self.set_status(NodeStatus::ConnectInProgress)
                } else {
                    self.set_status(NodeStatus::Idle)
                }
            }
            NodeStatus::Terminated => NextConnectionAction::None,
        }
    }
}
