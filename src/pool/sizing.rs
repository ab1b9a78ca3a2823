//! Sizing policy for the pool node state machine: how many new connections
//! the pool should start right now.
//!
//! Ported verbatim (variable names translated to snake_case) from
//! `num_connections_to_create` in
//! `boost/mysql/impl/internal/connection_pool/sansio_connection_node.hpp`.

/// `initial <= max`, `current <= max`, `pending <= current` are required;
/// debug builds assert them (matching the source's `BOOST_ASSERT`), release
/// builds saturate instead of panicking.
pub fn num_connections_to_create(
    initial: usize,
    max: usize,
    current: usize,
    pending: usize,
    pending_requests: usize,
) -> usize {
    debug_assert!(initial <= max, "initial ({initial}) must be <= max ({max})");
    debug_assert!(current <= max, "current ({current}) must be <= max ({max})");
    debug_assert!(pending <= current, "pending ({pending}) must be <= current ({current})");

    let required_by_requests = pending_requests.saturating_sub(pending);
    let required_by_min = initial.saturating_sub(current);
    let room = max.saturating_sub(current);

    required_by_requests.max(required_by_min).min(room)
}
