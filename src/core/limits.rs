/*!
 * Runtime Limits
 * Capacity and timing bounds for mailboxes and lifecycle waits
 */

/// Bounded capacity of a per-process mailbox
pub const MAILBOX_CAPACITY: usize = 1024;

/// Maximum encoded message size accepted by the transport
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024; // 64KB

/// Default bound on waiting for a spawned isolate to report initialized
pub const DEFAULT_INIT_TIMEOUT_MS: u64 = 5_000;

/// Default bound on a correlated request/response exchange
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 2_000;
