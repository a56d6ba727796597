/*!
 * Core Types
 * Common identifier types used across the runtime
 */

/// Process identifier for an isolate or the executive itself
pub type Pid = u32;

/// Application handle, scoped to a single isolate
///
/// Non-negative when valid. The container assigns it at start and it stays
/// stable for the lifetime of the application.
pub type AppId = i32;

/// Message identifier, assigned at send time and used for request/response
/// correlation
pub type MessageId = u64;

/// Wire sentinel for "no application" in legacy-style payloads
pub const APP_ID_NONE: AppId = -1;
