/// Router Module Index
///
/// Routes are split by access level so the auth layer is applied once per module
/// instead of per handler.

/// Routes open to any client.
pub mod public;

/// Routes behind the auth gate. Every handler here receives a resolved `Identity`.
pub mod authenticated;
