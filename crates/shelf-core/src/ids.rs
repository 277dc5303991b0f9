//! Identifier utilities.

use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
///
/// UUIDv7 embeds a Unix timestamp (milliseconds) in the first 48 bits, so
/// ids generated later sort lexicographically greater. That keeps list
/// output in creation order without a secondary sort key.
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}
