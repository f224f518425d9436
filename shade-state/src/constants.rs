//! Constants that impact state behaviour.

/// The directory name used to distinguish the state database from other
/// databases or flat files in the cache directory.
pub const STATE_DATABASE_KIND: &str = "state";

/// The database format version, incremented each time the on-disk database
/// format has a breaking data format change.
///
/// Databases with other versions are stored in sibling directories, and are
/// never opened.
pub const DATABASE_FORMAT_VERSION: u32 = 1;

/// The number of requests the state service buffers before callers wait.
pub const STATE_BUFFER_BOUND: usize = 32;

/// The name of the sled tree holding spent nullifiers.
pub const NULLIFIERS_TREE: &[u8] = b"nullifiers";

/// The name of the sled tree holding batch outputs, by block anchor.
pub const OUTPUTS_BY_ANCHOR_TREE: &[u8] = b"outputs_by_anchor";

/// The name of the sled tree holding block anchors, by height.
pub const ANCHOR_BY_HEIGHT_TREE: &[u8] = b"anchor_by_height";
