//! Global constants used throughout the viewdigest codebase.
//!
//! This module contains the naming conventions, separators, and sizing
//! defaults shared by the tree builder, the digest computer, and the
//! lookup layer. Defining them centrally keeps the digest format in one
//! place: changing any of these values changes every digest produced.

/// Path segment that marks a partial reference (`articles/_comment`).
///
/// Replacing it with `/` yields the logical name used for lookup.
pub const PARTIAL_MARKER: &str = "/_";

/// Filename prefix that marks a partial template on disk.
pub const PARTIAL_PREFIX: char = '_';

/// Token that marks a dynamically generated (interpolated) template name.
///
/// Names containing it can never be resolved, so no error is logged for them.
pub const DYNAMIC_NAME_TOKEN: char = '#';

/// Separator joining a template's source with its composed child digests,
/// and joining child digests with each other.
pub const DIGEST_SEPARATOR: &str = "-";

/// Contribution of a child that is already on the active digest stack.
pub const CYCLE_MARKER: &str = "false";

/// Separator joining the parts of a top-level cache key.
pub const CACHE_KEY_SEPARATOR: &str = ".";

/// Default number of lock stripes guarding digest computation.
///
/// Must be a power of two so a stripe can be selected with a mask.
pub const DEFAULT_LOCK_STRIPES: usize = 64;

/// Default request format used by the CLI when none is given.
pub const DEFAULT_FORMAT: &str = "html";

/// Handler whose templates are scanned by the built-in render tracker.
pub const DEFAULT_TRACKED_HANDLER: &str = "erb";

/// Name of the project-local configuration file.
pub const CONFIG_FILE_NAME: &str = "viewdigest.toml";

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "VIEWDIGEST_CONFIG";
