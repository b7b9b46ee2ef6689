/// Identifier of the repository that always exists after startup.
pub const DEFAULT_REPOSITORY_ID: &str = "default";

/// Identifier of the collection that always exists after startup.
pub const DEFAULT_COLLECTION_ID: &str = "default";

/// Display name given to the default repository and collection.
pub const DEFAULT_NAMESPACE_NAME: &str = "default";

/// How long an upload reservation stays in the staging store.
pub const STAGING_TTL_SECS: u64 = 60 * 60;

/// Lifetime of a signed read URL.
pub const SIGNED_URL_TTL_SECS: u64 = 15 * 60;

/// Prefix of generated repository identifiers.
pub const REPOSITORY_ID_PREFIX: &str = "di_";

/// Prefix of generated collection identifiers.
pub const COLLECTION_ID_PREFIX: &str = "bi_";

/// Prefix of generated file identifiers.
pub const FILE_ID_PREFIX: &str = "v1-";

/// Number of random characters following a namespace identifier prefix.
pub const NAMESPACE_ID_RANDOM_LEN: usize = 8;

/// Root prefix of every staging store key.
pub const STAGING_KEY_ROOT: &str = "media_storage";

/// Longest repository, collection or file identifier accepted from callers.
pub const MAX_IDENTIFIER_LEN: usize = 128;
