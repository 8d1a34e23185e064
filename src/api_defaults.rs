// Header added to responses served out of the cache when marking is enabled.
pub const X_FROM_CACHE: &str = "X-From-Cache";

// Prefix of the headers that snapshot, on a stored response, the request
// values of the headers listed in its Vary.
pub const X_VARIED_PREFIX: &str = "X-Varied-";

// Upper bound of headers parsed back from a stored response.
pub const MAX_STORED_HEADERS: usize = 128;

// Seconds before an outgoing HTTP exchange is abandoned.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

// Directory under $HOME used when no cache location is configured.
pub const DEFAULT_CACHE_DIR: &str = ".cache/httpcache";

// Configuration file under $HOME.
pub const DEFAULT_CONFIG_PATH: &str = ".config/httpcache/config";
