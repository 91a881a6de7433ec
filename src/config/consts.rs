/// Most items accepted per run from a source that has a checkpoint
pub const DEFAULT_ACCEPT_LIMIT: usize = 100;
/// Most items accepted from a source on its first run
pub const DEFAULT_FIRST_RUN_LIMIT: usize = 10;
/// How far back a source's first run looks
pub const DEFAULT_FIRST_RUN_LOOKBACK_HOURS: i64 = 12;

/// Outbound operations allowed per scheduler window
pub const DEFAULT_OPERATIONS_PER_WINDOW: u32 = 40;
/// Length of the scheduler window in milliseconds
pub const DEFAULT_WINDOW_MS: u64 = 1_000;
/// Pause after a rate-limit rejection that carries no resume hint
pub const DEFAULT_PAUSE_SECS: u64 = 60;

/// Text put in front of every delivered link
pub const DEFAULT_MESSAGE_PREFIX: &str = "@everyone";

/// Public, unauthenticated Bluesky AppView
pub const DEFAULT_BLUESKY_BASE_URL: &str = "https://public.api.bsky.app";
/// Discord REST API root
pub const DEFAULT_DISCORD_BASE_URL: &str = "https://discord.com/api";
/// User agent for feed requests when none is configured
pub const DEFAULT_USER_AGENT: &str = concat!("feedsift/", env!("CARGO_PKG_VERSION"));
