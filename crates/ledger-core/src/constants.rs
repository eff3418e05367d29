pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const DEFAULT_DIFFICULTY: usize = 2;
pub const MAX_CANDIDATES: usize = 5;
pub const DEFAULT_START_DELAY_MS: u64 = 0;
