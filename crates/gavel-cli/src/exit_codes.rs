//! Exit codes are part of the CI contract: build gating keys off them.

pub const SUCCESS: i32 = 0;
pub const CASES_FAILED: i32 = 1; // At least one verdict did not pass
pub const CONFIG_ERROR: i32 = 2; // Suite failed to load or validate
