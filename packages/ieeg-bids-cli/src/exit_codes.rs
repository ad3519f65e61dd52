pub const SUCCESS: i32 = 0;
/// Unreadable or malformed input, unknown sidecar type
pub const INPUT_ERROR: i32 = 1;
/// Writing output failed
pub const EXECUTION_ERROR: i32 = 2;
pub const VALIDATION_FAILED: i32 = 3;
/// Some dataset operations were skipped or failed
pub const PARTIAL_FAILURE: i32 = 4;
