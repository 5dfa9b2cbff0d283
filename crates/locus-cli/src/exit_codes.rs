//! Exit codes for `locus`.

pub const FOUND: i32 = 0;
pub const NOT_FOUND: i32 = 1; // Lookup completed, nothing matched
pub const ERROR: i32 = 2; // Bad arguments, config or delegate failure
