//! Language and sandbox configuration constants for EmojiASM.
//!
//! The opcode table in `bytecode` and the defaults below are versioned
//! together: lesson content is authored against one `LANGUAGE_VERSION`.

use std::time::Duration;

/// Bump whenever the opcode table, the word size or any opcode's semantics change.
pub const LANGUAGE_VERSION: u32 = 1;

/// Width of the machine word in bits. All arithmetic wraps at this width.
pub const WORD_BITS: u32 = i64::BITS;

/// Hard capacity of the operand stack, part of the language itself.
///
/// Exceeding it is a `StackOverflow` fault regardless of the budget.
pub const STACK_CAPACITY: usize = 4096;

/// Default instruction budget for one run.
///
/// Generous for any lesson program while still cutting off an infinite
/// loop in a few milliseconds.
pub const DEFAULT_MAX_INSTRUCTIONS: u64 = 100_000;

/// Default wall-clock ceiling, measured from the first instruction fetch.
pub const DEFAULT_TIME_LIMIT_MS: u64 = 250;
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_millis(DEFAULT_TIME_LIMIT_MS);

/// Default operand stack depth a program may use.
pub const DEFAULT_MAX_STACK_DEPTH: usize = 1024;

/// Default ceiling on printed output, in bytes, counting one line break per print.
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 64 * 1024;
