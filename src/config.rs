//! Process-wide configuration read from the environment.
//!
//! Only one value lives here: the total memory budget the [sizing
//! oracle](crate::sizing) uses to derive `primary_capacity_cap`. It is read
//! from `SILK_HASH_MAXMEM` at most once per process; a malformed value falls
//! back to the default and is logged exactly once via [`log::warn!`].

use std::sync::OnceLock;

/// Name of the environment variable carrying the total memory budget.
pub const MAXMEM_ENV_VAR: &str = "SILK_HASH_MAXMEM";

/// Default total memory budget when the environment variable is unset or
/// unparsable: three times the per-block byte ceiling used in the worked
/// examples.
const DEFAULT_BLOCK_BYTE_CEILING: u64 = 256 * 1024 * 1024;
const DEFAULT_MAXMEM: u64 = 3 * DEFAULT_BLOCK_BYTE_CEILING;

static MAXMEM: OnceLock<u64> = OnceLock::new();

/// Returns the process-wide total memory budget, in bytes.
///
/// The environment variable is only ever read and parsed once; subsequent
/// calls return the cached value, and a malformed value is warned about on
/// only the first call.
pub fn max_memory_bytes() -> u64 {
    *MAXMEM.get_or_init(|| match std::env::var(MAXMEM_ENV_VAR) {
        Ok(raw) => match parse_byte_count(&raw) {
            Some(bytes) => bytes,
            None => {
                log::warn!(
                    "{MAXMEM_ENV_VAR}={raw:?} is not a valid byte count, using default ({DEFAULT_MAXMEM} bytes)"
                );
                DEFAULT_MAXMEM
            }
        },
        Err(_) => DEFAULT_MAXMEM,
    })
}

/// Parses a human-friendly byte count: a plain integer, or an integer
/// immediately followed by a `K`/`M`/`G` suffix (case-insensitive, powers of
/// 1024). Returns `None` for anything else, including empty input, a bare
/// suffix, negative numbers, or overflow.
fn parse_byte_count(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (digits, multiplier) = match raw.as_bytes()[raw.len() - 1] {
        b'k' | b'K' => (&raw[..raw.len() - 1], 1024),
        b'm' | b'M' => (&raw[..raw.len() - 1], 1024 * 1024),
        b'g' | b'G' => (&raw[..raw.len() - 1], 1024 * 1024 * 1024),
        _ => (raw, 1),
    };

    if digits.is_empty() {
        return None;
    }
    let value: u64 = digits.parse().ok()?;
    value.checked_mul(multiplier)
}
