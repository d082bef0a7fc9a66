//! Computes the three capacity numbers the rest of the table depends on:
//! the initial primary capacity, the primary's hard cap (derived from the
//! total memory budget), and the size of whichever secondary block comes
//! next.

use crate::block::MIN_BLOCK_ENTRIES;
use crate::policy::SecondaryPolicy;
use crate::MAX_BLOCKS;

/// Default block count at which the planner stops appending secondaries
/// and starts rehashing instead.
pub const DEFAULT_REHASH_TRIGGER_COUNT: usize = 4;

/// Bundles the two knobs the sizing oracle and growth planner need beyond
/// raw capacities: how secondary blocks are shaped, and after how many
/// blocks the planner prefers a rehash over another append.
#[derive(Debug, Clone, Copy)]
pub struct Sizing {
    pub(crate) policy: SecondaryPolicy,
    pub(crate) rehash_trigger_count: usize,
}

impl Sizing {
    pub(crate) fn new(policy: SecondaryPolicy, rehash_trigger_count: usize) -> Self {
        Self {
            policy,
            rehash_trigger_count,
        }
    }

    /// Estimated number of entries across all `MAX_BLOCKS` blocks if the
    /// primary had capacity `primary_capacity`, assuming every secondary
    /// ends up no smaller than [`MIN_BLOCK_ENTRIES`] (as it would if it
    /// were ever actually allocated).
    fn total_entries_estimate(&self, primary_capacity: u64) -> u64 {
        let mut total = primary_capacity;
        let mut previous = primary_capacity;
        for i in 0..MAX_BLOCKS - 1 {
            let raw = if i == 0 {
                self.policy.first_secondary(primary_capacity)
            } else {
                self.policy.next_secondary(primary_capacity, previous)
            };
            let floored = raw.max(MIN_BLOCK_ENTRIES);
            total += floored;
            previous = raw;
        }
        total
    }

    /// Derives `primary_capacity_cap`: the largest power-of-two primary
    /// capacity whose estimated total table size fits the memory budget,
    /// floored at [`MIN_BLOCK_ENTRIES`].
    ///
    /// Uses integer arithmetic throughout rather than the floating-point
    /// formulation of the system this table is modelled on (see
    /// DESIGN.md); the result is exact rather than platform-dependent.
    pub(crate) fn primary_capacity_cap(&self, total_budget_bytes: u64, entry_bytes: u64) -> u64 {
        if entry_bytes == 0 {
            return MIN_BLOCK_ENTRIES;
        }
        let budget_entries = total_budget_bytes / entry_bytes;

        let mut candidate = MIN_BLOCK_ENTRIES;
        if self.total_entries_estimate(candidate) > budget_entries {
            return MIN_BLOCK_ENTRIES;
        }
        loop {
            let next = match candidate.checked_mul(2) {
                Some(n) => n,
                None => break,
            };
            if self.total_entries_estimate(next) > budget_entries {
                break;
            }
            candidate = next;
        }
        candidate
    }

    /// Initial primary capacity for a table created with an estimated
    /// entry count of `estimated_count`: `s = (E << 8) / load_factor`,
    /// rounded up to the next power of two, clamped to
    /// `[MIN_BLOCK_ENTRIES, cap]`.
    pub(crate) fn initial_primary_capacity(
        estimated_count: u64,
        load_factor: u8,
        cap: u64,
    ) -> u64 {
        let s = (estimated_count << 8) / load_factor.max(1) as u64;
        let rounded = s.max(1).next_power_of_two();
        rounded.clamp(MIN_BLOCK_ENTRIES, cap.max(MIN_BLOCK_ENTRIES))
    }

    /// Unfloored size of whichever secondary block would come next, given
    /// the table currently holds `block_count` blocks. `block_count >= 1`
    /// always (the primary always exists).
    ///
    /// The result may fall below [`MIN_BLOCK_ENTRIES`]; callers that
    /// decide to append anyway clamp it to the floor themselves. A value
    /// below the floor is itself a signal the planner uses to prefer
    /// rehashing.
    pub(crate) fn next_secondary_capacity_raw(
        &self,
        block_count: usize,
        primary_capacity: u64,
        last_block_capacity: u64,
    ) -> u64 {
        if block_count >= self.rehash_trigger_count {
            return last_block_capacity;
        }
        if block_count == 1 {
            self.policy.first_secondary(primary_capacity)
        } else {
            self.policy
                .next_secondary(primary_capacity, last_block_capacity)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_sizing() -> Sizing {
        Sizing::new(
            SecondaryPolicy::from_raw(crate::policy::DEFAULT_SECONDARY_POLICY).unwrap(),
            DEFAULT_REHASH_TRIGGER_COUNT,
        )
    }

    #[test]
    fn cap_never_falls_below_minimum() {
        let sizing = default_sizing();
        assert_eq!(sizing.primary_capacity_cap(1, 16), MIN_BLOCK_ENTRIES);
    }

    #[test]
    fn cap_grows_with_budget() {
        let sizing = default_sizing();
        let small = sizing.primary_capacity_cap(1_000_000, 12);
        let large = sizing.primary_capacity_cap(1_000_000_000, 12);
        assert!(large >= small);
        assert!(small.is_power_of_two());
        assert!(large.is_power_of_two());
    }

    #[test]
    fn initial_capacity_matches_worked_example() {
        // estimated_count=200, load_factor=185 => s = (200*256)/185 = 276 -> next pow2 = 512
        let cap = Sizing::initial_primary_capacity(200, 185, u64::MAX);
        assert_eq!(cap, 512);
    }

    #[test]
    fn initial_capacity_clamped_to_minimum() {
        let cap = Sizing::initial_primary_capacity(1, 185, u64::MAX);
        assert_eq!(cap, MIN_BLOCK_ENTRIES);
    }

    #[test]
    fn next_secondary_uses_last_block_capacity_past_trigger() {
        let sizing = default_sizing();
        assert_eq!(sizing.next_secondary_capacity_raw(4, 1024, 512), 512);
    }
}
