//! The small domain of secondary-block shape decisions, represented as an
//! explicit enum rather than the magic integers `{-4,-3,-2,-1,0,k>=1}` the
//! original protocol uses on the wire of its own configuration.

use crate::error::{Error, Result};

/// Default policy when the caller does not specify one: original policy
/// value `-3`.
pub const DEFAULT_SECONDARY_POLICY: i32 = -3;

/// How the capacities of secondary blocks are derived from the primary
/// block's capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryPolicy {
    /// `-1`: each secondary halves the one before it.
    EachHalvesThePrevious,
    /// `-2`: first secondary is a quarter of the primary; the rest keep
    /// halving.
    FirstQuarterThenHalving,
    /// `-3` (default): first secondary is half the primary; every
    /// subsequent secondary is a quarter of the primary.
    FirstHalfThenQuarter,
    /// `-4`: first secondary is a quarter of the primary; every subsequent
    /// secondary is an eighth of the primary.
    FirstQuarterThenEighth,
    /// `0`: every secondary equals the primary's capacity.
    AllEqualPrimary,
    /// `k >= 1`: every secondary is `primary_capacity >> k`.
    AllShiftedPrimary(u32),
}

impl SecondaryPolicy {
    pub(crate) fn from_raw(raw: i32) -> Result<Self> {
        match raw {
            -1 => Ok(Self::EachHalvesThePrevious),
            -2 => Ok(Self::FirstQuarterThenHalving),
            -3 => Ok(Self::FirstHalfThenQuarter),
            -4 => Ok(Self::FirstQuarterThenEighth),
            0 => Ok(Self::AllEqualPrimary),
            k if k >= 1 => Ok(Self::AllShiftedPrimary(k as u32)),
            _ => Err(Error::bad_argument(
                "secondary_policy must be -4..=-1, 0, or a positive shift",
            )),
        }
    }

    /// Size of the first secondary block (block index 1), given the
    /// primary's capacity.
    pub(crate) fn first_secondary(&self, primary_capacity: u64) -> u64 {
        match self {
            Self::EachHalvesThePrevious => primary_capacity / 2,
            Self::FirstQuarterThenHalving => primary_capacity / 4,
            Self::FirstHalfThenQuarter => primary_capacity / 2,
            Self::FirstQuarterThenEighth => primary_capacity / 4,
            Self::AllEqualPrimary => primary_capacity,
            Self::AllShiftedPrimary(k) => primary_capacity >> k,
        }
    }

    /// Size of the secondary block that follows `previous_secondary`,
    /// given the primary's capacity. Only ever called for secondary index
    /// 2 and beyond (the first secondary is [`Self::first_secondary`]).
    pub(crate) fn next_secondary(&self, primary_capacity: u64, previous_secondary: u64) -> u64 {
        match self {
            Self::EachHalvesThePrevious => previous_secondary / 2,
            Self::FirstQuarterThenHalving => previous_secondary / 2,
            Self::FirstHalfThenQuarter => primary_capacity / 4,
            Self::FirstQuarterThenEighth => primary_capacity / 8,
            Self::AllEqualPrimary => primary_capacity,
            Self::AllShiftedPrimary(k) => primary_capacity >> k,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_domain_values() {
        assert!(SecondaryPolicy::from_raw(-5).is_err());
    }

    #[test]
    fn default_policy_is_first_half_then_quarter() {
        let policy = SecondaryPolicy::from_raw(DEFAULT_SECONDARY_POLICY).unwrap();
        assert_eq!(policy, SecondaryPolicy::FirstHalfThenQuarter);
        assert_eq!(policy.first_secondary(1024), 512);
        assert_eq!(policy.next_secondary(1024, 512), 256);
        assert_eq!(policy.next_secondary(1024, 256), 256);
    }

    #[test]
    fn each_halves_policy_keeps_halving() {
        let policy = SecondaryPolicy::from_raw(-1).unwrap();
        assert_eq!(policy.first_secondary(1024), 512);
        assert_eq!(policy.next_secondary(1024, 512), 256);
        assert_eq!(policy.next_secondary(1024, 256), 128);
    }

    #[test]
    fn shift_policy_is_constant_across_secondaries() {
        let policy = SecondaryPolicy::from_raw(3).unwrap();
        assert_eq!(policy.first_secondary(2048), 256);
        assert_eq!(policy.next_secondary(2048, 256), 256);
    }
}
