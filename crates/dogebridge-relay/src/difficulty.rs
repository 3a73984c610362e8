//! Dogecoin difficulty adjustment.
//!
//! Before the Digishield fork the target is retargeted every 240 blocks with a
//! Litecoin-style window. From the fork on it is retargeted every block with the
//! modulated timespan of Digishield.

use dogebridge_codec::Target;
use dogebridge_primitives::ChainParams;
use num_bigint::BigUint;

/// Number of ancestors of the parent to walk back to reach the first block of the retarget
/// window, or `None` when the successor of the parent keeps the parent's bits.
pub fn retarget_lookback(params: &ChainParams, parent_height: u32) -> Option<u32> {
    if params.no_retargeting {
        return None;
    }

    let interval = if params.is_digishield(parent_height) {
        1
    } else {
        params.legacy_interval
    };
    let height = parent_height + 1;

    // Only change once per difficulty adjustment interval.
    if height % interval != 0 {
        return None;
    }

    // The first window is one block short, every later one spans the full interval.
    if height == interval {
        Some(interval - 1)
    } else {
        Some(interval)
    }
}

/// Computes the bits of the successor of a block at `parent_height` carrying `parent_bits`,
/// `actual_timespan` being the parent's time minus the time of the first block of the window.
///
/// https://github.com/dogecoin/dogecoin/blob/v1.14.6/src/dogecoin.cpp#L41
pub fn calculate_next_work_required(
    params: &ChainParams,
    parent_height: u32,
    parent_bits: u32,
    actual_timespan: i64,
) -> u32 {
    if params.no_retargeting {
        return parent_bits;
    }

    let height = parent_height + 1;

    let (retarget_timespan, modulated_timespan, min_timespan, max_timespan) =
        if params.is_digishield(parent_height) {
            let timespan = params.digishield_target_timespan;
            (
                timespan,
                timespan + (actual_timespan - timespan) / 8,
                timespan - timespan / 4,
                timespan + timespan / 2,
            )
        } else {
            let timespan = params.legacy_target_timespan;
            let min_timespan = if height > 10_000 {
                timespan / 4
            } else if height > 5_000 {
                timespan / 8
            } else {
                timespan / 16
            };
            (timespan, actual_timespan, min_timespan, timespan * 4)
        };

    // Limit adjustment step.
    let modulated_timespan = modulated_timespan.clamp(min_timespan, max_timespan);

    let previous_target = Target::from_bits(parent_bits);
    let new_target = previous_target.as_biguint() * BigUint::from(modulated_timespan as u64)
        / BigUint::from(retarget_timespan as u64);
    let new_target = Target::from_biguint(new_target);

    let pow_limit = Target::from_bits(params.pow_limit_bits);

    if new_target > pow_limit {
        pow_limit.to_compact()
    } else {
        new_target.to_compact()
    }
}
