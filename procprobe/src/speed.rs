//! Throughput from two cumulative interface counter snapshots.

use std::time::Duration;

use crate::error::SpeedError;
use crate::types::{InterfaceCounters, NetRates};

/// Average bytes/sec between `last` and `now`, truncated. The divisor is the
/// elapsed time floored to whole seconds.
pub fn calc_net_speed(
    now: &InterfaceCounters,
    last: &InterfaceCounters,
    elapsed: Duration,
) -> Result<NetRates, SpeedError> {
    if now.received < last.received || now.sent < last.sent {
        return Err(SpeedError::CounterRegression {
            now: now.clone(),
            last: last.clone(),
        });
    }
    let secs = elapsed.as_secs();
    if secs == 0 {
        return Err(SpeedError::ElapsedTooShort(elapsed));
    }
    Ok(NetRates {
        in_bps: (now.received - last.received) / secs,
        out_bps: (now.sent - last.sent) / secs,
    })
}
