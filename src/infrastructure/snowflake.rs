use crate::error::{LoanError, Result};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

// Twitter epoch, 2010-11-04T01:42:54.657Z. Keeps ids well inside i64 range
// for the next few decades.
const EPOCH_MS: i64 = 1_288_834_974_657;
const NODE_BITS: u8 = 10;
const SEQUENCE_BITS: u8 = 12;
const MAX_NODE_ID: i64 = (1 << NODE_BITS) - 1;
const SEQUENCE_MASK: i64 = (1 << SEQUENCE_BITS) - 1;

struct GeneratorState {
    last_timestamp: i64,
    sequence: i64,
}

/// Snowflake-style identifier source: 41-bit millisecond timestamp, 10-bit
/// node id, 12-bit per-millisecond sequence.
///
/// Ids are unique across the process lifetime even under concurrent callers
/// and roughly time-ordered. The timestamp component guarantees a generated
/// id is never 0, which the store uses as the "not yet assigned" sentinel.
pub struct SnowflakeGenerator {
    node_id: i64,
    state: Mutex<GeneratorState>,
}

impl SnowflakeGenerator {
    /// Fails with `GeneratorConstruction` if `node_id` does not fit in 10
    /// bits. Construction errors are fatal at startup, not per-call.
    pub fn new(node_id: i64) -> Result<Self> {
        if !(0..=MAX_NODE_ID).contains(&node_id) {
            return Err(LoanError::GeneratorConstruction { node_id });
        }
        Ok(Self {
            node_id,
            state: Mutex::new(GeneratorState {
                last_timestamp: 0,
                sequence: 0,
            }),
        })
    }

    pub fn next_id(&self) -> i64 {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let mut now = current_millis();
        if now < state.last_timestamp {
            // Clock went backwards; reuse the last timestamp so ids stay
            // unique within the sequence budget.
            now = state.last_timestamp;
        }

        if now == state.last_timestamp {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                // Sequence exhausted for this millisecond; spin to the next.
                while now <= state.last_timestamp {
                    now = current_millis();
                }
            }
        } else {
            state.sequence = 0;
        }
        state.last_timestamp = now;

        ((now - EPOCH_MS) << (NODE_BITS + SEQUENCE_BITS))
            | (self.node_id << SEQUENCE_BITS)
            | state.sequence
    }
}

fn current_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
