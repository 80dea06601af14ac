use std::collections::BTreeMap;

use mclog_types::{SpotLookup, SpotRow};

/// Divisor applied to the reassembled 32-bit spot value.
pub const SPOT_VALUE_DIVISOR: f64 = 32.0;

/// Reassembles low-rate spot values that are smuggled through the high-rate
/// record stream one byte per record.
///
/// Each record carries a `count` and a `spot` field. The counter selects a
/// slot and a byte position; four consecutive records deliver the four
/// little-endian bytes of that slot's value:
///
/// ```text
///   count:   4k+0   4k+1   4k+2   4k+3
///   spot:     b0     b1     b2     b3
///                                   └─▶ slot k = (i32)(b0|b1<<8|b2<<16|b3<<24) / 32
/// ```
///
/// When a cycle for slot 0 begins and every lookup slot has a value, one
/// row is emitted and the collected values are cleared. A sweep that misses
/// any slot therefore never produces a row. An empty lookup is always
/// complete, so every slot-0 cycle start yields a time-only row. Slots that are not in the
/// lookup are assembled but discarded.
#[derive(Clone, Debug)]
pub struct SpotDemux {
    lookup: SpotLookup,
    accumulator: u32,
    values: BTreeMap<u32, f64>,
}

impl SpotDemux {
    #[must_use]
    pub fn new(lookup: SpotLookup) -> Self {
        Self {
            lookup,
            accumulator: 0,
            values: BTreeMap::new(),
        }
    }

    /// Feed one record's raw counter and carrier bits. `time` is the
    /// record's elapsed time, used to tag a flushed row.
    pub fn feed(&mut self, counter: u32, carrier: u32, time: f64) -> Option<SpotRow> {
        let slot = counter >> 2;
        let position = counter & 0x03;
        let mut row = None;

        if position == 0 {
            if slot == 0 {
                row = self.flush(time);
            }
            self.accumulator = carrier;
        } else {
            self.accumulator |= carrier << (position * 8);
        }

        if position == 3 && self.lookup.contains(slot) {
            #[allow(clippy::cast_possible_wrap)]
            let value = f64::from(self.accumulator as i32) / SPOT_VALUE_DIVISOR;
            self.values.insert(slot, value);
        }

        row
    }

    fn flush(&mut self, time: f64) -> Option<SpotRow> {
        let complete = self.lookup.slots().all(|slot| self.values.contains_key(&slot));

        let row = complete.then(|| SpotRow {
            time,
            values: self
                .lookup
                .slots()
                .filter_map(|slot| self.values.get(&slot).copied())
                .collect(),
        });
        self.values.clear();
        row
    }
}
