// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turn a stream of raw samples into complete sweeps.
//!
//! The hardware sends samples continuously. A sample that is exactly `0+0j`
//! marks the end of a sweep; everything else is a bridge voltage in ADC
//! counts.

#[cfg(test)]
mod tests;

use crossbeam_channel::Receiver;
use log::{debug, trace};

use crate::{c64, constants::ADC_FULL_SCALE, engine::MeasurementResult, session::VnaSession};

/// Collects samples until a sweep marker arrives.
#[derive(Debug, Clone, Default)]
pub struct SweepFramer {
    pending: Vec<c64>,
}

impl SweepFramer {
    pub fn new() -> SweepFramer {
        SweepFramer::default()
    }

    /// The number of samples waiting for the end of their sweep.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Add a block of raw samples, returning every sweep it completes. The
    /// samples of each returned sweep have been scaled to the ADC full scale.
    /// Samples after the last marker are kept for the next block.
    pub fn push(&mut self, block: &[c64]) -> Vec<Vec<c64>> {
        let mut frames = vec![];
        for &sample in block {
            if sample.re == 0.0 && sample.im == 0.0 {
                if self.pending.is_empty() {
                    trace!("Ignoring an empty sweep");
                } else {
                    frames.push(std::mem::take(&mut self.pending));
                }
            } else {
                self.pending.push(sample / ADC_FULL_SCALE);
            }
        }
        frames
    }
}

/// What happened to the sweeps handed to [`consume`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    /// Sweeps that produced results.
    pub accepted: usize,
    /// Sweeps that were discarded, normally because they had the wrong number
    /// of samples.
    pub dropped: usize,
}

/// Frame every block received on `rx` and feed the sweeps to `session`, until
/// the sending side hangs up. `sink` sees the results of each accepted sweep.
///
/// Samples left over when the channel closes belong to an unfinished sweep and
/// are discarded.
pub fn consume<F>(rx: Receiver<Vec<c64>>, session: &mut VnaSession, mut sink: F) -> FeedStats
where
    F: FnMut(&MeasurementResult),
{
    let mut framer = SweepFramer::new();
    let mut stats = FeedStats::default();
    for block in rx.iter() {
        for frame in framer.push(&block) {
            match session.process_sweep(&frame) {
                Ok(result) => {
                    stats.accepted += 1;
                    sink(result);
                }
                Err(e) => {
                    debug!("Dropped a sweep: {e}");
                    stats.dropped += 1;
                }
            }
        }
    }
    if framer.pending_len() > 0 {
        debug!(
            "Discarding {} samples of an unfinished sweep",
            framer.pending_len()
        );
    }
    trace!(
        "Finished consuming sweeps: {} accepted, {} dropped",
        stats.accepted,
        stats.dropped
    );
    stats
}
