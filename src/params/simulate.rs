// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calibrate and measure with a simulated bridge, passing every sweep through
//! the same framing and session code as real hardware.

use std::{num::NonZeroUsize, thread};

use crossbeam_channel::bounded;
use log::{debug, trace, warn};
use thiserror::Error;

use super::{ParamsError, VnaConfig};
use crate::{
    acquisition::{consume, FeedStats},
    c64,
    calibration::CalKind,
    engine::SweepMode,
    session::VnaSession,
    simulate::{to_sample_stream, Bridge, Dut},
};

/// The number of sample blocks that can be in flight between the producer and
/// the session.
const CHANNEL_CAPACITY: usize = 8;

/// Parameters needed to simulate a calibration and a measurement.
#[derive(Debug, Clone)]
pub(crate) struct SimulateParams {
    pub(crate) config: VnaConfig,

    /// The references to capture, in order.
    pub(crate) calibrations: Vec<CalKind>,

    /// The measurement mode. Never a calibration mode.
    pub(crate) mode: SweepMode,

    /// The requested sweep range \[Hz\]. The stop may be clamped.
    pub(crate) freq_range: (u64, u64),

    pub(crate) bridge: Bridge,

    pub(crate) dut: Dut,

    /// The value of the load standard \[ohms\].
    pub(crate) load_ohms: f64,

    /// The number of samples sent to the session at a time.
    pub(crate) block_size: NonZeroUsize,
}

impl SimulateParams {
    /// Run the simulation, returning the session holding the measurement's
    /// results.
    pub(crate) fn run(&self) -> Result<VnaSession, SimulateError> {
        let mut session = VnaSession::new(self.config)?;
        session.set_freq_range(self.freq_range.0, self.freq_range.1)?;

        for &kind in &self.calibrations {
            let volts = self
                .bridge
                .cal_sweep(session.grid(), kind, self.load_ohms);
            session.set_mode(kind.into());
            self.feed(&mut session, &volts)?;
        }

        if !session.supports(self.mode) {
            warn!(
                "The {} calibration isn't enough for a {} measurement",
                session.status(),
                self.mode
            );
        }
        session.set_mode(self.mode);
        let volts = match self.mode {
            SweepMode::Transmission => self.bridge.transmission_sweep(session.sweep(), &self.dut),
            _ => self.bridge.reflection_sweep(session.sweep(), &self.dut),
        };
        self.feed(&mut session, &volts)?;

        Ok(session)
    }

    /// Send one sweep's samples to the session from another thread, the way
    /// the hardware would.
    fn feed(&self, session: &mut VnaSession, volts: &[c64]) -> Result<FeedStats, SimulateError> {
        let mode = session.mode();
        let stream = to_sample_stream(volts);
        let block_size = self.block_size.get();
        trace!(
            "Sending {} samples for a {mode} sweep in blocks of {block_size}",
            stream.len()
        );

        let (tx, rx) = bounded(CHANNEL_CAPACITY);
        let (stats, producer_ok) = thread::scope(|scope| {
            let producer = thread::Builder::new()
                .name("producer".to_string())
                .spawn_scoped(scope, move || {
                    for block in stream.chunks(block_size) {
                        // Stop if the session side has gone away.
                        if tx.send(block.to_vec()).is_err() {
                            break;
                        }
                    }
                })
                .expect("OS can create threads");

            let stats = consume(rx, session, |result| {
                debug!("Received a {} sweep of {} pixels", result.mode, result.len());
            });
            (stats, producer.join().is_ok())
        });

        if !producer_ok {
            return Err(SimulateError::ProducerPanicked);
        }
        if stats.accepted == 0 {
            return Err(SimulateError::NoSweeps {
                mode,
                dropped: stats.dropped,
            });
        }
        Ok(stats)
    }
}

#[derive(Error, Debug)]
pub(crate) enum SimulateError {
    #[error("No {mode} sweep was accepted ({dropped} dropped)")]
    NoSweeps { mode: SweepMode, dropped: usize },

    #[error("The sample producer thread panicked")]
    ProducerPanicked,

    #[error(transparent)]
    Params(#[from] ParamsError),
}
