// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calibrate and measure a simulated DUT, reporting what the analyser would
//! show.


use std::{num::NonZeroUsize, path::PathBuf, str::FromStr};

use clap::Parser;
use itertools::Itertools;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use thiserror::Error;

use super::common::{display_warnings, AnalyserArgs, InfoPrinter, Warn, ARG_FILE_HELP};
use crate::{
    c64,
    calibration::CalKind,
    engine::SweepMode,
    params::SimulateParams,
    session::VnaSession,
    simulate::{Bridge, Dut},
    VnaError,
};

const DEFAULT_FREQ_RANGE: [u64; 2] = [1_000_000, 30_000_000];
const DEFAULT_MODE: SweepMode = SweepMode::Reflection;
const DEFAULT_RESISTANCE: f64 = 50.0;
const DEFAULT_LOAD_OHMS: f64 = 50.0;
const DEFAULT_GAIN: [f64; 2] = [0.5, 0.0];
const DEFAULT_BLOCK_SIZE: usize = 1024;

lazy_static::lazy_static! {
    static ref CAL_KINDS_COMMA_SEPARATED: String = CalKind::iter().join(", ");

    static ref MEASUREMENT_MODES_COMMA_SEPARATED: String =
        SweepMode::iter().filter(|m| !m.is_cal()).join(", ");

    static ref CALIBRATIONS_HELP: String =
        format!("The reference calibrations to capture, in order. Supported: {}. Default: all of them", *CAL_KINDS_COMMA_SEPARATED);

    static ref MODE_HELP: String =
        format!("The measurement to make after calibrating. Supported: {}. Default: {DEFAULT_MODE}", *MEASUREMENT_MODES_COMMA_SEPARATED);

    static ref FREQ_RANGE_HELP: String =
        format!("The start and stop frequencies of the measurement sweep [Hz]. The stop is clamped to the maximum frequency. Default: {} {}", DEFAULT_FREQ_RANGE[0], DEFAULT_FREQ_RANGE[1]);

    static ref RESISTANCE_HELP: String =
        format!("The DUT's series resistance [ohms]. Default: {DEFAULT_RESISTANCE}");

    static ref LOAD_OHMS_HELP: String =
        format!("The resistance of the load standard used to calibrate [ohms]. Default: {DEFAULT_LOAD_OHMS}");

    static ref GAIN_HELP: String =
        format!("The complex gain of the simulated bridge. Default: {} {}", DEFAULT_GAIN[0], DEFAULT_GAIN[1]);

    static ref BLOCK_SIZE_HELP: String =
        format!("The number of samples delivered to the analyser at a time. Default: {DEFAULT_BLOCK_SIZE}");
}

#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct SimulateCliArgs {
    #[clap(short, long, multiple_values(true), help = CALIBRATIONS_HELP.as_str(), help_heading = "CALIBRATION")]
    pub(super) calibrations: Option<Vec<String>>,

    #[clap(long, help = LOAD_OHMS_HELP.as_str(), help_heading = "CALIBRATION")]
    pub(super) load_ohms: Option<f64>,

    #[clap(short, long, help = MODE_HELP.as_str(), help_heading = "MEASUREMENT")]
    pub(super) mode: Option<String>,

    #[clap(
        short, long, help = FREQ_RANGE_HELP.as_str(), help_heading = "MEASUREMENT",
        number_of_values = 2,
        value_names = &["START_HZ", "STOP_HZ"]
    )]
    pub(super) freq_range: Option<Vec<u64>>,

    /// Frequencies to report readouts at [Hz]. Default: the start, middle and
    /// stop of the sweep.
    #[clap(long, multiple_values(true), help_heading = "MEASUREMENT")]
    pub(super) markers: Option<Vec<u64>>,

    #[clap(short, long, help = RESISTANCE_HELP.as_str(), help_heading = "DUT")]
    pub(super) resistance: Option<f64>,

    /// The DUT's series inductance [nH]. Default: none.
    #[clap(short = 'l', long, help_heading = "DUT")]
    pub(super) inductance: Option<f64>,

    /// The DUT's series capacitance [pF]. Default: none (no capacitor).
    #[clap(short = 'C', long, help_heading = "DUT")]
    pub(super) capacitance: Option<f64>,

    #[clap(
        long, help = GAIN_HELP.as_str(), help_heading = "BRIDGE",
        number_of_values = 2,
        allow_hyphen_values = true,
        value_names = &["RE", "IM"]
    )]
    pub(super) gain: Option<Vec<f64>>,

    /// The electrical length of the cable between the bridge and the DUT
    /// [ns]. Default: 0.
    #[clap(long, help_heading = "BRIDGE")]
    pub(super) delay: Option<f64>,

    #[clap(long, help = BLOCK_SIZE_HELP.as_str(), help_heading = "BRIDGE")]
    pub(super) block_size: Option<usize>,
}

impl SimulateCliArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            calibrations: self.calibrations.or(other.calibrations),
            load_ohms: self.load_ohms.or(other.load_ohms),
            mode: self.mode.or(other.mode),
            freq_range: self.freq_range.or(other.freq_range),
            markers: self.markers.or(other.markers),
            resistance: self.resistance.or(other.resistance),
            inductance: self.inductance.or(other.inductance),
            capacitance: self.capacitance.or(other.capacitance),
            gain: self.gain.or(other.gain),
            delay: self.delay.or(other.delay),
            block_size: self.block_size.or(other.block_size),
        }
    }
}

#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct SimulateArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "analyser")]
    #[serde(default)]
    pub(super) analyser_args: AnalyserArgs,

    #[clap(flatten)]
    #[serde(rename = "simulate")]
    #[serde(default)]
    pub(super) simulate_args: SimulateCliArgs,
}

impl SimulateArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<SimulateArgs, VnaError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Read in the file arguments. Ensure all of the file args are
            // accounted for by pattern matching.
            let SimulateArgs {
                args_file: _,
                analyser_args,
                simulate_args,
            } = unpack_arg_file!(arg_file);

            Ok(SimulateArgs {
                args_file: None,
                analyser_args: cli_args.analyser_args.merge(analyser_args),
                simulate_args: cli_args.simulate_args.merge(simulate_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<(SimulateParams, Vec<u64>), VnaError> {
        debug!("{:#?}", self);

        // Expose all the struct fields to ensure they're all used.
        let SimulateArgs {
            args_file: _,
            analyser_args,
            simulate_args:
                SimulateCliArgs {
                    calibrations,
                    load_ohms,
                    mode,
                    freq_range,
                    markers,
                    resistance,
                    inductance,
                    capacitance,
                    gain,
                    delay,
                    block_size,
                },
        } = self;

        let config = analyser_args.parse()?;

        let calibrations = match calibrations {
            None => CalKind::iter().collect(),
            Some(cals) => {
                let mut kinds = Vec::with_capacity(cals.len());
                for cal in cals {
                    let kind = CalKind::from_str(&cal.to_lowercase())
                        .map_err(|_| SimulateArgsError::InvalidCalibration(cal))?;
                    if kinds.contains(&kind) {
                        format!("The {kind} calibration was requested more than once; it is only captured once").warn();
                    } else {
                        kinds.push(kind);
                    }
                }
                kinds
            }
        };

        let mode = match mode {
            None => DEFAULT_MODE,
            Some(m) => match SweepMode::from_str(&m.to_lowercase()) {
                Ok(mode) if !mode.is_cal() => mode,
                _ => return Err(SimulateArgsError::InvalidMode(m).into()),
            },
        };

        let (start, stop) = match freq_range.as_deref() {
            None => (DEFAULT_FREQ_RANGE[0], DEFAULT_FREQ_RANGE[1]),
            Some(&[start, stop]) => (start, stop),
            Some(other) => return Err(SimulateArgsError::BadFreqRange(other.to_vec()).into()),
        };
        let (start, clamped_stop) = config.check_freq_range(start, stop)?;
        if clamped_stop != stop {
            format!(
                "The stop frequency {stop} Hz is beyond the maximum; using {clamped_stop} Hz"
            )
            .warn();
        }
        let stop = clamped_stop;

        let markers = match markers {
            None => vec![start, start + (stop - start) / 2, stop],
            Some(markers) => {
                for &m in &markers {
                    if !(start..=stop).contains(&m) {
                        format!("Marker {m} Hz is outside the sweep; using the nearest frequency")
                            .warn();
                    }
                }
                markers
            }
        };

        let resistance = resistance.unwrap_or(DEFAULT_RESISTANCE);
        let inductance = inductance.unwrap_or_default();
        for (name, value) in [
            ("resistance", Some(resistance)),
            ("inductance", Some(inductance)),
            ("capacitance", capacitance),
        ] {
            match value {
                Some(v) if v < 0.0 || !v.is_finite() => {
                    return Err(SimulateArgsError::BadComponent { name, value: v }.into())
                }
                _ => (),
            }
        }
        let dut = Dut {
            resistance,
            inductance: inductance * 1e-9,
            capacitance: capacitance.map(|c| c * 1e-12),
        };

        let load_ohms = load_ohms.unwrap_or(DEFAULT_LOAD_OHMS);
        if load_ohms < 0.0 || !load_ohms.is_finite() {
            return Err(SimulateArgsError::BadComponent {
                name: "load",
                value: load_ohms,
            }
            .into());
        }

        let gain = match gain.as_deref() {
            None => c64::new(DEFAULT_GAIN[0], DEFAULT_GAIN[1]),
            Some(&[re, im]) => c64::new(re, im),
            Some(other) => return Err(SimulateArgsError::BadGain(other.to_vec()).into()),
        };
        if gain.norm() == 0.0 || gain.norm() > 1.0 {
            return Err(SimulateArgsError::GainOutOfRange(gain.norm()).into());
        }
        let bridge = Bridge {
            gain,
            delay_s: delay.unwrap_or_default() * 1e-9,
        };

        let block_size = NonZeroUsize::new(block_size.unwrap_or(DEFAULT_BLOCK_SIZE))
            .ok_or(SimulateArgsError::ZeroBlockSize)?;

        let mut printer = InfoPrinter::new("Simulation".into());
        printer.push_block(vec![
            format!("Bridge gain {:.3}{:+.3}j", gain.re, gain.im).into(),
            format!("Cable delay {} ns", bridge.delay_s * 1e9).into(),
        ]);
        let mut dut_line = format!("DUT: {resistance} ohms");
        if inductance > 0.0 {
            dut_line.push_str(&format!(", {inductance} nH"));
        }
        if let Some(c) = capacitance {
            dut_line.push_str(&format!(", {c} pF"));
        }
        printer.push_line(dut_line.into());
        printer.push_line(
            if calibrations.is_empty() {
                "No calibrations".to_string()
            } else {
                format!("Calibrating with: {}", calibrations.iter().join(", "))
            }
            .into(),
        );
        printer.push_line(format!("Measuring {mode} from {start} Hz to {stop} Hz").into());
        printer.display();

        display_warnings();

        Ok((
            SimulateParams {
                config,
                calibrations,
                mode,
                freq_range: (start, stop),
                bridge,
                dut,
                load_ohms,
                block_size,
            },
            markers,
        ))
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), VnaError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let (params, markers) = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        let session = params.run()?;
        display_results(&session, &markers);
        Ok(())
    }
}

/// Print the calibration status and the readouts at each marker.
fn display_results(session: &VnaSession, markers: &[u64]) {
    let mut printer = InfoPrinter::new(session.status().to_string().into());
    if let Some(results) = session.results() {
        printer.push_line(
            match results.correction {
                Some(path) => format!("{} corrected with {path}", results.mode),
                None => format!("{} uncorrected", results.mode),
            }
            .into(),
        );
        if results.bridge_fallbacks > 0 {
            printer.push_line(
                format!(
                    "The load calibration couldn't be used at {} of {} frequencies",
                    results.bridge_fallbacks,
                    results.len()
                )
                .into(),
            );
        }
        let block = markers
            .iter()
            .filter_map(|&m| session.readout_at(m))
            .map(|r| format!("{:>10} Hz  {r}", r.pixel.freq_hz).trim_end().to_string().into())
            .collect();
        printer.push_block(block);
    }
    printer.display();
}

#[derive(Error, Debug)]
pub(super) enum SimulateArgsError {
    #[error("Unrecognised calibration '{0}'. Supported calibrations: {}", *CAL_KINDS_COMMA_SEPARATED)]
    InvalidCalibration(String),

    #[error("Unrecognised measurement mode '{0}'. Supported modes: {}", *MEASUREMENT_MODES_COMMA_SEPARATED)]
    InvalidMode(String),

    #[error("The frequency range was specified as {0:?}, not [<start>, <stop>]")]
    BadFreqRange(Vec<u64>),

    #[error("The bridge gain was specified as {0:?}, not [<real>, <imaginary>]")]
    BadGain(Vec<f64>),

    #[error("The bridge gain's magnitude must be more than 0 and no more than 1 (got {0})")]
    GainOutOfRange(f64),

    #[error("The {name} must be a non-negative number (got {value})")]
    BadComponent { name: &'static str, value: f64 },

    #[error("The block size cannot be 0")]
    ZeroBlockSize,
}
