// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Things shared by `vnacal` subcommands: argument files, the analyser's
//! parameters and pretty printing.

mod printers;

pub(crate) use printers::{display_warnings, InfoPrinter, Warn};

use clap::Parser;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    constants::{DEFAULT_CORRECT_DELTA, DEFAULT_DATA_WIDTH, DEFAULT_MAX_FREQ},
    params::{ParamsError, VnaConfig},
};

lazy_static::lazy_static! {
    pub(super) static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");

    pub(super) static ref ARG_FILE_HELP: String =
        format!("All arguments may be specified in a file. Any CLI arguments override arguments set in the file. Supported formats: {}", *ARG_FILE_TYPES_COMMA_SEPARATED);

    static ref CORRECT_DELTA_HELP: String =
        format!("The spacing of the coarse calibration grid [Hz]. Default: {DEFAULT_CORRECT_DELTA}");

    static ref MAX_FREQ_HELP: String =
        format!("The maximum frequency the analyser works to [Hz]. Sweeps are clamped to this. Default: {DEFAULT_MAX_FREQ}");

    static ref DATA_WIDTH_HELP: String =
        format!("The number of pixels (frequencies) in a measurement sweep. Default: {DEFAULT_DATA_WIDTH}");
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub(super) enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

macro_rules! unpack_arg_file {
    ($arg_file:expr) => ({
        use std::{fs::File, io::Read, str::FromStr};

        use crate::cli::common::{ArgFileTypes, ARG_FILE_TYPES_COMMA_SEPARATED};

        debug!("Attempting to parse argument file {}", $arg_file.display());

        let mut contents = String::new();
        let arg_file_type = $arg_file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ArgFileTypes::from_str(&e).ok());

        match arg_file_type {
            Some(ArgFileTypes::Toml) => {
                debug!("Parsing toml file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match toml::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(VnaError::ArgFile(format!(
                            "Couldn't decode toml structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }
            Some(ArgFileTypes::Json) => {
                debug!("Parsing json file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match serde_json::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(VnaError::ArgFile(format!(
                            "Couldn't decode json structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }

            _ => {
                return Err(VnaError::ArgFile(format!(
                    "Argument file '{:?}' doesn't have a recognised file extension! Valid extensions are: {}", $arg_file, *ARG_FILE_TYPES_COMMA_SEPARATED)
                ))
            }
        }
    });
}

/// The analyser's fixed parameters, as the user gives them.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct AnalyserArgs {
    #[clap(long, help = CORRECT_DELTA_HELP.as_str(), help_heading = "ANALYSER")]
    pub(super) correct_delta: Option<u64>,

    #[clap(long, help = MAX_FREQ_HELP.as_str(), help_heading = "ANALYSER")]
    pub(super) max_freq: Option<u64>,

    #[clap(long, help = DATA_WIDTH_HELP.as_str(), help_heading = "ANALYSER")]
    pub(super) data_width: Option<usize>,
}

impl AnalyserArgs {
    /// Prefer values in `self` over those in `other`.
    pub(super) fn merge(self, other: Self) -> Self {
        Self {
            correct_delta: self.correct_delta.or(other.correct_delta),
            max_freq: self.max_freq.or(other.max_freq),
            data_width: self.data_width.or(other.data_width),
        }
    }

    pub(super) fn parse(self) -> Result<VnaConfig, ParamsError> {
        let AnalyserArgs {
            correct_delta,
            max_freq,
            data_width,
        } = self;
        let default = VnaConfig::default();
        let config = VnaConfig {
            correct_delta: correct_delta.unwrap_or(default.correct_delta),
            max_freq: max_freq.unwrap_or(default.max_freq),
            data_width: data_width.unwrap_or(default.data_width),
        };
        config.validate()?;
        let correct_width = config.correct_width()?;

        let mut printer = InfoPrinter::new("Analyser".into());
        printer.push_block(vec![
            format!(
                "{correct_width} calibration points, every {} Hz",
                config.correct_delta
            )
            .into(),
            format!("Maximum frequency: {} Hz", config.max_freq).into(),
        ]);
        printer.push_line(format!("{} pixels per sweep", config.data_width).into());
        printer.display();

        Ok(config)
    }
}
