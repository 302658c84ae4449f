// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use indoc::indoc;

use super::*;

#[test]
fn test_default_config() {
    let config = VnaConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.correct_width(), Ok(4004));
    let grid = config.grid().unwrap();
    assert_eq!(grid.delta(), 15_000);
    assert_eq!(grid.width(), 4004);
}

#[test]
fn test_invalid_configs() {
    let config = VnaConfig {
        correct_delta: 0,
        ..Default::default()
    };
    assert_eq!(config.validate(), Err(ParamsError::ZeroDelta));
    assert!(config.grid().is_err());

    let config = VnaConfig {
        max_freq: 10,
        ..Default::default()
    };
    assert_eq!(
        config.validate(),
        Err(ParamsError::MaxFreqBelowDelta {
            max_freq: 10,
            delta: 15_000
        })
    );

    let config = VnaConfig {
        data_width: 1,
        ..Default::default()
    };
    assert_eq!(
        config.validate(),
        Err(ParamsError::DataWidthTooSmall { got: 1 })
    );
}

#[test]
fn test_oversized_configs() {
    // The grid width would overflow.
    let config = VnaConfig {
        correct_delta: 1,
        max_freq: u64::MAX,
        data_width: 2,
    };
    let expected = || ParamsError::GridTooLarge {
        max_freq: u64::MAX,
        delta: 1,
        max: MAX_POINTS,
    };
    assert_eq!(config.validate(), Err(expected()));
    assert_eq!(config.correct_width(), Err(expected()));
    assert!(config.grid().is_err());

    // Just over and just at the limit.
    let config = VnaConfig {
        correct_delta: 1,
        max_freq: (MAX_POINTS - EXTRA_CORRECT_POINTS + 1) as u64,
        data_width: 2,
    };
    assert!(matches!(
        config.validate(),
        Err(ParamsError::GridTooLarge { .. })
    ));
    let config = VnaConfig {
        max_freq: (MAX_POINTS - EXTRA_CORRECT_POINTS) as u64,
        ..config
    };
    assert_eq!(config.correct_width(), Ok(MAX_POINTS));
    assert!(config.validate().is_ok());

    let config = VnaConfig {
        data_width: MAX_POINTS + 1,
        ..Default::default()
    };
    assert_eq!(
        config.validate(),
        Err(ParamsError::DataWidthTooLarge {
            got: MAX_POINTS + 1,
            max: MAX_POINTS
        })
    );
}

#[test]
fn test_check_freq_range() {
    let config = VnaConfig::default();
    assert_eq!(
        config.check_freq_range(1_000_000, 30_000_000),
        Ok((1_000_000, 30_000_000))
    );
    assert_eq!(
        config.check_freq_range(1_000_000, 90_000_000),
        Ok((1_000_000, 60_000_000))
    );
    assert_eq!(
        config.check_freq_range(2, 1),
        Err(ParamsError::StartAfterStop { start: 2, stop: 1 })
    );
    assert_eq!(
        config.check_freq_range(70_000_000, 80_000_000),
        Err(ParamsError::StartAfterStop {
            start: 70_000_000,
            stop: 60_000_000
        })
    );
}

#[test]
fn test_config_from_toml() {
    let config: VnaConfig = toml::from_str(indoc! {r#"
        correct_delta = 10000
        data_width = 200
    "#})
    .unwrap();
    assert_eq!(config.correct_delta, 10_000);
    assert_eq!(config.data_width, 200);
    // Unspecified fields take their defaults.
    assert_eq!(config.max_freq, 60_000_000);
    assert_eq!(config.correct_width(), Ok(6004));
}

mod simulate {
    use std::num::NonZeroUsize;

    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{
        c64,
        calibration::{CalKind, CorrectionPath},
        engine::SweepMode,
        simulate::{Bridge, Dut},
    };

    fn params(calibrations: Vec<CalKind>, mode: SweepMode) -> SimulateParams {
        SimulateParams {
            config: VnaConfig {
                correct_delta: 100_000,
                max_freq: 30_000_000,
                data_width: 60,
            },
            calibrations,
            mode,
            freq_range: (1_000_000, 20_000_000),
            bridge: Bridge {
                gain: c64::new(0.4, 0.3),
                delay_s: 2e-9,
            },
            dut: Dut::resistor(100.0),
            load_ohms: 50.0,
            block_size: NonZeroUsize::new(37).unwrap(),
        }
    }

    #[test]
    fn test_fully_calibrated_reflection() {
        let session = params(
            vec![CalKind::Open, CalKind::Short, CalKind::Load],
            SweepMode::Reflection,
        )
        .run()
        .unwrap();
        assert_eq!(session.status().to_string(), "Calibration OpShLo");

        let results = session.results().unwrap();
        assert_eq!(results.mode, SweepMode::Reflection);
        assert_eq!(results.correction, Some(CorrectionPath::ShortOpen));
        assert_eq!(results.bridge_fallbacks, 0);
        assert_eq!(results.len(), 60);
        for p in &results.pixels {
            assert_abs_diff_eq!(p.impedance.re, 100.0, epsilon = 1e-3);
            assert_abs_diff_eq!(p.impedance.im, 0.0, epsilon = 1e-3);
            assert_abs_diff_eq!(p.swr.unwrap(), 2.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_transmission() {
        let session = params(vec![CalKind::Short, CalKind::Open], SweepMode::Transmission)
            .run()
            .unwrap();
        let results = session.results().unwrap();
        for p in &results.pixels {
            assert_abs_diff_eq!(p.reflect.re, 0.5, epsilon = 1e-6);
            assert_abs_diff_eq!(p.reflect.im, 0.0, epsilon = 1e-6);
            assert!(p.swr.is_none());
        }
    }

    #[test]
    fn test_uncalibrated() {
        let session = params(vec![], SweepMode::Reflection).run().unwrap();
        assert_eq!(session.status().to_string(), "Calibration None");
        let results = session.results().unwrap();
        assert_eq!(results.correction, None);
        // The raw voltage of a 100 ohm DUT is a third of the gain.
        assert_abs_diff_eq!(results.pixels[0].raw.norm(), 0.5 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_freq_range() {
        let mut p = params(vec![CalKind::Short], SweepMode::Reflection);
        p.freq_range = (5_000_000, 50_000_000);
        let session = p.run().unwrap();
        assert_eq!(session.sweep().start(), 5_000_000);
        assert_eq!(session.sweep().stop(), 30_000_000);

        let mut p = params(vec![CalKind::Short], SweepMode::Reflection);
        p.freq_range = (3_000_000, 2_000_000);
        assert!(matches!(
            p.run(),
            Err(SimulateError::Params(ParamsError::StartAfterStop { .. }))
        ));
    }
}
