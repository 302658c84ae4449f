// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests against the `simulate` subcommand.

use std::io::Write;

use indoc::indoc;
use tempfile::TempDir;

use crate::{get_cmd_output, vnacal};

#[test]
fn test_full_calibration_reports_the_dut() {
    #[rustfmt::skip]
    let cmd = vnacal()
        .args([
            "simulate",
            "--data-width", "101",
            "--freq-range", "1000000", "11000000",
            "--resistance", "100",
            "--markers", "6000000",
        ])
        .ok();
    assert!(cmd.is_ok(), "simulate failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Calibration OpShLo"), "{stdout}");
    assert!(stdout.contains("refl corrected with short and open"), "{stdout}");
    // A 100 ohm resistor has an SWR of 2.
    assert!(stdout.contains("SWR    2.0"), "{stdout}");
    assert!(stdout.contains("Imped    100.0"), "{stdout}");
    assert!(stdout.contains("   6000000 Hz"), "{stdout}");
}

#[test]
fn test_short_only_transmission() {
    #[rustfmt::skip]
    let cmd = vnacal()
        .args([
            "simulate",
            "--data-width", "20",
            "--calibrations", "short",
            "--mode", "trans",
        ])
        .ok();
    assert!(cmd.is_ok(), "simulate failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Calibration Sh"), "{stdout}");
    assert!(stdout.contains("trans corrected with short only"), "{stdout}");
}

#[test]
fn test_args_file() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let args_file = tmp_dir.path().join("args.toml");
    let mut f = std::fs::File::create(&args_file).unwrap();
    f.write_all(
        indoc! {r#"
            [analyser]
            data_width = 40

            [simulate]
            calibrations = ["open", "short"]
            freq_range = [2000000, 3000000]
            resistance = 25.0
        "#}
        .as_bytes(),
    )
    .unwrap();
    drop(f);

    let saved = tmp_dir.path().join("saved.toml");
    #[rustfmt::skip]
    let cmd = vnacal()
        .args([
            "simulate",
            &format!("{}", args_file.display()),
            "--resistance", "100",
            "--save-toml", &format!("{}", saved.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "simulate failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Calibration OpSh"), "{stdout}");
    assert!(stdout.contains("Measuring refl from 2000000 Hz to 3000000 Hz"), "{stdout}");
    // The command line wins over the file.
    assert!(stdout.contains("DUT: 100 ohms"), "{stdout}");

    let saved = std::fs::read_to_string(saved).unwrap();
    assert!(saved.contains("data_width = 40"), "{saved}");
    assert!(saved.contains("resistance = 100.0"), "{saved}");
}

#[test]
fn test_bad_freq_range() {
    #[rustfmt::skip]
    let cmd = vnacal()
        .args([
            "simulate",
            "--freq-range", "5000000", "1000000",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.starts_with("Error: "), "{stderr}");
    assert!(stderr.contains("is after the stop frequency"), "{stderr}");
}

#[test]
fn test_bad_mode() {
    let cmd = vnacal().args(["simulate", "--mode", "cal-load"]).ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Unrecognised measurement mode 'cal-load'"), "{stderr}");
    assert!(stderr.contains("trans, refl"), "{stderr}");
}

#[test]
fn test_oversized_grid() {
    #[rustfmt::skip]
    let cmd = vnacal()
        .args([
            "simulate",
            "--max-freq", "18446744073709551615",
            "--correct-delta", "1",
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.starts_with("Error: "), "{stderr}");
    assert!(stderr.contains("calibration points"), "{stderr}");
    assert!(!stderr.contains("panicked"), "{stderr}");
}
