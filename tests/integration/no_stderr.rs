// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use crate::{get_cmd_output, vnacal};

#[test]
fn test_simulate_no_stderr() {
    #[rustfmt::skip]
    let cmd = vnacal()
        .args([
            "simulate",
            "--data-width", "50",
            "--freq-range", "1000000", "5000000",
        ])
        .ok();
    assert!(
        cmd.is_ok(),
        "simulate failed with simple arguments: {}",
        cmd.err().unwrap()
    );
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_dry_run_no_stderr() {
    let cmd = vnacal().args(["simulate", "--dry-run"]).ok();
    assert!(cmd.is_ok(), "dry run failed: {}", cmd.err().unwrap());
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
    assert!(stdout.contains("Dry run -- exiting now."), "{stdout}");
}
