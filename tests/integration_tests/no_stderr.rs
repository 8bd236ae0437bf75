// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use crate::{calpipe, get_cmd_output};

#[test]
fn test_calibrate_dry_run_no_stderr() {
    #[rustfmt::skip]
    let cmd = calpipe()
        .args([
            "calibrate",
            "--dry-run",
            "--msfile", "/does/not/exist/1557347448.ms",
            "-f", "J1939-6342",
            "-b", "J0408-6545",
            "--applycal",
        ])
        .ok();
    assert!(cmd.is_ok(), "calibrate failed: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_flag_dry_run_no_stderr() {
    let cmd = calpipe()
        .args(["flag", "--dry-run", "--msfile", "obs.ms", "--lband"])
        .ok();
    assert!(cmd.is_ok(), "flag failed: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}
