// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{calpipe, get_cmd_output};

#[test]
fn test_flag_dry_run() {
    #[rustfmt::skip]
    let cmd = calpipe()
        .args([
            "flag",
            "--dry-run",
            "--msfile", "/does/not/exist/1557347448.ms",
            "--mw",
            "--gps",
        ])
        .ok();
    assert!(cmd.is_ok(), "flag --dry-run failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert_eq!(stdout.matches("flagdata(").count(), 5, "{stdout}");
    assert!(stdout.contains("mode='shadow'"), "{stdout}");
    assert!(stdout.contains("1420MHZ~1421.3MHZ"), "{stdout}");
}

#[test]
fn test_flag_needs_an_msfile() {
    let cmd = calpipe().args(["flag", "--dry-run"]).ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("--msfile"), "{stderr}");
}
