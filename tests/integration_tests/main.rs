// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod calibrate;
mod flag;
mod no_stderr;

use std::{path::Path, process::Output, str::from_utf8};

use assert_cmd::{output::OutputError, Command};

fn calpipe() -> Command {
    Command::cargo_bin("mkat_calpipe").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

/// Make an (empty) measurement set directory so that existence checks pass.
fn make_ms(dir: &Path) -> String {
    let ms = dir.join("1557347448.ms");
    std::fs::create_dir(&ms).unwrap();
    ms.display().to_string()
}

#[test]
fn test_calibrators_listing() {
    let cmd = calpipe().args(["calibrators", "--no-progress-bars"]).ok();
    assert!(cmd.is_ok(), "calibrators failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("3 flux calibrators"), "{stdout}");
    assert!(stdout.contains("J1939-6342"), "{stdout}");
    assert!(stdout.contains("Stevens-Reynolds 2016"), "{stdout}");
}

#[test]
fn test_no_subcommand_is_an_error() {
    let cmd = calpipe().ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("SUBCOMMAND"), "{stderr}");
}
