// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tempfile::TempDir;

use crate::{calpipe, get_cmd_output, make_ms};

#[test]
fn test_calibrate_dry_run_prints_every_task() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");

    #[rustfmt::skip]
    let cmd = calpipe()
        .args([
            "calibrate",
            "--dry-run",
            "--msfile", "/does/not/exist/1557347448.ms",
            "--output-dir", &tmp_dir.path().display().to_string(),
            "-f", "J1939-6342",
            "-g", "J0010-2818",
            "-t", "NGC253",
            "-r", "m002",
            "--applycal",
        ])
        .ok();
    assert!(cmd.is_ok(), "calibrate --dry-run failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);

    for task in ["clearcal(", "setjy(", "bandpass(", "fluxscale(", "applycal("] {
        assert!(stdout.contains(task), "no {task} in:\n{stdout}");
    }
    assert!(stdout.contains("1557347448.K"), "{stdout}");
    assert!(stdout.contains("1557347448.flux"), "{stdout}");
    assert!(stdout.contains("refant='m002'"), "{stdout}");
    // Nothing was written.
    assert_eq!(std::fs::read_dir(tmp_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_unknown_flux_calibrator() {
    #[rustfmt::skip]
    let cmd = calpipe()
        .args([
            "calibrate",
            "--dry-run",
            "--msfile", "/does/not/exist/1557347448.ms",
            "-f", "J0010-2818",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("not a standard flux calibrator"), "{stderr}");
    assert!(stderr.contains("--standard"), "{stderr}");
}

#[test]
fn test_missing_msfile() {
    let cmd = calpipe()
        .args(["calibrate", "--msfile", "/does/not/exist/obs.ms", "-f", "J1939-6342"])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("doesn't exist"), "{stderr}");
}

#[test]
fn test_missing_engine() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let ms = make_ms(tmp_dir.path());

    #[rustfmt::skip]
    let cmd = calpipe()
        .args([
            "calibrate",
            "--msfile", &ms,
            "--output-dir", &tmp_dir.path().display().to_string(),
            "--casa", "/does/not/exist/casa",
            "-f", "J1939-6342",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Couldn't start the calibration engine"), "{stderr}");
    assert!(stderr.contains("--dry-run"), "{stderr}");
}

#[cfg(unix)]
#[test]
fn test_engine_that_writes_nothing() {
    use std::{fs::Permissions, os::unix::fs::PermissionsExt};

    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let ms = make_ms(tmp_dir.path());
    // An engine that happily does nothing.
    let casa = tmp_dir.path().join("casa");
    std::fs::write(&casa, "#!/bin/sh\nexit 0\n").unwrap();
    std::fs::set_permissions(&casa, Permissions::from_mode(0o755)).unwrap();

    #[rustfmt::skip]
    let cmd = calpipe()
        .args([
            "calibrate",
            "--msfile", &ms,
            "--output-dir", &tmp_dir.path().display().to_string(),
            "--casa", &casa.display().to_string(),
            "-f", "J1939-6342",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("The delay stage didn't produce"), "{stderr}");
    assert!(stderr.contains("1557347448.K"), "{stderr}");
}

#[test]
fn test_save_toml_then_reuse() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let toml = tmp_dir.path().join("calibrate.toml");

    #[rustfmt::skip]
    let cmd = calpipe()
        .args([
            "calibrate",
            "--dry-run",
            "--save-toml", &toml.display().to_string(),
            "--msfile", "/does/not/exist/1557347448.ms",
            "-f", "J0408-6545",
            "-t", "NGC253",
        ])
        .ok();
    assert!(cmd.is_ok(), "calibrate --save-toml failed: {}", cmd.err().unwrap());
    let saved = std::fs::read_to_string(&toml).unwrap();
    assert!(saved.contains("fluxcal = \"J0408-6545\""), "{saved}");

    let cmd = calpipe()
        .args(["calibrate", "--dry-run", &toml.display().to_string()])
        .ok();
    assert!(cmd.is_ok(), "calibrate from a toml failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    // J0408-6545 is catalogued with a manual flux density.
    assert!(stdout.contains("standard='manual'"), "{stdout}");
    assert!(stdout.contains("NGC253"), "{stdout}");
}
