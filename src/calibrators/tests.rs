// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::Path;

use approx::assert_abs_diff_eq;
use indoc::indoc;

use super::*;

fn set(fields: &[&str]) -> FieldSet {
    fields.iter().copied().collect()
}

#[test]
fn test_parse_list_dedups_and_trims() {
    let fields = FieldSet::parse_list(" J1939-6342, J0010-2818,,J1939-6342 ,  ");
    assert_eq!(fields.len(), 2);
    assert_eq!(fields, set(&["J0010-2818", "J1939-6342"]));
    assert!(fields.contains("J1939-6342"));
    assert!(!fields.contains(""));
}

#[test]
fn test_parse_list_empty() {
    assert!(FieldSet::parse_list("").is_empty());
    assert!(FieldSet::parse_list(" , ,").is_empty());
    assert_eq!(FieldSet::new().join(), "");
}

#[test]
fn test_equality_is_order_independent() {
    assert_eq!(FieldSet::parse_list("a,b,c"), FieldSet::parse_list("c,a,b"));
    assert_ne!(FieldSet::parse_list("a,b"), FieldSet::parse_list("a,b,c"));
}

#[test]
fn test_join_is_deterministic() {
    let fields = FieldSet::parse_list("b, a, b, c");
    assert_eq!(fields.join(), "b,a,c");
    assert_eq!(fields.join(), fields.to_string());
    // Joining and re-parsing gives the same set.
    assert_eq!(FieldSet::parse_list(&fields.join()), fields);
}

#[test]
fn test_union_and_difference() {
    let a = set(&["x", "y"]);
    let b = set(&["y", "z"]);
    assert_eq!(a.union(&b), set(&["x", "y", "z"]));
    assert_eq!(a.difference(&b), set(&["x"]));
    assert_eq!(b.difference(&a), set(&["z"]));
    assert!(a.difference(&a).is_empty());
}

#[test]
fn test_roles_default_to_flux() {
    let roles = CalibratorRoles::new(
        FieldSet::parse_list("J1939-6342"),
        None,
        None,
        FieldSet::parse_list("J0010-2818"),
        FieldSet::new(),
    )
    .unwrap();
    assert_eq!(roles.bandpass(), &set(&["J1939-6342"]));
    assert_eq!(roles.delay(), &set(&["J1939-6342"]));
    assert_eq!(roles.role(CalibratorRole::Gain), &set(&["J0010-2818"]));
    assert_eq!(roles.secondary(), set(&["J0010-2818"]));
    assert_eq!(roles.delay_solve_fields(), set(&["J1939-6342"]));
}

#[test]
fn test_roles_need_a_flux_calibrator() {
    let result = CalibratorRoles::new(
        FieldSet::new(),
        Some(FieldSet::parse_list("a")),
        None,
        FieldSet::new(),
        FieldSet::new(),
    );
    assert!(matches!(result, Err(RolesError::NoFluxCalibrators)));
}

#[test]
fn test_secondary_never_contains_flux_calibrators() {
    // Consecutive flux calibrators in the bandpass list must all be removed.
    let roles = CalibratorRoles::new(
        FieldSet::parse_list("F1,F2"),
        Some(FieldSet::parse_list("F1,F2,B1,F1")),
        None,
        FieldSet::parse_list("G1,F2"),
        FieldSet::new(),
    )
    .unwrap();
    let secondary = roles.secondary();
    for flux in roles.flux() {
        assert!(!secondary.contains(flux), "{flux} is in {secondary}");
    }
    assert_eq!(secondary, set(&["B1", "G1"]));
}

#[test]
fn test_secondary_empty_without_extra_calibrators() {
    let roles = CalibratorRoles::new(
        FieldSet::parse_list("J1939-6342"),
        None,
        None,
        FieldSet::new(),
        FieldSet::parse_list("target"),
    )
    .unwrap();
    assert!(roles.secondary().is_empty());
    assert_eq!(roles.target_gain_fields(), roles.flux());
}

#[test]
fn test_all_calibrators() {
    let roles = CalibratorRoles::new(
        FieldSet::parse_list("F"),
        Some(FieldSet::parse_list("B,F")),
        Some(FieldSet::parse_list("D")),
        FieldSet::parse_list("G"),
        FieldSet::parse_list("T"),
    )
    .unwrap();
    // Delay calibrators only feed the apply mapping.
    assert_eq!(roles.all_calibrators(), set(&["F", "B", "G"]));
    assert_eq!(roles.target_gain_fields(), &set(&["G"]));
}

#[test]
fn test_measurement_set_prefix() {
    let ms = MeasurementSet::new("/data/obs.ms").unwrap();
    assert_eq!(ms.prefix(), "obs");
    assert_eq!(ms.path(), Path::new("/data/obs.ms"));

    let ms = MeasurementSet::new("1234567890_sdp_l0.full.ms").unwrap();
    assert_eq!(ms.prefix(), "1234567890_sdp_l0.full");

    let fixed = ms.fixvis_output(Path::new("out"));
    assert_eq!(fixed.prefix(), "1234567890_sdp_l0.full_fixvis");
    assert_eq!(fixed.path(), Path::new("out/1234567890_sdp_l0.full_fixvis.ms"));

    assert!(MeasurementSet::new("").is_err());
}

#[cfg(unix)]
#[test]
fn test_measurement_set_path_must_be_utf8() {
    use std::{ffi::OsStr, os::unix::ffi::OsStrExt, path::PathBuf};

    // The stem is fine but a parent directory isn't.
    let mut path = PathBuf::from(OsStr::from_bytes(b"/data/\xff\xfe"));
    path.push("obs.ms");
    assert!(matches!(
        MeasurementSet::new(path),
        Err(MeasurementSetError::NotUtf8(_))
    ));
}

#[test]
fn test_flux_standard_stokes() {
    let standard: FluxStandard = "1,0,0,0".parse().unwrap();
    assert!(standard.is_manual());
    match standard {
        FluxStandard::Stokes(s) => {
            for (got, expected) in s.into_iter().zip([1.0, 0.0, 0.0, 0.0]) {
                assert_abs_diff_eq!(got, expected);
            }
        }
        FluxStandard::Named(_) => panic!("expected Stokes parameters"),
    }

    let standard: FluxStandard = " 17.1, 0.0 ,0, 0 ".parse().unwrap();
    assert_eq!(standard, FluxStandard::Stokes([17.1, 0.0, 0.0, 0.0]));
}

#[test]
fn test_flux_standard_named() {
    let standard: FluxStandard = "Perley-Butler 2013".parse().unwrap();
    assert!(!standard.is_manual());
    assert_eq!(standard, FluxStandard::Named("Perley-Butler 2013".to_string()));

    // Not four elements, so it's a name.
    let standard: FluxStandard = "1,0,0".parse().unwrap();
    assert_eq!(standard, FluxStandard::Named("1,0,0".to_string()));
}

#[test]
fn test_flux_standard_bad_stokes() {
    let result = "1,0,zero,0".parse::<FluxStandard>();
    assert!(matches!(result, Err(FluxStandardError::BadStokes { .. })));
    assert!(matches!(
        "  ".parse::<FluxStandard>(),
        Err(FluxStandardError::Empty)
    ));
}

#[test]
fn test_flux_standard_non_finite_stokes() {
    for input in ["nan,0,0,0", "inf,0,0,0", "1,-inf,0,0", "1e400,0,0,0"] {
        match input.parse::<FluxStandard>() {
            Err(FluxStandardError::BadStokes { input: i, .. }) => assert_eq!(i, input),
            other => panic!("expected {input} to be rejected, got {other:?}"),
        }
    }
}

#[test]
fn test_catalog_resolve() {
    let catalog = CalibratorCatalog::meerkat();
    let standard = catalog
        .resolve(&FieldSet::parse_list("J1939-6342"), None)
        .unwrap();
    assert_eq!(
        standard,
        FluxStandard::Named("Stevens-Reynolds 2016".to_string())
    );

    let standard = catalog
        .resolve(&FieldSet::parse_list("J0408-6545"), None)
        .unwrap();
    assert!(standard.is_manual());

    // An explicit standard is always used.
    let explicit = FluxStandard::Stokes([1.0, 0.0, 0.0, 0.0]);
    let standard = catalog
        .resolve(&FieldSet::parse_list("J9999-9999"), Some(explicit.clone()))
        .unwrap();
    assert_eq!(standard, explicit);
}

#[test]
fn test_catalog_resolve_unknown() {
    let catalog = CalibratorCatalog::meerkat();
    let result = catalog.resolve(&FieldSet::parse_list("J9999-9999"), None);
    match result {
        Err(CatalogError::UnknownFluxCalibrator { name, known }) => {
            assert_eq!(name, "J9999-9999");
            assert!(known.contains("J1939-6342"));
        }
        _ => panic!("expected an unknown-calibrator error"),
    }

    let result = catalog.resolve(&FieldSet::parse_list("J1939-6342,J1331+3030"), None);
    assert!(matches!(result, Err(CatalogError::MixedStandards(_))));

    let result = catalog.resolve(&FieldSet::new(), None);
    assert!(matches!(result, Err(CatalogError::NoFluxCalibrators)));
}

#[test]
fn test_catalog_from_toml() {
    let toml = indoc! {r#"
        [calibrators]
        "J1939-6342" = "Perley-Butler 2017"
        "J0521+1638" = [8.3, 0.0, 0.0, 0.0]
    "#};
    let file_catalog = CalibratorCatalog::from_toml_str(toml).unwrap();
    assert_eq!(file_catalog.len(), 2);

    let mut catalog = CalibratorCatalog::meerkat();
    catalog.extend(file_catalog);
    assert_eq!(catalog.len(), 4);
    assert_eq!(
        catalog.lookup("J1939-6342"),
        Some(&FluxStandard::Named("Perley-Butler 2017".to_string()))
    );
    assert_eq!(
        catalog.lookup("J0521+1638"),
        Some(&FluxStandard::Stokes([8.3, 0.0, 0.0, 0.0]))
    );
}

#[test]
fn test_catalog_from_json() {
    let json = r#"{"calibrators": {"J0408-6545": [15.0, 0, 0, 0]}}"#;
    let catalog = CalibratorCatalog::from_json_str(json).unwrap();
    assert_eq!(
        catalog.lookup("J0408-6545"),
        Some(&FluxStandard::Stokes([15.0, 0.0, 0.0, 0.0]))
    );

    assert!(matches!(
        CalibratorCatalog::from_json_str("{"),
        Err(CatalogError::Decode(_))
    ));
}
