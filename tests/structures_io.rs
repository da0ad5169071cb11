use exan_rs::structures::{
    STRUCTURE_DIR, Structure, StructureError, StructureFormat, structure_path,
    write_structure_files,
};
use std::fs;
use tempfile::tempdir;

const WATER_AIMS: &str = "\
atom 0.000 0.000 0.119 O
atom 0.000 0.763 -0.477 H
atom 0.000 -0.763 -0.477 H
";

const SALT_XYZ: &str = "\
2
Lattice=\"5.64 0.0 0.0 0.0 5.64 0.0 0.0 0.0 5.64\" pbc=\"T T T\"
Na 0.0 0.0 0.0
Cl 2.82 2.82 2.82
";

#[test]
fn converts_rows_in_order() {
    let src = tempdir().unwrap();
    let out = tempdir().unwrap();
    let a = src.path().join("water.in");
    let b = src.path().join("water2.in");
    fs::write(&a, WATER_AIMS).unwrap();
    fs::write(&b, WATER_AIMS).unwrap();

    let written = write_structure_files(&[a, b], StructureFormat::Aims, out.path()).unwrap();
    assert_eq!(written.len(), 2);
    assert_eq!(written[0], out.path().join(STRUCTURE_DIR).join("set0.xyz"));
    assert_eq!(written[1], out.path().join(structure_path(1)));

    let text = fs::read_to_string(&written[0]).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("3"));
    assert!(lines.next().unwrap().contains("pbc=\"F F F\""));
    assert!(lines.next().unwrap().starts_with("O "));
}

#[test]
fn periodic_xyz_keeps_its_cell() {
    let s = Structure::parse(SALT_XYZ, StructureFormat::Xyz).unwrap();
    assert_eq!(s.atoms.len(), 2);
    assert_eq!(s.atoms[1].symbol, "Cl");
    let cell = s.lattice.unwrap();
    assert_eq!(cell[0], [5.64, 0.0, 0.0]);
    assert_eq!(cell[2], [0.0, 0.0, 5.64]);

    let xyz = s.to_xyz();
    assert!(xyz.contains("Lattice=\"5.64 0 0 0 5.64 0 0 0 5.64\""));
    assert!(xyz.contains("pbc=\"T T T\""));

    // written output parses back to the same structure
    let again = Structure::parse(&xyz, StructureFormat::Xyz).unwrap();
    assert_eq!(again.atoms.len(), 2);
    assert_eq!(again.lattice, s.lattice);
}

#[test]
fn missing_files_report_their_path() {
    let out = tempdir().unwrap();
    let missing = out.path().join("nope.in");
    let err = write_structure_files(&[missing.clone()], StructureFormat::Aims, out.path())
        .unwrap_err();
    match err {
        StructureError::Io { path, .. } => assert_eq!(path, missing),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn broken_geometry_is_rejected() {
    let err = Structure::parse("atom 0.0 zero 0.0 H\n", StructureFormat::Aims).unwrap_err();
    assert!(err.to_string().contains("line 1"));
    assert!(matches!(
        Structure::parse("# nothing\n", StructureFormat::Aims),
        Err(StructureError::Empty)
    ));
    assert!(matches!(
        Structure::parse("atom_frac 0.5 0.5 0.5 Fe\n", StructureFormat::Aims),
        Err(StructureError::MissingLattice)
    ));
}
