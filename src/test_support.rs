//! Fixtures shared by unit tests

use manifest::{Component, ComponentManifest, Coordinate};
use reconcile::layout;
use std::fs;
use std::path::Path;

pub fn write(root: &Path, rel: &str, content: &str) {
    let path = layout::resolve(root, rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

pub fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(layout::resolve(root, rel)).unwrap()
}

pub fn write_manifest(root: &Path, components: &[(&str, &str, Option<&str>)]) {
    let manifest = ComponentManifest {
        components: components
            .iter()
            .map(|(coordinate, version, source)| Component {
                coordinate: Coordinate::parse(coordinate).unwrap(),
                version: (*version).to_string(),
                source: source.map(str::to_string),
            })
            .collect(),
    };
    manifest
        .save(&layout::metadata_dir(root).join(layout::MANIFEST_FILE))
        .unwrap();
}
