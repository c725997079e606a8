//! Runs a real helper script through the transformer.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use slowsort_provider_process::CommandDoubler;
use slowsort_rt::{Pipeline, SortConfig, TransformConfig, Transformer};

const CALC_SH: &str = "#!/bin/sh\n\
if [ \"$1\" = \"4\" ]; then\n\
  echo \"refusing $1\" >&2\n\
  exit 1\n\
fi\n\
echo $(( $1 * 2 ))\n";

fn install_script(dir: &Path) {
    let path = dir.join("calc.sh");
    fs::write(&path, CALC_SH).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn script_failures_are_isolated_per_element() {
    let dir = tempfile::tempdir().unwrap();
    install_script(dir.path());

    let doubler = CommandDoubler::default().with_current_dir(dir.path());
    let transformer = Transformer::from_config(doubler, TransformConfig::default()).unwrap();
    let out = transformer.transform(&[1, 4, 9]);

    assert_eq!(out.values, vec![2, 18]);
    assert_eq!(out.failures.len(), 1);
    assert_eq!(out.failures[0].value, 4);
    assert!(out.failures[0].detail.contains("refusing 4"));
}

#[test]
fn script_feeds_sorted_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    install_script(dir.path());

    let doubler = CommandDoubler::new("./calc.sh")
        .unwrap()
        .with_current_dir(dir.path());
    let transformer = Transformer::from_config(doubler, TransformConfig::default()).unwrap();
    let pipeline = Pipeline::new(transformer, SortConfig::new(2).unwrap()).unwrap();

    let out = pipeline.run(&[3, -1, 7, 0, 2]).unwrap();
    assert_eq!(out.sorted, vec![-2, 0, 4, 6, 14]);
    assert!(out.failures.is_empty());
}
