//! Integration tests for settings and the environment cache.

use std::fs;
use std::path::PathBuf;

use phoobe_cli::{CacheError, EnvironmentCache, EnvironmentRecord, Settings};
use tempfile::TempDir;

#[test]
fn test_settings_file_with_overrides() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("phoobe.yaml");
    fs::write(
        &path,
        "environment_file: lab.yaml\nenvironment_name: lab\ncache_file: state/envs.json\nnetwork_ids: ids.yaml\n",
    )
    .unwrap();

    let settings = Settings::load(&path)
        .unwrap()
        .with_environment_name(Some("override".to_string()));

    assert_eq!(settings.environment_file, PathBuf::from("lab.yaml"));
    assert_eq!(settings.environment_name, "override");
    assert_eq!(settings.cache_file, PathBuf::from("state/envs.json"));
    assert_eq!(settings.network_ids, Some(PathBuf::from("ids.yaml")));
}

#[test]
fn test_register_then_forget_cycle() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".phoobe").join("environments.json");

    let mut cache = EnvironmentCache::load(&path).unwrap();
    cache
        .insert(EnvironmentRecord::new("lab", "a1b2", "environment.yaml"))
        .unwrap();
    cache
        .insert(EnvironmentRecord::new("demo", "c3d4", "demo.yaml"))
        .unwrap();
    cache.save().unwrap();

    let mut cache = EnvironmentCache::load(&path).unwrap();
    let names: Vec<_> = cache.records().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["demo", "lab"]);

    let err = cache
        .insert(EnvironmentRecord::new("lab", "e5f6", "environment.yaml"))
        .unwrap_err();
    assert!(matches!(err, CacheError::EnvironmentAlreadyCreated(_)));

    cache.remove("lab").unwrap();
    cache.save().unwrap();

    let cache = EnvironmentCache::load(&path).unwrap();
    assert!(matches!(
        cache.require("lab"),
        Err(CacheError::EnvironmentNotCreated(name)) if name == "lab"
    ));
    assert_eq!(cache.require("demo").unwrap().filename, PathBuf::from("demo.yaml"));
}
