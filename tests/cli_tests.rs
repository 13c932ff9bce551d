// End-to-end binary runs: allow-list discovery, skip-and-continue on
// malformed definitions, exit codes, and teardown behavior.

#![allow(deprecated)] // Command::cargo_bin is deprecated but still functional

use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn git(repo: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .current_dir(repo)
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A minimal kernel-tree stand-in: one driver catalog, one enabled symbol
/// that should be disabled and one that is allow-listed.
fn setup_tree(repo: &Path) {
    git(repo, &["init", "-b", "main"]);

    fs::create_dir_all(repo.join("drivers/iio/accel")).unwrap();
    fs::write(
        repo.join("drivers/iio/accel/Kconfig"),
        "config BMC150_ACCEL_I2C\n\ttristate\nconfig DA280\n\ttristate\n",
    )
    .unwrap();

    fs::create_dir_all(repo.join("redhat/configs/fedora/generic/x86")).unwrap();
    fs::write(
        repo.join("redhat/configs/fedora/generic/CONFIG_BMC150_ACCEL_I2C"),
        "CONFIG_BMC150_ACCEL_I2C=y\n",
    )
    .unwrap();
    fs::write(
        repo.join("redhat/configs/fedora/generic/CONFIG_DA280"),
        "CONFIG_DA280=m\n",
    )
    .unwrap();

    fs::create_dir_all(repo.join("redhat/scripts/x86_allow")).unwrap();
    fs::write(
        repo.join("redhat/scripts/x86_allow/iio_accel.json"),
        r#"{
            "name": "iio_accel",
            "driver_path": "drivers/iio/accel",
            "redhat_config_path": "redhat/configs/fedora/generic",
            "redhat_x86_config_path": "redhat/configs/fedora/generic/x86",
            "allow_list": ["CONFIG_BMC150_ACCEL_I2C"],
            "commit_msg": "Disable {{ config_name }} because no x86 board uses it."
        }"#,
    )
    .unwrap();

    git(repo, &["add", "-A"]);
    git(
        repo,
        &[
            "-c",
            "user.name=Test",
            "-c",
            "user.email=test@example.com",
            "commit",
            "-m",
            "initial tree",
        ],
    );
}

fn koclean(repo: &Path) -> Command {
    let mut cmd = Command::cargo_bin("koclean").unwrap();
    cmd.current_dir(repo)
        .arg("Kate Hsuan")
        .arg("hpa@redhat.com");
    cmd
}

#[test]
#[serial]
fn test_run_disables_da280_and_exports_patch() {
    let tmp = TempDir::new().unwrap();
    setup_tree(tmp.path());

    koclean(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Driver catalog name: iio_accel"))
        .stdout(predicate::str::contains("CONFIG_DA280 is not required."))
        .stdout(predicate::str::contains("1 symbol(s) disabled"));

    let override_path = tmp
        .path()
        .join("redhat/configs/fedora/generic/x86/CONFIG_DA280");
    assert_eq!(
        fs::read_to_string(override_path).unwrap(),
        "# CONFIG_DA280 is not set\n"
    );
    assert!(!tmp
        .path()
        .join("redhat/configs/fedora/generic/x86/CONFIG_BMC150_ACCEL_I2C")
        .exists());

    // Without --teardown the repo stays on the working branch.
    assert_eq!(
        git(tmp.path(), &["rev-parse", "--abbrev-ref", "HEAD"]),
        "wip/driver/unused-drivers"
    );
    let patches: Vec<_> = fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "patch"))
        .collect();
    assert_eq!(patches.len(), 1);
}

#[test]
#[serial]
fn test_teardown_returns_to_base_branch() {
    let tmp = TempDir::new().unwrap();
    setup_tree(tmp.path());

    koclean(tmp.path()).arg("--teardown").assert().success();

    assert_eq!(git(tmp.path(), &["rev-parse", "--abbrev-ref", "HEAD"]), "main");
    assert!(git(
        tmp.path(),
        &["branch", "--list", "wip/driver/unused-drivers"]
    )
    .is_empty());
}

#[test]
#[serial]
fn test_malformed_definition_is_skipped_not_fatal() {
    let tmp = TempDir::new().unwrap();
    setup_tree(tmp.path());
    fs::write(
        tmp.path().join("redhat/scripts/x86_allow/broken.json"),
        r#"{"name": "missing everything else"}"#,
    )
    .unwrap();

    koclean(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 definition(s) skipped"));
}

#[test]
#[serial]
fn test_missing_repository_is_fatal_exit_1() {
    let tmp = TempDir::new().unwrap();
    // Valid allow dir, but no git repository at all.
    fs::create_dir_all(tmp.path().join("redhat/scripts/x86_allow")).unwrap();

    koclean(tmp.path()).assert().failure().code(1);
}

#[test]
#[serial]
fn test_missing_allow_dir_is_fatal_exit_1() {
    let tmp = TempDir::new().unwrap();
    git(tmp.path(), &["init", "-b", "main"]);
    fs::write(tmp.path().join("README"), "x\n").unwrap();
    git(tmp.path(), &["add", "README"]);
    git(
        tmp.path(),
        &[
            "-c",
            "user.name=Test",
            "-c",
            "user.email=test@example.com",
            "commit",
            "-m",
            "initial",
        ],
    );

    koclean(tmp.path()).assert().failure().code(1);
}

#[test]
#[serial]
fn test_second_run_warns_about_stale_sentinel() {
    let tmp = TempDir::new().unwrap();
    setup_tree(tmp.path());
    fs::write(tmp.path().join(".koclean-in-progress"), "wip/old\n").unwrap();

    // Stale sentinel warns but does not block the run.
    koclean(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("previous run did not finish"));
}
