use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_cli_pack_list_install_remove_cycle() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Setup: a small source tree
    let source_dir = tempdir()?;
    fs::write(source_dir.path().join("readme.txt"), "Hello from the CLI.\n")?;
    let nested_dir = source_dir.path().join("nested");
    fs::create_dir(&nested_dir)?;
    fs::write(nested_dir.join("data.bin"), [0u8, 1, 2, 3, 4, 5])?;

    let archive_dir = tempdir()?;
    let archive_path = archive_dir.path().join("pkg.tar.gz");

    // 2. Pack
    let mut cmd = Command::cargo_bin("treepack")?;
    cmd.arg("pack")
        .arg(source_dir.path())
        .arg("--output")
        .arg(&archive_path);
    cmd.assert().success();

    assert!(archive_path.exists());

    // 3. List contents
    let mut cmd = Command::cargo_bin("treepack")?;
    cmd.arg("list").arg(&archive_path);
    cmd.assert().success().stdout(
        predicate::str::contains("readme.txt")
            .and(predicate::str::contains("nested/"))
            .and(predicate::str::contains("nested/data.bin")),
    );

    // 4. Install into a fresh root
    let dest_dir = tempdir()?;
    let mut cmd = Command::cargo_bin("treepack")?;
    cmd.arg("install").arg(dest_dir.path()).arg(&archive_path);
    cmd.assert().success();

    let installed = fs::read(dest_dir.path().join("readme.txt"))?;
    assert_eq!(installed, fs::read(source_dir.path().join("readme.txt"))?);
    let installed_nested = fs::read(dest_dir.path().join("nested/data.bin"))?;
    assert_eq!(installed_nested, [0, 1, 2, 3, 4, 5]);

    // 5. Remove everything that was installed
    let mut cmd = Command::cargo_bin("treepack")?;
    cmd.arg("remove").arg(dest_dir.path()).arg(&archive_path);
    cmd.assert().success();

    assert_eq!(fs::read_dir(dest_dir.path())?.count(), 0);

    Ok(())
}

#[test]
fn test_cli_pack_refuses_existing_archive() -> Result<(), Box<dyn std::error::Error>> {
    let source_dir = tempdir()?;
    fs::write(source_dir.path().join("f"), "x")?;

    let archive_dir = tempdir()?;
    let archive_path = archive_dir.path().join("pkg.tar.gz");
    fs::write(&archive_path, "already here")?;

    let mut cmd = Command::cargo_bin("treepack")?;
    cmd.arg("pack")
        .arg(source_dir.path())
        .arg("--output")
        .arg(&archive_path);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("refusing to over-write"));

    assert_eq!(fs::read(&archive_path)?, b"already here");
    Ok(())
}

#[test]
fn test_cli_install_refuses_destination_collision() -> Result<(), Box<dyn std::error::Error>> {
    let source_dir = tempdir()?;
    fs::write(source_dir.path().join("clash.txt"), "new")?;

    let archive_dir = tempdir()?;
    let archive_path = archive_dir.path().join("pkg.tar.gz");

    let mut cmd = Command::cargo_bin("treepack")?;
    cmd.arg("pack")
        .arg(source_dir.path())
        .arg("--output")
        .arg(&archive_path);
    cmd.assert().success();

    let dest_dir = tempdir()?;
    fs::write(dest_dir.path().join("clash.txt"), "old")?;

    let mut cmd = Command::cargo_bin("treepack")?;
    cmd.arg("install").arg(dest_dir.path()).arg(&archive_path);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("refusing to over-write"));

    assert_eq!(fs::read(dest_dir.path().join("clash.txt"))?, b"old");
    Ok(())
}

#[test]
fn test_cli_activate_emits_evalable_exports() -> Result<(), Box<dyn std::error::Error>> {
    let project_dir = tempdir()?;
    let project = project_dir.path().join("proj");

    let mut cmd = Command::cargo_bin("treepack")?;
    cmd.arg("activate")
        .arg(&project)
        .env("SHELL", "/bin/bash")
        .env_remove("TREEPACK_ENV");
    cmd.assert().success().stdout(
        predicate::str::contains("deactivate () {")
            .and(predicate::str::contains("export TREEPACK_ENV="))
            .and(predicate::str::contains("export TREEPACK_PATH=")),
    );

    assert!(project.join("venv").is_dir());
    Ok(())
}

#[test]
fn test_cli_activate_refuses_nested_environments() -> Result<(), Box<dyn std::error::Error>> {
    let project_dir = tempdir()?;

    let mut cmd = Command::cargo_bin("treepack")?;
    cmd.arg("activate")
        .arg(project_dir.path().join("proj"))
        .env("SHELL", "/bin/bash")
        .env("TREEPACK_ENV", "/somewhere/venv");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("already in an active environment"));
    Ok(())
}
