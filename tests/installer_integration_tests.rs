//! Integration tests for RuntimeInstaller
//!
//! The installer process is replaced by a mock that fakes its filesystem
//! effect (writing the version descriptor) so no JVM is needed.

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use hyperion::error::InstallFailure;
use hyperion::services::{InstallOutcome, InstallerCommand, ProcessRunner, RuntimeInstaller};
use hyperion::{LauncherError, RuntimeId};
use mockall::mock;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

mock! {
    pub Runner {}

    #[async_trait]
    impl ProcessRunner for Runner {
        async fn run(&self, command: &InstallerCommand) -> std::io::Result<i32>;
    }
}

struct Fixture {
    _temp: TempDir,
    game_dir: Utf8PathBuf,
    installer_jar: Utf8PathBuf,
}

fn fixture() -> Fixture {
    let temp = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
    let installer_jar = root.join("resources").join("fabric-installer.jar");
    fs::create_dir_all(installer_jar.parent().unwrap()).unwrap();
    fs::write(&installer_jar, b"jar").unwrap();

    Fixture {
        game_dir: root.join(".minecraft"),
        installer_jar,
        _temp: temp,
    }
}

fn installer(fixture: &Fixture, runner: MockRunner) -> RuntimeInstaller {
    RuntimeInstaller::new(
        "java",
        vec![
            fixture.installer_jar.parent().unwrap().join("missing.jar"),
            fixture.installer_jar.clone(),
        ],
    )
    .with_runner(Arc::new(runner))
}

fn write_descriptor(path: &Utf8Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "{}").unwrap();
}

#[tokio::test]
async fn test_installs_once_then_short_circuits() {
    let fixture = fixture();
    let id = RuntimeId::derive("0.17.3", "1.21.4");
    let descriptor = RuntimeInstaller::descriptor_path(&fixture.game_dir, &id);

    let mut runner = MockRunner::new();
    let expected_jar = fixture.installer_jar.to_string();
    runner
        .expect_run()
        .withf(move |cmd| {
            cmd.program == "java"
                && cmd.args[1] == expected_jar
                && cmd.args.windows(2).any(|w| w == ["-mcversion", "1.21.4"])
                && cmd.args.windows(2).any(|w| w == ["-loader", "0.17.3"])
        })
        .times(1)
        .returning(move |_| {
            write_descriptor(&descriptor);
            Ok(0)
        });

    let installer = installer(&fixture, runner);

    let first = installer.ensure_installed(&fixture.game_dir, &id).await.unwrap();
    let second = installer.ensure_installed(&fixture.game_dir, &id).await.unwrap();

    assert_eq!(first, InstallOutcome::Installed);
    assert_eq!(second, InstallOutcome::AlreadyInstalled);
}

#[tokio::test]
async fn test_existing_descriptor_skips_installer() {
    let fixture = fixture();
    let id = RuntimeId::derive("0.17.3", "1.21.8");
    write_descriptor(&RuntimeInstaller::descriptor_path(&fixture.game_dir, &id));

    let mut runner = MockRunner::new();
    runner.expect_run().times(0);

    let outcome = installer(&fixture, runner)
        .ensure_installed(&fixture.game_dir, &id)
        .await
        .unwrap();
    assert_eq!(outcome, InstallOutcome::AlreadyInstalled);
}

#[tokio::test]
async fn test_clean_exit_without_descriptor_fails_verification() {
    let fixture = fixture();
    let id = RuntimeId::derive("0.17.3", "1.21.4");

    let mut runner = MockRunner::new();
    runner.expect_run().times(1).returning(|_| Ok(0));

    let result = installer(&fixture, runner)
        .ensure_installed(&fixture.game_dir, &id)
        .await;

    match result {
        Err(LauncherError::InstallVerificationFailed { descriptor }) => {
            assert_eq!(descriptor, RuntimeInstaller::descriptor_path(&fixture.game_dir, &id));
        }
        other => panic!("Expected InstallVerificationFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_nonzero_exit_is_install_failure() {
    let fixture = fixture();
    let id = RuntimeId::derive("0.17.3", "1.21.4");

    let mut runner = MockRunner::new();
    runner.expect_run().times(1).returning(|_| Ok(1));

    let result = installer(&fixture, runner)
        .ensure_installed(&fixture.game_dir, &id)
        .await;

    assert!(matches!(
        result,
        Err(LauncherError::InstallFailed(InstallFailure::ExitCode(1)))
    ));
}

#[tokio::test]
async fn test_spawn_error_is_install_failure() {
    let fixture = fixture();
    let id = RuntimeId::derive("0.17.3", "1.21.4");

    let mut runner = MockRunner::new();
    runner.expect_run().times(1).returning(|_| {
        Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "java: command not found",
        ))
    });

    let err = installer(&fixture, runner)
        .ensure_installed(&fixture.game_dir, &id)
        .await
        .unwrap_err();

    assert!(matches!(err, LauncherError::InstallFailed(InstallFailure::Spawn(_))));
    assert!(err.to_string().contains("command not found"));
}

#[tokio::test]
async fn test_missing_installer_jar() {
    let fixture = fixture();
    let id = RuntimeId::derive("0.17.3", "1.21.4");
    fs::remove_file(&fixture.installer_jar).unwrap();

    let mut runner = MockRunner::new();
    runner.expect_run().times(0);

    let result = installer(&fixture, runner)
        .ensure_installed(&fixture.game_dir, &id)
        .await;

    match result {
        Err(LauncherError::InstallerNotFound { searched }) => assert_eq!(searched.len(), 2),
        other => panic!("Expected InstallerNotFound, got {:?}", other),
    }
    // The version directory is prepared before the jar lookup.
    assert!(
        RuntimeInstaller::descriptor_path(&fixture.game_dir, &id)
            .parent()
            .unwrap()
            .is_dir()
    );
}
