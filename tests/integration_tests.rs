#![cfg(unix)]

mod common;

use httpmock::prelude::*;
use jpackager::domain::model::FetchOutcome;
use jpackager::{PackageState, Packager, PackagerError, Stage, SystemToolRunner};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_end_to_end_from_fresh_checkout() {
    let temp = TempDir::new().unwrap();
    let server = MockServer::start_async().await;
    let archive_mock = server
        .mock_async(|when, then| {
            when.method(GET).path(common::ARCHIVE_PATH);
            then.status(200)
                .header("Content-Type", "application/zip")
                .body(common::jmods_zip());
        })
        .await;

    let settings = common::settings(temp.path(), &server.base_url(), 0);
    assert!(!settings.jmods_dir.exists());

    let mut packager = Packager::new(settings.clone(), Arc::new(SystemToolRunner::new()));
    let report = packager.run().await.unwrap();

    archive_mock.assert_async().await;
    assert_eq!(report.state, PackageState::Done);
    assert_eq!(packager.state(), PackageState::Done);

    match report.fetch {
        Some(FetchOutcome::Downloaded { files, .. }) => assert_eq!(files, common::MODULES.len()),
        other => panic!("expected a download, got {:?}", other),
    }
    for module in common::MODULES {
        assert!(settings
            .javafx_module_dir()
            .join(format!("{}.jmod", module))
            .is_file());
    }

    let image = report.image_dir.unwrap();
    assert!(image.join("bin").is_dir());
    assert!(image.join("release").is_file());

    let installers = common::files_in(&settings.installer_dir);
    assert_eq!(installers.len(), 1);
    assert_eq!(installers, report.installers);
    assert!(installers[0].ends_with("Template-1.0.deb"));

    let stages: Vec<Stage> = report.stages.iter().map(|s| s.stage).collect();
    assert_eq!(stages, vec![Stage::Fetch, Stage::Image, Stage::Installer]);
}

#[tokio::test]
async fn test_second_run_does_not_download_again() {
    let temp = TempDir::new().unwrap();
    let server = MockServer::start_async().await;
    let archive_mock = server
        .mock_async(|when, then| {
            when.method(GET).path(common::ARCHIVE_PATH);
            then.status(200).body(common::jmods_zip());
        })
        .await;

    let settings = common::settings(temp.path(), &server.base_url(), 0);

    for _ in 0..2 {
        let mut packager = Packager::new(settings.clone(), Arc::new(SystemToolRunner::new()));
        packager.run().await.unwrap();
    }

    assert_eq!(archive_mock.hits_async().await, 1);
    assert_eq!(common::files_in(&settings.installer_dir).len(), 1);
}

#[tokio::test]
async fn test_installer_failure_carries_exit_code() {
    for code in [1, 7, 64] {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(common::ARCHIVE_PATH);
                then.status(200).body(common::jmods_zip());
            })
            .await;

        let settings = common::settings(temp.path(), &server.base_url(), code);
        let mut packager = Packager::new(settings.clone(), Arc::new(SystemToolRunner::new()));

        let err = packager.run().await.unwrap_err();

        assert!(
            err.to_string().contains(&format!("exit code {}", code)),
            "unexpected error: {}",
            err
        );
        assert!(matches!(err, PackagerError::ToolFailedError { .. }));
        assert_eq!(packager.state(), PackageState::Failed);
        assert!(common::files_in(&settings.installer_dir).is_empty());
    }
}

#[tokio::test]
async fn test_read_only_image_from_previous_run_is_replaced() {
    let temp = TempDir::new().unwrap();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(common::ARCHIVE_PATH);
            then.status(200).body(common::jmods_zip());
        })
        .await;

    let settings = common::settings(temp.path(), &server.base_url(), 0);
    let legal = settings.image_dir.join("legal");
    fs::create_dir_all(&legal).unwrap();
    let notice = legal.join("NOTICE");
    fs::write(&notice, b"old").unwrap();
    for path in [&notice, &legal] {
        let mut perms = fs::metadata(path).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(path, perms).unwrap();
    }

    let mut packager = Packager::new(settings.clone(), Arc::new(SystemToolRunner::new()));
    let report = packager.run_until(Stage::Image).await.unwrap();

    assert_eq!(report.state, PackageState::Done);
    assert!(!notice.exists());
    assert!(settings.image_dir.join("release").is_file());
}

#[tokio::test]
async fn test_missing_jpackage_is_reported() {
    let temp = TempDir::new().unwrap();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(common::ARCHIVE_PATH);
            then.status(200).body(common::jmods_zip());
        })
        .await;

    let settings = common::settings(temp.path(), &server.base_url(), 0);
    fs::remove_file(settings.java_home.join("bin/jpackage")).unwrap();

    let mut packager = Packager::new(settings, Arc::new(SystemToolRunner::new()));
    let err = packager.run().await.unwrap_err();

    assert!(matches!(err, PackagerError::ToolNotFoundError { ref tool, .. } if tool == "jpackage"));
    assert_eq!(packager.state(), PackageState::Failed);
}
