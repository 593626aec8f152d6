// Real-process and real-disk coverage: the classifier and executor over
// the tokio adapters, using shell scripts as stand-in interpreters so the
// suite does not depend on a Python install.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pyrun_core::application::EnvironmentClassifier;
use pyrun_core::domain::EnvironmentKind;
use pyrun_infra_system::{
    DirWorkspaceResolver, PipfileMatcher, TokioFileProbe, TokioProcessRunner,
};

/// Write an executable script that behaves like an interpreter.
fn fake_interpreter(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

fn classifier(folders: Vec<PathBuf>) -> EnvironmentClassifier {
    EnvironmentClassifier::new(
        Arc::new(TokioProcessRunner::new()),
        Arc::new(TokioFileProbe::new()),
        Arc::new(DirWorkspaceResolver::new(folders)),
        Arc::new(PipfileMatcher),
    )
}

#[tokio::test]
async fn attribute_probe_against_a_real_process() {
    let dir = tempfile::tempdir().unwrap();
    // Claims to be a virtualenv whatever it is asked.
    let interpreter = fake_interpreter(dir.path(), "python", "echo virtualenv");

    let classifier = classifier(vec![]);
    let kind = classifier
        .classify(&interpreter.to_string_lossy(), None)
        .await;
    assert_eq!(kind, EnvironmentKind::VirtualEnv);

    assert_eq!(
        classifier
            .environment_name(&interpreter.to_string_lossy())
            .await,
        "virtualenv"
    );
}

#[tokio::test]
async fn plain_interpreter_with_silent_probe_is_unknown() {
    let dir = tempfile::tempdir().unwrap();
    // Prints nothing, like a system interpreter outside any env.
    let interpreter = fake_interpreter(dir.path(), "python", "true");

    let kind = classifier(vec![])
        .classify(&interpreter.to_string_lossy(), None)
        .await;
    assert_eq!(kind, EnvironmentKind::Unknown);
}

#[tokio::test]
async fn marker_file_beats_a_live_probe() {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("bin");
    fs::create_dir_all(&bin).unwrap();
    fs::write(dir.path().join("pyvenv.cfg"), "home = /usr\n").unwrap();
    let interpreter = fake_interpreter(&bin, "python", "echo virtualenv");

    let kind = classifier(vec![])
        .classify(&interpreter.to_string_lossy(), None)
        .await;
    // Step 1 matched; the script's claim never ran.
    assert_eq!(kind, EnvironmentKind::Venv);
}

#[tokio::test]
async fn pipenv_detected_from_pipfile_and_venv_naming() {
    let workspace = tempfile::tempdir().unwrap();
    fs::write(workspace.path().join("Pipfile"), "[packages]\n").unwrap();
    let project = workspace
        .path()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .to_string();

    // Silent stand-in interpreter placed under a pipenv-style venv dir.
    let venvs = tempfile::tempdir().unwrap();
    let venv_bin = venvs.path().join(format!("{}-hash123", project)).join("bin");
    fs::create_dir_all(&venv_bin).unwrap();
    let interpreter = fake_interpreter(&venv_bin, "python", "true");

    let kind = classifier(vec![workspace.path().to_path_buf()])
        .classify(&interpreter.to_string_lossy(), None)
        .await;
    assert_eq!(kind, EnvironmentKind::PipEnv);
}
