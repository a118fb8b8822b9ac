use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

const FULL: &str = "keyAlias=upload\nkeyPassword=s3cret-key\nstoreFile=upload.jks\nstorePassword=s3cret-store\n";

fn cli(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("lipikar-android").unwrap();
    cmd.current_dir(dir).arg("--no-color");
    cmd
}

/// Flutter-style layout: <root>/android/key.properties next to the keystore
fn android_project(root: &Path, properties: Option<&str>) -> std::path::PathBuf {
    let android = root.join("android");
    std::fs::create_dir_all(&android).unwrap();
    if let Some(content) = properties {
        std::fs::write(android.join("key.properties"), content).unwrap();
    }
    std::fs::write(android.join("upload.jks"), b"keystore").unwrap();
    android
}

#[test]
fn signing_show_masks_passwords() {
    let root = tempfile::tempdir().unwrap();
    android_project(root.path(), Some(FULL));

    cli(root.path())
        .args(["signing", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("upload"))
        .stdout(predicate::str::contains("********"))
        .stdout(predicate::str::contains("s3cret").not());
}

#[test]
fn signing_show_json_reveal() {
    let root = tempfile::tempdir().unwrap();
    android_project(root.path(), Some(FULL));

    cli(root.path())
        .args(["signing", "show", "--json", "--reveal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"key_password\": \"s3cret-key\""))
        .stdout(predicate::str::contains("\"missing_keys\": []"));
}

#[test]
fn signing_show_missing_file_warns_and_succeeds() {
    let root = tempfile::tempdir().unwrap();

    cli(root.path())
        .args(["signing", "show", "--properties", "nowhere/key.properties"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Keystore properties file not found at"))
        .stderr(predicate::str::contains("nowhere"));
}

#[test]
fn signing_check_passes_for_complete_file() {
    let root = tempfile::tempdir().unwrap();
    android_project(root.path(), Some(FULL));

    cli(root.path())
        .args(["signing", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Release signing ready"));
}

#[test]
fn signing_check_names_missing_keys() {
    let root = tempfile::tempdir().unwrap();
    android_project(root.path(), Some("keyAlias=upload\nstoreFile=upload.jks\n"));

    cli(root.path())
        .args(["signing", "check"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("keyPassword, storePassword"));
}

#[test]
fn signing_check_without_file_fails() {
    let root = tempfile::tempdir().unwrap();
    android_project(root.path(), None);

    cli(root.path())
        .args(["signing", "check"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("No release signing credentials"));
}

#[test]
fn release_dry_run_plans_signing_without_leaking_secrets() {
    let root = tempfile::tempdir().unwrap();
    android_project(root.path(), Some(FULL));

    cli(root.path())
        .args(["build", "--release", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("assembleRelease"))
        .stdout(predicate::str::contains("proguard-rules.pro"))
        .stdout(predicate::str::contains(
            "ORG_GRADLE_PROJECT_android.injected.signing.store.password",
        ))
        .stdout(predicate::str::contains("s3cret").not());
}

#[test]
fn debug_dry_run_never_reads_key_properties() {
    let root = tempfile::tempdir().unwrap();
    android_project(root.path(), None);

    cli(root.path())
        .args(["build", "--bundle", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bundleDebug"))
        .stdout(predicate::str::contains("androiddebugkey"))
        .stderr(predicate::str::contains("Keystore properties").not());
}

#[test]
fn config_json_uses_defaults_and_local_properties() {
    let root = tempfile::tempdir().unwrap();
    let android = android_project(root.path(), None);
    std::fs::write(android.join("local.properties"), "flutter.versionName=1.0.3\n").unwrap();

    cli(root.path())
        .args(["config", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"application_id\": \"com.visionlab.lipikar\""))
        .stdout(predicate::str::contains("\"compile_sdk\": 36"))
        .stdout(predicate::str::contains("\"version_name\": \"1.0.3\""));
}

#[test]
fn config_file_overrides_project_layout() {
    let root = tempfile::tempdir().unwrap();
    let mobile = root.path().join("mobile");
    std::fs::create_dir_all(&mobile).unwrap();
    std::fs::write(mobile.join("signing.properties"), FULL).unwrap();
    std::fs::write(mobile.join("upload.jks"), b"keystore").unwrap();
    std::fs::write(
        root.path().join("lipikar.toml"),
        "[project]\nandroid_dir = \"mobile\"\nkey_properties = \"signing.properties\"\n",
    )
    .unwrap();

    cli(root.path())
        .args(["signing", "check"])
        .assert()
        .success();
}

#[test]
fn invalid_config_reports_validation_error() {
    let root = tempfile::tempdir().unwrap();
    android_project(root.path(), None);
    std::fs::write(
        root.path().join("lipikar.toml"),
        "[android]\nmin_sdk = 30\ntarget_sdk = 28\n",
    )
    .unwrap();

    cli(root.path())
        .args(["config"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("target_sdk"));
}

#[test]
fn configured_key_properties_expands_environment_variables() {
    let root = tempfile::tempdir().unwrap();
    android_project(root.path(), None);
    let secrets = tempfile::tempdir().unwrap();
    std::fs::write(secrets.path().join("key.properties"), FULL).unwrap();
    std::fs::write(secrets.path().join("upload.jks"), b"keystore").unwrap();
    std::fs::write(
        root.path().join("lipikar.toml"),
        "[project]\nkey_properties = \"$LIPIKAR_SECRETS/key.properties\"\n",
    )
    .unwrap();

    cli(root.path())
        .env("LIPIKAR_SECRETS", secrets.path())
        .args(["signing", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Release signing ready"))
        .stderr(predicate::str::contains("$LIPIKAR_SECRETS").not());
}

#[test]
fn undefined_variable_in_config_is_config_error() {
    let root = tempfile::tempdir().unwrap();
    android_project(root.path(), Some(FULL));
    std::fs::write(
        root.path().join("lipikar.toml"),
        "[project]\nkey_properties = \"$LIPIKAR_UNSET_SECRETS/key.properties\"\n",
    )
    .unwrap();

    cli(root.path())
        .env_remove("LIPIKAR_UNSET_SECRETS")
        .args(["signing", "check"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("LIPIKAR_UNSET_SECRETS"));
}

#[test]
fn project_dir_overrides_configured_android_dir() {
    let root = tempfile::tempdir().unwrap();
    let other = root.path().join("other/android");
    std::fs::create_dir_all(&other).unwrap();
    std::fs::write(other.join("key.properties"), FULL).unwrap();
    std::fs::write(other.join("upload.jks"), b"keystore").unwrap();
    // The default android/ directory has no credentials
    android_project(root.path(), None);

    cli(root.path())
        .args(["--project-dir", "other/android", "signing", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Release signing ready"));
}

#[test]
fn signing_check_without_file_names_looked_up_path() {
    let root = tempfile::tempdir().unwrap();
    android_project(root.path(), None);

    cli(root.path())
        .args(["signing", "check", "--properties", "secrets/release.properties"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Looked for secrets/release.properties"))
        .stderr(predicate::str::contains("android/key.properties").not());
}

#[test]
fn release_build_without_file_names_looked_up_path() {
    let root = tempfile::tempdir().unwrap();
    android_project(root.path(), None);

    cli(root.path())
        .args(["build", "--release", "--dry-run"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Looked for"))
        .stderr(predicate::str::contains("key.properties"));
}

#[test]
fn no_color_disables_ansi_in_log_lines() {
    let root = tempfile::tempdir().unwrap();

    cli(root.path())
        .args(["signing", "show", "--properties", "missing/key.properties"])
        .assert()
        .success()
        .stderr(predicate::str::contains("WARN"))
        .stderr(predicate::str::contains("\u{1b}[").not());
}

#[cfg(unix)]
#[test]
fn failed_gradle_run_reports_gradle_error() {
    use std::os::unix::fs::PermissionsExt;

    let root = tempfile::tempdir().unwrap();
    let android = android_project(root.path(), None);
    let wrapper = android.join("gradlew");
    std::fs::write(&wrapper, "#!/bin/sh\necho 'FAILURE: compileDebugKotlin broke' >&2\nexit 1\n")
        .unwrap();
    std::fs::set_permissions(&wrapper, std::fs::Permissions::from_mode(0o755)).unwrap();

    cli(root.path())
        .args(["build"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("E8001"))
        .stderr(predicate::str::contains("assembleDebug"))
        .stderr(predicate::str::contains("compileDebugKotlin broke"));
}
