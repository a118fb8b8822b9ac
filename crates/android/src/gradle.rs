//! Gradle build system integration
//!
//! Runs the project's Gradle wrapper. Release signing values from a
//! [`PackagingPlan`] travel as `ORG_GRADLE_PROJECT_*` environment variables.

use crate::build_config::BuildType;
use crate::packaging::PackagingPlan;
use lipikar_core::error::{Error, Result};
use lipikar_core::process::{run_command_with_env, CommandResult};
use std::path::{Path, PathBuf};

/// Wrapper script name for this platform
pub fn wrapper_name() -> &'static str {
    if cfg!(windows) {
        "gradlew.bat"
    } else {
        "gradlew"
    }
}

/// Absolute path of the Gradle wrapper in `project_dir`
pub fn wrapper_path(project_dir: &Path) -> Result<PathBuf> {
    let wrapper = std::path::absolute(project_dir.join(wrapper_name()))?;
    if !wrapper.is_file() {
        return Err(Error::command_not_found(wrapper_name())
            .with_context(format!("Looked in {}", project_dir.display()))
            .with_suggestion("Run from the Flutter project root or pass --project-dir"));
    }
    Ok(wrapper)
}

/// Whether `project_dir` contains a Gradle wrapper
pub fn has_wrapper(project_dir: &Path) -> bool {
    project_dir.join(wrapper_name()).is_file()
}

/// Run Gradle tasks with extra environment variables
pub fn run_tasks(project_dir: &Path, tasks: &[&str], env: &[(String, String)]) -> Result<CommandResult> {
    let wrapper = wrapper_path(project_dir)?;
    let program = wrapper.to_string_lossy();

    tracing::info!(tasks = ?tasks, dir = %project_dir.display(), "Running Gradle");
    run_command_with_env(&program, tasks, Some(project_dir), env)
}

/// Run a single Gradle task
pub fn run_task(project_dir: &Path, task: &str) -> Result<CommandResult> {
    run_tasks(project_dir, &[task], &[])
}

/// Build an APK according to a packaging plan
pub fn assemble(project_dir: &Path, plan: &PackagingPlan) -> Result<CommandResult> {
    run_tasks(project_dir, &[plan.build_type.assemble_task()], &plan.gradle_env())
}

/// Build an app bundle (AAB) according to a packaging plan
pub fn bundle(project_dir: &Path, plan: &PackagingPlan) -> Result<CommandResult> {
    run_tasks(project_dir, &[plan.build_type.bundle_task()], &plan.gradle_env())
}

/// Clean build artifacts
pub fn clean(project_dir: &Path) -> Result<CommandResult> {
    run_task(project_dir, "clean")
}

/// Candidate output locations, Flutter layout first
fn artifact_candidates(project_dir: &Path, build_type: BuildType, bundle: bool) -> Vec<PathBuf> {
    let name = build_type.name();
    let (kind, file) = if bundle {
        ("bundle", format!("app-{}.aab", name))
    } else {
        ("apk", format!("app-{}.apk", name))
    };

    vec![
        // Flutter moves the app module's build dir to <flutter root>/build/app
        project_dir
            .join("..")
            .join("build/app/outputs")
            .join(kind)
            .join(name)
            .join(&file),
        project_dir
            .join("app/build/outputs")
            .join(kind)
            .join(name)
            .join(&file),
    ]
}

/// Locate the artifact a finished build produced
pub fn find_artifact(project_dir: &Path, build_type: BuildType, bundle: bool) -> Option<PathBuf> {
    artifact_candidates(project_dir, build_type, bundle)
        .into_iter()
        .find(|p| p.is_file())
}
