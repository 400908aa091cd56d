//! Release orchestration pipeline.
//!
//! One run is an ordered chain of fallible stages over three collaborators
//! (git, the build tool, the notifier) plus a confirmation gate. Stages run
//! strictly in sequence, the first failure short-circuits to a single summary
//! handler, and a final restore phase puts the repository back on the base
//! branch no matter how the pipeline ended.

use std::path::PathBuf;

use crate::build::BuildRunner;
use crate::config::Config;
use crate::error::{ReleaseError, Result};
use crate::git::{GitClient, GitRunner, STAGING_BRANCH};
use crate::manifest;
use crate::notify::Notifier;
use crate::prompt::Confirm;
use crate::ui;

/// Mutable state for one orchestration run.
///
/// Created at run start, owned exclusively by the orchestrator, discarded at
/// run end. The base branch lives in [GitClient].
#[derive(Debug, Default)]
pub struct ReleaseContext {
    pub version: Option<String>,
    pub project_name: Option<String>,
    pub dry_run: bool,
}

/// One unit of work in the pipeline.
///
/// The ordered list is [STAGES]; the driver loop in [Orchestrator::run]
/// executes them in sequence and applies the error-wrapping rule: failures
/// that are not already labeled (and not policy aborts) get wrapped with the
/// stage label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    InitializeVcs,
    ResolveVersions,
    ConfirmVersion,
    VerifyCleanTree,
    FetchUpstream,
    CheckoutUpstreamTarget,
    CreateStagingBranch,
    MergeBaseBranch,
    Build,
    StageGeneratedFiles,
    AmendMergeCommit,
    TagRelease,
    PushStagingBranch,
    PushTag,
    Notify,
}

/// Every stage of a release run, in execution order.
pub const STAGES: [Stage; 15] = [
    Stage::InitializeVcs,
    Stage::ResolveVersions,
    Stage::ConfirmVersion,
    Stage::VerifyCleanTree,
    Stage::FetchUpstream,
    Stage::CheckoutUpstreamTarget,
    Stage::CreateStagingBranch,
    Stage::MergeBaseBranch,
    Stage::Build,
    Stage::StageGeneratedFiles,
    Stage::AmendMergeCommit,
    Stage::TagRelease,
    Stage::PushStagingBranch,
    Stage::PushTag,
    Stage::Notify,
];

impl Stage {
    /// Human-readable step name, used for progress display and error labels.
    pub fn label(self) -> &'static str {
        match self {
            Stage::InitializeVcs => "initialize git state",
            Stage::ResolveVersions => "resolve release version",
            Stage::ConfirmVersion => "confirm release version",
            Stage::VerifyCleanTree => "check for uncommitted changes",
            Stage::FetchUpstream => "fetch upstream remote",
            Stage::CheckoutUpstreamTarget => "checkout upstream target",
            Stage::CreateStagingBranch => "create temporary release branch",
            Stage::MergeBaseBranch => "merge base branch",
            Stage::Build => "run build tasks",
            Stage::StageGeneratedFiles => "add generated files",
            Stage::AmendMergeCommit => "amend generated files",
            Stage::TagRelease => "generate version tag",
            Stage::PushStagingBranch => "push release branch",
            Stage::PushTag => "push version tag",
            Stage::Notify => "notify the chat room",
        }
    }
}

/// Outcome of one release run: the pipeline result and the restore result,
/// reported separately.
#[derive(Debug)]
pub struct RunReport {
    pub pipeline: Result<()>,
    pub restore: Result<()>,
}

impl RunReport {
    pub fn release_succeeded(&self) -> bool {
        self.pipeline.is_ok()
    }
}

/// Drives the ordered release pipeline and the unconditional restore phase.
pub struct Orchestrator<'a, R: GitRunner> {
    git: GitClient<R>,
    build: &'a dyn BuildRunner,
    notifier: Option<&'a dyn Notifier>,
    gate: &'a dyn Confirm,
    config: &'a Config,
    work_dir: PathBuf,
    ctx: ReleaseContext,
}

impl<'a, R: GitRunner> Orchestrator<'a, R> {
    pub fn new(
        git: GitClient<R>,
        build: &'a dyn BuildRunner,
        notifier: Option<&'a dyn Notifier>,
        gate: &'a dyn Confirm,
        config: &'a Config,
        work_dir: impl Into<PathBuf>,
        dry_run: bool,
    ) -> Self {
        Orchestrator {
            git,
            build,
            notifier,
            gate,
            config,
            work_dir: work_dir.into(),
            ctx: ReleaseContext {
                dry_run,
                ..ReleaseContext::default()
            },
        }
    }

    /// Runs every stage in order, prints the summary, then restores the
    /// original working state. Restore runs exactly once whether the
    /// pipeline succeeded, aborted, or failed part-way.
    pub fn run(mut self) -> RunReport {
        let progress = ui::stage_progress(STAGES.len() as u64);

        let mut pipeline: Result<()> = Ok(());
        for stage in STAGES {
            progress.set_message(stage.label());
            match self.execute(stage) {
                Ok(()) => progress.inc(1),
                Err(err) => {
                    pipeline = Err(wrap_stage_error(stage, err));
                    break;
                }
            }
        }
        progress.finish_and_clear();

        match &pipeline {
            Ok(()) => {
                let mode = if self.ctx.dry_run {
                    "(in dry-run mode) "
                } else {
                    ""
                };
                ui::display_success(&format!(
                    "successfully deployed {}the release {}",
                    mode,
                    self.ctx.version.as_deref().unwrap_or("?")
                ));
            }
            Err(err) => ui::display_failure(err),
        }

        let restore = self.git.restore_base_branch();
        match &restore {
            Ok(()) => ui::display_success("successfully restored git previous work state"),
            Err(err) => ui::display_error(&format!("(during git restore) {}", err)),
        }

        RunReport { pipeline, restore }
    }

    fn execute(&mut self, stage: Stage) -> Result<()> {
        match stage {
            Stage::InitializeVcs => self.git.initialize(),

            Stage::ResolveVersions => {
                let resolved = manifest::resolve_versions(
                    &self.work_dir,
                    &self.config.manifests,
                    self.gate,
                )?;
                self.ctx.version = Some(resolved.version);
                self.ctx.project_name = resolved.project_name;
                Ok(())
            }

            Stage::ConfirmVersion => {
                let question = format!(
                    "The current version defined is {}, is this what you want to release?",
                    self.version()?
                );
                if self.gate.ask(&question, false)? {
                    Ok(())
                } else {
                    Err(ReleaseError::aborted("stop release process, version rejected"))
                }
            }

            Stage::VerifyCleanTree => self
                .git
                .execute("diff", &["--exit-code"])
                .and_then(|_| self.git.execute("diff", &["--cached", "--exit-code"]))
                .map(|_| ())
                .map_err(|e| {
                    ReleaseError::step("please commit your changes or stash them first", e)
                }),

            Stage::FetchUpstream => {
                if self.config.remote.fetch_all {
                    self.git.execute("fetch", &["--all"])?;
                } else {
                    self.git.execute("fetch", &[self.remote()])?;
                }
                Ok(())
            }

            Stage::CheckoutUpstreamTarget => {
                let target = format!("{}/{}", self.remote(), self.config.remote.target_branch);
                self.git.execute("checkout", &[&target])?;
                Ok(())
            }

            Stage::CreateStagingBranch => {
                // A leftover staging branch from an earlier run is expected
                self.git.delete_branch(STAGING_BRANCH);
                self.git.execute("checkout", &["-b", STAGING_BRANCH])?;
                Ok(())
            }

            Stage::MergeBaseBranch => {
                let base = self
                    .git
                    .base_branch()
                    .ok_or(ReleaseError::UninitializedBaseBranch)?
                    .to_string();
                let message = format!("Release {}", self.version()?);
                self.git
                    .execute("merge", &["--no-ff", &base, "-m", &message])?;
                Ok(())
            }

            Stage::Build => {
                if !self.build.has_build_configuration() {
                    ui::display_status("no build configuration found, skipping build stage");
                    return Ok(());
                }
                self.build.run(None)?;
                for task in &self.config.build.tasks {
                    self.build.run(Some(task))?;
                }
                Ok(())
            }

            Stage::StageGeneratedFiles => {
                self.git.execute("add", &["."])?;
                Ok(())
            }

            Stage::AmendMergeCommit => {
                self.git.execute("commit", &["--amend", "--no-edit"])?;
                Ok(())
            }

            Stage::TagRelease => {
                let version = self.version()?;
                if self.ctx.dry_run {
                    ui::display_status(&format!("DRY RUN - generate tag {}", version));
                    return Ok(());
                }
                self.git
                    .confirm_tag_overwrite(self.remote(), &version, self.gate)?;
                if self.config.remote.force_tag {
                    self.git.execute("tag", &["-f", &version])?;
                } else {
                    self.git.execute("tag", &[&version])?;
                }
                Ok(())
            }

            Stage::PushStagingBranch => {
                let refspec = format!("{}:{}", STAGING_BRANCH, self.config.remote.target_branch);
                if self.ctx.dry_run {
                    ui::display_status(&format!(
                        "DRY RUN - push {} to {}",
                        refspec,
                        self.remote()
                    ));
                    return Ok(());
                }
                self.git.execute("push", &[self.remote(), &refspec])?;
                Ok(())
            }

            Stage::PushTag => {
                let version = self.version()?;
                if self.ctx.dry_run {
                    ui::display_status(&format!("DRY RUN - push tag {} to {}", version, self.remote()));
                    return Ok(());
                }
                self.git.execute("push", &[self.remote(), &version])?;
                Ok(())
            }

            Stage::Notify => {
                if self.ctx.dry_run {
                    ui::display_status("DRY RUN - notify the chat room");
                    return Ok(());
                }
                let (notifier, notify_config) = match (self.notifier, &self.config.notify) {
                    (Some(notifier), Some(config)) => (notifier, config),
                    _ => {
                        ui::display_status("no notifier configured, skipping announcement");
                        return Ok(());
                    }
                };

                let version = self.version()?;
                let message = match &self.ctx.project_name {
                    Some(name) => format!("New version {} released for {}", version, name),
                    None => format!("New version {} released", version),
                };

                // Best-effort: the release is already pushed, a lost
                // announcement must not flip the outcome
                match notifier.notify(&notify_config.room, &message) {
                    Ok(()) => ui::display_success(&format!(
                        "successfully notified the room for version {} release",
                        version
                    )),
                    Err(err) => ui::display_warning(&err.to_string()),
                }
                Ok(())
            }
        }
    }

    fn remote(&self) -> &str {
        &self.config.remote.name
    }

    fn version(&self) -> Result<String> {
        self.ctx
            .version
            .clone()
            .ok_or_else(|| ReleaseError::version("no release version resolved"))
    }
}

/// The error-wrapping rule: policy aborts, version errors and already-labeled
/// step failures pass through untouched; collaborator failures get the stage
/// label.
fn wrap_stage_error(stage: Stage, err: ReleaseError) -> ReleaseError {
    match err {
        labeled @ (ReleaseError::Step { .. }
        | ReleaseError::Aborted(_)
        | ReleaseError::Version(_)) => labeled,
        other => ReleaseError::step(format!("{} failed", stage.label()), other),
    }
}
