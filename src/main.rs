use anyhow::Result;
use clap::Parser;

use git_release::build::CommandBuildRunner;
use git_release::config;
use git_release::git::{GitClient, ProcessGitRunner};
use git_release::notify::{HttpNotifier, Notifier};
use git_release::pipeline::Orchestrator;
use git_release::prompt::TerminalPrompt;
use git_release::ui;

#[derive(clap::Parser)]
#[command(
    name = "git-release",
    about = "Merge, build, tag and push a release from the current branch"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short = 'n', long, help = "Simulate remote-mutating operations")]
    dry_run: bool,

    #[arg(short, long, help = "Print version information")]
    version: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.version {
        println!("git-release {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("loading config: {}", e));
            std::process::exit(1);
        }
    };

    let work_dir = std::env::current_dir()?;

    let git = GitClient::new(ProcessGitRunner::new(&work_dir));
    let build = CommandBuildRunner::new(&work_dir, &config.build);
    let gate = TerminalPrompt;
    let notifier = config.notify.as_ref().map(HttpNotifier::new);

    let orchestrator = Orchestrator::new(
        git,
        &build,
        notifier.as_ref().map(|n| n as &dyn Notifier),
        &gate,
        &config,
        &work_dir,
        args.dry_run,
    );

    orchestrator.run();

    // Restoration completion, not release success, gates process exit; the
    // exit status is non-zero either way
    std::process::exit(1);
}
