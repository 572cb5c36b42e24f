use std::io::Write;

use clap::Parser;
use proc_exit::prelude::*;

mod args;
mod logger;
mod ops;

fn main() {
    human_panic::setup_panic!();
    let result = run();
    proc_exit::exit(result);
}

fn run() -> proc_exit::ExitResult {
    // clap's `get_matches` uses Failure rather than Usage, so bypass it for `try_parse`.
    let args = match args::Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            return proc_exit::sysexits::USAGE_ERR.ok();
        }
        Err(e) => {
            let _ = e.print();
            return proc_exit::Code::SUCCESS.ok();
        }
    };

    args.color.write_global();
    let colored_stderr = !matches!(
        anstream::AutoStream::choice(&std::io::stderr()),
        anstream::ColorChoice::Never
    );
    logger::init_logging(args.verbose.clone(), colored_stderr);

    let cwd = std::env::current_dir().with_code(proc_exit::sysexits::USAGE_ERR)?;
    let repo = git2::Repository::discover(cwd).with_code(proc_exit::sysexits::USAGE_ERR)?;
    let repo = git_rebase_track::git::GitRepo::new(repo);

    let repo_config = git_rebase_track::config::RepoConfig::from_all(repo.raw())
        .with_code(proc_exit::sysexits::CONFIG_ERR)?
        .update(args.to_config());

    if let Some(output_path) = args.dump_config.as_deref() {
        dump_config(&repo_config, output_path)
    } else if let Some(new_head) = args.new_head.as_deref() {
        analyze(&args, &repo, &repo_config, new_head)
    } else {
        candidates(&args, &repo, &repo_config)
    }
}

fn dump_config(
    repo_config: &git_rebase_track::config::RepoConfig,
    output_path: &std::path::Path,
) -> proc_exit::ExitResult {
    let output = repo_config.to_string();

    if output_path == std::path::Path::new("-") {
        std::io::stdout()
            .write_all(output.as_bytes())
            .to_sysexits()?;
    } else {
        std::fs::write(output_path, &output).to_sysexits()?;
    }

    Ok(())
}

fn candidates(
    args: &args::Args,
    repo: &git_rebase_track::git::GitRepo,
    repo_config: &git_rebase_track::config::RepoConfig,
) -> proc_exit::ExitResult {
    let palette = ops::Palette::colored();
    let tracked = ops::resolve_tracked(repo, args.tracked.as_deref(), repo_config.remote())?;
    ops::show_tracked(&tracked, palette)?;

    let policy = repo_config
        .candidate_policy(&tracked.branch.name)
        .with_code(proc_exit::sysexits::CONFIG_ERR)?;
    let candidates = if policy.is_empty() {
        log::debug!("No rebased branch pattern or filter configured");
        Vec::new()
    } else {
        let remote_refs = repo
            .ls_remote(&tracked.remote, policy.pattern.as_ref())
            .with_code(proc_exit::sysexits::SERVICE_UNAVAILABLE)?;
        policy.find(&tracked.branch.name, &remote_refs)
    };

    ops::show_candidates(&tracked, &candidates, repo_config.upstream(), palette)
}

fn analyze(
    args: &args::Args,
    repo: &git_rebase_track::git::GitRepo,
    repo_config: &git_rebase_track::config::RepoConfig,
    new_head: &str,
) -> proc_exit::ExitResult {
    let palette = ops::Palette::colored();
    let tracked = ops::resolve_tracked(repo, args.tracked.as_deref(), repo_config.remote())?;
    ops::show_tracked(&tracked, palette)?;

    let old_head = match args.old_head.as_deref() {
        Some(old_head) => ops::resolve_commit(repo, old_head)?.id,
        None => tracked.branch.id,
    };
    let new_head = ops::resolve_commit(repo, new_head)?;
    let upstream = args
        .new_upstream
        .as_deref()
        .unwrap_or_else(|| repo_config.upstream());
    let new_upstream = ops::resolve_commit(repo, upstream)?;
    let new_branch = args
        .new_branch
        .clone()
        .unwrap_or_else(|| format!("refs/heads/{}", tracked.branch.name));

    let request = git_rebase_track::rebase::RebaseRequest {
        old_head,
        new_head: new_head.id,
        new_upstream: new_upstream.id,
        new_branch: new_branch.clone(),
    };
    let analysis = git_rebase_track::rebase::analyze(repo, &request)
        .with_code(proc_exit::Code::FAILURE)?;
    log::debug!("{:?}", analysis.descriptor);

    ops::show_analysis(&analysis, &new_branch, upstream, palette)
}
