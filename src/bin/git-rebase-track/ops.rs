use std::io::Write;

use proc_exit::prelude::*;

use git_rebase_track::git::Repo;

/// Where the review currently stands, before any rebase is proposed
pub(crate) struct Tracked {
    pub(crate) remote: String,
    pub(crate) branch: git_rebase_track::git::Branch,
}

pub(crate) fn resolve_tracked(
    repo: &dyn Repo,
    name: Option<&str>,
    remote: &str,
) -> Result<Tracked, proc_exit::Exit> {
    let branch = match name {
        Some(name) => repo
            .find_local_branch(git_rebase_track::git::short_branch_name(name))
            .ok_or_else(|| {
                proc_exit::sysexits::USAGE_ERR
                    .with_message(format!("could not find branch `{name}`"))
            })?,
        None => repo.head_branch().ok_or_else(|| {
            proc_exit::sysexits::USAGE_ERR
                .with_message("HEAD must point to a branch, or pass `--tracked`")
        })?,
    };
    Ok(Tracked {
        remote: remote.to_owned(),
        branch,
    })
}

pub(crate) fn resolve_commit(
    repo: &dyn Repo,
    revspec: &str,
) -> Result<std::rc::Rc<git_rebase_track::git::Commit>, proc_exit::Exit> {
    repo.resolve(revspec).ok_or_else(|| {
        proc_exit::sysexits::USAGE_ERR.with_message(format!("could not resolve `{revspec}`"))
    })
}

pub(crate) fn show_tracked(tracked: &Tracked, palette: Palette) -> proc_exit::ExitResult {
    let mut stdout = anstream::stdout().lock();
    writeln!(stdout, "Remote: {}", palette.highlight(&tracked.remote)).to_sysexits()?;
    writeln!(
        stdout,
        "Current branch: {}",
        palette.highlight(format_args!("refs/heads/{}", tracked.branch.name))
    )
    .to_sysexits()?;
    Ok(())
}

pub(crate) fn show_candidates(
    tracked: &Tracked,
    candidates: &[String],
    upstream: &str,
    palette: Palette,
) -> proc_exit::ExitResult {
    let mut stdout = anstream::stdout().lock();
    if 1 < candidates.len() {
        writeln!(stdout, "New branch candidates:").to_sysexits()?;
        for name in candidates {
            writeln!(stdout, "  refs/heads/{}", palette.good(name)).to_sysexits()?;
        }
    } else {
        let default =
            git_rebase_track::rebase::default_new_branch(&tracked.branch.name, candidates);
        writeln!(
            stdout,
            "New branch: {}",
            palette.good(format_args!("refs/heads/{default}"))
        )
        .to_sysexits()?;
    }
    writeln!(stdout, "Upstream: {}", palette.good(upstream)).to_sysexits()?;
    Ok(())
}

pub(crate) fn show_analysis(
    analysis: &git_rebase_track::rebase::RebaseAnalysis,
    new_branch: &str,
    upstream: &str,
    palette: Palette,
) -> proc_exit::ExitResult {
    let mut stdout = anstream::stdout().lock();
    writeln!(
        stdout,
        "New branch: {} @ {}",
        palette.highlight(new_branch),
        palette.hint(&analysis.head)
    )
    .to_sysexits()?;
    writeln!(
        stdout,
        "New upstream: {} @ {}",
        palette.highlight(upstream),
        palette.hint(&analysis.upstream)
    )
    .to_sysexits()?;
    writeln!(stdout).to_sysexits()?;
    writeln!(stdout, "Merge: {}", palette.warn(analysis.merge_status)).to_sysexits()?;
    writeln!(stdout, "Conflicts: {}", palette.warn(analysis.conflict_status)).to_sysexits()?;
    writeln!(stdout).to_sysexits()?;
    writeln!(stdout, "Rebased commits:").to_sysexits()?;
    for commit in &analysis.commits {
        writeln!(stdout, "  {commit}").to_sysexits()?;
    }
    Ok(())
}

#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct Palette {
    error: anstyle::Style,
    warn: anstyle::Style,
    good: anstyle::Style,
    highlight: anstyle::Style,
    hint: anstyle::Style,
}

impl Palette {
    pub(crate) fn colored() -> Self {
        Self {
            error: anstyle::AnsiColor::Red.on_default() | anstyle::Effects::BOLD,
            warn: anstyle::AnsiColor::Yellow.on_default() | anstyle::Effects::BOLD,
            good: anstyle::AnsiColor::Cyan.on_default() | anstyle::Effects::BOLD,
            highlight: anstyle::AnsiColor::Green.on_default() | anstyle::Effects::BOLD,
            hint: anstyle::Effects::DIMMED.into(),
        }
    }

    pub(crate) fn plain() -> Self {
        Self::default()
    }

    pub(crate) fn error<D: std::fmt::Display>(self, display: D) -> Styled<D> {
        Styled::new(display, self.error)
    }

    pub(crate) fn warn<D: std::fmt::Display>(self, display: D) -> Styled<D> {
        Styled::new(display, self.warn)
    }

    pub(crate) fn good<D: std::fmt::Display>(self, display: D) -> Styled<D> {
        Styled::new(display, self.good)
    }

    pub(crate) fn highlight<D: std::fmt::Display>(self, display: D) -> Styled<D> {
        Styled::new(display, self.highlight)
    }

    pub(crate) fn hint<D: std::fmt::Display>(self, display: D) -> Styled<D> {
        Styled::new(display, self.hint)
    }
}

#[derive(Debug)]
pub(crate) struct Styled<D> {
    display: D,
    style: anstyle::Style,
}

impl<D: std::fmt::Display> Styled<D> {
    pub(crate) fn new(display: D, style: anstyle::Style) -> Self {
        Self { display, style }
    }
}

impl<D: std::fmt::Display> std::fmt::Display for Styled<D> {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.style.render())?;
        self.display.fmt(f)?;
        write!(f, "{}", self.style.render_reset())?;
        Ok(())
    }
}
