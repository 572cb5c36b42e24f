#[derive(clap::Parser)]
#[command(about, author, version)]
#[command(group = clap::ArgGroup::new("mode").multiple(false))]
pub(crate) struct Args {
    /// Branch the review follows (default: current branch)
    #[arg(long)]
    pub(crate) tracked: Option<String>,

    /// Remote to look for the rebased branch on
    #[arg(long)]
    pub(crate) remote: Option<String>,

    /// Pattern for rebased branch names (gitignore syntax, `{branch}` is the tracked branch)
    #[arg(long = "pattern", value_name = "PATTERN")]
    pub(crate) patterns: Vec<String>,

    /// Relationship a candidate's name must have with the tracked branch's
    #[arg(long, value_enum)]
    pub(crate) filter: Option<git_rebase_track::config::CandidateFilter>,

    /// Head of the rebased branch
    #[arg(long, group = "mode")]
    pub(crate) new_head: Option<String>,

    /// Upstream the branch was rebased onto (default: `rebase-track.upstream`)
    #[arg(long, requires = "new_head")]
    pub(crate) new_upstream: Option<String>,

    /// Head of the branch before the rebase (default: tracked branch)
    #[arg(long, requires = "new_head")]
    pub(crate) old_head: Option<String>,

    /// Branch the review moves to (default: tracked branch)
    #[arg(long, requires = "new_head")]
    pub(crate) new_branch: Option<String>,

    /// Write the current configuration to file with `-` for stdout
    #[arg(long, group = "mode")]
    pub(crate) dump_config: Option<std::path::PathBuf>,

    #[command(flatten)]
    pub(crate) color: colorchoice_clap::Color,

    #[command(flatten)]
    pub(crate) verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,
}

impl Args {
    pub(crate) fn to_config(&self) -> git_rebase_track::config::RepoConfig {
        git_rebase_track::config::RepoConfig {
            remote: self.remote.clone(),
            rebased_patterns: (!self.patterns.is_empty()).then(|| self.patterns.clone()),
            candidate_filter: self.filter,
            upstream: None,
        }
    }
}
