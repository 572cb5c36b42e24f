use std::str::FromStr;

use crate::git::BranchPattern;
use crate::rebase::CandidatePolicy;

#[derive(Default, Clone, Debug)]
pub struct RepoConfig {
    pub remote: Option<String>,
    pub rebased_patterns: Option<Vec<String>>,
    pub candidate_filter: Option<CandidateFilter>,
    pub upstream: Option<String>,
}

static REMOTE_FIELD: &str = "rebase-track.remote";
static PATTERN_FIELD: &str = "rebase-track.rebased-pattern";
static FILTER_FIELD: &str = "rebase-track.candidate-filter";
static UPSTREAM_FIELD: &str = "rebase-track.upstream";

static DEFAULT_REMOTE: &str = "origin";

impl RepoConfig {
    pub fn from_all(repo: &git2::Repository) -> eyre::Result<Self> {
        let config = Self::from_defaults();
        let config = config.update(Self::from_global());
        let config = config.update(Self::from_workdir(repo)?);
        let config = config.update(Self::from_repo(repo)?);
        Ok(config)
    }

    pub fn from_repo(repo: &git2::Repository) -> eyre::Result<Self> {
        let config_path = repo.path().join("config");
        Ok(Self::from_path(&config_path))
    }

    pub fn from_workdir(repo: &git2::Repository) -> eyre::Result<Self> {
        let workdir = repo
            .workdir()
            .ok_or_else(|| eyre::eyre!("Cannot read config in bare repository."))?;
        let config_path = workdir.join(".gitconfig");
        Ok(Self::from_path(&config_path))
    }

    fn from_path(config_path: &std::path::Path) -> Self {
        log::trace!("Loading {}", config_path.display());
        if config_path.exists() {
            match git2::Config::open(config_path) {
                Ok(config) => Self::from_gitconfig(&config),
                Err(err) => {
                    log::debug!("Failed to load git config: {}", err);
                    Default::default()
                }
            }
        } else {
            Default::default()
        }
    }

    pub fn from_global() -> Self {
        log::trace!("Loading gitconfig");
        match git2::Config::open_default() {
            Ok(config) => Self::from_gitconfig(&config),
            Err(err) => {
                log::debug!("Failed to load git config: {}", err);
                Default::default()
            }
        }
    }

    pub fn from_defaults() -> Self {
        Self {
            remote: Some(DEFAULT_REMOTE.to_owned()),
            rebased_patterns: None,
            candidate_filter: None,
            upstream: Some(crate::rebase::DEFAULT_UPSTREAM.to_owned()),
        }
    }

    pub fn from_gitconfig(config: &git2::Config) -> Self {
        let remote = config.get_string(REMOTE_FIELD).ok();

        let mut rebased_patterns = Vec::new();
        if let Ok(entries) = config.multivar(PATTERN_FIELD, None) {
            let result = entries.for_each(|entry| {
                if let Some(value) = entry.value() {
                    rebased_patterns.push(value.to_owned());
                }
            });
            if let Err(err) = result {
                log::debug!("Failed to read {}: {}", PATTERN_FIELD, err);
            }
        }
        let rebased_patterns = (!rebased_patterns.is_empty()).then_some(rebased_patterns);

        let candidate_filter = config
            .get_string(FILTER_FIELD)
            .ok()
            .and_then(|s| s.parse().ok());

        let upstream = config.get_string(UPSTREAM_FIELD).ok();

        Self {
            remote,
            rebased_patterns,
            candidate_filter,
            upstream,
        }
    }

    pub fn update(mut self, other: Self) -> Self {
        match (&mut self.rebased_patterns, other.rebased_patterns) {
            (Some(lhs), Some(rhs)) => lhs.extend(rhs),
            (None, Some(rhs)) => self.rebased_patterns = Some(rhs),
            (_, _) => (),
        }

        self.remote = other.remote.or(self.remote);
        self.candidate_filter = other.candidate_filter.or(self.candidate_filter);
        self.upstream = other.upstream.or(self.upstream);

        self
    }

    pub fn remote(&self) -> &str {
        self.remote.as_deref().unwrap_or(DEFAULT_REMOTE)
    }

    pub fn rebased_patterns(&self) -> &[String] {
        self.rebased_patterns.as_deref().unwrap_or(&[])
    }

    pub fn upstream(&self) -> &str {
        self.upstream
            .as_deref()
            .unwrap_or(crate::rebase::DEFAULT_UPSTREAM)
    }

    /// Resolve the site's naming policy for `tracked`
    pub fn candidate_policy(&self, tracked: &str) -> eyre::Result<CandidatePolicy<'static>> {
        let pattern = BranchPattern::from_templates(
            self.rebased_patterns().iter().map(|s| s.as_str()),
            tracked,
        )?;
        let predicate = self.candidate_filter.map(CandidateFilter::into_predicate);
        Ok(CandidatePolicy { pattern, predicate })
    }
}

impl std::fmt::Display for RepoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "[rebase-track]")?;
        writeln!(f, "\tremote={}", self.remote())?;
        for pattern in self.rebased_patterns() {
            writeln!(f, "\trebased-pattern={pattern}")?;
        }
        if let Some(filter) = self.candidate_filter {
            writeln!(f, "\tcandidate-filter={filter}")?;
        }
        writeln!(f, "\tupstream={}", self.upstream())?;
        Ok(())
    }
}

/// Relationship a candidate branch name must have with the tracked branch name
#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum CandidateFilter {
    /// Candidate contains the tracked name
    Contains,
    /// Candidate starts with the tracked name
    Prefix,
    /// Candidate ends with the tracked name
    Suffix,
}

impl CandidateFilter {
    pub fn is_candidate(self, tracked: &str, candidate: &str) -> bool {
        if tracked == candidate {
            return false;
        }
        match self {
            Self::Contains => candidate.contains(tracked),
            Self::Prefix => candidate.starts_with(tracked),
            Self::Suffix => candidate.ends_with(tracked),
        }
    }

    pub fn into_predicate(self) -> Box<dyn Fn(&str, &str) -> bool> {
        Box::new(move |tracked: &str, candidate: &str| self.is_candidate(tracked, candidate))
    }
}

impl FromStr for CandidateFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as clap::ValueEnum>::from_str(s, true)
    }
}

impl std::fmt::Display for CandidateFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Contains => "contains",
            Self::Prefix => "prefix",
            Self::Suffix => "suffix",
        };
        f.write_str(name)
    }
}
