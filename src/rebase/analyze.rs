use std::rc::Rc;

use itertools::Itertools;

use super::CommitSet;
use crate::git::Commit;
use crate::git::Repo;

/// Why a proposed rebase could not be mapped onto the tracked branch
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("invalid commit-set: expected a single head, found {}", DisplayIds(.heads))]
    AmbiguousHead { heads: Vec<git2::Oid> },
    #[error("invalid commit-set: expected a single tail, found {}", DisplayIds(.tails))]
    AmbiguousTail { tails: Vec<git2::Oid> },
    #[error(
        "invalid commit-set: expected a single upstream, found {}",
        DisplayIds(.upstreams)
    )]
    AmbiguousUpstream { upstreams: Vec<git2::Oid> },
    #[error("could not find commit {id}")]
    NotFound { id: git2::Oid },
    #[error(transparent)]
    Git(#[from] git2::Error),
}

struct DisplayIds<'i>(&'i [git2::Oid]);

impl std::fmt::Display for DisplayIds<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{} ({})", self.0.len(), self.0.iter().join(", "))
        }
    }
}

/// The rebase a caller proposes for a tracked branch
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RebaseRequest {
    pub old_head: git2::Oid,
    pub new_head: git2::Oid,
    pub new_upstream: git2::Oid,
    /// Branch the tracked branch moves to, with or without `refs/heads/`
    pub new_branch: String,
}

/// A validated rebase: `new_head` sits on `new_upstream` as a single segment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RebaseDescriptor {
    pub old_head: git2::Oid,
    pub new_head: git2::Oid,
    pub new_upstream: git2::Oid,
    pub new_branch_name: String,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Undetermined,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Undetermined => write!(f, "N/A"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RebaseAnalysis {
    pub descriptor: RebaseDescriptor,
    pub head: Rc<Commit>,
    /// Oldest commit of the rebased segment
    pub tail: Rc<Commit>,
    pub upstream: Rc<Commit>,
    pub commits: CommitSet,
    pub merge_status: Status,
    pub conflict_status: Status,
}

pub fn analyze(repo: &dyn Repo, request: &RebaseRequest) -> Result<RebaseAnalysis, AnalysisError> {
    for id in [request.new_head, request.new_upstream] {
        if repo.find_commit(id).is_none() {
            return Err(AnalysisError::NotFound { id });
        }
    }
    let commits = CommitSet::from_revlist(repo, &[request.new_head], &[request.new_upstream])?;
    analyze_commit_set(repo, commits, request.old_head, &request.new_branch)
}

/// Validate an already loaded segment and describe it as a rebase of `old_head`
pub fn analyze_commit_set(
    repo: &dyn Repo,
    commits: CommitSet,
    old_head: git2::Oid,
    new_branch: &str,
) -> Result<RebaseAnalysis, AnalysisError> {
    let head = match commits.heads().as_slice() {
        [head] => Rc::clone(head),
        heads => {
            return Err(AnalysisError::AmbiguousHead {
                heads: heads.iter().map(|c| c.id).collect(),
            });
        }
    };
    let tail = match commits.tails(repo)?.as_slice() {
        [tail] => Rc::clone(tail),
        tails => {
            return Err(AnalysisError::AmbiguousTail {
                tails: tails.iter().map(|c| c.id).collect(),
            });
        }
    };
    let upstream_id = match commits.upstreams(repo)?.as_slice() {
        [upstream_id] => *upstream_id,
        upstreams => {
            return Err(AnalysisError::AmbiguousUpstream {
                upstreams: upstreams.to_vec(),
            });
        }
    };
    let upstream = repo
        .find_commit(upstream_id)
        .ok_or(AnalysisError::NotFound { id: upstream_id })?;
    log::debug!(
        "{} commits from {} rebased onto {}",
        commits.len(),
        head.id,
        upstream.id
    );

    let descriptor = RebaseDescriptor {
        old_head,
        new_head: head.id,
        new_upstream: upstream.id,
        new_branch_name: crate::git::short_branch_name(new_branch).to_owned(),
    };
    Ok(RebaseAnalysis {
        descriptor,
        head,
        tail,
        upstream,
        commits,
        merge_status: Status::Undetermined,
        conflict_status: Status::Undetermined,
    })
}
