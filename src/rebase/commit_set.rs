use std::collections::HashSet;
use std::rc::Rc;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::git::Commit;
use crate::git::Repo;

/// A sub-graph of history, keyed by commit id in the order commits were added
#[derive(Clone, Debug, Default)]
pub struct CommitSet {
    commits: IndexMap<git2::Oid, Rc<Commit>>,
}

impl CommitSet {
    pub fn new(commits: impl IntoIterator<Item = Rc<Commit>>) -> Self {
        let mut set = Self::default();
        for commit in commits {
            set.insert(commit);
        }
        set
    }

    /// Load every commit reachable from `included` but not from `excluded`
    pub fn from_revlist(
        repo: &dyn Repo,
        included: &[git2::Oid],
        excluded: &[git2::Oid],
    ) -> Result<Self, super::AnalysisError> {
        let ids = repo.revlist(included, excluded)?;
        log::trace!(
            "{} commits in {}..{}",
            ids.len(),
            excluded.iter().join(","),
            included.iter().join(",")
        );
        let commits = ids
            .into_iter()
            .map(|id| {
                repo.find_commit(id)
                    .ok_or(super::AnalysisError::NotFound { id })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(commits))
    }

    /// Returns `false` when a commit with the same id was already present
    pub fn insert(&mut self, commit: Rc<Commit>) -> bool {
        match self.commits.entry(commit.id) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(commit);
                true
            }
        }
    }

    pub fn contains(&self, id: git2::Oid) -> bool {
        self.commits.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<Commit>> + '_ {
        self.commits.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = git2::Oid> + '_ {
        self.commits.keys().copied()
    }

    /// Members that are no other member's parent
    pub fn heads(&self) -> Vec<Rc<Commit>> {
        let parents: HashSet<_> = self
            .iter()
            .flat_map(|commit| commit.parent_ids.iter().copied())
            .collect();
        self.iter()
            .filter(|commit| !parents.contains(&commit.id))
            .cloned()
            .collect()
    }

    /// Members without a parent in the set
    pub fn raw_tails(&self) -> Vec<Rc<Commit>> {
        self.iter()
            .filter(|commit| !commit.parent_ids.iter().any(|id| self.contains(*id)))
            .cloned()
            .collect()
    }

    /// [`CommitSet::raw_tails`] without those that are an ancestor of another tail
    pub fn tails(&self, repo: &dyn Repo) -> Result<Vec<Rc<Commit>>, git2::Error> {
        let raw = self.raw_tails();
        let ids: Vec<_> = raw.iter().map(|commit| commit.id).collect();
        let kept = filter_ancestors(repo, &ids)?;
        Ok(raw
            .into_iter()
            .filter(|commit| kept.contains(&commit.id))
            .collect())
    }

    /// Parents of members that are outside of the set, in first-seen order
    pub fn raw_upstreams(&self) -> Vec<git2::Oid> {
        self.iter()
            .flat_map(|commit| commit.parent_ids.iter().copied())
            .filter(|id| !self.contains(*id))
            .unique()
            .collect()
    }

    /// [`CommitSet::raw_upstreams`] without those that are an ancestor of another
    ///
    /// This is the base the set was built on top of.
    pub fn upstreams(&self, repo: &dyn Repo) -> Result<Vec<git2::Oid>, git2::Error> {
        filter_ancestors(repo, &self.raw_upstreams())
    }
}

impl<'s> IntoIterator for &'s CommitSet {
    type Item = &'s Rc<Commit>;
    type IntoIter = indexmap::map::Values<'s, git2::Oid, Rc<Commit>>;

    fn into_iter(self) -> Self::IntoIter {
        self.commits.values()
    }
}

impl FromIterator<Rc<Commit>> for CommitSet {
    fn from_iter<I: IntoIterator<Item = Rc<Commit>>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Keep only the ids that are not reachable from any other id in `ids`
pub fn filter_ancestors(repo: &dyn Repo, ids: &[git2::Oid]) -> Result<Vec<git2::Oid>, git2::Error> {
    let mut kept = Vec::with_capacity(ids.len());
    for (i, candidate) in ids.iter().enumerate() {
        let mut redundant = false;
        for (j, other) in ids.iter().enumerate() {
            if i == j || candidate == other {
                continue;
            }
            if repo.is_ancestor(*candidate, *other)? {
                log::debug!("Dropping {} as it is an ancestor of {}", candidate, other);
                redundant = true;
                break;
            }
        }
        if !redundant {
            kept.push(*candidate);
        }
    }
    Ok(kept)
}
