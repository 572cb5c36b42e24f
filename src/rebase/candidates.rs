use crate::git::BranchPattern;
use crate::git::RemoteRef;

/// Upstream offered when the caller has no better guess
pub static DEFAULT_UPSTREAM: &str = "refs/heads/master";

/// Site policy for which remote branches may be the rebased tracked branch
#[derive(Default)]
pub struct CandidatePolicy<'p> {
    pub pattern: Option<BranchPattern>,
    /// Called as `predicate(tracked, candidate)`
    pub predicate: Option<Box<dyn Fn(&str, &str) -> bool + 'p>>,
}

impl CandidatePolicy<'_> {
    /// Without any policy, no candidates are suggested
    pub fn is_empty(&self) -> bool {
        self.pattern.is_none() && self.predicate.is_none()
    }

    pub fn find(&self, tracked: &str, remote_refs: &[RemoteRef]) -> Vec<String> {
        find_candidates(
            tracked,
            remote_refs,
            self.pattern.as_ref(),
            self.predicate.as_deref(),
        )
    }
}

impl std::fmt::Debug for CandidatePolicy<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidatePolicy")
            .field("pattern", &self.pattern)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

/// Branch names from `remote_refs` that could hold the rebased `tracked` branch
///
/// Names are returned without `refs/heads/`, deduplicated, in the order the remote listed them.
pub fn find_candidates(
    tracked: &str,
    remote_refs: &[RemoteRef],
    pattern: Option<&BranchPattern>,
    predicate: Option<&dyn Fn(&str, &str) -> bool>,
) -> Vec<String> {
    if pattern.is_none() && predicate.is_none() {
        log::debug!("No rebased branch policy for `{}`", tracked);
        return Vec::new();
    }

    let mut seen = std::collections::HashSet::new();
    remote_refs
        .iter()
        .filter_map(|r| r.name.strip_prefix(crate::git::HEADS_PREFIX))
        .filter(|name| pattern.is_none_or(|pattern| pattern.is_match(*name)))
        .filter(|name| {
            let keep = predicate.is_none_or(|predicate| predicate(tracked, *name));
            if !keep {
                log::trace!("`{}` rejected as a candidate for `{}`", name, tracked);
            }
            keep
        })
        .filter(|name| seen.insert(*name))
        .map(|name| name.to_owned())
        .collect()
}

/// Pre-selected new branch: the only candidate, else the tracked branch itself
pub fn default_new_branch<'s>(tracked: &'s str, candidates: &'s [String]) -> &'s str {
    match candidates {
        [only] => only.as_str(),
        _ => tracked,
    }
}
