use bstr::ByteSlice;

use crate::git::BranchPattern;

/// Read-only view of a repository's commits, ancestry, and remotes
pub trait Repo {
    fn find_commit(&self, id: git2::Oid) -> Option<std::rc::Rc<Commit>>;
    fn resolve(&self, revspec: &str) -> Option<std::rc::Rc<Commit>>;
    fn head_branch(&self) -> Option<Branch>;
    fn find_local_branch(&self, name: &str) -> Option<Branch>;

    /// Commits reachable from `included` but not from `excluded`, children before parents
    fn revlist(
        &self,
        included: &[git2::Oid],
        excluded: &[git2::Oid],
    ) -> Result<Vec<git2::Oid>, git2::Error>;
    /// Whether `candidate_id` is reachable from `of_id` (a commit is its own ancestor)
    fn is_ancestor(&self, candidate_id: git2::Oid, of_id: git2::Oid) -> Result<bool, git2::Error>;
    fn ls_remote(
        &self,
        remote: &str,
        pattern: Option<&BranchPattern>,
    ) -> Result<Vec<RemoteRef>, git2::Error>;
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Branch {
    pub name: String,
    pub id: git2::Oid,
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name.as_str())
    }
}

/// A ref as advertised by a remote
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RemoteRef {
    pub id: git2::Oid,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Commit {
    pub id: git2::Oid,
    pub parent_ids: Vec<git2::Oid>,
    pub summary: bstr::BString,
}

impl Commit {
    pub fn short_id(&self) -> String {
        let mut id = self.id.to_string();
        id.truncate(8);
        id
    }

    pub fn fixup_summary(&self) -> Option<&bstr::BStr> {
        self.summary
            .strip_prefix(b"fixup! ")
            .map(ByteSlice::as_bstr)
    }

    pub fn squash_summary(&self) -> Option<&bstr::BStr> {
        self.summary
            .strip_prefix(b"squash! ")
            .map(ByteSlice::as_bstr)
    }

    /// Summary for display, with autosquash markers called out
    pub fn nice_summary(&self) -> String {
        if let Some(target) = self.fixup_summary() {
            format!("[fixup] {}", target.trim().as_bstr())
        } else if let Some(target) = self.squash_summary() {
            format!("[squash] {}", target.trim().as_bstr())
        } else {
            self.summary.trim().as_bstr().to_string()
        }
    }
}

impl std::fmt::Display for Commit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.short_id(), self.nice_summary())
    }
}

pub struct GitRepo {
    repo: git2::Repository,
    commits: std::cell::RefCell<std::collections::HashMap<git2::Oid, std::rc::Rc<Commit>>>,
}

impl GitRepo {
    pub fn new(repo: git2::Repository) -> Self {
        Self {
            repo,
            commits: Default::default(),
        }
    }

    pub fn raw(&self) -> &git2::Repository {
        &self.repo
    }

    pub fn find_commit(&self, id: git2::Oid) -> Option<std::rc::Rc<Commit>> {
        let mut commits = self.commits.borrow_mut();
        if let Some(commit) = commits.get(&id) {
            Some(std::rc::Rc::clone(commit))
        } else {
            log::trace!("Loading commit {}", id);
            let commit = self.repo.find_commit(id).ok()?;
            let summary: bstr::BString = commit.summary_bytes().unwrap_or_default().into();
            let commit = std::rc::Rc::new(Commit {
                id: commit.id(),
                parent_ids: commit.parent_ids().collect(),
                summary,
            });
            commits.insert(id, std::rc::Rc::clone(&commit));
            Some(commit)
        }
    }

    pub fn resolve(&self, revspec: &str) -> Option<std::rc::Rc<Commit>> {
        let id = self
            .repo
            .revparse_single(revspec)
            .ok()?
            .peel_to_commit()
            .ok()?
            .id();
        self.find_commit(id)
    }

    pub fn head_branch(&self) -> Option<Branch> {
        let head = self.repo.head().ok()?;
        if !head.is_branch() {
            return None;
        }
        let resolved = head.resolve().ok()?;
        let name = resolved.shorthand()?;
        let id = resolved.target()?;
        Some(Branch {
            name: name.to_owned(),
            id,
        })
    }

    pub fn find_local_branch(&self, name: &str) -> Option<Branch> {
        let branch = self.repo.find_branch(name, git2::BranchType::Local).ok()?;
        let id = branch.get().target()?;
        Some(Branch {
            name: name.to_owned(),
            id,
        })
    }

    pub fn revlist(
        &self,
        included: &[git2::Oid],
        excluded: &[git2::Oid],
    ) -> Result<Vec<git2::Oid>, git2::Error> {
        let mut revwalk = self.repo.revwalk()?;
        for id in included {
            revwalk.push(*id)?;
        }
        for id in excluded {
            revwalk.hide(*id)?;
        }
        revwalk.set_sorting(git2::Sort::TOPOLOGICAL)?;
        revwalk.collect()
    }

    pub fn is_ancestor(
        &self,
        candidate_id: git2::Oid,
        of_id: git2::Oid,
    ) -> Result<bool, git2::Error> {
        if candidate_id == of_id {
            return Ok(true);
        }
        self.repo.graph_descendant_of(of_id, candidate_id)
    }

    /// List refs of a configured remote, or of a URL when no remote goes by that name
    pub fn ls_remote(
        &self,
        remote: &str,
        pattern: Option<&BranchPattern>,
    ) -> Result<Vec<RemoteRef>, git2::Error> {
        let mut remote = match self.repo.find_remote(remote) {
            Ok(remote) => remote,
            Err(err) => {
                log::trace!("No remote named `{}` ({}), treating it as a URL", remote, err);
                self.repo.remote_anonymous(remote)?
            }
        };
        log::trace!("Listing refs of {}", remote.url().unwrap_or("<non-utf8 url>"));
        remote.connect(git2::Direction::Fetch)?;
        let refs = remote
            .list()?
            .iter()
            .filter(|head| {
                pattern.is_none_or(|pattern| pattern.is_match(super::short_branch_name(head.name())))
            })
            .map(|head| RemoteRef {
                id: head.oid(),
                name: head.name().to_owned(),
            })
            .collect::<Vec<_>>();
        remote.disconnect()?;
        Ok(refs)
    }
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.debug_struct("GitRepo")
            .field("repo", &self.repo.workdir())
            .finish()
    }
}

impl Repo for GitRepo {
    fn find_commit(&self, id: git2::Oid) -> Option<std::rc::Rc<Commit>> {
        self.find_commit(id)
    }

    fn resolve(&self, revspec: &str) -> Option<std::rc::Rc<Commit>> {
        self.resolve(revspec)
    }

    fn head_branch(&self) -> Option<Branch> {
        self.head_branch()
    }

    fn find_local_branch(&self, name: &str) -> Option<Branch> {
        self.find_local_branch(name)
    }

    fn revlist(
        &self,
        included: &[git2::Oid],
        excluded: &[git2::Oid],
    ) -> Result<Vec<git2::Oid>, git2::Error> {
        self.revlist(included, excluded)
    }

    fn is_ancestor(&self, candidate_id: git2::Oid, of_id: git2::Oid) -> Result<bool, git2::Error> {
        self.is_ancestor(candidate_id, of_id)
    }

    fn ls_remote(
        &self,
        remote: &str,
        pattern: Option<&BranchPattern>,
    ) -> Result<Vec<RemoteRef>, git2::Error> {
        self.ls_remote(remote, pattern)
    }
}

#[derive(Debug)]
pub struct InMemoryRepo {
    commits: std::collections::HashMap<git2::Oid, std::rc::Rc<Commit>>,
    // Edges point from child to parent, weighted by parent position
    graph: petgraph::graphmap::DiGraphMap<git2::Oid, usize>,
    branches: std::collections::BTreeMap<String, Branch>,
    remotes: std::collections::BTreeMap<String, Vec<RemoteRef>>,
    head_id: Option<git2::Oid>,

    last_id: std::sync::atomic::AtomicUsize,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self {
            commits: Default::default(),
            graph: Default::default(),
            branches: Default::default(),
            remotes: Default::default(),
            head_id: Default::default(),
            last_id: std::sync::atomic::AtomicUsize::new(1),
        }
    }

    pub fn clear(&mut self) {
        *self = InMemoryRepo::new();
    }

    pub fn gen_id(&mut self) -> git2::Oid {
        let last_id = self
            .last_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let sha = format!("{last_id:040x}");
        git2::Oid::from_str(&sha).unwrap()
    }

    pub fn push_commit(&mut self, commit: Commit) {
        self.graph.add_node(commit.id);
        for (weight, parent_id) in commit.parent_ids.iter().enumerate() {
            assert!(
                self.commits.contains_key(parent_id),
                "expected to contain {parent_id}"
            );
            self.graph.add_edge(commit.id, *parent_id, weight);
        }
        self.head_id = Some(commit.id);
        self.commits.insert(commit.id, std::rc::Rc::new(commit));
    }

    pub fn head_id(&self) -> Option<git2::Oid> {
        self.head_id
    }

    pub fn set_head(&mut self, head_id: git2::Oid) {
        assert!(self.commits.contains_key(&head_id));
        self.head_id = Some(head_id);
    }

    pub fn mark_branch(&mut self, branch: Branch) {
        assert!(self.commits.contains_key(&branch.id));
        self.branches.insert(branch.name.clone(), branch);
    }

    /// Advertise `name` on `remote`, as seen by [`InMemoryRepo::ls_remote`]
    pub fn push_remote_ref(&mut self, remote: &str, remote_ref: RemoteRef) {
        self.remotes
            .entry(remote.to_owned())
            .or_default()
            .push(remote_ref);
    }

    pub fn find_commit(&self, id: git2::Oid) -> Option<std::rc::Rc<Commit>> {
        self.commits.get(&id).cloned()
    }

    pub fn resolve(&self, revspec: &str) -> Option<std::rc::Rc<Commit>> {
        let branch = self
            .branches
            .get(super::short_branch_name(revspec))
            .map(|b| b.id);
        let id = branch.or_else(|| git2::Oid::from_str(revspec).ok())?;
        self.find_commit(id)
    }

    pub fn head_branch(&self) -> Option<Branch> {
        let head_id = self.head_id?;
        self.branches.values().find(|b| b.id == head_id).cloned()
    }

    pub fn find_local_branch(&self, name: &str) -> Option<Branch> {
        self.branches.get(name).cloned()
    }

    pub fn revlist(
        &self,
        included: &[git2::Oid],
        excluded: &[git2::Oid],
    ) -> Result<Vec<git2::Oid>, git2::Error> {
        for id in included.iter().chain(excluded) {
            if !self.commits.contains_key(id) {
                return Err(not_found(*id));
            }
        }

        let mut hidden = std::collections::HashSet::new();
        let mut dfs = petgraph::visit::Dfs::empty(&self.graph);
        for id in excluded {
            dfs.move_to(*id);
            while let Some(ancestor_id) = dfs.next(&self.graph) {
                hidden.insert(ancestor_id);
            }
        }

        // Reverse post-order keeps every child ahead of its parents
        let mut visited = std::collections::HashSet::new();
        let mut post_order = Vec::new();
        for id in included {
            let mut stack = vec![(*id, false)];
            while let Some((current, expanded)) = stack.pop() {
                if expanded {
                    post_order.push(current);
                    continue;
                }
                if hidden.contains(&current) || !visited.insert(current) {
                    continue;
                }
                stack.push((current, true));
                let parent_ids: Vec<_> = self.graph.neighbors(current).collect();
                for parent_id in parent_ids.into_iter().rev() {
                    if !visited.contains(&parent_id) {
                        stack.push((parent_id, false));
                    }
                }
            }
        }
        post_order.reverse();
        Ok(post_order)
    }

    pub fn is_ancestor(
        &self,
        candidate_id: git2::Oid,
        of_id: git2::Oid,
    ) -> Result<bool, git2::Error> {
        for id in [candidate_id, of_id] {
            if !self.commits.contains_key(&id) {
                return Err(not_found(id));
            }
        }
        Ok(petgraph::algo::has_path_connecting(
            &self.graph,
            of_id,
            candidate_id,
            None,
        ))
    }

    pub fn ls_remote(
        &self,
        remote: &str,
        pattern: Option<&BranchPattern>,
    ) -> Result<Vec<RemoteRef>, git2::Error> {
        let refs = self.remotes.get(remote).ok_or_else(|| {
            git2::Error::new(
                git2::ErrorCode::NotFound,
                git2::ErrorClass::Net,
                format!("could not reach remote {remote:?}"),
            )
        })?;
        Ok(refs
            .iter()
            .filter(|r| pattern.is_none_or(|pattern| pattern.is_match(super::short_branch_name(&r.name))))
            .cloned()
            .collect())
    }
}

impl Default for InMemoryRepo {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(id: git2::Oid) -> git2::Error {
    git2::Error::new(
        git2::ErrorCode::NotFound,
        git2::ErrorClass::Object,
        format!("could not find commit {id}"),
    )
}

impl Repo for InMemoryRepo {
    fn find_commit(&self, id: git2::Oid) -> Option<std::rc::Rc<Commit>> {
        self.find_commit(id)
    }

    fn resolve(&self, revspec: &str) -> Option<std::rc::Rc<Commit>> {
        self.resolve(revspec)
    }

    fn head_branch(&self) -> Option<Branch> {
        self.head_branch()
    }

    fn find_local_branch(&self, name: &str) -> Option<Branch> {
        self.find_local_branch(name)
    }

    fn revlist(
        &self,
        included: &[git2::Oid],
        excluded: &[git2::Oid],
    ) -> Result<Vec<git2::Oid>, git2::Error> {
        self.revlist(included, excluded)
    }

    fn is_ancestor(&self, candidate_id: git2::Oid, of_id: git2::Oid) -> Result<bool, git2::Error> {
        self.is_ancestor(candidate_id, of_id)
    }

    fn ls_remote(
        &self,
        remote: &str,
        pattern: Option<&BranchPattern>,
    ) -> Result<Vec<RemoteRef>, git2::Error> {
        self.ls_remote(remote, pattern)
    }
}
