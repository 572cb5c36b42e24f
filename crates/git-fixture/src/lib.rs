//! Describe commit graphs in YAML and replay them into a repository

mod model;

pub use model::*;

use eyre::WrapErr;

impl Dag {
    pub fn load(path: &std::path::Path) -> eyre::Result<Self> {
        let data = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Could not read {}", path.display()))?;

        let mut dag: Self = match path.extension().and_then(std::ffi::OsStr::to_str) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&data)
                .wrap_err_with(|| format!("Could not parse {}", path.display()))?,
            Some(other) => {
                return Err(eyre::eyre!("Unknown extension: {:?}", other));
            }
            None => {
                return Err(eyre::eyre!("No extension for {}", path.display()));
            }
        };

        dag.import_root = path
            .parent()
            .unwrap_or_else(|| std::path::Path::new(""))
            .to_owned();

        Ok(dag)
    }

    /// Write the commits into `repo`, leaving `HEAD` at the last one
    pub fn run(self, repo: &git2::Repository) -> eyre::Result<()> {
        let mut state = RunState::default();
        if !self.init {
            state.head = repo.head().ok().and_then(|h| h.target());
        }
        Self::run_events(repo, self.events, &self.import_root, &mut state)?;

        match (state.head, state.head_branch) {
            (Some(_), Some(branch)) => repo
                .set_head(&format!("refs/heads/{branch}"))
                .wrap_err_with(|| format!("Failed to switch to {branch}"))?,
            (Some(head), None) => repo
                .set_head_detached(head)
                .wrap_err_with(|| format!("Failed to detach at {head}"))?,
            (None, _) => {}
        }

        Ok(())
    }

    fn run_events(
        repo: &git2::Repository,
        events: Vec<Event>,
        import_root: &std::path::Path,
        state: &mut RunState,
    ) -> eyre::Result<()> {
        for event in events.into_iter() {
            match event {
                Event::Import(path) => {
                    let path = import_root.join(path);
                    let child_dag = Dag::load(&path)?;
                    Self::run_events(repo, child_dag.events, &child_dag.import_root, state)
                        .wrap_err_with(|| {
                            format!("Failed when running imported fixture {}", path.display())
                        })?;
                }
                Event::Tree(tree) => {
                    let mut builder = repo.treebuilder(None)?;
                    for (name, content) in tree.tracked.iter() {
                        let blob_id = repo.blob(content.as_bytes())?;
                        builder
                            .insert(name.as_str(), blob_id, 0o100644)
                            .wrap_err_with(|| format!("Failed to add {name}"))?;
                    }
                    let tree_id = builder.write()?;
                    let message = tree.message.as_deref().unwrap_or("Automated");
                    let id = state.commit(repo, tree_id, message, &[])?;
                    state.label(repo, id, tree.branch.as_ref(), tree.mark.as_ref())?;
                }
                Event::Merge(merge) => {
                    let head_id = state
                        .head
                        .ok_or_else(|| eyre::eyre!("Cannot merge without a commit"))?;
                    let tree_id = repo.find_commit(head_id)?.tree_id();
                    let bases = merge
                        .base
                        .iter()
                        .map(|reference| state.resolve(repo, reference))
                        .collect::<eyre::Result<Vec<_>>>()?;
                    let message = merge.message.as_deref().unwrap_or("Merge");
                    let id = state.commit(repo, tree_id, message, &bases)?;
                    state.label(repo, id, merge.branch.as_ref(), merge.mark.as_ref())?;
                }
                Event::Children(mut runs) => {
                    let start = (state.head, state.head_branch.clone());
                    let last_run = runs.pop();
                    for run in runs {
                        Self::run_events(repo, run, import_root, state)?;
                        (state.head, state.head_branch) = start.clone();
                    }
                    if let Some(last_run) = last_run {
                        Self::run_events(repo, last_run, import_root, state)?;
                    }
                }
                Event::Head(reference) => {
                    state.head = Some(state.resolve(repo, &reference)?);
                    state.head_branch = match reference {
                        Reference::Branch(branch) => Some(branch.as_str().to_owned()),
                        Reference::Mark(_) => None,
                    };
                }
            }
        }

        Ok(())
    }
}

#[derive(Default)]
struct RunState {
    head: Option<git2::Oid>,
    head_branch: Option<String>,
    marks: std::collections::HashMap<String, git2::Oid>,
    time: i64,
}

impl RunState {
    fn commit(
        &mut self,
        repo: &git2::Repository,
        tree_id: git2::Oid,
        message: &str,
        bases: &[git2::Oid],
    ) -> eyre::Result<git2::Oid> {
        let tree = repo.find_tree(tree_id)?;
        let parents = self
            .head
            .iter()
            .chain(bases)
            .map(|id| repo.find_commit(*id))
            .collect::<Result<Vec<_>, _>>()?;
        let parents: Vec<_> = parents.iter().collect();

        // Deterministic timestamps keep ids stable between runs
        self.time += 1;
        let signature =
            git2::Signature::new("Fixture", "fixture@example.com", &git2::Time::new(self.time, 0))?;
        let id = repo
            .commit(None, &signature, &signature, message, &tree, &parents)
            .wrap_err_with(|| format!("Failed to commit {message:?}"))?;
        self.head = Some(id);
        self.head_branch = None;
        Ok(id)
    }

    fn label(
        &mut self,
        repo: &git2::Repository,
        id: git2::Oid,
        branch: Option<&Branch>,
        mark: Option<&Mark>,
    ) -> eyre::Result<()> {
        if let Some(branch) = branch {
            let commit = repo.find_commit(id)?;
            repo.branch(branch.as_str(), &commit, true)
                .wrap_err_with(|| format!("Failed to create branch {}", branch.as_str()))?;
            self.head_branch = Some(branch.as_str().to_owned());
        }
        if let Some(mark) = mark {
            self.marks.insert(mark.as_str().to_owned(), id);
        }
        Ok(())
    }

    fn resolve(&self, repo: &git2::Repository, reference: &Reference) -> eyre::Result<git2::Oid> {
        match reference {
            Reference::Mark(mark) => self
                .marks
                .get(mark.as_str())
                .copied()
                .ok_or_else(|| eyre::eyre!("Reference doesn't exist: {:?}", mark)),
            Reference::Branch(branch) => repo
                .find_branch(branch.as_str(), git2::BranchType::Local)?
                .get()
                .target()
                .ok_or_else(|| eyre::eyre!("Branch is symbolic: {:?}", branch)),
        }
    }
}
