use git_rebase_track::git::InMemoryRepo;

pub(crate) fn load(name: &str) -> InMemoryRepo {
    let path = std::path::Path::new("tests/fixtures").join(name);
    let plan = git_fixture::Dag::load(&path).unwrap();
    let mut repo = InMemoryRepo::new();
    populate_repo(&mut repo, plan);
    repo
}

pub(crate) fn to_oid(number: usize) -> git2::Oid {
    let sha = format!("{number:040x}");
    git2::Oid::from_str(&sha).unwrap()
}

pub(crate) fn populate_repo(repo: &mut InMemoryRepo, fixture: git_fixture::Dag) {
    if fixture.init {
        repo.clear();
    }

    let import_root = fixture.import_root;
    let mut marks: std::collections::HashMap<String, git2::Oid> = Default::default();
    for event in fixture.events.into_iter() {
        populate_event(repo, event, &import_root, &mut marks);
    }
}

fn populate_event(
    repo: &mut InMemoryRepo,
    event: git_fixture::Event,
    import_root: &std::path::Path,
    marks: &mut std::collections::HashMap<String, git2::Oid>,
) {
    match event {
        git_fixture::Event::Import(path) => {
            let path = import_root.join(path);
            let mut child_dag = git_fixture::Dag::load(&path).unwrap();
            child_dag.init = false;
            populate_repo(repo, child_dag);
        }
        git_fixture::Event::Tree(tree) => {
            let parent_ids = repo.head_id().into_iter().collect();
            let message = tree.message.as_deref().unwrap_or("Automated");
            push(repo, parent_ids, message, tree.branch, tree.mark, marks);
        }
        git_fixture::Event::Merge(merge) => {
            let parent_ids = repo
                .head_id()
                .into_iter()
                .chain(merge.base.iter().map(|r| resolve(repo, r, marks)))
                .collect();
            let message = merge.message.as_deref().unwrap_or("Merge");
            push(repo, parent_ids, message, merge.branch, merge.mark, marks);
        }
        git_fixture::Event::Children(mut events) => {
            let start_commit = repo.head_id().unwrap();
            let last_run = events.pop();
            for run in events {
                for event in run {
                    populate_event(repo, event, import_root, marks);
                }
                repo.set_head(start_commit);
            }
            if let Some(last_run) = last_run {
                for event in last_run {
                    populate_event(repo, event, import_root, marks);
                }
            }
        }
        git_fixture::Event::Head(reference) => {
            let id = resolve(repo, &reference, marks);
            repo.set_head(id);
        }
    }
}

fn push(
    repo: &mut InMemoryRepo,
    parent_ids: Vec<git2::Oid>,
    message: &str,
    branch: Option<git_fixture::Branch>,
    mark: Option<git_fixture::Mark>,
    marks: &mut std::collections::HashMap<String, git2::Oid>,
) {
    let id = repo.gen_id();
    let summary = message.lines().next().unwrap_or_default();
    repo.push_commit(git_rebase_track::git::Commit {
        id,
        parent_ids,
        summary: summary.into(),
    });
    if let Some(branch) = branch {
        repo.mark_branch(git_rebase_track::git::Branch {
            name: branch.as_str().to_owned(),
            id,
        });
    }
    if let Some(mark) = mark {
        marks.insert(mark.as_str().to_owned(), id);
    }
}

fn resolve(
    repo: &InMemoryRepo,
    reference: &git_fixture::Reference,
    marks: &std::collections::HashMap<String, git2::Oid>,
) -> git2::Oid {
    match reference {
        git_fixture::Reference::Mark(mark) => *marks.get(mark.as_str()).unwrap(),
        git_fixture::Reference::Branch(name) => repo.find_local_branch(name.as_str()).unwrap().id,
    }
}
