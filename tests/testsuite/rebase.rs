use git_rebase_track::rebase::*;

use crate::fixture;
use crate::fixture::to_oid;

fn request(
    repo: &git_rebase_track::git::InMemoryRepo,
    old: &str,
    new: &str,
    upstream: &str,
) -> RebaseRequest {
    RebaseRequest {
        old_head: repo.find_local_branch(old).unwrap().id,
        new_head: repo.find_local_branch(new).unwrap().id,
        new_upstream: repo.find_local_branch(upstream).unwrap().id,
        new_branch: format!("refs/heads/{new}"),
    }
}

#[test]
fn rebased_onto_new_upstream() {
    let repo = fixture::load("rebased.yml");

    let analysis = analyze(&repo, &request(&repo, "topic", "topic-v2", "master")).unwrap();

    assert_eq!(
        analysis.descriptor,
        RebaseDescriptor {
            old_head: to_oid(4),
            new_head: to_oid(8),
            new_upstream: to_oid(5),
            new_branch_name: "topic-v2".to_owned(),
        }
    );
    assert_eq!(analysis.tail.id, to_oid(6));
    assert_eq!(analysis.upstream.summary, "new upstream");
    let rebased: Vec<_> = analysis.commits.iter().map(|c| c.nice_summary()).collect();
    assert_eq!(
        rebased,
        ["feature two", "[fixup] feature one", "feature one"]
    );
    assert_eq!(analysis.merge_status, Status::Undetermined);
    assert_eq!(analysis.conflict_status, Status::Undetermined);
}

#[test]
fn older_upstream_includes_upstream_commits() {
    let repo = fixture::load("rebased.yml");

    let analysis = analyze(&repo, &request(&repo, "topic", "topic-v2", "old-master")).unwrap();

    assert_eq!(analysis.descriptor.new_upstream, to_oid(2));
    assert_eq!(analysis.tail.id, to_oid(5));
    assert_eq!(analysis.commits.len(), 4);
}

#[test]
fn unrebased_branch_onto_its_own_base() {
    let repo = fixture::load("rebased.yml");

    let analysis = analyze(&repo, &request(&repo, "topic", "topic", "old-master")).unwrap();

    assert_eq!(analysis.head.id, to_oid(4));
    assert_eq!(analysis.tail.id, to_oid(3));
    assert_eq!(analysis.upstream.id, to_oid(2));
}

#[test]
fn upstream_ahead_of_head_is_empty() {
    let repo = fixture::load("rebased.yml");

    let err = analyze(&repo, &request(&repo, "topic", "master", "topic-v2")).unwrap_err();

    match err {
        AnalysisError::AmbiguousHead { heads } => assert!(heads.is_empty()),
        err => panic!("unexpected {err:?}"),
    }
}

#[test]
fn two_independent_branches() {
    let repo = fixture::load("rebased.yml");
    let topic = repo.find_local_branch("topic").unwrap();
    let topic_v2 = repo.find_local_branch("topic-v2").unwrap();
    let initial = to_oid(1);

    let commits =
        CommitSet::from_revlist(&repo, &[topic.id, topic_v2.id], &[initial]).unwrap();
    assert_eq!(
        commits.heads().iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![topic_v2.id, topic.id]
    );

    let err = analyze_commit_set(&repo, commits, topic.id, "topic-v2").unwrap_err();
    assert!(
        matches!(err, AnalysisError::AmbiguousHead { ref heads } if heads.len() == 2),
        "{err:?}"
    );
    assert!(err.to_string().starts_with("invalid commit-set: expected a single head, found 2"));
}

#[test]
fn merged_side_branch_has_two_tails() {
    let repo = fixture::load("merged_side.yml");

    let err = analyze(&repo, &request(&repo, "topic", "topic", "master")).unwrap_err();

    match err {
        AnalysisError::AmbiguousTail { tails } => {
            assert_eq!(tails, vec![to_oid(2), to_oid(4)]);
        }
        err => panic!("unexpected {err:?}"),
    }
}

#[test]
fn merged_upstream_filters_older_base() {
    let repo = fixture::load("merged_upstream.yml");
    let commits = CommitSet::from_revlist(
        &repo,
        &[repo.find_local_branch("topic").unwrap().id],
        &[repo.find_local_branch("master").unwrap().id],
    )
    .unwrap();
    assert_eq!(commits.raw_upstreams(), vec![to_oid(2), to_oid(1)]);

    let analysis = analyze(&repo, &request(&repo, "topic", "topic", "master")).unwrap();

    assert_eq!(analysis.head.id, to_oid(4));
    assert_eq!(analysis.tail.id, to_oid(3));
    assert_eq!(analysis.descriptor.new_upstream, to_oid(2));
}
