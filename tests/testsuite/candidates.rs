use git_rebase_track::config::CandidateFilter;
use git_rebase_track::config::RepoConfig;
use git_rebase_track::git::RemoteRef;
use git_rebase_track::rebase::*;

use crate::fixture;

fn advertise(repo: &mut git_rebase_track::git::InMemoryRepo, remote: &str, names: &[&str]) {
    for name in names {
        let branch = git_rebase_track::git::short_branch_name(name);
        let id = repo
            .find_local_branch(branch)
            .map(|b| b.id)
            .unwrap_or_else(|| repo.head_id().unwrap());
        repo.push_remote_ref(
            remote,
            RemoteRef {
                id,
                name: (*name).to_owned(),
            },
        );
    }
}

#[test]
fn configured_pattern_finds_rebased_branch() {
    let mut repo = fixture::load("rebased.yml");
    advertise(
        &mut repo,
        "origin",
        &[
            "HEAD",
            "refs/heads/master",
            "refs/heads/topic",
            "refs/heads/topic-v2",
        ],
    );
    let config = RepoConfig {
        rebased_patterns: Some(vec!["{branch}-v*".to_owned()]),
        ..RepoConfig::from_defaults()
    };

    let policy = config.candidate_policy("topic").unwrap();
    let remote_refs = repo.ls_remote(config.remote(), None).unwrap();
    let candidates = policy.find("topic", &remote_refs);

    assert_eq!(candidates, ["topic-v2"]);
    assert_eq!(default_new_branch("topic", &candidates), "topic-v2");
}

#[test]
fn configured_filter_finds_every_match() {
    let mut repo = fixture::load("rebased.yml");
    advertise(
        &mut repo,
        "review",
        &[
            "refs/heads/topic",
            "refs/heads/topic-v2",
            "refs/heads/old-topic",
            "refs/heads/master",
        ],
    );
    let config = RepoConfig {
        remote: Some("review".to_owned()),
        candidate_filter: Some(CandidateFilter::Contains),
        ..RepoConfig::from_defaults()
    };

    let policy = config.candidate_policy("topic").unwrap();
    let remote_refs = repo.ls_remote(config.remote(), None).unwrap();
    let candidates = policy.find("topic", &remote_refs);

    assert_eq!(candidates, ["topic-v2", "old-topic"]);
    assert_eq!(default_new_branch("topic", &candidates), "topic");
}

#[test]
fn unconfigured_site_suggests_nothing() {
    let mut repo = fixture::load("rebased.yml");
    advertise(&mut repo, "origin", &["refs/heads/topic-v2"]);
    let config = RepoConfig::from_defaults();

    let policy = config.candidate_policy("topic").unwrap();
    assert!(policy.is_empty());
    let remote_refs = repo.ls_remote(config.remote(), None).unwrap();
    assert!(policy.find("topic", &remote_refs).is_empty());
}

#[test]
fn unreachable_remote() {
    let repo = fixture::load("rebased.yml");
    let err = repo.ls_remote("nowhere", None).unwrap_err();
    assert_eq!(err.class(), git2::ErrorClass::Net);
}

#[test]
fn candidate_feeds_analysis() {
    let mut repo = fixture::load("rebased.yml");
    advertise(&mut repo, "origin", &["refs/heads/topic", "refs/heads/topic-v2"]);
    let config = RepoConfig {
        candidate_filter: Some(CandidateFilter::Prefix),
        ..RepoConfig::from_defaults()
    };

    let policy = config.candidate_policy("topic").unwrap();
    let remote_refs = repo.ls_remote(config.remote(), None).unwrap();
    let candidates = policy.find("topic", &remote_refs);
    let new_branch = default_new_branch("topic", &candidates);

    let new_head = repo.resolve(new_branch).unwrap();
    let upstream = repo.resolve(config.upstream()).unwrap();
    let analysis = analyze(
        &repo,
        &RebaseRequest {
            old_head: repo.find_local_branch("topic").unwrap().id,
            new_head: new_head.id,
            new_upstream: upstream.id,
            new_branch: new_branch.to_owned(),
        },
    )
    .unwrap();
    assert_eq!(analysis.descriptor.new_branch_name, "topic-v2");
    assert_eq!(analysis.commits.len(), 3);
}
