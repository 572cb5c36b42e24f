fn fixture_repo(name: &str) -> assert_fs::TempDir {
    let temp = assert_fs::TempDir::new().unwrap();
    let repo = git2::Repository::init(temp.path()).unwrap();
    let path = std::path::Path::new("tests/fixtures").join(name);
    git_fixture::Dag::load(&path).unwrap().run(&repo).unwrap();
    temp
}

fn git_rebase_track(root: &std::path::Path) -> snapbox::cmd::Command {
    // Keep the user's global gitconfig out of the run
    snapbox::cmd::Command::new(snapbox::cmd::cargo_bin!("git-rebase-track"))
        .current_dir(root)
        .env("HOME", root)
        .env("XDG_CONFIG_HOME", root)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .arg("--color=never")
}

#[test]
fn candidates_from_pattern() {
    let root = fixture_repo("rebased.yml");
    let url = root.path().to_str().unwrap();

    git_rebase_track(root.path())
        .args(["--tracked", "topic", "--remote", url, "--pattern", "{branch}-v*"])
        .assert()
        .success()
        .stdout_eq(
            "\
Remote: [..]
Current branch: refs/heads/topic
New branch: refs/heads/topic-v2
Upstream: refs/heads/master
",
        );

    root.close().unwrap();
}

#[test]
fn analyze_rebased_branch() {
    let root = fixture_repo("rebased.yml");

    git_rebase_track(root.path())
        .args([
            "--tracked",
            "topic",
            "--new-head",
            "topic-v2",
            "--new-upstream",
            "master",
            "--new-branch",
            "refs/heads/topic-v2",
        ])
        .assert()
        .success()
        .stdout_eq(
            "\
Remote: origin
Current branch: refs/heads/topic
New branch: refs/heads/topic-v2 @ [..] feature two
New upstream: master @ [..] new upstream

Merge: N/A
Conflicts: N/A

Rebased commits:
  [..] feature two
  [..] [fixup] feature one
  [..] feature one
",
        );

    root.close().unwrap();
}

#[test]
fn merged_side_branch_is_rejected() {
    let root = fixture_repo("merged_side.yml");

    git_rebase_track(root.path())
        .args([
            "--tracked",
            "topic",
            "--new-head",
            "topic",
            "--new-upstream",
            "master",
        ])
        .assert()
        .code(1)
        .stdout_eq(
            "\
Remote: origin
Current branch: refs/heads/topic
",
        )
        .stderr_eq(
            "\
invalid commit-set: expected a single tail, found 2 ([..])
",
        );

    root.close().unwrap();
}

#[test]
fn dump_config_to_stdout() {
    let root = fixture_repo("rebased.yml");

    git_rebase_track(root.path())
        .args(["--pattern", "{branch}-v*", "--dump-config", "-"])
        .assert()
        .success()
        .stdout_eq(
            "\
[rebase-track]
\tremote=origin
\trebased-pattern={branch}-v*
\tupstream=refs/heads/master
",
        );

    root.close().unwrap();
}

#[test]
fn unknown_tracked_branch_is_usage_error() {
    let root = fixture_repo("rebased.yml");

    git_rebase_track(root.path())
        .args(["--tracked", "missing"])
        .assert()
        .code(64)
        .stdout_eq("")
        .stderr_eq(
            "\
could not find branch `missing`
",
        );

    root.close().unwrap();
}

#[test]
fn unreachable_remote_is_unavailable() {
    let root = fixture_repo("rebased.yml");
    let missing = root.path().join("does-not-exist");

    git_rebase_track(root.path())
        .args(["--tracked", "topic", "--pattern", "{branch}-v*", "--remote"])
        .arg(&missing)
        .assert()
        .code(69);

    root.close().unwrap();
}
