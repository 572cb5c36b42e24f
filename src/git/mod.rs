mod pattern;
mod repo;

pub use pattern::*;
pub use repo::*;

pub type Result<T, E = git2::Error> = std::result::Result<T, E>;

pub(crate) static HEADS_PREFIX: &str = "refs/heads/";

/// Strip the `refs/heads/` namespace, if present
pub fn short_branch_name(name: &str) -> &str {
    name.strip_prefix(HEADS_PREFIX).unwrap_or(name)
}
