/// Placeholder in a pattern template that expands to the tracked branch name
pub static BRANCH_PLACEHOLDER: &str = "{branch}";

/// Branch names a site considers plausible rebase targets (gitignore syntax)
#[derive(Clone, Debug)]
pub struct BranchPattern {
    globs: ignore::gitignore::Gitignore,
}

impl BranchPattern {
    pub fn new<'p>(patterns: impl IntoIterator<Item = &'p str>) -> eyre::Result<Self> {
        let mut globs = ignore::gitignore::GitignoreBuilder::new("");
        for pattern in patterns {
            globs.add_line(None, pattern)?;
        }
        let globs = globs.build()?;
        Ok(Self { globs })
    }

    /// Expand `{branch}` in each template with `tracked`
    ///
    /// Returns `None` when there are no templates, meaning the site has no pattern.
    pub fn from_templates<'p>(
        templates: impl IntoIterator<Item = &'p str>,
        tracked: &str,
    ) -> eyre::Result<Option<Self>> {
        let expanded: Vec<_> = templates
            .into_iter()
            .map(|t| t.replace(BRANCH_PLACEHOLDER, tracked))
            .collect();
        if expanded.is_empty() {
            return Ok(None);
        }
        Self::new(expanded.iter().map(|s| s.as_str())).map(Some)
    }

    pub fn is_empty(&self) -> bool {
        self.globs.is_empty()
    }

    pub fn is_match(&self, name: &str) -> bool {
        let name_match = self.globs.matched_path_or_any_parents(name, false);
        match name_match {
            ignore::Match::None => false,
            ignore::Match::Ignore(glob) => {
                log::trace!("`{}` is matched by {:?}", name, glob.original());
                true
            }
            ignore::Match::Whitelist(glob) => {
                log::trace!("`{}` is excluded by {:?}", name, glob.original());
                false
            }
        }
    }
}
