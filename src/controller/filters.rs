//! Filter scope rules and the ordered before/after filter tables.

/// FilterOptions
///
/// Restricts the actions a filter applies to. `skip` runs the filter for every
/// action except the listed ones; `only` runs it for the listed actions alone.
/// When both lists are set, `skip` wins and `only` is ignored. A value with
/// neither list matches no action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub skip: Option<Vec<String>>,
    pub only: Option<Vec<String>>,
}

impl FilterOptions {
    pub fn skip<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            skip: Some(actions.into_iter().map(Into::into).collect()),
            only: None,
        }
    }

    pub fn only<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            skip: None,
            only: Some(actions.into_iter().map(Into::into).collect()),
        }
    }
}

/// should_run
///
/// Decides whether a filter scoped by `options` applies to `action_name`.
/// No options means the filter always runs.
pub fn should_run(options: Option<&FilterOptions>, action_name: &str) -> bool {
    let Some(options) = options else {
        return true;
    };

    if let Some(skip) = &options.skip {
        return !skip.iter().any(|action| action == action_name);
    }

    if let Some(only) = &options.only {
        return only.iter().any(|action| action == action_name);
    }

    false
}

/// FallbackScoping
///
/// How scope rules apply to filters that resolve only through the application
/// controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackScoping {
    /// Application filters run for every action, ignoring `skip`/`only`.
    #[default]
    Unscoped,
    /// Application filters honour the same scope rules as local ones.
    Scoped,
}

/// Before or after the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPhase {
    Before,
    After,
}

impl std::fmt::Display for FilterPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterPhase::Before => write!(f, "before"),
            FilterPhase::After => write!(f, "after"),
        }
    }
}

/// FilterChain
///
/// Filter names with their scope rules, kept in first-registration order.
/// Registering a name again replaces its options without moving it.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    entries: Vec<(String, Option<FilterOptions>)>,
}

impl FilterChain {
    pub fn insert(&mut self, name: impl Into<String>, options: Option<FilterOptions>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = options,
            None => self.entries.push((name, options)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&FilterOptions>)> {
        self.entries
            .iter()
            .map(|(name, options)| (name.as_str(), options.as_ref()))
    }
}
