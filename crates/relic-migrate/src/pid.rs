use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Decides which objects a run writes.
pub trait PidFilter: Send + Sync + fmt::Debug {
    fn accept(&self, pid: &str) -> bool;
}

/// Accepts every object.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl PidFilter for AcceptAll {
    fn accept(&self, _pid: &str) -> bool {
        true
    }
}

/// Accepts only listed pids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PidListFilter {
    pids: HashSet<String>,
}

impl PidListFilter {
    pub fn new<I, S>(pids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pids: pids.into_iter().map(Into::into).collect(),
        }
    }

    /// Read a pid list: one pid per line, blank lines and `#` comments ignored.
    pub fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    pub fn parse(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    pub fn len(&self) -> usize {
        self.pids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pids.is_empty()
    }
}

impl PidFilter for PidListFilter {
    fn accept(&self, pid: &str) -> bool {
        self.pids.contains(pid)
    }
}
