use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// Kind of change reported by a notification source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Write,
    Create,
    Remove,
    Rename,
    PermissionChange,
}

impl ChangeKind {
    /// Only content writes and creations can start a test run.
    pub fn triggers_run(self) -> bool {
        matches!(self, ChangeKind::Write | ChangeKind::Create)
    }
}

/// A single change notification for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// A test that failed in a previous run.
///
/// `package` is the import path printed on the `FAIL <package>` summary
/// line, when one was seen for the block the test belonged to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FailedTest {
    pub package: Option<String>,
    pub name: String,
}

impl FailedTest {
    pub fn new(package: Option<String>, name: impl Into<String>) -> Self {
        Self {
            package,
            name: name.into(),
        }
    }
}

impl fmt::Display for FailedTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.package {
            Some(pkg) => write!(f, "{pkg}/{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Previously failed tests, kept until a fully green run clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailedTestSet {
    tests: BTreeSet<FailedTest>,
}

impl FailedTestSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, test: FailedTest) -> bool {
        self.tests.insert(test)
    }

    pub fn extend<I: IntoIterator<Item = FailedTest>>(&mut self, tests: I) {
        self.tests.extend(tests);
    }

    pub fn clear(&mut self) {
        self.tests.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FailedTest> {
        self.tests.iter()
    }

    /// Identifiers in `package/TestName` form, sorted.
    pub fn identifiers(&self) -> Vec<String> {
        self.tests.iter().map(|t| t.to_string()).collect()
    }
}

/// Which packages a test run should exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestScope {
    /// Every package under the root (`./...`).
    All,
    /// Explicit package directories relative to the root (`.` is the root).
    Packages(Vec<String>),
}

impl TestScope {
    /// Package selectors as passed to the test command.
    pub fn selectors(&self) -> Vec<String> {
        match self {
            TestScope::All => vec!["./...".to_string()],
            TestScope::Packages(dirs) => dirs
                .iter()
                .map(|d| {
                    if d == "." {
                        ".".to_string()
                    } else {
                        format!("./{d}")
                    }
                })
                .collect(),
        }
    }
}

impl fmt::Display for TestScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.selectors().join(" "))
    }
}
