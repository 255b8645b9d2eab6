use std::path::Path;

use testwatch::config::{ConfigFile, RawConfigFile};

/// Builder for `ConfigFile` to simplify test setup.
///
/// The root must exist on disk; validation canonicalizes it.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let mut config = RawConfigFile::default();
        config.watch.root = Some(root.as_ref().to_path_buf());
        Self { config }
    }

    pub fn debounce(mut self, value: &str) -> Self {
        self.config.watch.debounce = value.to_string();
        self
    }

    pub fn filter(mut self, pattern: &str) -> Self {
        self.config.watch.filter = pattern.to_string();
        self
    }

    pub fn poll_interval(mut self, value: &str) -> Self {
        self.config.watch.poll_interval = value.to_string();
        self
    }

    pub fn force_polling(mut self, val: bool) -> Self {
        self.config.watch.force_polling = val;
        self
    }

    pub fn command(mut self, command: &str) -> Self {
        self.config.test.command = command.to_string();
        self
    }

    pub fn coverage(mut self, val: bool) -> Self {
        self.config.test.coverage = val;
        self
    }

    pub fn focus_test_file(mut self, val: bool) -> Self {
        self.config.test.focus_test_file = val;
        self
    }

    pub fn bell(mut self, val: bool) -> Self {
        self.config.output.bell = val;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}
