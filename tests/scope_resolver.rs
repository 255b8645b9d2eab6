// tests/scope_resolver.rs

mod common;
use crate::common::init_tracing;

use std::path::{Path, PathBuf};

use testwatch::engine::scope::module_path;
use testwatch::engine::ScopeResolver;
use testwatch::fs::mock::MockFileSystem;
use testwatch::types::{FailedTest, FailedTestSet, TestScope};

fn paths(list: &[&str]) -> Vec<PathBuf> {
    list.iter().map(PathBuf::from).collect()
}

fn failed(ids: &[(&str, &str)]) -> FailedTestSet {
    let mut set = FailedTestSet::new();
    for (pkg, name) in ids {
        set.insert(FailedTest::new(Some(pkg.to_string()), *name));
    }
    set
}

fn package(dir: &str) -> TestScope {
    TestScope::Packages(vec![dir.to_string()])
}

#[test]
fn single_directory_is_targeted() {
    init_tracing();
    let resolver = ScopeResolver::new("/proj", None);

    let scope = resolver.resolve(&paths(&["/proj/a/x.go"]), &FailedTestSet::new());

    assert_eq!(scope, package("a"));
    assert_eq!(scope.selectors(), vec!["./a"]);
}

#[test]
fn several_files_in_one_directory_stay_targeted() {
    let resolver = ScopeResolver::new("/proj", None);

    let scope = resolver.resolve(
        &paths(&["/proj/a/x.go", "/proj/a/x_test.go"]),
        &FailedTestSet::new(),
    );

    assert_eq!(scope, package("a"));
}

#[test]
fn two_directories_collapse_to_all() {
    let resolver = ScopeResolver::new("/proj", None);

    let scope = resolver.resolve(
        &paths(&["/proj/a/x.go", "/proj/b/y.go"]),
        &FailedTestSet::new(),
    );

    assert_eq!(scope, TestScope::All);
    assert_eq!(scope.selectors(), vec!["./..."]);
}

#[test]
fn root_files_map_to_the_root_package() {
    let resolver = ScopeResolver::new("/proj", None);

    let scope = resolver.resolve(&paths(&["/proj/main.go"]), &FailedTestSet::new());

    assert_eq!(scope, package("."));
    assert_eq!(scope.selectors(), vec!["."]);
}

#[test]
fn nothing_changed_and_nothing_failing_runs_everything() {
    let resolver = ScopeResolver::new("/proj", None);

    assert_eq!(resolver.resolve(&[], &FailedTestSet::new()), TestScope::All);
}

#[test]
fn paths_outside_the_root_degrade_to_all() {
    let resolver = ScopeResolver::new("/proj", None);

    let scope = resolver.resolve(
        &paths(&["/somewhere/else/z.go"]),
        &FailedTestSet::new(),
    );

    assert_eq!(scope, TestScope::All);
}

#[test]
fn remembered_failures_are_retargeted_without_changes() {
    let resolver = ScopeResolver::new("/proj", Some("example.com/calc".to_string()));
    let memory = failed(&[("example.com/calc/a", "TestX")]);

    assert_eq!(resolver.resolve(&[], &memory), package("a"));
    assert_eq!(resolver.resolve(&paths(&["/proj/a/y.go"]), &memory), package("a"));
    assert_eq!(
        resolver.resolve(&paths(&["/proj/b/y.go"]), &memory),
        TestScope::All
    );
}

#[test]
fn failures_in_the_module_root_map_to_dot() {
    let resolver = ScopeResolver::new("/proj", Some("example.com/calc".to_string()));
    let memory = failed(&[("example.com/calc", "TestMain2")]);

    assert_eq!(resolver.resolve(&[], &memory), package("."));
}

#[test]
fn unplaceable_failures_degrade_to_all() {
    let resolver = ScopeResolver::new("/proj", Some("example.com/calc".to_string()));

    let foreign = failed(&[("other.org/lib", "TestY")]);
    assert_eq!(resolver.resolve(&[], &foreign), TestScope::All);

    let mut unknown = FailedTestSet::new();
    unknown.insert(FailedTest::new(None, "TestZ"));
    assert_eq!(resolver.resolve(&[], &unknown), TestScope::All);
}

#[test]
fn without_a_module_packages_are_relative_directories() {
    let resolver = ScopeResolver::new("/proj", None);

    assert_eq!(resolver.package_dir("a/b"), Some("a/b".to_string()));
    assert_eq!(resolver.package_dir("./a"), Some("a".to_string()));
    assert_eq!(resolver.package_dir("../a"), None);
    assert_eq!(resolver.package_dir("/abs/a"), None);
}

#[test]
fn module_path_is_read_from_go_mod() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/go.mod", "// comment\nmodule example.com/calc\n\ngo 1.22\n");

    let resolver = ScopeResolver::detect(&fs, Path::new("/proj"));
    assert_eq!(resolver.module(), Some("example.com/calc"));

    let missing = ScopeResolver::detect(&fs, Path::new("/other"));
    assert_eq!(missing.module(), None);
}

#[test]
fn module_directive_parsing() {
    assert_eq!(
        module_path("module \"example.com/quoted\"\n"),
        Some("example.com/quoted".to_string())
    );
    assert_eq!(module_path("modules are fun\n"), None);
    assert_eq!(module_path("go 1.22\n"), None);
}
