//! Captured `go test -v` output used across tests.

pub const PASSING: &str = "\
=== RUN   TestAdd
--- PASS: TestAdd (0.00s)
PASS
ok  \texample.com/calc\t0.012s
";

pub const PASSING_CACHED_WITH_COVERAGE: &str = "\
=== RUN   TestAdd
--- PASS: TestAdd (0.00s)
PASS
coverage: 87.3% of statements
ok  \texample.com/calc\t(cached)\tcoverage: 87.3% of statements
";

/// Two failing tests in one package.
pub const TWO_FAILURES: &str = "\
=== RUN   TestAdd
    calc_test.go:10: expected 3, got 4
--- FAIL: TestAdd (0.00s)
=== RUN   TestSub
    calc_test.go:20: expected 1, got 2
--- FAIL: TestSub (0.00s)
=== RUN   TestMul
--- PASS: TestMul (0.00s)
FAIL
FAIL\texample.com/calc/a\t0.004s
FAIL
";

pub const ONE_FAILURE: &str = "\
=== RUN   TestDiv
    div_test.go:7: division by zero
--- FAIL: TestDiv (0.00s)
FAIL
FAIL\texample.com/calc/a\t0.003s
FAIL
";

/// A compile error in one package, alongside a failing test elsewhere.
pub const BUILD_FAILED: &str = "\
# example.com/calc/b
b/b.go:3:1: syntax error: non-declaration statement outside function body
FAIL\texample.com/calc/b [build failed]
=== RUN   TestAdd
--- FAIL: TestAdd (0.00s)
FAIL\texample.com/calc/a\t0.004s
FAIL
";
