//! Test runner reports
//!
//! A report is a tree: describe blocks hold tests and nested describe blocks.
//! [`TestReport::summary`] flattens it into pass/fail counts.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pass,
    Fail,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub status: TestStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescribeBlock {
    pub name: String,
    #[serde(default)]
    pub tests: Vec<TestCase>,
    #[serde(default)]
    pub describes: Vec<DescribeBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    #[serde(default)]
    pub tests: Vec<TestCase>,
    #[serde(default)]
    pub describes: Vec<DescribeBlock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStatus {
    /// Nothing has run yet, or every test was skipped
    #[default]
    Idle,
    Pass,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TestSummary {
    pub status: SummaryStatus,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl TestSummary {
    pub fn from_counts(passed: usize, failed: usize, skipped: usize) -> Self {
        let status = if failed > 0 {
            SummaryStatus::Fail
        } else if passed > 0 {
            SummaryStatus::Pass
        } else {
            SummaryStatus::Idle
        };
        Self {
            status,
            passed,
            failed,
            skipped,
        }
    }

    pub fn is_pass(&self) -> bool {
        self.status == SummaryStatus::Pass
    }
}

/// A failed test and the describe names leading to it
#[derive(Debug, Clone, PartialEq)]
pub struct Failure<'a> {
    pub path: Vec<&'a str>,
    pub test: &'a TestCase,
}

impl Failure<'_> {
    /// `"Switch > toggles on click"`
    pub fn title(&self) -> String {
        let mut parts = self.path.clone();
        parts.push(&self.test.name);
        parts.join(" > ")
    }
}

impl TestReport {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Visit every test with its describe path
    pub fn walk<'a>(&'a self, mut visit: impl FnMut(&[&'a str], &'a TestCase)) {
        fn block<'a>(
            b: &'a DescribeBlock,
            path: &mut Vec<&'a str>,
            visit: &mut impl FnMut(&[&'a str], &'a TestCase),
        ) {
            path.push(&b.name);
            for test in &b.tests {
                visit(path.as_slice(), test);
            }
            for child in &b.describes {
                block(child, path, visit);
            }
            path.pop();
        }

        for test in &self.tests {
            visit(&[], test);
        }
        let mut path = Vec::new();
        for b in &self.describes {
            block(b, &mut path, &mut visit);
        }
    }

    pub fn summary(&self) -> TestSummary {
        let (mut passed, mut failed, mut skipped) = (0, 0, 0);
        self.walk(|_, test| match test.status {
            TestStatus::Pass => passed += 1,
            TestStatus::Fail => failed += 1,
            TestStatus::Skip => skipped += 1,
        });
        TestSummary::from_counts(passed, failed, skipped)
    }

    pub fn failures(&self) -> Vec<Failure<'_>> {
        let mut out = Vec::new();
        self.walk(|path, test| {
            if test.status == TestStatus::Fail {
                out.push(Failure {
                    path: path.to_vec(),
                    test,
                });
            }
        });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const REPORT: &str = r#"{
        "describes": [{
            "name": "Switch",
            "tests": [
                { "name": "renders role switch", "status": "pass" },
                { "name": "toggles on click", "status": "fail", "errors": ["expected true"] }
            ],
            "describes": [{
                "name": "keyboard",
                "tests": [
                    { "name": "space toggles", "status": "pass" },
                    { "name": "enter toggles", "status": "skip" }
                ]
            }]
        }]
    }"#;

    #[test]
    fn test_summary_counts_nested_tests() {
        let report = TestReport::from_json(REPORT).unwrap();
        let summary = report.summary();
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.status, SummaryStatus::Fail);
    }

    #[test]
    fn test_failures_carry_path() {
        let report = TestReport::from_json(REPORT).unwrap();
        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].title(), "Switch > toggles on click");
        assert_eq!(failures[0].test.errors, ["expected true"]);
    }

    #[test]
    fn test_empty_report_is_idle() {
        let report = TestReport::from_json("{}").unwrap();
        assert_eq!(report.summary().status, SummaryStatus::Idle);
    }

    #[test]
    fn test_all_skipped_is_idle() {
        let report = TestReport {
            tests: vec![TestCase {
                name: "later".into(),
                status: TestStatus::Skip,
                errors: Vec::new(),
                duration_ms: None,
            }],
            describes: Vec::new(),
        };
        assert_eq!(report.summary().status, SummaryStatus::Idle);
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!(TestReport::from_json(r#"{"tests":[{"name":"x","status":"todo"}]}"#).is_err());
    }

    proptest! {
        #[test]
        fn test_status_follows_counts(passed in 0usize..50, failed in 0usize..50, skipped in 0usize..5) {
            let summary = TestSummary::from_counts(passed, failed, skipped);
            prop_assert_eq!(summary.status == SummaryStatus::Pass, failed == 0 && passed > 0);
            prop_assert_eq!(summary.status == SummaryStatus::Fail, failed > 0);
            prop_assert_eq!(
                summary.status == SummaryStatus::Idle,
                failed == 0 && passed == 0
            );
        }
    }
}
