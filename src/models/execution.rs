use serde::{Deserialize, Serialize};

use crate::models::contest::TestCase;
use crate::models::Language;

/// 代码执行请求（运行与全量检测共用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub code: String,
    pub language: Language,
    pub test_cases: Vec<TestCase>,
    #[serde(rename = "time_limit")]
    pub time_limit_seconds: u32,
}

/// 单个用例的执行结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseResult {
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub expected_output: Option<String>,
    #[serde(rename = "output", default)]
    pub actual_output: Option<String>,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl TestCaseResult {
    /// 是否带有运行时错误（空字符串不算）
    pub fn has_error(&self) -> bool {
        self.error.as_deref().is_some_and(|e| !e.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionResponse {
    #[serde(default)]
    pub results: Vec<TestCaseResult>,
}

/// 用例通过情况汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub passed: usize,
    pub total: usize,
    pub errors: usize,
}

impl RunSummary {
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a TestCaseResult>) -> Self {
        results.into_iter().fold(Self::default(), |mut acc, result| {
            acc.total += 1;
            if result.passed {
                acc.passed += 1;
            }
            if result.has_error() {
                acc.errors += 1;
            }
            acc
        })
    }

    /// 全部通过（至少有一个用例）
    pub fn all_passed(&self) -> bool {
        self.total > 0 && self.passed == self.total
    }

    pub fn merge(self, other: RunSummary) -> Self {
        Self {
            passed: self.passed + other.passed,
            total: self.total + other.total,
            errors: self.errors + other.errors,
        }
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} passed", self.passed, self.total)?;
        if self.errors > 0 {
            write!(f, "\nErrors detected: {}", self.errors)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_response() {
        let body = r#"{"results": [
            {"input": "1", "output": "1", "expected_output": "1", "passed": true, "error": null},
            {"input": "2", "output": null, "expected_output": "4", "passed": false, "error": "Time limit exceeded"}
        ]}"#;
        let response: ExecutionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].actual_output.as_deref(), Some("1"));

        let summary = RunSummary::from_results(&response.results);
        assert_eq!(summary, RunSummary { passed: 1, total: 2, errors: 1 });
        assert!(!summary.all_passed());
        assert_eq!(summary.to_string(), "1/2 passed\nErrors detected: 1");
    }

    #[test]
    fn test_empty_summary_is_not_all_passed() {
        assert!(!RunSummary::default().all_passed());
    }

    #[test]
    fn test_request_uses_wire_field_names() {
        let request = ExecutionRequest {
            code: "print(1)".to_string(),
            language: Language::Python,
            test_cases: vec![TestCase::new("", "1")],
            time_limit_seconds: 2,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["time_limit"], 2);
        assert_eq!(value["language"], "python");
        assert_eq!(value["test_cases"][0]["output"], "1");
    }
}
