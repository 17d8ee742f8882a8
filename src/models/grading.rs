use serde::{Deserialize, Serialize};

use crate::models::answer::AnswerValue;
use crate::models::contest::{deserialize_question_id, QuestionId, QuestionKind};
use crate::models::execution::{RunSummary, TestCaseResult};
use crate::models::Language;

/// 交卷载荷中的单题答案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionEntry {
    pub question_id: QuestionId,
    pub answer: AnswerValue,
}

/// 交卷载荷
///
/// 只上报切屏与退出全屏次数，导航次数仅在本地统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub submission: Vec<SubmissionEntry>,
    pub language: Language,
    #[serde(rename = "back_attempts")]
    pub tab_switch_count: u32,
    #[serde(rename = "fullscreen_attempts")]
    pub fullscreen_exit_count: u32,
}

/// 评分接口返回的单题结果
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionResult {
    #[serde(deserialize_with = "deserialize_question_id")]
    pub question_id: QuestionId,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub test_results: Option<Vec<TestCaseResult>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// 评分接口响应
#[derive(Debug, Clone, Deserialize)]
pub struct GradingResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub max_score: Option<u32>,
    #[serde(rename = "test_case_results", default)]
    pub results: Vec<QuestionResult>,
}

impl GradingResponse {
    /// 编程题用例的汇总；没有编程题结果时返回 `None`
    pub fn coding_summary(&self) -> Option<RunSummary> {
        self.results
            .iter()
            .filter(|r| r.kind == QuestionKind::Coding)
            .filter_map(|r| r.test_results.as_ref())
            .map(RunSummary::from_results)
            .reduce(RunSummary::merge)
    }
}

/// 交卷完成后的汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionReport {
    pub total_score: u32,
    pub max_score: u32,
    /// 只有竞赛包含编程题时才有
    pub coding: Option<RunSummary>,
}

impl CompletionReport {
    /// 交卷成功后展示给考生的文案
    pub fn message(&self) -> String {
        match self.coding {
            Some(summary) => format!("Test submitted!\nTotal Test Cases: {}", summary),
            None => "Test submitted successfully!".to_string(),
        }
    }
}
