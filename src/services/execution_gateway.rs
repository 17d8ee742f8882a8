//! 代码执行网关 - 业务能力层
//!
//! 只负责"把一道编程题的代码送去执行并解释结果"，不修改会话状态

use std::sync::Arc;

use tracing::{debug, info};

use crate::clients::CodeExecutionApi;
use crate::error::{AppResult, SessionError};
use crate::models::{
    ExecutionRequest, Language, Question, QuestionId, RunSummary, TestCase, TestCaseResult,
};

/// 执行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    /// 只跑可见用例，不计分
    Run,
    /// 可见 + 隐藏用例，给出临时分数
    SubmitCheck,
}

impl std::fmt::Display for CheckMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckMode::Run => write!(f, "运行"),
            CheckMode::SubmitCheck => write!(f, "全量检测"),
        }
    }
}

/// 一次执行的结果
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    pub mode: CheckMode,
    pub question_id: QuestionId,
    pub results: Vec<TestCaseResult>,
    pub summary: RunSummary,
    /// 只有全量检测才有
    pub provisional_score: Option<u32>,
    /// 题目满分
    pub max_score: u32,
}

impl ExecutionOutcome {
    /// 展示给考生的结果文案
    pub fn message(&self) -> String {
        match self.mode {
            CheckMode::Run => format!("Visible Test Cases: {}", self.summary),
            CheckMode::SubmitCheck => format!(
                "Test Cases: {}\nScore for this question: {}/{}",
                self.summary,
                self.provisional_score.unwrap_or(0),
                self.max_score
            ),
        }
    }
}

/// 全对得满分，否则 0 分；没有任何结果时为 0 分
pub fn provisional_score(question: &Question, results: &[TestCaseResult]) -> u32 {
    if !results.is_empty() && results.iter().all(|r| r.passed) {
        question.score
    } else {
        0
    }
}

/// 代码执行网关
///
/// 职责：
/// - 按模式挑选用例集合
/// - 计算通过汇总与临时分数
/// - 执行失败原样返回错误，由调用方决定如何提示
#[derive(Clone)]
pub struct CodeExecutionGateway {
    api: Arc<dyn CodeExecutionApi>,
}

impl CodeExecutionGateway {
    pub fn new(api: Arc<dyn CodeExecutionApi>) -> Self {
        Self { api }
    }

    /// 用可见用例运行代码
    pub async fn run(
        &self,
        question: &Question,
        code: &str,
        language: Language,
    ) -> AppResult<ExecutionOutcome> {
        self.execute(CheckMode::Run, question, code, language).await
    }

    /// 用全部用例检测代码并给出临时分数
    pub async fn submit_check(
        &self,
        question: &Question,
        code: &str,
        language: Language,
    ) -> AppResult<ExecutionOutcome> {
        self.execute(CheckMode::SubmitCheck, question, code, language)
            .await
    }

    async fn execute(
        &self,
        mode: CheckMode,
        question: &Question,
        code: &str,
        language: Language,
    ) -> AppResult<ExecutionOutcome> {
        if !question.is_coding() {
            return Err(SessionError::NotCodingQuestion {
                question_id: question.id,
            }
            .into());
        }

        let test_cases: Vec<TestCase> = match mode {
            CheckMode::Run => question.visible_test_cases.clone(),
            CheckMode::SubmitCheck => question.all_test_cases(),
        };

        debug!(
            "[题目 {}] {}: {} 个用例",
            question.id,
            mode,
            test_cases.len()
        );

        let request = ExecutionRequest {
            code: code.to_string(),
            language,
            test_cases,
            time_limit_seconds: question.time_limit(),
        };
        let results = self.api.execute(&request).await?;
        let summary = RunSummary::from_results(&results);

        let provisional_score = match mode {
            CheckMode::Run => None,
            CheckMode::SubmitCheck => Some(provisional_score(question, &results)),
        };

        info!("[题目 {}] {}完成: {}", question.id, mode, summary);

        Ok(ExecutionOutcome {
            mode,
            question_id: question.id,
            results,
            summary,
            provisional_score,
            max_score: question.score,
        })
    }
}
