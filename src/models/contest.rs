use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AppResult, SessionError};
use crate::models::answer::AnswerValue;

/// 题目ID（竞赛内唯一）
pub type QuestionId = i64;

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionKind {
    /// 单选
    #[serde(rename = "mcq")]
    SingleChoice,
    /// 多选
    #[serde(rename = "msq")]
    MultiChoice,
    /// 填空
    #[serde(rename = "blank")]
    FillBlank,
    /// 编程
    #[serde(rename = "coding")]
    Coding,
}

impl QuestionKind {
    /// 接口中使用的题型代码
    pub fn code(self) -> &'static str {
        match self {
            QuestionKind::SingleChoice => "mcq",
            QuestionKind::MultiChoice => "msq",
            QuestionKind::FillBlank => "blank",
            QuestionKind::Coding => "coding",
        }
    }

    /// 该题型"未作答"时的答案值
    pub fn empty_answer(self) -> AnswerValue {
        match self {
            QuestionKind::SingleChoice | QuestionKind::MultiChoice => AnswerValue::Selected(Vec::new()),
            QuestionKind::FillBlank | QuestionKind::Coding => AnswerValue::Text(String::new()),
        }
    }

    /// 是否有可编辑的文本输入区（填空框 / 代码编辑器）
    pub fn has_editor(self) -> bool {
        matches!(self, QuestionKind::FillBlank | QuestionKind::Coding)
    }
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// 编程题测试用例
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    #[serde(rename = "output")]
    pub expected_output: String,
}

impl TestCase {
    pub fn new(input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected_output: expected_output.into(),
        }
    }
}

/// 题目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub description: String,
    /// 满分（只有完全正确才得分）
    pub score: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub visible_test_cases: Vec<TestCase>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub invisible_test_cases: Vec<TestCase>,
    #[serde(default)]
    pub time_limit_seconds: Option<u32>,
    #[serde(default)]
    pub initial_code: Option<String>,
}

impl Question {
    /// 运行时限，缺省为 1 秒
    pub fn time_limit(&self) -> u32 {
        self.time_limit_seconds.filter(|s| *s > 0).unwrap_or(1)
    }

    /// 可见 + 隐藏的全部用例
    pub fn all_test_cases(&self) -> Vec<TestCase> {
        self.visible_test_cases
            .iter()
            .chain(self.invisible_test_cases.iter())
            .cloned()
            .collect()
    }

    /// 该题的初始答案；编程题带上起始代码
    pub fn empty_answer(&self) -> AnswerValue {
        match (self.kind, &self.initial_code) {
            (QuestionKind::Coding, Some(code)) => AnswerValue::Text(code.clone()),
            (kind, _) => kind.empty_answer(),
        }
    }

    pub fn is_coding(&self) -> bool {
        self.kind == QuestionKind::Coding
    }
}

/// 竞赛定义（加载后不可变）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContestDefinition {
    pub id: i64,
    pub name: String,
    pub duration_minutes: u32,
    /// 服务端计算的剩余秒数（用于恢复作答）
    #[serde(default)]
    pub time_remaining: Option<u64>,
    pub questions: Vec<Question>,
}

impl ContestDefinition {
    pub fn duration_seconds(&self) -> u64 {
        u64::from(self.duration_minutes) * 60
    }

    pub fn question(&self, question_id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn has_coding_questions(&self) -> bool {
        self.questions.iter().any(Question::is_coding)
    }

    pub fn max_score(&self) -> u32 {
        self.questions.iter().map(|q| q.score).sum()
    }

    /// 校验会话能依赖的最基本约束
    pub fn validate(&self) -> AppResult<()> {
        let invalid = |reason: String| SessionError::InvalidContest { reason };

        if self.duration_minutes == 0 {
            return Err(invalid("duration_minutes 必须为正数".to_string()).into());
        }
        if self.questions.is_empty() {
            return Err(invalid("竞赛没有任何题目".to_string()).into());
        }

        let mut seen = HashSet::new();
        for question in &self.questions {
            if !seen.insert(question.id) {
                return Err(invalid(format!("题目ID {} 重复", question.id)).into());
            }
            if question.score == 0 {
                return Err(invalid(format!("题目 {} 的分值必须为正数", question.id)).into());
            }
        }
        Ok(())
    }
}

/// 把 JSON 中的 `null` 当作默认值处理
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 题目ID 既可能是字符串也可能是整数（评分接口返回字符串）
pub(crate) fn deserialize_question_id<'de, D>(deserializer: D) -> Result<QuestionId, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct QuestionIdVisitor;

    impl<'de> Visitor<'de> for QuestionIdVisitor {
        type Value = QuestionId;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer question id")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            value.trim().parse().map_err(E::custom)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            QuestionId::try_from(value).map_err(E::custom)
        }
    }

    deserializer.deserialize_any(QuestionIdVisitor)
}
