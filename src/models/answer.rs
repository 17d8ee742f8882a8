use serde::{Deserialize, Serialize};

/// 单题答案
///
/// 选择题是已选选项列表；填空与编程题是文本（编程题为源代码）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Selected(Vec<String>),
    Text(String),
}

impl AnswerValue {
    pub fn selected<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AnswerValue::Selected(options.into_iter().map(Into::into).collect())
    }

    pub fn text(value: impl Into<String>) -> Self {
        AnswerValue::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Selected(options) => options.is_empty(),
            AnswerValue::Text(text) => text.trim().is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(text) => Some(text),
            AnswerValue::Selected(_) => None,
        }
    }
}

impl std::fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnswerValue::Selected(options) => write!(f, "[{}]", options.join(", ")),
            AnswerValue::Text(text) => write!(f, "{}", text),
        }
    }
}
