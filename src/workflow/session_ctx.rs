//! 作答上下文
//!
//! 封装"我正在作答哪场竞赛"这一信息

use std::fmt::Display;

use crate::models::{ContestDefinition, Language};

/// 作答上下文
///
/// 只用于日志前缀，不参与任何状态判断
#[derive(Debug, Clone)]
pub struct SessionCtx {
    /// 竞赛ID
    pub contest_id: i64,

    /// 竞赛名称
    pub contest_name: String,

    /// 题目数量
    pub question_count: usize,

    /// 作答语言
    pub language: Language,
}

impl SessionCtx {
    pub fn new(contest: &ContestDefinition, language: Language) -> Self {
        Self {
            contest_id: contest.id,
            contest_name: contest.name.clone(),
            question_count: contest.questions.len(),
            language,
        }
    }
}

impl Display for SessionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[竞赛 ID#{} {} 题数#{} 语言#{}]",
            self.contest_id, self.contest_name, self.question_count, self.language
        )
    }
}
