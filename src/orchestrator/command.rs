//! 考生命令解析
//!
//! 把一行文本解析成作答命令，供命令行驱动使用

use anyhow::{anyhow, Result};
use regex::Regex;

use crate::infrastructure::IntegrityEvent;
use crate::models::{AnswerValue, Language, QuestionId, QuestionKind};

/// 作答命令
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptCommand {
    Start,
    Next,
    Previous,
    /// 跳转到第 N 题（从0开始）
    GoTo(usize),
    /// 写入答案；原始文本按题型转换
    Answer { question_id: QuestionId, raw: String },
    /// 更新当前编辑框
    Edit(String),
    /// 运行可见用例
    Run,
    /// 全量检测
    Check,
    /// 请求交卷（需要确认）
    Submit,
    Confirm,
    Cancel,
    Retry,
    SetLanguage(Language),
    /// 注入完整性事件
    Integrity(IntegrityEvent),
    Status,
}

pub struct CommandParser {
    line_re: Regex,
    answer_re: Regex,
}

impl CommandParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            line_re: Regex::new(r"^\s*(?P<cmd>!?[a-z]+)(?:\s+(?P<arg>.*?))?\s*$")?,
            answer_re: Regex::new(r"^(?P<id>-?\d+)\s+(?P<value>.*)$")?,
        })
    }

    /// 解析一行命令；空行返回 `Ok(None)`
    pub fn parse(&self, line: &str) -> Result<Option<AttemptCommand>> {
        if line.trim().is_empty() {
            return Ok(None);
        }

        let caps = self
            .line_re
            .captures(line)
            .ok_or_else(|| anyhow!("无法识别的命令: {}", line.trim()))?;
        let cmd = &caps["cmd"];
        let arg = caps.name("arg").map(|m| m.as_str()).unwrap_or("");

        let command = match cmd {
            "start" => AttemptCommand::Start,
            "next" | "n" => AttemptCommand::Next,
            "prev" | "p" => AttemptCommand::Previous,
            "goto" | "g" => {
                let number: usize = arg
                    .parse()
                    .map_err(|_| anyhow!("goto 需要题号 (从1开始): '{}'", arg))?;
                if number == 0 {
                    return Err(anyhow!("题号从1开始"));
                }
                AttemptCommand::GoTo(number - 1)
            }
            "answer" | "a" => {
                let caps = self
                    .answer_re
                    .captures(arg)
                    .ok_or_else(|| anyhow!("用法: answer <题目ID> <答案>"))?;
                AttemptCommand::Answer {
                    question_id: caps["id"].parse()?,
                    raw: caps["value"].to_string(),
                }
            }
            "edit" | "e" => AttemptCommand::Edit(unescape_editor_text(arg)),
            "run" => AttemptCommand::Run,
            "check" => AttemptCommand::Check,
            "submit" => AttemptCommand::Submit,
            "confirm" | "y" => AttemptCommand::Confirm,
            "cancel" => AttemptCommand::Cancel,
            "retry" => AttemptCommand::Retry,
            "lang" => AttemptCommand::SetLanguage(arg.parse()?),
            "status" | "s" => AttemptCommand::Status,
            "!tab" => AttemptCommand::Integrity(IntegrityEvent::VisibilityHidden),
            "!visible" => AttemptCommand::Integrity(IntegrityEvent::VisibilityVisible),
            "!fullscreen" => AttemptCommand::Integrity(IntegrityEvent::FullscreenExited),
            "!back" => AttemptCommand::Integrity(IntegrityEvent::HistoryNavigation),
            "!unload" => AttemptCommand::Integrity(IntegrityEvent::BeforeUnload),
            other => return Err(anyhow!("未知命令: {}", other)),
        };
        Ok(Some(command))
    }
}

/// 按题型把命令行文本转换成答案
///
/// 选择题用逗号分隔选项，编程题支持 `\n` 转义
pub fn answer_from_input(kind: QuestionKind, raw: &str) -> AnswerValue {
    match kind {
        QuestionKind::SingleChoice => AnswerValue::text(raw.trim()),
        QuestionKind::MultiChoice => AnswerValue::Selected(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        QuestionKind::FillBlank => AnswerValue::text(raw),
        QuestionKind::Coding => AnswerValue::Text(unescape_editor_text(raw)),
    }
}

fn unescape_editor_text(text: &str) -> String {
    text.replace("\\n", "\n").replace("\\t", "\t")
}
