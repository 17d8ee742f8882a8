//! 答案缓冲 - 业务能力层
//!
//! 按题目ID保存当前答案，与计分、网络、计时都无关

use std::collections::HashMap;

use crate::error::{AppResult, SessionError};
use crate::models::{AnswerValue, ContestDefinition, QuestionId, QuestionKind};

#[derive(Debug, Clone)]
struct Slot {
    kind: QuestionKind,
    value: AnswerValue,
}

/// 答案缓冲
///
/// 创建时即为每道题放入该题型的空答案，"未作答"用空值表示而不是缺少键
#[derive(Debug, Clone)]
pub struct AnswerBuffer {
    slots: HashMap<QuestionId, Slot>,
}

impl AnswerBuffer {
    pub fn from_contest(contest: &ContestDefinition) -> Self {
        let slots = contest
            .questions
            .iter()
            .map(|q| {
                (
                    q.id,
                    Slot {
                        kind: q.kind,
                        value: q.empty_answer(),
                    },
                )
            })
            .collect();
        Self { slots }
    }

    /// 读取答案；未知题目返回 `None`
    pub fn get(&self, question_id: QuestionId) -> Option<&AnswerValue> {
        self.slots.get(&question_id).map(|slot| &slot.value)
    }

    /// 写入答案（覆盖旧值），返回值是否发生变化
    ///
    /// 单选题的文本会被包装成单元素列表
    pub fn set(&mut self, question_id: QuestionId, value: AnswerValue) -> AppResult<bool> {
        let slot = self
            .slots
            .get_mut(&question_id)
            .ok_or(SessionError::UnknownQuestion { question_id })?;

        let value = normalize(question_id, slot.kind, value)?;
        if slot.value == value {
            return Ok(false);
        }
        slot.value = value;
        Ok(true)
    }

    pub fn question_count(&self) -> usize {
        self.slots.len()
    }

    /// 已作答（非空）的题目数量
    pub fn answered_count(&self) -> usize {
        self.slots.values().filter(|slot| !slot.value.is_empty()).count()
    }
}

/// 按题型整理答案值
fn normalize(
    question_id: QuestionId,
    kind: QuestionKind,
    value: AnswerValue,
) -> AppResult<AnswerValue> {
    let mismatch = || SessionError::AnswerKindMismatch { question_id, kind };

    let normalized = match (kind, value) {
        (QuestionKind::SingleChoice, AnswerValue::Text(option)) => {
            if option.is_empty() {
                AnswerValue::Selected(Vec::new())
            } else {
                AnswerValue::Selected(vec![option])
            }
        }
        (QuestionKind::SingleChoice, AnswerValue::Selected(options)) if options.len() <= 1 => {
            AnswerValue::Selected(options)
        }
        (QuestionKind::MultiChoice, AnswerValue::Selected(options)) => {
            AnswerValue::Selected(options)
        }
        (QuestionKind::FillBlank | QuestionKind::Coding, AnswerValue::Text(text)) => {
            AnswerValue::Text(text)
        }
        _ => return Err(mismatch().into()),
    };
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Question;

    fn question(id: QuestionId, kind: QuestionKind) -> Question {
        Question {
            id,
            kind,
            description: format!("q{}", id),
            score: 1,
            options: vec!["A".to_string(), "B".to_string()],
            visible_test_cases: Vec::new(),
            invisible_test_cases: Vec::new(),
            time_limit_seconds: None,
            initial_code: None,
        }
    }

    fn buffer() -> AnswerBuffer {
        let contest = ContestDefinition {
            id: 1,
            name: "buffer".to_string(),
            duration_minutes: 10,
            time_remaining: None,
            questions: vec![
                question(1, QuestionKind::SingleChoice),
                question(2, QuestionKind::MultiChoice),
                question(3, QuestionKind::FillBlank),
                question(4, QuestionKind::Coding),
            ],
        };
        AnswerBuffer::from_contest(&contest)
    }

    #[test]
    fn test_every_question_has_an_empty_entry() {
        let buffer = buffer();
        assert_eq!(buffer.question_count(), 4);
        assert_eq!(buffer.get(1), Some(&AnswerValue::Selected(Vec::new())));
        assert_eq!(buffer.get(2), Some(&AnswerValue::Selected(Vec::new())));
        assert_eq!(buffer.get(3), Some(&AnswerValue::text("")));
        assert_eq!(buffer.get(4), Some(&AnswerValue::text("")));
        assert_eq!(buffer.get(99), None);
        assert_eq!(buffer.answered_count(), 0);
    }

    #[test]
    fn test_single_choice_is_wrapped_in_a_list() {
        let mut buffer = buffer();
        buffer.set(1, AnswerValue::text("A")).unwrap();
        assert_eq!(buffer.get(1), Some(&AnswerValue::selected(["A"])));

        buffer.set(1, AnswerValue::selected(["B"])).unwrap();
        assert_eq!(buffer.get(1), Some(&AnswerValue::selected(["B"])));

        assert!(buffer.set(1, AnswerValue::selected(["A", "B"])).is_err());
    }

    #[test]
    fn test_writes_are_idempotent() {
        let mut buffer = buffer();
        assert!(buffer.set(2, AnswerValue::selected(["A", "B"])).unwrap());
        assert!(!buffer.set(2, AnswerValue::selected(["A", "B"])).unwrap());
    }

    #[test]
    fn test_last_write_wins() {
        let mut buffer = buffer();
        for code in ["print(1)", "print(2)", "print(3)"] {
            buffer.set(4, AnswerValue::text(code)).unwrap();
        }
        assert_eq!(buffer.get(4), Some(&AnswerValue::text("print(3)")));
    }

    #[test]
    fn test_kind_mismatch_and_unknown_question() {
        let mut buffer = buffer();
        assert!(buffer.set(3, AnswerValue::selected(["A"])).is_err());
        assert!(buffer.set(2, AnswerValue::text("A")).is_err());
        assert!(buffer.set(42, AnswerValue::text("A")).is_err());
    }

    #[test]
    fn test_clearing_an_answer_stores_the_kind_empty_value() {
        let mut buffer = buffer();
        buffer.set(1, AnswerValue::text("A")).unwrap();
        buffer.set(3, AnswerValue::text("Paris")).unwrap();
        assert_eq!(buffer.answered_count(), 2);

        buffer.set(1, AnswerValue::text("")).unwrap();
        buffer.set(3, AnswerValue::text("")).unwrap();
        assert_eq!(buffer.get(1), Some(&AnswerValue::Selected(Vec::new())));
        assert_eq!(buffer.get(3), Some(&AnswerValue::text("")));
        assert_eq!(buffer.answered_count(), 0);
    }
}
