use burrow_dns_domain::Question;
use std::collections::VecDeque;

/// The pending questions of one request. Seeded questions drain FIFO;
/// follow-up work can jump the line with `push_front`. One queue lives per
/// request, owned by the resolver pass that drains it.
#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: VecDeque<Question>,
}

impl TaskQueue {
    pub fn seed(questions: &[Question]) -> Self {
        Self {
            tasks: questions.iter().cloned().collect(),
        }
    }

    pub fn head(&self) -> Option<&Question> {
        self.tasks.front()
    }

    pub fn pop(&mut self) -> Option<Question> {
        self.tasks.pop_front()
    }

    pub fn push_front(&mut self, task: Question) {
        self.tasks.push_front(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_dns_domain::{DomainName, RecordClass, RecordType};

    fn task(name: &str, qtype: RecordType) -> Question {
        Question::new(name.parse::<DomainName>().unwrap(), qtype, RecordClass::IN)
    }

    #[test]
    fn seeded_questions_drain_in_order() {
        let mut queue = TaskQueue::seed(&[
            task("bupt.edu.cn", RecordType::A),
            task("mail.bupt.edu.cn", RecordType::MX),
        ]);

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().unwrap().qtype, RecordType::A);
        assert_eq!(queue.pop().unwrap().qtype, RecordType::MX);
        assert!(queue.is_empty());
    }

    #[test]
    fn push_front_takes_priority() {
        let mut queue = TaskQueue::seed(&[task("bupt.edu.cn", RecordType::A)]);
        queue.push_front(task("cn", RecordType::NS));

        assert_eq!(queue.head().unwrap().qtype, RecordType::NS);
        assert_eq!(queue.len(), 2);
        queue.pop();
        assert_eq!(queue.head().unwrap().qtype, RecordType::A);
    }
}
