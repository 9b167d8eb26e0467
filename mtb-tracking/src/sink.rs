use crate::error::SinkError;
use crate::snapshot::AnswerPayload;

/// Receiver of answer snapshots. Errors go back to the caller untouched;
/// there is no retry here.
pub trait AnswerSink {
    fn set_answer(&mut self, payload: &AnswerPayload) -> Result<(), SinkError>;
}

impl<S: AnswerSink + ?Sized> AnswerSink for &mut S {
    fn set_answer(&mut self, payload: &AnswerPayload) -> Result<(), SinkError> {
        (**self).set_answer(payload)
    }
}

/// Keeps every payload it receives.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    payloads: Vec<AnswerPayload>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn payloads(&self) -> &[AnswerPayload] {
        &self.payloads
    }

    pub fn last(&self) -> Option<&AnswerPayload> {
        self.payloads.last()
    }
}

impl AnswerSink for MemorySink {
    fn set_answer(&mut self, payload: &AnswerPayload) -> Result<(), SinkError> {
        self.payloads.push(payload.clone());
        Ok(())
    }
}
