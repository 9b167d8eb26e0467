use std::io::Write;

use mtb_tracking::{AnswerPayload, AnswerSink, SinkError};

/// Writes each payload as one JSON document per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> AnswerSink for JsonLinesSink<W> {
    fn set_answer(&mut self, payload: &AnswerPayload) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, payload)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
