//! Wave-based concurrent processing of chunks
//!
//! - **answer**: the `AnswerOperation` boundary and closure adapters
//! - **confidence**: reads a confidence score out of an answer payload
//! - **scheduler**: wave dispatch, barrier and early termination

pub mod answer;
pub mod confidence;
pub mod scheduler;

pub use answer::{answer_fn, AnswerFn, AnswerOperation, AnswerRequest, BlockingAnswer, ChunkMetadata};
pub use confidence::{extract_confidence, PayloadShape, CONFIDENCE_FIELDS};
pub use scheduler::{truncate_chars, WavePolicy, WaveScheduler, ANSWER_CONTENT_LIMIT};
