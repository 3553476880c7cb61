//! Agent System
//!
//! A single agent lives here: the document Q&A agent, which turns the
//! loaded document, the transcript and a new question into one model call.
//!
//! ```text
//! Question ──▶ validate ──▶ record user turn ──▶ prompt ──▶ LLM ──▶ record AI turn
//! ```

pub mod document_qa;

pub use document_qa::{ChatTurn, DocumentQaAgent, EMPTY_QUESTION_WARNING, NO_DOCUMENT_MESSAGE};
