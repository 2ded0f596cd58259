use assistant::{Segment, TranscriptEntry, ToolInvocation};
use rag_store::RetrievedChunk;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct CreatedSession {
    pub id: String,
}

#[derive(Serialize)]
pub struct SessionTranscript {
    pub id: String,
    pub transcript: Vec<TranscriptEntry>,
}

#[derive(Serialize)]
pub struct ClosedSession {
    pub closed: String,
}

#[derive(Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Serialize)]
pub struct AskResponse {
    /// Raw answer, chart markup included.
    pub answer: String,
    /// `answer` split into text, chart and image parts for rendering.
    pub segments: Vec<Segment>,
    pub context: Vec<RetrievedChunk>,
    pub tools: Vec<ToolInvocation>,
}
