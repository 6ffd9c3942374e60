// Shared prompt fragments used by more than one caller of the LLM client.
// Feature-specific prompts live in screening/prompts.rs.

/// System prompt for retrieval-grounded answers.
pub const GROUNDED_QA_SYSTEM: &str = "You are a careful recruitment assistant. \
    Answer using only the resume excerpts you are given. \
    If the excerpts do not contain the answer, say that you don't know.";

/// Template that "stuffs" retrieved passages ahead of the question.
/// Replace `{context}` and `{question}` before sending.
pub const GROUNDED_QA_TEMPLATE: &str = "Use the following pieces of context to answer the question at the end.\n\n\
    {context}\n\n\
    Question: {question}\n\
    Helpful Answer:";

/// Builds the grounded QA prompt from retrieved passages.
pub fn grounded_qa_prompt(passages: &[&str], question: &str) -> String {
    GROUNDED_QA_TEMPLATE
        .replace("{context}", &passages.join("\n\n"))
        .replace("{question}", question)
}
