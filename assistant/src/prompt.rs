//! Prompt assembly: fixed instruction + retrieved context + question.

use rag_store::RetrievedChunk;

/// Fixed instruction placed ahead of the context and question.
pub const FINANCIAL_EXPERT_PROMPT: &str = "You are FinWise, an expert financial advisor with deep knowledge of investing, \
financial markets, and personal finance. Your goal is to help users make informed financial decisions.

When responding to questions:
1. Provide clear, accurate financial information
2. Explain complex financial concepts in simple terms
3. Consider the user's best interests and financial well-being
4. Acknowledge the limitations of your advice (you're not a licensed financial advisor)
5. Focus on educational content rather than specific investment recommendations
6. When discussing investments, explain risks, potential returns, and time horizons
7. For Indian users, be aware of the specific financial products, regulations, and market conditions in India
8. Maintain context from previous messages when answering follow-up questions
9. For visualizations and data analysis:
   - Remember previously used data and charts
   - If modifying a previous visualization, use the same data unless new data is provided
   - Keep track of columns and data structures used before

Remember that financial literacy levels vary widely, so tailor your responses to be accessible \
while remaining informative and accurate. Data can come in any format; convert it to CSV when \
you pass it to the chart tool.";

/// Chunk texts in retrieval order, blank-line separated. No reranking,
/// deduplication or truncation.
pub fn render_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_prompt(question: &str, chunks: &[RetrievedChunk]) -> String {
    format!(
        "{FINANCIAL_EXPERT_PROMPT}\n\nUse the following context to inform your response:\n{}\n\nQuestion: {question}\n\nHelpful Answer:",
        render_context(chunks)
    )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn chunk(text: &str) -> RetrievedChunk {
        RetrievedChunk {
            text: text.into(),
            metadata: BTreeMap::new(),
            score: 0.5,
        }
    }

    #[test]
    fn context_keeps_retrieval_order() {
        let p = build_prompt("How much on rent?", &[chunk("Category: Rent"), chunk("Category: Fun")]);
        let rent = p.find("Category: Rent").unwrap();
        let fun = p.find("Category: Fun").unwrap();
        assert!(rent < fun);
        assert!(p.contains("Question: How much on rent?"));
        assert!(p.ends_with("Helpful Answer:"));
    }

    #[test]
    fn empty_context_still_builds() {
        let p = build_prompt("What is an SIP?", &[]);
        assert!(p.contains("inform your response:\n\n\nQuestion: What is an SIP?"));
    }

    #[test]
    fn placeholders_in_chunks_are_not_expanded() {
        let p = build_prompt("q", &[chunk("literal {question} text")]);
        assert!(p.contains("literal {question} text"));
        assert!(p.contains("Question: q"));
    }
}
