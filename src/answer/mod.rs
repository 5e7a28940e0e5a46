
use crate::Result;
use crate::store::SearchResult;

/// Returned by a session asked a question before any document was added
pub const NO_DOCUMENTS_RESPONSE: &str = "No documents have been added yet.";

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions based on the provided context. \
If the answer cannot be found in the context, say so clearly.";

/// Produces an answer to a question from ranked context chunks
pub trait AnswerGenerator {
    fn generate_answer(&self, question: &str, context: &[SearchResult]) -> Result<String>;
}

impl<T: AnswerGenerator + ?Sized> AnswerGenerator for &T {
    #[inline]
    fn generate_answer(&self, question: &str, context: &[SearchResult]) -> Result<String> {
        (**self).generate_answer(question, context)
    }
}

/// An answer together with the chunks it was generated from
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<SearchResult>,
}

impl Answer {
    #[inline]
    pub fn no_documents() -> Self {
        Self {
            text: NO_DOCUMENTS_RESPONSE.to_string(),
            sources: Vec::new(),
        }
    }
}

/// Join chunk texts in rank order, separated by blank lines
#[inline]
pub fn compose_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| r.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[inline]
pub fn user_prompt(question: &str, context: &str) -> String {
    format!(
        "Context:\n{}\n\nQuestion: {}\n\nAnswer based on the context above:",
        context, question
    )
}
