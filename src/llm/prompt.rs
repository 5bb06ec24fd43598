//! Grounded prompt composition.
//!
//! The prompt has four sections in a fixed order: the static instruction
//! block, `CONTEXT:` with one tagged entry per retrieved passage,
//! `USER QUERY:` with the transcribed question, and the `Answer:` cue.
//! [`clean_response`](crate::llm::clean_response) relies on these literal
//! markers to strip a prompt the model echoed back.

use crate::retrieval::ScoredPassage;

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

/// Citation and style rules prepended to every prompt.
pub const INSTRUCTION: &str = "\
You are an assistant who answers with reference to the Bhagavad Gita.

GUIDELINES:
1. Use only the verses provided in the CONTEXT.
   - Treat CONTEXT as the sole knowledge source.
   - Do not use outside knowledge or recall verses that are not listed.

2. Citations:
   - Whenever part of your answer draws on a verse, cite it inline in exactly this form: (id=N).
   - When several verses are relevant, cite each of them.

3. Quoting:
   - Keep direct quotes to a short phrase.
   - Prefer paraphrase and explanation over long verbatim passages.

4. Style:
   - Answer clearly in under 120 words.
   - Explain how each cited verse relates to the user's question.

5. Boundaries:
   - Never invent ids, chapters or verse numbers.
   - Only cite ids that appear in the CONTEXT.";

/// System message sent alongside the prompt to chat-style backends.
pub const SYSTEM_MESSAGE: &str =
    "You are an assistant that must answer using only the provided verses and cite them by id.";

// ---------------------------------------------------------------------------
// compose_prompt
// ---------------------------------------------------------------------------

/// Format one context entry: id and score header, trimmed text, delimiter.
pub fn context_entry(passage: &ScoredPassage) -> String {
    format!(
        "(id={}, score={:.4})\n{}\n---\n",
        passage.id,
        passage.score,
        passage.text.trim()
    )
}

/// Build the context block from `retrieved` in rank order.
///
/// Entries are joined by a newline. Accumulation stops before the first
/// entry that would push the block past `max_context_chars`; later entries
/// are dropped even if they would fit.
pub fn build_context(retrieved: &[ScoredPassage], max_context_chars: usize) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(retrieved.len());
    let mut total = 0usize;

    for passage in retrieved {
        let entry = context_entry(passage);
        let separator = usize::from(!parts.is_empty());
        let next = total + separator + entry.chars().count();
        if next > max_context_chars {
            break;
        }
        total = next;
        parts.push(entry);
    }

    parts.join("\n")
}

/// Compose the full prompt for `query` grounded on `retrieved`.
pub fn compose_prompt(
    query: &str,
    retrieved: &[ScoredPassage],
    max_context_chars: usize,
) -> String {
    let context = build_context(retrieved, max_context_chars);
    format!("{INSTRUCTION}\n\nCONTEXT:\n{context}\nUSER QUERY:\n{query}\n\nAnswer:")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
