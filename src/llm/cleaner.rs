//! Post-processing of generated answers for speech.
//!
//! [`clean_response`] strips citation tokens, emphasis markers and any echoed
//! prompt scaffolding, then normalises whitespace. The raw answer is kept
//! separately by the caller for display.

use std::sync::LazyLock;

use regex::Regex;

static BRACKET_CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[id=\s*\d+\s*\]").expect("valid regex"));

static PAREN_CITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\(id=\s*\d+(?:\s*,\s*score\s*=\s*[-+]?\d*\.?\d+)?\s*\)").expect("valid regex")
});

static BARE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bid\s*=\s*\d+\b").expect("valid regex"));

static EMPTY_BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\s*\]").expect("valid regex"));

static EMPTY_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*\)").expect("valid regex"));

static MANY_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

static MANY_BLANKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("valid regex"));

/// Prompt scaffolding a model sometimes parrots back before answering.
static ECHOED_PROMPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)CONTEXT:.*USER QUERY:.*Answer:").expect("valid regex"));

/// One pass of every normalisation, in order.
fn clean_once(text: &str) -> String {
    let s = BRACKET_CITATION.replace_all(text, " ");
    let s = PAREN_CITATION.replace_all(&s, " ");
    let s = BARE_ID.replace_all(&s, " ");
    let s = EMPTY_BRACKETS.replace_all(&s, " ");
    let s = EMPTY_PARENS.replace_all(&s, " ");
    let s = s.replace('*', " ");
    let s = MANY_NEWLINES.replace_all(&s, "\n\n");
    let s = MANY_BLANKS.replace_all(&s, " ");
    let s = ECHOED_PROMPT.replace_all(s.trim(), "");
    s.trim().to_string()
}

/// Produce speech-ready text from a raw model answer.
///
/// Idempotent: passes are repeated until the text stops changing, so
/// removing one token can never leave another behind. Every pass that
/// changes the text shortens it or removes an asterisk, so the loop ends.
pub fn clean_response(raw: &str) -> String {
    let mut current = clean_once(raw);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_citations_and_emphasis() {
        let raw = "Action (id=12, score=0.8421) matters. *Do* it. [id=7]";
        assert_eq!(clean_response(raw), "Action matters. Do it.");
    }

    #[test]
    fn strips_each_citation_form() {
        assert_eq!(clean_response("Act [id=3] now."), "Act now.");
        assert_eq!(clean_response("Act [id= 3 ] now."), "Act now.");
        assert_eq!(clean_response("Act (id=3) now."), "Act now.");
        assert_eq!(clean_response("Act (ID=3, Score=-0.5) now."), "Act now.");
        assert_eq!(clean_response("Act (id=3, score=.75) now."), "Act now.");
        assert_eq!(clean_response("Act id=3 now."), "Act now.");
        assert_eq!(clean_response("Act id = 3 now."), "Act now.");
    }

    #[test]
    fn removes_emptied_brackets() {
        assert_eq!(clean_response("See (id=4, id=5) here."), "See ( , ) here.");
        assert_eq!(clean_response("See [ ] and ( ) here."), "See and here.");
        assert_eq!(clean_response("See ([id=2]) here."), "See here.");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(
            clean_response("  First line.\n\n\n\nSecond\t\t line.  "),
            "First line.\n\nSecond line."
        );
    }

    #[test]
    fn removes_echoed_prompt_scaffolding() {
        let raw = "Some preamble\nCONTEXT:\n(id=1, score=0.9)\nverse\n---\nUSER QUERY:\nwhat?\n\nAnswer: Be steady.";
        assert_eq!(clean_response(raw), "Some preamble\n Be steady.");
    }

    #[test]
    fn scaffolding_match_is_case_insensitive() {
        assert_eq!(
            clean_response("context: x user query: y answer: Act calmly."),
            "Act calmly."
        );
    }

    #[test]
    fn leaves_plain_text_alone() {
        let text = "Perform your duty without attachment to results.";
        assert_eq!(clean_response(text), text);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(clean_response(""), "");
        assert_eq!(clean_response("   "), "");
    }

    #[test]
    fn word_containing_id_is_kept() {
        assert_eq!(clean_response("Avoid=3 doubts."), "Avoid=3 doubts.");
    }

    #[test]
    fn is_idempotent() {
        let samples = [
            "Action (id=12, score=0.8421) matters. *Do* it. [id=7]",
            "a CONTEXT: b USER QUERY: c Answer:  d",
            "x (id=[id=3]) y",
            "(id=1) (id=2)\n\n\n\n**bold** id=3",
            "[(id=9)]   tail\t\t",
            "lead  CONTEXT: c USER QUERY: q Answer:(id=4)  trail",
            "nested ((id=1)) and [[id=2]]",
            "",
        ];
        for raw in samples {
            let once = clean_response(raw);
            assert_eq!(clean_response(&once), once, "not idempotent for {raw:?}");
        }
    }
}
