/// Substitution point for the numbered word list inside a prompt template.
pub const WORDS_LIST_PLACEHOLDER: &str = "{words_list}";

pub const DEFAULT_PROMPT_TEMPLATE: &str = r#"Per ognuna delle seguenti parole italiane, dimmi se appartiene a una di queste categorie:
- Un verbo all'infinito
- Una coniugazione verbale
- Un nome proprio di persona
- Una parola arcaica non più usata

Lista parole:
{words_list}

Rispondi SOLO con "true" o "false" (uno per riga) SOLO SE SEI SICURO AL 100%, NESSUNA altra parola.
Esempio:
true
false
true"#;

/// Render a batch as a numbered list, one word per line, 1-based.
///
/// The numbering anchors each response line to its word so the model
/// answers in order.
pub fn render_word_list(words: &[String]) -> String {
    words
        .iter()
        .enumerate()
        .map(|(i, word)| format!("{}. {}", i + 1, word))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the classification prompt for a batch by substituting the
/// numbered word list into the template.
pub fn build_batch_prompt(template: &str, words: &[String]) -> String {
    template.replace(WORDS_LIST_PLACEHOLDER, &render_word_list(words))
}
