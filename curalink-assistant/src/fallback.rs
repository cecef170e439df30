//! Canned replies used when the remote model cannot answer.

pub const CONNECTION_TROUBLE: &str = "I'm having trouble connecting right now. Please try again.";
pub const PUBLICATION_SUMMARY_UNAVAILABLE: &str = "Summary not available at this time.";
pub const TRIAL_SUMMARY_UNAVAILABLE: &str = "Summary not available.";

const TRIALS_HINT: &str = "In the meantime, the Clinical Trials page lists recruiting studies you can filter by condition: try `curalink search <condition> --kind trials`.";
const EXPERTS_HINT: &str = "In the meantime, the Health Experts page lets you find specialists by name or specialty: try `curalink search <specialty> --kind researchers`.";
const PUBLICATIONS_HINT: &str = "In the meantime, the Publications page lists recent research: try `curalink search <topic> --kind publications`.";
const FORUM_HINT: &str = "In the meantime, the Forums page has community discussions: try `curalink forum list`.";
const FAVORITES_HINT: &str = "In the meantime, your saved items are on the Favorites page: try `curalink favorites`.";
const GENERAL_HINT: &str = "I can help you search for researchers, clinical trials, or publications. What specific area would you like to explore?";

/// Pick help text by keyword. Clinical trials win over the other topics.
pub fn chat_fallback(message: &str) -> String {
    let lower = message.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    let hint = if has(&["trial"]) {
        TRIALS_HINT
    } else if has(&["expert", "researcher", "doctor", "specialist"]) {
        EXPERTS_HINT
    } else if has(&["publication", "paper", "article", "research"]) {
        PUBLICATIONS_HINT
    } else if has(&["forum", "community", "discussion"]) {
        FORUM_HINT
    } else if has(&["favorite", "favourite", "saved", "save"]) {
        FAVORITES_HINT
    } else {
        GENERAL_HINT
    };
    format!("{CONNECTION_TROUBLE} {hint}")
}
