use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    // `\w` is Unicode-aware in the regex crate.
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s]").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","shan't","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Suffix rules, checked in order. The first matching suffix is removed and
/// no further rule is applied.
const SUFFIXES: &[&str] = &["ing", "ly", "ed", "ment", "ness", "s"];

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Crude suffix stripping. There is no minimum stem length, so `"ing"`
/// stems to the empty string.
pub fn stem(token: &str) -> String {
    for suffix in SUFFIXES {
        if let Some(stripped) = token.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    token.to_string()
}

/// Turn raw text into the normalized term stream: lowercase, punctuation
/// replaced by spaces, whitespace split, stopwords and single-character
/// tokens dropped, then stemmed.
pub fn normalize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = NON_WORD.replace_all(&lowered, " ");
    cleaned
        .split_whitespace()
        .filter(|token| !is_stopword(token) && token.chars().count() > 1)
        .map(stem)
        .collect()
}
