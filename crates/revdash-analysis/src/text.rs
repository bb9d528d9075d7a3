//! Tokenization and word frequency counts.

use std::collections::HashMap;

use revdash_core::Review;

use crate::types::WordCount;

/// Tokens shorter than this (in characters) are dropped.
const MIN_TOKEN_CHARS: usize = 3;

/// English and Russian function words that carry no topic signal.
const STOP_WORDS: &[&str] = &[
    // English
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "has", "have", "his", "how", "its", "may", "new", "now", "see", "two",
    "who", "did", "get", "got", "let", "too", "use", "very", "just", "this", "that", "with",
    "from", "they", "them", "then", "than", "there", "their", "what", "when", "where", "which",
    "will", "would", "could", "should", "been", "being", "were", "into", "only", "also", "some",
    "more", "most", "much", "such", "here", "about", "after", "again", "app", "application",
    "because", "before", "even", "every", "over", "really", "still", "your", "yours", "it's",
    "don", "doesn", "didn", "can't", "i'm",
    // Russian
    "что", "это", "как", "так", "все", "всё", "она", "они", "оно", "его", "её", "ему", "ней",
    "нет", "был", "была", "было", "были", "быть", "есть", "для", "при", "без", "над", "под",
    "про", "или", "уже", "ещё", "еще", "только", "когда", "где", "там", "тут", "вот", "если",
    "чем", "чтобы", "мне", "меня", "мой", "моя", "мои", "вас", "вам", "наш", "ваш", "сам",
    "себя", "тоже", "также", "даже", "очень", "можно", "нужно", "надо", "просто", "потом",
    "после", "перед", "через", "этот", "эта", "эти", "того", "тот", "той", "том", "кто",
    "весь", "всех", "всем", "ведь", "будет", "раз",
    "приложение", "приложения", "приложении", "приложением",
];

/// Lowercases `text`, splits it on anything that is not a letter or digit,
/// and drops short tokens, digit-only tokens and stop words.
///
/// `ё` is folded to `е` so both spellings count as one word.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace('ё', "е")
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|token| token.trim_matches('\''))
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .filter(|token| !token.chars().all(|c| c.is_ascii_digit()))
        .filter(|token| !is_stop_word(token))
        .map(str::to_owned)
        .collect()
}

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS
        .iter()
        .any(|stop| stop.replace('ё', "е") == token)
}

/// Counts tokens across review titles and bodies.
///
/// Sorted by count descending, then word ascending; at most `top_n` entries.
#[must_use]
pub fn word_frequencies(reviews: &[Review], top_n: usize) -> Vec<WordCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for review in reviews {
        for token in tokenize(&review.full_text()) {
            *counts.entry(token).or_default() += 1;
        }
    }

    let mut words: Vec<WordCount> = counts
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .collect();
    words.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    words.truncate(top_n);
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::review;

    #[test]
    fn tokenize_lowercases_and_drops_noise() {
        let tokens = tokenize("The App CRASHES on login, 100% of the time!!");
        assert_eq!(tokens, ["crashes", "login", "time"]);
    }

    #[test]
    fn tokenize_handles_cyrillic_and_stop_words() {
        let tokens = tokenize("Приложение постоянно вылетает, и это очень раздражает");
        assert_eq!(tokens, ["постоянно", "вылетает", "раздражает"]);
    }

    #[test]
    fn tokenize_folds_yo() {
        assert_eq!(tokenize("Ещё ёлка"), ["елка"]);
    }

    #[test]
    fn tokenize_empty_text() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ... 42 !").is_empty());
    }

    #[test]
    fn frequencies_sort_by_count_then_word() {
        let reviews = vec![
            review("1", 1, Some("Реклама"), "реклама мешает, вылетает"),
            review("2", 2, None, "вылетает после обновления"),
            review("3", 5, None, "удобно"),
        ];
        let words = word_frequencies(&reviews, 3);
        assert_eq!(
            words,
            [
                WordCount {
                    word: "вылетает".to_owned(),
                    count: 2
                },
                WordCount {
                    word: "реклама".to_owned(),
                    count: 2
                },
                WordCount {
                    word: "мешает".to_owned(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn frequencies_of_nothing_is_empty() {
        assert!(word_frequencies(&[], 10).is_empty());
    }
}
