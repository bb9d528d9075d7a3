//! Lexicon scorer for app review sentiment.

/// Word weights for English and Russian app reviews.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative. The final score is clamped to `[-1.0, 1.0]`.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // Positive, English
    ("great", 0.4),
    ("good", 0.3),
    ("excellent", 0.5),
    ("love", 0.5),
    ("best", 0.5),
    ("recommend", 0.4),
    ("convenient", 0.4),
    ("fast", 0.3),
    ("easy", 0.3),
    ("perfect", 0.5),
    ("awesome", 0.5),
    ("thanks", 0.3),
    // Positive, Russian
    ("отлично", 0.5),
    ("отличное", 0.5),
    ("отличный", 0.5),
    ("хорошо", 0.3),
    ("хорошее", 0.3),
    ("хороший", 0.3),
    ("супер", 0.5),
    ("удобно", 0.4),
    ("удобное", 0.4),
    ("удобный", 0.4),
    ("быстро", 0.3),
    ("спасибо", 0.3),
    ("нравится", 0.4),
    ("рекомендую", 0.4),
    ("лучшее", 0.5),
    ("лучший", 0.5),
    ("класс", 0.4),
    // Negative, English
    ("bad", -0.4),
    ("terrible", -0.6),
    ("worst", -0.6),
    ("awful", -0.6),
    ("useless", -0.6),
    ("crash", -0.5),
    ("crashes", -0.5),
    ("bug", -0.4),
    ("bugs", -0.4),
    ("slow", -0.3),
    ("broken", -0.5),
    ("scam", -0.7),
    ("refund", -0.4),
    // Negative, Russian
    ("плохо", -0.4),
    ("плохое", -0.4),
    ("ужасно", -0.6),
    ("ужасное", -0.6),
    ("отвратительно", -0.7),
    ("худшее", -0.6),
    ("вылетает", -0.5),
    ("глючит", -0.5),
    ("тормозит", -0.4),
    ("ошибка", -0.3),
    ("ошибки", -0.3),
    ("бесполезное", -0.6),
    ("невозможно", -0.4),
    ("мошенники", -0.7),
    ("удалил", -0.5),
    ("разочарован", -0.5),
];

/// Score a text string using the review lexicon.
///
/// Splits text into lowercase words, sums matching weights, and clamps
/// the result to `[-1.0, 1.0]`. Returns `0.0` for empty or unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f32 {
    let mut score = 0.0_f32;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase()
            .replace('ё', "е");
        for &(lex_word, weight) in LEXICON {
            if w == lex_word {
                score += weight;
                break;
            }
        }
    }
    score.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_returns_zero() {
        assert_eq!(lexicon_score(""), 0.0);
    }

    #[test]
    fn unknown_text_returns_zero() {
        assert_eq!(lexicon_score("the quick brown fox"), 0.0);
    }

    #[test]
    fn positive_keyword_returns_positive() {
        let score = lexicon_score("Очень удобно, спасибо");
        assert!(score > 0.0, "expected positive score, got {score}");
    }

    #[test]
    fn negative_keyword_returns_negative() {
        let score = lexicon_score("Постоянно вылетает");
        assert!(score < 0.0, "expected negative score, got {score}");
    }

    #[test]
    fn mixed_text_returns_intermediate() {
        // good (+0.3) + crashes (-0.5) = -0.2
        let score = lexicon_score("good idea but it crashes");
        assert!((score + 0.2).abs() < 1e-6, "expected -0.2, got {score}");
    }

    #[test]
    fn score_clamps_to_positive_one() {
        let score = lexicon_score("отлично супер лучшее рекомендую perfect awesome");
        assert_eq!(score, 1.0, "expected score clamped to 1.0, got {score}");
    }

    #[test]
    fn score_clamps_to_negative_one() {
        let score = lexicon_score("ужасно отвратительно мошенники worst scam");
        assert_eq!(score, -1.0, "expected score clamped to -1.0, got {score}");
    }

    #[test]
    fn punctuation_and_case_are_ignored() {
        let score = lexicon_score("ОТЛИЧНО!!!");
        assert!(score > 0.0, "expected positive score, got {score}");
    }
}
