//! Answer matching
//!
//! Guesses and aliases are both passed through [`normalize`] so that accents,
//! case and punctuation never decide the outcome. Similarity is an Indel
//! (insert/delete) ratio on a 0-100 scale, the same scale the close threshold
//! is expressed in.

use crate::types::Verdict;
use unicode_normalization::UnicodeNormalization;

/// Default score a guess must exceed to count as close
pub const CLOSE_THRESHOLD: u32 = 85;

/// Canonical form used for comparisons.
///
/// Accented letters are decomposed and reduced to their base letter, anything
/// outside `[a-z0-9 ]` is dropped and whitespace runs collapse to one space.
pub fn normalize(text: &str) -> String {
    let filtered: String = text
        .nfd()
        .filter(|c| c.is_ascii())
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Length of the longest common subsequence of two char slices
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

fn ratio_chars(a: &[char], b: &[char]) -> u32 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let total = (a.len() + b.len()) as f64;
    let score = 2.0 * lcs_len(a, b) as f64 / total * 100.0;
    score.round() as u32
}

/// Whole-string similarity (0-100)
pub fn ratio(a: &str, b: &str) -> u32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// Best similarity between the shorter string and any equal-length window of the longer one
pub fn partial_ratio(a: &str, b: &str) -> u32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return 0;
    }
    if short.len() == long.len() {
        return ratio_chars(&short, &long);
    }

    let mut best = 0;
    for window in long.windows(short.len()) {
        let score = ratio_chars(&short, window);
        if score > best {
            best = score;
            if best == 100 {
                break;
            }
        }
    }
    best
}

/// Score a normalized guess against one normalized answer.
///
/// The partial ratio only counts when the guess is shorter than the answer,
/// so a long guess that merely contains the answer is not rewarded.
pub fn score(guess: &str, answer: &str) -> u32 {
    let whole = ratio(guess, answer);
    if guess.chars().count() < answer.chars().count() {
        whole.max(partial_ratio(guess, answer))
    } else {
        whole
    }
}

/// Classify a normalized guess against normalized answers
pub fn classify<S: AsRef<str>>(guess: &str, answers: &[S], threshold: u32) -> Verdict {
    if answers.iter().any(|answer| answer.as_ref() == guess) {
        return Verdict::Correct;
    }

    let best = answers
        .iter()
        .map(|answer| score(guess, answer.as_ref()))
        .max()
        .unwrap_or(0);

    if best > threshold {
        Verdict::Close
    } else {
        Verdict::Wrong
    }
}

/// Title-case a display title: the first letter of every alphabetic run is
/// upper-cased, the rest lower-cased
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }

    out
}
