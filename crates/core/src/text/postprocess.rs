use once_cell::sync::Lazy;
use regex::Regex;

/// Punctuation that recognizers emit in long runs over noise.
const RUN_PUNCT: &[char] = &['!', '¡', '?', '¿', '.', ',', '…'];

/// Vowels covered by elongation cleanup, accented forms included.
const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u', 'á', 'é', 'í', 'ó', 'ú'];

/// A run of this many identical punctuation marks collapses to three.
const PUNCT_RUN_LIMIT: usize = 7;

/// A contiguous same-vowel run of this length collapses to an ellipsis.
const VOWEL_RUN_LIMIT: usize = 6;

/// Lines of only symbols at least this long are recognizer noise.
const SYMBOL_LINE_MIN_LEN: usize = 12;

/// Longer lines still count as noise when almost nothing alphanumeric
/// survives.
const SPARSE_LINE_MIN_LEN: usize = 25;

static ONLY_SYMBOLS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\W_]+$").expect("valid regex"));
static ALNUM_STRIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9ÁÉÍÓÚáéíóúÑñ]+").expect("valid regex"));
static SPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("valid regex"));
static BLANK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Clean a stitched transcript: collapse punctuation runs and phoneme
/// elongations, drop recognizer-artifact lines, cap immediate line repeats,
/// and tidy whitespace.
///
/// The repeat cap is always applied; it is the safety net against decoder
/// loops. It only ever suppresses *adjacent* exact repeats, so a chorus
/// recurring later in a song survives untouched.
pub fn postprocess(
    text: &str,
    clean_text: bool,
    normalize_elongations: bool,
    max_consecutive_repeats: usize,
) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut text = text.to_string();
    if clean_text {
        text = collapse_punct_runs(&text);
    }
    if normalize_elongations {
        text = collapse_hyphen_elongations(&text);
        text = collapse_vowel_runs(&text);
    }

    let mut lines = split_lines(&text);
    if clean_text {
        lines.retain(|line| !is_garbage_line(line));
    }
    let lines = limit_consecutive_repeats(&lines, max_consecutive_repeats);

    let out = lines.join("\n");
    let out = SPACE_RUN_RE.replace_all(&out, " ");
    let out = BLANK_RUN_RE.replace_all(&out, "\n\n");
    out.trim().to_string()
}

fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn is_vowel(c: char) -> bool {
    VOWELS.contains(&lower(c))
}

fn same_vowel(a: char, b: char) -> bool {
    is_vowel(a) && lower(a) == lower(b)
}

/// "!!!!!!!!" -> "!!!" (runs shorter than the limit pass through).
fn collapse_punct_runs(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if RUN_PUNCT.contains(&c) {
            let mut j = i;
            while j < chars.len() && chars[j] == c {
                j += 1;
            }
            let run = j - i;
            let emit = if run >= PUNCT_RUN_LIMIT { 3 } else { run };
            for _ in 0..emit {
                out.push(c);
            }
            i = j;
        } else {
            out.push(c);
            i += 1;
        }
    }
    out
}

/// "su-u-u-u" -> "su..." (two or more hyphen-separated repeats of the same
/// vowel, case-insensitive).
fn collapse_hyphen_elongations(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if is_vowel(c) {
            let mut reps = 0;
            while i + 2 + 2 * reps < chars.len()
                && chars[i + 1 + 2 * reps] == '-'
                && same_vowel(c, chars[i + 2 + 2 * reps])
            {
                reps += 1;
            }
            if reps >= 2 {
                out.push(c);
                out.push_str("...");
                i += 1 + 2 * reps;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }
    out
}

/// "soooooo" -> "so..." (six or more of the same vowel in a row,
/// case-insensitive).
fn collapse_vowel_runs(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if is_vowel(c) {
            let mut j = i;
            while j < chars.len() && same_vowel(c, chars[j]) {
                j += 1;
            }
            if j - i >= VOWEL_RUN_LIMIT {
                out.push(c);
                out.push_str("...");
            } else {
                out.extend(&chars[i..j]);
            }
            i = j;
        } else {
            out.push(c);
            i += 1;
        }
    }
    out
}

fn split_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(|line| line.trim().to_string())
        .collect()
}

fn is_garbage_line(line: &str) -> bool {
    if line.is_empty() {
        return false;
    }

    let len = line.chars().count();
    if len >= SYMBOL_LINE_MIN_LEN && ONLY_SYMBOLS_RE.is_match(line) {
        return true;
    }

    let alnum = ALNUM_STRIP_RE.replace_all(line, "");
    len >= SPARSE_LINE_MIN_LEN && alnum.chars().count() <= 1
}

/// Cap adjacent exact repeats of a line: occurrences are counted while they
/// stay adjacent, and emission stops once the count reaches the cap. A blank
/// line or any different line resets the count, so separated repeats are
/// never suppressed.
fn limit_consecutive_repeats(lines: &[String], max_repeat: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut prev: Option<&str> = None;
    let mut count = 0usize;

    for line in lines {
        if line.is_empty() {
            // Keep a single soft break and forget the previous line so a
            // repeated stanza after the break starts a fresh count
            if out.last().is_some_and(|last| !last.is_empty()) {
                out.push(String::new());
            }
            prev = None;
            count = 0;
            continue;
        }

        if prev == Some(line.as_str()) {
            count += 1;
        } else {
            prev = Some(line);
            count = 1;
        }

        if count < max_repeat {
            out.push(line.clone());
        }
    }

    out
}
