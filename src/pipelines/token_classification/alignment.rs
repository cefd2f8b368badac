use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::labels::{begin, inside, OUTSIDE};

lazy_static! {
    /// Runs of word characters, or single punctuation characters
    static ref WORD: Regex = Regex::new(r"\w+|[^\w\s]").expect("invalid word pattern");
}

/// A word from a raw log line, with its byte span in that line
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// The word text
    pub text: String,

    /// Byte offsets of the word within the original line
    pub span: Range<usize>,
}

/// Split text into words on whitespace and punctuation. Punctuation characters become words of
/// their own, whitespace is dropped.
pub fn pre_tokenize(text: &str) -> Vec<Word> {
    WORD.find_iter(text)
        .map(|m| Word {
            text: m.as_str().to_string(),
            span: m.range(),
        })
        .collect()
}

/// The outcome of aligning parsed field values against a raw line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alignment {
    /// One BIO label per word
    pub labels: Vec<String>,

    /// Fields whose value could not be located in the line
    pub misses: Vec<String>,
}

/// Derive per-word BIO labels by locating each field value as a contiguous run of words.
///
/// Values are matched longest first, and a value only matches words that no other field has
/// claimed yet, so spans never overlap. Empty values and values that can't be found are
/// reported as misses and leave the line untouched.
pub fn align<F, V>(words: &[Word], fields: &[(F, V)]) -> Alignment
where
    F: AsRef<str>,
    V: AsRef<str>,
{
    let mut owners: Vec<Option<usize>> = vec![None; words.len()];
    let mut misses = Vec::new();

    let values: Vec<Vec<Word>> = fields
        .iter()
        .map(|(_, value)| pre_tokenize(value.as_ref()))
        .collect();

    // Stable, so equal lengths keep their column order
    let mut order: Vec<usize> = (0..fields.len()).collect();
    order.sort_by(|a, b| values[*b].len().cmp(&values[*a].len()));

    for field in order {
        let needle = &values[field];

        match find_unclaimed(words, &owners, needle) {
            Some(start) => {
                for owner in &mut owners[start..start + needle.len()] {
                    *owner = Some(field);
                }
            }
            None => {
                let name = fields[field].0.as_ref();
                log::debug!("no match for field {} = {:?}", name, fields[field].1.as_ref());

                misses.push(name.to_string());
            }
        }
    }

    let mut labels = Vec::with_capacity(words.len());
    let mut previous = None;

    for owner in owners {
        let label = match owner {
            Some(field) if previous == Some(field) => inside(fields[field].0.as_ref()),
            Some(field) => begin(fields[field].0.as_ref()),
            None => OUTSIDE.to_string(),
        };

        labels.push(label);
        previous = owner;
    }

    Alignment { labels, misses }
}

/// Find the first start index where `needle` matches `words` and every matched word is unclaimed
fn find_unclaimed(words: &[Word], owners: &[Option<usize>], needle: &[Word]) -> Option<usize> {
    if needle.is_empty() || needle.len() > words.len() {
        return None;
    }

    (0..=words.len() - needle.len()).find(|&start| {
        let window = start..start + needle.len();

        owners[window.clone()].iter().all(Option::is_none)
            && words[window]
                .iter()
                .zip(needle)
                .all(|(word, expected)| word.text == expected.text)
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const LINE: &str = r#"127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326"#;

    fn texts(words: &[Word]) -> Vec<&str> {
        words.iter().map(|w| w.text.as_str()).collect()
    }

    #[test]
    fn test_pre_tokenize_splits_punctuation() {
        let words = pre_tokenize("GET /index.html HTTP/1.1");

        assert_eq!(
            texts(&words),
            vec!["GET", "/", "index", ".", "html", "HTTP", "/", "1", ".", "1"]
        );
    }

    #[test]
    fn test_pre_tokenize_keeps_spans() {
        let line = "  a-b  c";
        let words = pre_tokenize(line);

        let spans: Vec<_> = words.iter().map(|w| &line[w.span.clone()]).collect();

        assert_eq!(spans, vec!["a", "-", "b", "c"]);
        assert_eq!(words[3].span, 7..8);
    }

    #[test]
    fn test_pre_tokenize_empty() {
        assert!(pre_tokenize("   ").is_empty());
    }

    #[test]
    fn test_align_labels_fields() {
        let words = pre_tokenize(LINE);
        let fields = [
            ("client_ip", "127.0.0.1"),
            ("user", "frank"),
            ("method", "GET"),
            ("status", "200"),
            ("size", "2326"),
        ];

        let alignment = align(&words, &fields);

        assert!(alignment.misses.is_empty());
        assert_eq!(alignment.labels.len(), words.len());
        assert_eq!(
            alignment.labels[..8],
            [
                "B-CLIENT_IP",
                "I-CLIENT_IP",
                "I-CLIENT_IP",
                "I-CLIENT_IP",
                "I-CLIENT_IP",
                "I-CLIENT_IP",
                "I-CLIENT_IP",
                "O",
            ]
        );
        assert_eq!(alignment.labels[8], "B-USER");

        let status = texts(&words).iter().position(|w| *w == "200").unwrap();
        assert_eq!(alignment.labels[status], "B-STATUS");
        assert_eq!(alignment.labels[status + 1], "B-SIZE");
        assert_eq!(alignment.labels.last().unwrap(), "B-SIZE");
    }

    #[test]
    fn test_align_longest_value_claims_first() {
        // "10" appears inside the timestamp and again on its own at the end
        let words = pre_tokenize("[10/Oct/2000] 10");
        let fields = [("size", "10"), ("timestamp", "10/Oct/2000")];

        let alignment = align(&words, &fields);

        assert_eq!(
            alignment.labels,
            vec![
                "O",
                "B-TIMESTAMP",
                "I-TIMESTAMP",
                "I-TIMESTAMP",
                "I-TIMESTAMP",
                "I-TIMESTAMP",
                "O",
                "B-SIZE",
            ]
        );
    }

    #[test]
    fn test_align_repeated_value_takes_next_free_occurrence() {
        let words = pre_tokenize("- - -");
        let fields = [("ident", "-"), ("user", "-")];

        let alignment = align(&words, &fields);

        assert_eq!(alignment.labels, vec!["B-IDENT", "B-USER", "O"]);
    }

    #[test]
    fn test_align_reports_misses() {
        let words = pre_tokenize("GET / HTTP/1.1");
        let fields = [("method", "POST"), ("referrer", ""), ("protocol", "HTTP/1.1")];

        let alignment = align(&words, &fields);

        assert_eq!(alignment.misses, vec!["method", "referrer"]);
        assert_eq!(
            alignment.labels,
            vec!["O", "O", "B-PROTOCOL", "I-PROTOCOL", "I-PROTOCOL", "I-PROTOCOL", "I-PROTOCOL"]
        );
    }

    #[test]
    fn test_align_adjacent_fields_of_same_name_start_new_spans() {
        let words = pre_tokenize("a b");
        let fields = [("x", "a"), ("x", "b")];

        let alignment = align(&words, &fields);

        // Different columns with the same name still get separate spans
        assert_eq!(alignment.labels, vec!["B-X", "B-X"]);
    }
}
