/// A chunk of consecutive tokens that share an entity type
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    /// The entity type, e.g. `STATUS` for `B-STATUS`/`I-STATUS`
    pub kind: String,

    /// Index of the first token
    pub start: usize,

    /// Index of the last token, inclusive
    pub end: usize,
}

/// Split a tag into its single-character prefix and its type. `O` has the type `_`.
fn split_tag(tag: &str) -> (char, &str) {
    let mut chars = tag.chars();
    let prefix = chars.next().unwrap_or('O');
    let rest = chars.as_str();

    let kind = rest.split_once('-').map_or(rest, |(_, kind)| kind);
    let kind = if kind.is_empty() { "_" } else { kind };

    (prefix, kind)
}

/// Whether the chunk that was open at the previous token ends before the current one
fn end_of_chunk(prev_tag: char, tag: char, prev_kind: &str, kind: &str) -> bool {
    match (prev_tag, tag) {
        ('E', _) | ('S', _) => true,
        ('B', 'B') | ('B', 'S') | ('B', 'O') => true,
        ('I', 'B') | ('I', 'S') | ('I', 'O') => true,
        _ => prev_tag != 'O' && prev_tag != '.' && prev_kind != kind,
    }
}

/// Whether a new chunk starts at the current token
fn start_of_chunk(prev_tag: char, tag: char, prev_kind: &str, kind: &str) -> bool {
    match (prev_tag, tag) {
        (_, 'B') | (_, 'S') => true,
        ('E', 'E') | ('E', 'I') => true,
        ('S', 'E') | ('S', 'I') => true,
        ('O', 'E') | ('O', 'I') => true,
        _ => tag != 'O' && tag != '.' && prev_kind != kind,
    }
}

/// Extract entity chunks from a tag sequence.
///
/// Uses lenient IOB2 chunking: a chunk is closed by `O`, by a new `B-`, or by a change of type,
/// and a stray `I-X` opens a chunk of its own.
pub fn get_entities<S: AsRef<str>>(tags: &[S]) -> Vec<Entity> {
    let mut entities = Vec::new();

    let mut prev_tag = 'O';
    let mut prev_kind = String::from("_");
    let mut begin = 0;

    let sentinel = std::iter::once("O");

    for (index, tag) in tags.iter().map(|t| t.as_ref()).chain(sentinel).enumerate() {
        let (tag, kind) = split_tag(tag);

        if end_of_chunk(prev_tag, tag, &prev_kind, kind) {
            entities.push(Entity {
                kind: prev_kind.clone(),
                start: begin,
                end: index - 1,
            });
        }

        if start_of_chunk(prev_tag, tag, &prev_kind, kind) {
            begin = index;
        }

        prev_tag = tag;
        prev_kind = kind.to_string();
    }

    entities
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn entity(kind: &str, start: usize, end: usize) -> Entity {
        Entity {
            kind: kind.to_string(),
            start,
            end,
        }
    }

    #[test]
    fn test_get_entities() {
        let tags = ["B-PER", "I-PER", "O", "B-LOC"];

        assert_eq!(
            get_entities(&tags),
            vec![entity("PER", 0, 1), entity("LOC", 3, 3)]
        );
    }

    #[test]
    fn test_adjacent_begins_split_chunks() {
        let tags = ["B-STATUS", "B-STATUS", "I-STATUS"];

        assert_eq!(
            get_entities(&tags),
            vec![entity("STATUS", 0, 0), entity("STATUS", 1, 2)]
        );
    }

    #[test]
    fn test_stray_inside_opens_chunk() {
        let tags = ["O", "I-SIZE", "I-SIZE", "O"];

        assert_eq!(get_entities(&tags), vec![entity("SIZE", 1, 2)]);
    }

    #[test]
    fn test_type_change_closes_chunk() {
        let tags = ["B-METHOD", "I-PATH", "I-PATH"];

        assert_eq!(
            get_entities(&tags),
            vec![entity("METHOD", 0, 0), entity("PATH", 1, 2)]
        );
    }

    #[test]
    fn test_types_may_contain_dashes() {
        let tags = ["B-USER-AGENT", "I-USER-AGENT"];

        assert_eq!(get_entities(&tags), vec![entity("USER-AGENT", 0, 1)]);
    }

    #[test]
    fn test_only_outside() {
        assert!(get_entities(&["O", "O"]).is_empty());
        assert!(get_entities::<&str>(&[]).is_empty());
    }
}
