//! UCFG document tree.

use indexmap::IndexMap;
use num_bigint::BigInt;
use std::fmt;

/// A scalar literal.
///
/// The parser only produces `String`; the remaining variants let callers
/// build trees with typed values for the formatter.
#[derive(Clone, PartialEq)]
pub enum Scalar {
    /// Decoded string or bare identifier.
    String(String),
    /// Arbitrary-precision integer.
    Integer(BigInt),
    /// 64-bit floating-point number.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// Null value.
    Null,
    /// Marker for a value that is not present.
    Absent,
}

impl Scalar {
    /// Returns a reference to the string if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a reference to the integer if this is an `Integer`.
    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Scalar::Integer(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the float value if this is a `Float`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Scalar::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the boolean value if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Scalar::Absent)
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => write!(f, "{:?}", s),
            Scalar::Integer(n) => write!(f, "{}n", n),
            Scalar::Float(n) => write!(f, "{}", n),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Null => write!(f, "null"),
            Scalar::Absent => write!(f, "absent"),
        }
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<BigInt> for Scalar {
    fn from(n: BigInt) -> Self {
        Scalar::Integer(n)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Integer(BigInt::from(n))
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Scalar::Float(f)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

/// What a key is bound to inside a section.
#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
    /// `key: value...;`
    Leaf(Vec<Scalar>),
    /// One or more `key header... { ... }` blocks, in source order.
    Sections(Vec<Section>),
}

impl Entry {
    /// Returns the values if this is a `Leaf`.
    pub fn as_leaf(&self) -> Option<&[Scalar]> {
        match self {
            Entry::Leaf(values) => Some(values),
            _ => None,
        }
    }

    /// Returns the sibling sections if this is `Sections`.
    pub fn as_sections(&self) -> Option<&[Section]> {
        match self {
            Entry::Sections(sections) => Some(sections),
            _ => None,
        }
    }
}

/// A section: header values plus ordered entries.
///
/// The root of a document is a section with an empty header. Keys keep the
/// order in which they were first inserted, and equality takes that order
/// into account.
#[derive(Clone, Debug, Default)]
pub struct Section {
    header: Vec<Scalar>,
    entries: IndexMap<String, Entry>,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty section with header values.
    pub fn with_header(header: Vec<Scalar>) -> Self {
        Self {
            header,
            entries: IndexMap::new(),
        }
    }

    /// Values written between the section's key and its opening brace.
    pub fn header(&self) -> &[Scalar] {
        &self.header
    }

    pub fn set_header(&mut self, header: Vec<Scalar>) {
        self.header = header;
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Values of the leaf at `key`.
    pub fn leaf(&self, key: &str) -> Option<&[Scalar]> {
        self.get(key).and_then(Entry::as_leaf)
    }

    /// Sibling subsections at `key`.
    pub fn sections(&self, key: &str) -> Option<&[Section]> {
        self.get(key).and_then(Entry::as_sections)
    }

    /// Bind a leaf. Fails, leaving the section untouched, if the key is
    /// already bound to anything.
    pub fn set_leaf(&mut self, key: impl Into<String>, values: Vec<Scalar>) -> bool {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, Entry::Leaf(values));
        true
    }

    /// Append a subsection under `key`. Fails if the key is bound to a leaf.
    #[must_use]
    pub fn push_section(&mut self, key: impl Into<String>, section: Section) -> bool {
        match self
            .entries
            .entry(key.into())
            .or_insert_with(|| Entry::Sections(Vec::new()))
        {
            Entry::Sections(siblings) => {
                siblings.push(section);
                true
            }
            Entry::Leaf(_) => false,
        }
    }

    /// Check whether `key` is bound to a leaf.
    pub fn has_leaf(&self, key: &str) -> bool {
        matches!(self.entries.get(key), Some(Entry::Leaf(_)))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entry at `index` in insertion order.
    pub(crate) fn entry_at(&self, index: usize) -> Option<(&str, &Entry)> {
        self.entries.get_index(index).map(|(k, v)| (k.as_str(), v))
    }
}

// Equality and drop walk nested sections with an explicit stack, so neither
// is limited by nesting depth.

impl PartialEq for Section {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            if a.header != b.header || a.entries.len() != b.entries.len() {
                return false;
            }
            for ((ka, ea), (kb, eb)) in a.entries.iter().zip(b.entries.iter()) {
                if ka != kb {
                    return false;
                }
                match (ea, eb) {
                    (Entry::Leaf(va), Entry::Leaf(vb)) if va == vb => {}
                    (Entry::Sections(sa), Entry::Sections(sb)) if sa.len() == sb.len() => {
                        pending.extend(sa.iter().zip(sb.iter()));
                    }
                    _ => return false,
                }
            }
        }
        true
    }
}

impl Drop for Section {
    fn drop(&mut self) {
        let mut orphans: Vec<Section> = Vec::new();
        detach_children(self, &mut orphans);
        while let Some(mut section) = orphans.pop() {
            detach_children(&mut section, &mut orphans);
        }
    }
}

/// Move every subsection of `section` onto `orphans`.
fn detach_children(section: &mut Section, orphans: &mut Vec<Section>) {
    for (_, entry) in std::mem::take(&mut section.entries) {
        if let Entry::Sections(children) = entry {
            orphans.extend(children);
        }
    }
}

impl<'a> IntoIterator for &'a Section {
    type Item = (&'a String, &'a Entry);
    type IntoIter = indexmap::map::Iter<'a, String, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_leaf_once() {
        let mut section = Section::new();
        assert!(section.set_leaf("name", vec!["a".into()]));
        assert!(!section.set_leaf("name", vec!["b".into()]));
        assert_eq!(section.leaf("name"), Some(&[Scalar::from("a")][..]));
    }

    #[test]
    fn test_push_section_appends_siblings() {
        let mut section = Section::new();
        assert!(section.push_section("server", Section::with_header(vec!["a".into()])));
        assert!(section.push_section("server", Section::with_header(vec!["b".into()])));
        let siblings = section.sections("server").unwrap();
        assert_eq!(siblings.len(), 2);
        assert_eq!(siblings[1].header(), &[Scalar::from("b")]);
        assert_eq!(section.len(), 1);
    }

    #[test]
    fn test_mixed_kinds_rejected() {
        let mut section = Section::new();
        assert!(section.set_leaf("x", vec!["1".into()]));
        assert!(!section.push_section("x", Section::new()));

        let mut section = Section::new();
        assert!(section.push_section("y", Section::new()));
        assert!(!section.set_leaf("y", vec!["1".into()]));
        assert!(!section.has_leaf("y"));
    }

    #[test]
    fn test_keys_keep_insertion_order() {
        let mut section = Section::new();
        section.set_leaf("b", vec!["1".into()]);
        assert!(section.push_section("a", Section::new()));
        section.set_leaf("c", vec!["2".into()]);
        assert!(section.push_section("a", Section::new()));
        assert_eq!(section.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let mut first = Section::new();
        first.set_leaf("a", vec!["1".into()]);
        first.set_leaf("b", vec!["2".into()]);

        let mut second = Section::new();
        second.set_leaf("b", vec!["2".into()]);
        second.set_leaf("a", vec!["1".into()]);

        assert_ne!(first, second);
        assert_eq!(first, first.clone());
    }

    #[test]
    fn test_equality_compares_nested_sections() {
        let mut inner = Section::new();
        inner.set_leaf("k", vec!["1".into()]);
        let mut first = Section::new();
        assert!(first.push_section("a", inner.clone()));

        let mut changed = inner.clone();
        changed.set_header(vec!["h".into()]);
        let mut second = Section::new();
        assert!(second.push_section("a", changed));

        assert_ne!(first, second);
        assert_eq!(first, first.clone());
    }

    /// A chain of `depth` sections under key `a`.
    fn chain(depth: usize) -> Section {
        let mut section = Section::new();
        for _ in 0..depth {
            let mut parent = Section::new();
            assert!(parent.push_section("a", section));
            section = parent;
        }
        section
    }

    #[test]
    fn test_deep_tree_compares_and_drops() {
        let first = chain(100_000);
        let second = chain(100_000);
        assert!(first == second);
        assert!(first != chain(99_999));
        drop(first);
        drop(second);
    }

    #[test]
    fn test_scalar_accessors() {
        assert_eq!(Scalar::from("s").as_str(), Some("s"));
        assert_eq!(Scalar::from(3i64).as_integer(), Some(&BigInt::from(3)));
        assert_eq!(Scalar::from(1.5).as_float(), Some(1.5));
        assert_eq!(Scalar::from(true).as_bool(), Some(true));
        assert!(Scalar::Null.is_null());
        assert!(Scalar::Absent.is_absent());
        assert_eq!(format!("{:?}", Scalar::from(7i64)), "7n");
    }
}
