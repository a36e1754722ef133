use std::ops::Range;

use fxhash::FxBuildHasher;
use indexmap::IndexMap;
use miette::SourceSpan;

type FxMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Symbol table of name -> data memory address.
///
/// Declaring a name twice rebinds it; nothing is ever removed.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    table: FxMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            table: IndexMap::with_hasher(FxBuildHasher::default()),
        }
    }

    /// Bind `name` to `address`, replacing any previous binding.
    pub fn declare(&mut self, name: &str, address: usize) {
        self.table.insert(name.to_string(), address);
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.table.get(name).copied()
    }

    /// Address bound to `name`. Undeclared names are bound to address 0 on first use.
    pub fn resolve(&mut self, name: &str) -> usize {
        if let Some(address) = self.get(name) {
            return address;
        }
        self.table.insert(name.to_string(), 0);
        0
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Entries ordered by symbol name.
    pub fn sorted(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<_> = self
            .table
            .iter()
            .map(|(name, address)| (name.as_str(), *address))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Location within source
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Span {
    offs: SrcOffset,
    len: usize,
}

impl Span {
    pub fn new(offs: SrcOffset, len: usize) -> Self {
        Span { offs, len }
    }

    /// Same span, moved `by` bytes further into the source.
    pub fn shifted(self, by: usize) -> Self {
        Span::new(SrcOffset(self.offs.0 + by), self.len)
    }

    pub fn range(&self) -> Range<usize> {
        self.offs.0..self.offs.0 + self.len
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn offs(&self) -> usize {
        self.offs.0
    }
}

impl From<Span> for SourceSpan {
    fn from(value: Span) -> Self {
        SourceSpan::new(value.offs().into(), value.len())
    }
}

impl From<Span> for Range<usize> {
    fn from(value: Span) -> Self {
        value.range()
    }
}

/// Used to refer to offsets from the start of a source file.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct SrcOffset(pub usize);
