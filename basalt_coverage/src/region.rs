//! The region model: source spans bound to coverage counters.
//!
//! A [`Region`] is one instrumentable source span with its counter slot and
//! owning file. [`FunctionRegions`] holds one function's regions in
//! collection order and assigns counter ids as regions are recorded, so the
//! enumeration exists exactly once and every later consumer (injector,
//! writer) reads the same ids. [`FileTable`] interns source file paths into
//! per-module [`FileId`]s, append-only, in first-encountered order.

use basalt_ir::{NodeId, SourceFile, Span};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

use crate::hash::stable_name_hash;

/// A per-function counter slot index.
///
/// Assigned once, in collection order, starting at 0; never renumbered
/// within a compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct CounterId(pub u32);

impl CounterId {
    /// Create a counter id.
    #[inline]
    #[must_use]
    pub const fn new(index: u32) -> Self {
        CounterId(index)
    }

    /// Get the raw slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CounterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// A per-module source file index.
///
/// The index into the module's [`FileTable`]; stable for the whole write
/// pass once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct FileId(pub u32);

impl FileId {
    /// Create a file id.
    #[inline]
    #[must_use]
    pub const fn new(index: u32) -> Self {
        FileId(index)
    }

    /// Get the raw table index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// A contiguous source span in 1-based line/column coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRegion {
    /// 1-based line of the first byte.
    pub start_line: u32,
    /// 1-based column of the first byte.
    pub start_col: u32,
    /// 1-based line of the end position (exclusive byte).
    pub end_line: u32,
    /// 1-based column of the end position (exclusive byte).
    pub end_col: u32,
}

impl SourceRegion {
    /// Resolve a byte span through its file's line table.
    #[must_use]
    pub fn from_span(file: &SourceFile, span: Span) -> Self {
        let (start_line, start_col) = file.line_col(span.start);
        let (end_line, end_col) = file.line_col(span.end);
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }
}

impl fmt::Display for SourceRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} - {}:{}",
            self.start_line, self.start_col, self.end_line, self.end_col
        )
    }
}

/// One instrumentable source region of a function.
///
/// Immutable once created: the collector builds it, the injector and writer
/// only read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Owning file within the module's file table.
    pub file: FileId,
    /// Covered source span.
    pub span: SourceRegion,
    /// Counter slot measuring the span.
    pub counter: CounterId,
}

/// The ordered region set of one function.
///
/// Regions are keyed by the IR node (or conditional arm) that produced
/// them. Recording assigns the counter id: the n-th region gets slot n-1,
/// so iteration order, counter order, and collection order are the same
/// thing by construction.
#[derive(Debug, Clone)]
pub struct FunctionRegions {
    /// Qualified function name.
    name: Arc<str>,
    /// Linker symbol name.
    symbol: Arc<str>,
    /// Stable hash of the qualified name; the coverage record key.
    hash: u64,
    /// Declaring file.
    file: FileId,
    /// Regions in collection order.
    regions: Vec<(NodeId, Region)>,
    /// Node to region index, for the injector's O(1) lookups.
    by_node: FxHashMap<NodeId, u32>,
}

impl FunctionRegions {
    /// Create an empty region set for a function.
    #[must_use]
    pub fn new(name: Arc<str>, symbol: Arc<str>, file: FileId) -> Self {
        let hash = stable_name_hash(&name);
        Self {
            name,
            symbol,
            hash,
            file,
            regions: Vec::new(),
            by_node: FxHashMap::default(),
        }
    }

    /// Record a region for a node, assigning the next counter slot.
    ///
    /// # Panics
    ///
    /// Panics if the node already has a region; one region per node is an
    /// invariant of collection, and a duplicate means the traversal visited
    /// a node twice.
    pub fn record(&mut self, node: NodeId, file: FileId, span: SourceRegion) -> CounterId {
        let counter = CounterId::new(self.regions.len() as u32);
        let previous = self.by_node.insert(node, counter.index());
        assert!(
            previous.is_none(),
            "node {} of `{}` was recorded twice",
            node,
            self.name
        );
        self.regions.push((
            node,
            Region {
                file,
                span,
                counter,
            },
        ));
        counter
    }

    /// Look up the region of a node.
    #[inline]
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&Region> {
        self.by_node
            .get(&node)
            .map(|&index| &self.regions[index as usize].1)
    }

    /// Number of regions (and therefore counters) in the function.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the function has no regions.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Iterate regions in collection order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Region)> {
        self.regions.iter().map(|(node, region)| (*node, region))
    }

    /// Qualified function name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Linker symbol name.
    #[inline]
    #[must_use]
    pub fn symbol(&self) -> &Arc<str> {
        &self.symbol
    }

    /// Stable hash of the qualified name.
    #[inline]
    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Declaring file.
    #[inline]
    #[must_use]
    pub fn file(&self) -> FileId {
        self.file
    }
}

/// Append-only table of the distinct source files of one module.
///
/// The position of a path is its [`FileId`]. Files are appended on first
/// encounter and never removed or reordered, so an id handed out early in
/// collection is still valid at write time.
#[derive(Debug, Clone, Default)]
pub struct FileTable {
    paths: Vec<Arc<str>>,
    ids: FxHashMap<Arc<str>, FileId>,
}

impl FileTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a path, appending it on first encounter.
    pub fn intern(&mut self, path: &Arc<str>) -> FileId {
        if let Some(&id) = self.ids.get(path) {
            return id;
        }
        let id = FileId::new(self.paths.len() as u32);
        self.paths.push(path.clone());
        self.ids.insert(path.clone(), id);
        id
    }

    /// Path at a given id.
    ///
    /// # Panics
    ///
    /// Panics if the id was not produced by this table.
    #[inline]
    #[must_use]
    pub fn path(&self, id: FileId) -> &Arc<str> {
        &self.paths[id.index() as usize]
    }

    /// All paths in id order.
    #[inline]
    #[must_use]
    pub fn paths(&self) -> &[Arc<str>] {
        &self.paths
    }

    /// Number of distinct files.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the table is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// All collected regions of one module.
///
/// Produced by collection, borrowed read-only by the writer. Functions
/// appear in declaration order, including those with no regions; the
/// writer decides what to emit.
#[derive(Debug, Clone)]
pub struct ModuleRegions {
    /// The module's file table.
    pub file_table: FileTable,
    /// Per-function region sets in declaration order.
    pub functions: Vec<FunctionRegions>,
}

impl ModuleRegions {
    /// Total number of regions across all functions.
    #[must_use]
    pub fn total_regions(&self) -> usize {
        self.functions.iter().map(FunctionRegions::len).sum()
    }
}
