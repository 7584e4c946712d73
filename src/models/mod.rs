pub mod corpus;
pub mod search;

pub use corpus::{
    lift_untitled, CorpusSummary, DocRef, MappingRule, NamesIndex, PathsIndex, TocNode,
};
pub use search::{Fragments, HighlightSegment, SearchHit, SearchResult};
