pub mod catalog;
pub mod domain;
pub mod pagination;
pub mod ports;

pub use catalog::{categories, filter_entries, CatalogEntry, CatalogQuery, CategoryFilter, ProgressBadge};
pub use domain::{
    Chapter, Document, Novel, NovelWithContent, ProgressRecord, ProgressUpdate, TranslationUnit,
    UserProfile,
};
pub use pagination::{Mode, PagedContent, PaginationEngine, PaginationError, ReadingPosition};
pub use ports::{LibraryService, PortError, PortResult, ProgressStore};
