//! crates/library_reader_core/src/pagination.rs
//!
//! Position tracking over pre-chunked reading content.
//!
//! Content comes in two shapes: chapters of pages (novels) and a flat ordered
//! list of translation units. Both reduce to "advance with carry into the next
//! container", so a single `PagedContent` type covers them and the
//! `PaginationEngine` never needs to know which one it holds.

use std::fmt;
use std::ops::Range;

use crate::domain::{Chapter, TranslationUnit};

//=========================================================================================
// Errors
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    #[error("Content has nothing to read")]
    EmptyContent,
    #[error("Chapter at index {0} has no pages")]
    EmptyChapter(usize),
    #[error("Chapter number {number} at index {index} does not follow the previous chapter")]
    ChapterOrder { index: usize, number: u32 },
    #[error("Index {index} is out of range (length {len})")]
    InvalidIndex { index: usize, len: usize },
    #[error("Operation requires {0} content")]
    WrongMode(Mode),
}

//=========================================================================================
// Content Shapes
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Hierarchical,
    Flat,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Hierarchical => f.write_str("chapter-structured"),
            Mode::Flat => f.write_str("flat"),
        }
    }
}

/// A location inside `PagedContent`. Only ever constructed in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingPosition {
    Hierarchical { chapter: usize, page: usize },
    Flat(usize),
}

#[derive(Debug, Clone)]
enum Shape {
    Hierarchical(Vec<Chapter>),
    Flat(Vec<TranslationUnit>),
}

/// Navigable content. Guaranteed non-empty, and every chapter has at least one page.
#[derive(Debug, Clone)]
pub struct PagedContent {
    shape: Shape,
    len: usize,
}

impl PagedContent {
    /// Builds chapter-structured content. Chapter numbers must be strictly increasing.
    pub fn chapters(chapters: Vec<Chapter>) -> Result<Self, PaginationError> {
        if chapters.is_empty() {
            return Err(PaginationError::EmptyContent);
        }
        let mut previous_number: Option<u32> = None;
        for (index, chapter) in chapters.iter().enumerate() {
            if chapter.pages.is_empty() {
                return Err(PaginationError::EmptyChapter(index));
            }
            if previous_number.is_some_and(|prev| chapter.number <= prev) {
                return Err(PaginationError::ChapterOrder {
                    index,
                    number: chapter.number,
                });
            }
            previous_number = Some(chapter.number);
        }
        let len = chapters.iter().map(|c| c.pages.len()).sum();
        Ok(Self {
            shape: Shape::Hierarchical(chapters),
            len,
        })
    }

    /// Builds flat content. Sequence order is reading order.
    pub fn flat(units: Vec<TranslationUnit>) -> Result<Self, PaginationError> {
        if units.is_empty() {
            return Err(PaginationError::EmptyContent);
        }
        let len = units.len();
        Ok(Self {
            shape: Shape::Flat(units),
            len,
        })
    }

    pub fn mode(&self) -> Mode {
        match self.shape {
            Shape::Hierarchical(_) => Mode::Hierarchical,
            Shape::Flat(_) => Mode::Flat,
        }
    }

    /// Total number of readable pages (or units).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn start(&self) -> ReadingPosition {
        match self.shape {
            Shape::Hierarchical(_) => ReadingPosition::Hierarchical { chapter: 0, page: 0 },
            Shape::Flat(_) => ReadingPosition::Flat(0),
        }
    }

    /// Whether `pos` addresses a page of this content.
    pub fn contains(&self, pos: ReadingPosition) -> bool {
        match (&self.shape, pos) {
            (Shape::Hierarchical(chapters), ReadingPosition::Hierarchical { chapter, page }) => {
                chapters.get(chapter).is_some_and(|c| page < c.pages.len())
            }
            (Shape::Flat(units), ReadingPosition::Flat(index)) => index < units.len(),
            _ => false,
        }
    }

    /// The position after `pos`, or `None` at the end or when `pos` is not
    /// a position of this content.
    pub fn advance(&self, pos: ReadingPosition) -> Option<ReadingPosition> {
        if !self.contains(pos) {
            return None;
        }
        match (&self.shape, pos) {
            (Shape::Hierarchical(chapters), ReadingPosition::Hierarchical { chapter, page }) => {
                if page + 1 < chapters[chapter].pages.len() {
                    Some(ReadingPosition::Hierarchical { chapter, page: page + 1 })
                } else if chapter + 1 < chapters.len() {
                    Some(ReadingPosition::Hierarchical { chapter: chapter + 1, page: 0 })
                } else {
                    None
                }
            }
            (Shape::Flat(units), ReadingPosition::Flat(index)) => {
                (index + 1 < units.len()).then(|| ReadingPosition::Flat(index + 1))
            }
            _ => None,
        }
    }

    /// The position before `pos`, or `None` at the start. Stepping back across
    /// a chapter boundary lands on the previous chapter's last page.
    pub fn retreat(&self, pos: ReadingPosition) -> Option<ReadingPosition> {
        if !self.contains(pos) {
            return None;
        }
        match (&self.shape, pos) {
            (Shape::Hierarchical(chapters), ReadingPosition::Hierarchical { chapter, page }) => {
                if page > 0 {
                    Some(ReadingPosition::Hierarchical { chapter, page: page - 1 })
                } else if chapter > 0 {
                    let last_page = chapters[chapter - 1].pages.len() - 1;
                    Some(ReadingPosition::Hierarchical {
                        chapter: chapter - 1,
                        page: last_page,
                    })
                } else {
                    None
                }
            }
            (Shape::Flat(_), ReadingPosition::Flat(index)) => {
                index.checked_sub(1).map(ReadingPosition::Flat)
            }
            _ => None,
        }
    }

    /// Zero-based reading ordinal of `pos`: the flat index, or the absolute
    /// page number counted across all chapters. Positions outside the content
    /// clamp to the last ordinal.
    pub fn ordinal_of(&self, pos: ReadingPosition) -> usize {
        let ordinal = match (&self.shape, pos) {
            (Shape::Hierarchical(chapters), ReadingPosition::Hierarchical { chapter, page }) => {
                chapters.iter().take(chapter).map(|c| c.pages.len()).sum::<usize>() + page
            }
            (_, ReadingPosition::Flat(index)) => index,
            (Shape::Flat(_), ReadingPosition::Hierarchical { .. }) => 0,
        };
        ordinal.min(self.len - 1)
    }

    /// Inverse of `ordinal_of`. `None` when the ordinal is out of range.
    pub fn position_at(&self, ordinal: usize) -> Option<ReadingPosition> {
        if ordinal >= self.len {
            return None;
        }
        match &self.shape {
            Shape::Hierarchical(chapters) => {
                let mut remaining = ordinal;
                for (chapter, c) in chapters.iter().enumerate() {
                    if remaining < c.pages.len() {
                        return Some(ReadingPosition::Hierarchical { chapter, page: remaining });
                    }
                    remaining -= c.pages.len();
                }
                None
            }
            Shape::Flat(_) => Some(ReadingPosition::Flat(ordinal)),
        }
    }

    /// Fraction of the content read once `pos` is on screen, in `(0, 1]`.
    pub fn fraction(&self, pos: ReadingPosition) -> f64 {
        (self.ordinal_of(pos) + 1) as f64 / self.len as f64
    }
}

//=========================================================================================
// The Engine
//=========================================================================================

/// Tracks the current reading position over one piece of `PagedContent`.
#[derive(Debug, Clone)]
pub struct PaginationEngine {
    content: PagedContent,
    position: ReadingPosition,
}

impl PaginationEngine {
    /// Starts at `restored` when it is a valid reading ordinal, otherwise at the start.
    pub fn initialize(content: PagedContent, restored: Option<usize>) -> Self {
        let position = restored
            .and_then(|ordinal| content.position_at(ordinal))
            .unwrap_or_else(|| content.start());
        Self { content, position }
    }

    pub fn mode(&self) -> Mode {
        self.content.mode()
    }

    pub fn position(&self) -> ReadingPosition {
        self.position
    }

    /// Moves forward one page. Returns whether the position changed.
    pub fn next(&mut self) -> bool {
        match self.content.advance(self.position) {
            Some(pos) => {
                self.position = pos;
                true
            }
            None => false,
        }
    }

    /// Moves back one page. Returns whether the position changed.
    pub fn previous(&mut self) -> bool {
        match self.content.retreat(self.position) {
            Some(pos) => {
                self.position = pos;
                true
            }
            None => false,
        }
    }

    /// Jumps to the first page of a chapter.
    pub fn jump_to_chapter(&mut self, chapter_index: usize) -> Result<(), PaginationError> {
        let Shape::Hierarchical(chapters) = &self.content.shape else {
            return Err(PaginationError::WrongMode(Mode::Hierarchical));
        };
        if chapter_index >= chapters.len() {
            return Err(PaginationError::InvalidIndex {
                index: chapter_index,
                len: chapters.len(),
            });
        }
        self.position = ReadingPosition::Hierarchical {
            chapter: chapter_index,
            page: 0,
        };
        Ok(())
    }

    /// Jumps to a flat index.
    pub fn jump_to_index(&mut self, index: usize) -> Result<(), PaginationError> {
        if self.content.mode() != Mode::Flat {
            return Err(PaginationError::WrongMode(Mode::Flat));
        }
        if index >= self.content.len() {
            return Err(PaginationError::InvalidIndex {
                index,
                len: self.content.len(),
            });
        }
        self.position = ReadingPosition::Flat(index);
        Ok(())
    }

    pub fn has_next(&self) -> bool {
        self.content.advance(self.position).is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.content.retreat(self.position).is_some()
    }

    pub fn progress_fraction(&self) -> f64 {
        self.content.fraction(self.position)
    }

    pub fn progress_percent(&self) -> u8 {
        (self.progress_fraction() * 100.0).round() as u8
    }

    /// The index persisted for this position.
    pub fn ordinal(&self) -> usize {
        self.content.ordinal_of(self.position)
    }

    pub fn pages_read(&self) -> usize {
        self.ordinal() + 1
    }

    pub fn total_pages(&self) -> usize {
        self.content.len()
    }

    /// Ordinals within `radius` of the current one, clipped to the content.
    pub fn nearby(&self, radius: usize) -> Range<usize> {
        let current = self.ordinal();
        current.saturating_sub(radius)..(current + radius + 1).min(self.content.len())
    }

    pub fn chapters(&self) -> &[Chapter] {
        match &self.content.shape {
            Shape::Hierarchical(chapters) => chapters,
            Shape::Flat(_) => &[],
        }
    }

    pub fn current_chapter(&self) -> Option<&Chapter> {
        match (&self.content.shape, self.position) {
            (Shape::Hierarchical(chapters), ReadingPosition::Hierarchical { chapter, .. }) => {
                chapters.get(chapter)
            }
            _ => None,
        }
    }

    pub fn current_unit(&self) -> Option<&TranslationUnit> {
        match (&self.content.shape, self.position) {
            (Shape::Flat(units), ReadingPosition::Flat(index)) => units.get(index),
            _ => None,
        }
    }

    /// Text of the page currently on screen.
    pub fn current_text(&self) -> &str {
        match (&self.content.shape, self.position) {
            (Shape::Hierarchical(chapters), ReadingPosition::Hierarchical { chapter, page }) => {
                &chapters[chapter].pages[page]
            }
            (Shape::Flat(units), ReadingPosition::Flat(index)) => &units[index].text,
            _ => "",
        }
    }
}
