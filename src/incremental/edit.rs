//! Text edits.

use rowan::TokenAtOffset;
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};
use thiserror::Error;

use crate::parser::SyntaxNode;

/// A single replacement: `removed` bytes at `start` replaced by `inserted`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edit {
    pub start: TextSize,
    pub removed: TextSize,
    pub inserted: SmolStr,
}

/// An edit that does not describe the transition between two texts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("edit range {range:?} exceeds the old text length {len:?}")]
    OutOfBounds { range: TextRange, len: TextSize },
    #[error("edit boundary {offset:?} is not on a character boundary")]
    NotCharBoundary { offset: TextSize },
    #[error("new text length {found:?} does not match the edit (expected {expected:?})")]
    LengthMismatch { expected: TextSize, found: TextSize },
    #[error("new text does not contain the inserted text at {offset:?}")]
    ContentMismatch { offset: TextSize },
}

impl Edit {
    pub fn new(start: TextSize, removed: TextSize, inserted: impl Into<SmolStr>) -> Self {
        Self {
            start,
            removed,
            inserted: inserted.into(),
        }
    }

    pub fn insert(offset: TextSize, text: impl Into<SmolStr>) -> Self {
        Self::new(offset, TextSize::new(0), text)
    }

    pub fn delete(range: TextRange) -> Self {
        Self::new(range.start(), range.len(), "")
    }

    pub fn replace(range: TextRange, text: impl Into<SmolStr>) -> Self {
        Self::new(range.start(), range.len(), text)
    }

    /// The smallest edit turning `old` into `new`, found by trimming the
    /// common prefix and suffix.
    pub fn between(old: &str, new: &str) -> Self {
        let prefix = common_prefix(old, new);
        let suffix = common_suffix(&old[prefix..], &new[prefix..]);
        let inserted = &new[prefix..new.len() - suffix];
        Self::new(
            TextSize::new(prefix as u32),
            TextSize::new((old.len() - prefix - suffix) as u32),
            inserted,
        )
    }

    pub fn inserted_len(&self) -> TextSize {
        TextSize::of(self.inserted.as_str())
    }

    /// End of the removed range in the old text.
    pub fn old_end(&self) -> TextSize {
        self.start + self.removed
    }

    /// End of the inserted text in the new text.
    pub fn new_end(&self) -> TextSize {
        self.start + self.inserted_len()
    }

    pub fn old_range(&self) -> TextRange {
        TextRange::new(self.start, self.old_end())
    }

    pub fn new_range(&self) -> TextRange {
        TextRange::new(self.start, self.new_end())
    }

    pub fn is_noop(&self) -> bool {
        self.removed == TextSize::new(0) && self.inserted.is_empty()
    }

    /// Map an old offset at or after the removed range into the new text.
    pub fn shift(&self, offset: TextSize) -> TextSize {
        offset - self.old_end() + self.new_end()
    }

    /// Where an old range ends up, or `None` when it overlaps the edit.
    pub fn map_range(&self, range: TextRange) -> Option<TextRange> {
        if range.end() <= self.start {
            Some(range)
        } else if range.start() >= self.old_end() {
            Some(TextRange::new(self.shift(range.start()), self.shift(range.end())))
        } else {
            None
        }
    }

    /// Apply to `old`, producing the new text.
    pub fn apply(&self, old: &str) -> Result<String, EditError> {
        self.check_old(old)?;
        let mut text = String::with_capacity(old.len() + self.inserted.len());
        text.push_str(&old[..usize::from(self.start)]);
        text.push_str(&self.inserted);
        text.push_str(&old[usize::from(self.old_end())..]);
        Ok(text)
    }

    /// Check that this edit turns `old` into `new`.
    pub fn validate(&self, old: &str, new: &str) -> Result<(), EditError> {
        self.check_old(old)?;
        self.check_new(TextSize::of(old), new)
    }

    /// [`Edit::validate`] against the tree of the old text, reading only the
    /// tokens at the edit boundaries.
    pub fn validate_tree(&self, old: &SyntaxNode, new: &str) -> Result<(), EditError> {
        let len = old.text_range().len();
        self.check_bounds(len)?;
        for offset in [self.start, self.old_end()] {
            let on_boundary = match old.token_at_offset(offset) {
                TokenAtOffset::Single(token) => {
                    let local = offset - token.text_range().start();
                    token.text().is_char_boundary(usize::from(local))
                }
                TokenAtOffset::None | TokenAtOffset::Between(..) => true,
            };
            if !on_boundary {
                return Err(EditError::NotCharBoundary { offset });
            }
        }
        self.check_new(len, new)
    }

    fn check_new(&self, old_len: TextSize, new: &str) -> Result<(), EditError> {
        let expected = old_len - self.removed + self.inserted_len();
        let found = TextSize::of(new);
        if expected != found {
            return Err(EditError::LengthMismatch { expected, found });
        }
        let inserted = new.get(usize::from(self.start)..usize::from(self.new_end()));
        if inserted != Some(self.inserted.as_str()) {
            return Err(EditError::ContentMismatch { offset: self.start });
        }
        Ok(())
    }

    fn check_bounds(&self, len: TextSize) -> Result<(), EditError> {
        if self.old_end() > len {
            return Err(EditError::OutOfBounds {
                range: self.old_range(),
                len,
            });
        }
        Ok(())
    }

    fn check_old(&self, old: &str) -> Result<(), EditError> {
        self.check_bounds(TextSize::of(old))?;
        for offset in [self.start, self.old_end()] {
            if !old.is_char_boundary(usize::from(offset)) {
                return Err(EditError::NotCharBoundary { offset });
            }
        }
        Ok(())
    }
}

fn common_prefix(a: &str, b: &str) -> usize {
    let mut len = 0;
    for (x, y) in a.chars().zip(b.chars()) {
        if x != y {
            break;
        }
        len += x.len_utf8();
    }
    len
}

fn common_suffix(a: &str, b: &str) -> usize {
    let mut len = 0;
    for (x, y) in a.chars().rev().zip(b.chars().rev()) {
        if x != y {
            break;
        }
        len += x.len_utf8();
    }
    len
}
