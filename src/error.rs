/// Failures surfaced by an [`Arena`](crate::Arena).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ArenaError {
  /// The memory source could not supply a new page.
  #[error("memory source could not supply {bytes} bytes for a new page")]
  AcquireFailed { bytes: usize },

  /// A page of this many words does not fit in the address space.
  #[error("page of {words} words exceeds the addressable size")]
  CapacityOverflow { words: usize },

  /// Blocks are only ever word aligned.
  #[error("alignment {align} exceeds the arena word alignment of {max}")]
  UnsupportedAlignment { align: usize, max: usize },

  /// The memory source refused some pages during destroy.
  #[error("memory source failed to release {failed} of {pages} pages")]
  ReleaseFailed { failed: usize, pages: usize },
}
