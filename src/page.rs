use std::{alloc::Layout, mem, ptr::NonNull};

use crate::{
  align,
  align::WORD_SIZE,
  error::ArenaError,
  source::MemorySource,
};

/// Bookkeeping written at the front of every page. The data region starts
/// right after it.
#[repr(C)]
struct PageHeader {
  capacity: usize,
  fill: usize,
}

const HEADER_SIZE: usize = align!(mem::size_of::<PageHeader>());

/// Owning handle to one page acquired from a [`MemorySource`].
///
/// A page is a single block laid out as header followed by `capacity` word
/// slots. It has to be handed back with [`Page::release`] to the source that
/// created it; dropping the handle leaks the block.
pub(crate) struct Page {
  header: NonNull<PageHeader>,
  layout: Layout,
}

impl Page {
  /// Layout of a page holding `capacity` words.
  pub(crate) fn layout(capacity: usize) -> Result<Layout, ArenaError> {
    let overflow = ArenaError::CapacityOverflow { words: capacity };

    let bytes = capacity
      .checked_mul(WORD_SIZE)
      .and_then(|data| data.checked_add(HEADER_SIZE))
      .ok_or_else(|| overflow.clone())?;

    Layout::from_size_align(bytes, mem::align_of::<PageHeader>()).map_err(|_| overflow)
  }

  pub(crate) fn create<S: MemorySource + ?Sized>(
    source: &mut S,
    capacity: usize,
  ) -> Result<Self, ArenaError> {
    let layout = Self::layout(capacity)?;

    let Some(block) = source.acquire(layout) else {
      tracing::warn!(capacity, bytes = layout.size(), "memory source refused a page");
      return Err(ArenaError::AcquireFailed { bytes: layout.size() });
    };
    debug_assert_eq!(block.as_ptr() as usize % layout.align(), 0, "misaligned page");

    let header = block.cast::<PageHeader>();
    unsafe { header.as_ptr().write(PageHeader { capacity, fill: 0 }) };

    tracing::trace!(capacity, bytes = layout.size(), "acquired page");
    Ok(Self { header, layout })
  }

  /// Returns the page to `source`, reporting whether the source accepted it.
  ///
  /// # Safety
  ///
  /// `source` must be the source this page was created from, and no pointer
  /// into the page may be used afterwards.
  pub(crate) unsafe fn release<S: MemorySource + ?Sized>(
    self,
    source: &mut S,
  ) -> bool {
    let capacity = self.capacity();
    let released = unsafe { source.release(self.header.cast::<u8>(), self.layout) };

    if released {
      tracing::trace!(capacity, bytes = self.layout.size(), "released page");
    } else {
      tracing::error!(capacity, bytes = self.layout.size(), "memory source failed to release page");
    }
    released
  }

  pub(crate) fn capacity(&self) -> usize {
    unsafe { (*self.header.as_ptr()).capacity }
  }

  pub(crate) fn fill(&self) -> usize {
    unsafe { (*self.header.as_ptr()).fill }
  }

  pub(crate) fn remaining(&self) -> usize {
    self.capacity() - self.fill()
  }

  /// Whether `words` more slots fit behind the fill cursor.
  pub(crate) fn fits(
    &self,
    words: usize,
  ) -> bool {
    words <= self.remaining()
  }

  /// Start of the data region.
  pub(crate) fn base(&self) -> NonNull<u8> {
    unsafe { self.header.cast::<u8>().add(HEADER_SIZE) }
  }

  /// Carves `words` slots at the fill cursor and advances it.
  ///
  /// The caller must have checked [`Page::fits`].
  pub(crate) fn bump(
    &mut self,
    words: usize,
  ) -> NonNull<u8> {
    debug_assert!(self.fits(words));

    unsafe {
      let header = self.header.as_ptr();
      let block = self.base().add((*header).fill * WORD_SIZE);
      (*header).fill += words;
      block
    }
  }

  pub(crate) fn clear(&mut self) {
    unsafe { (*self.header.as_ptr()).fill = 0 };
  }
}
