use std::{alloc::Layout, fmt, ptr::NonNull};

use crate::{
  align::{WORD_SIZE, words_for},
  error::ArenaError,
  page::Page,
  source::{LibcHeap, MemorySource},
};

/// Page capacity in words used when nothing larger is asked for.
#[cfg(not(feature = "large-pages"))]
pub const DEFAULT_PAGE_CAPACITY: usize = 4 * 1024;

/// Page capacity in words used when nothing larger is asked for.
#[cfg(feature = "large-pages")]
pub const DEFAULT_PAGE_CAPACITY: usize = 16 * 1024;

/// Tunables for an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaConfig {
  /// Minimum capacity, in words, of the first page.
  pub page_capacity: usize,
}

impl Default for ArenaConfig {
  fn default() -> Self {
    Self {
      page_capacity: DEFAULT_PAGE_CAPACITY,
    }
  }
}

impl ArenaConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_page_capacity(
    mut self,
    words: usize,
  ) -> Self {
    self.page_capacity = words;
    self
  }
}

/// Snapshot of one page in an arena's chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
  /// First byte of the page's data region.
  pub base: NonNull<u8>,
  /// Capacity in words.
  pub capacity: usize,
  /// Words handed out since the last reset.
  pub fill: usize,
}

impl PageInfo {
  pub fn remaining(&self) -> usize {
    self.capacity - self.fill
  }

  /// Byte offset of `ptr` inside the data region, if it points there.
  pub fn offset_of(
    &self,
    ptr: *const u8,
  ) -> Option<usize> {
    let offset = (ptr as usize).checked_sub(self.base.as_ptr() as usize)?;
    (offset < self.capacity * WORD_SIZE).then_some(offset)
  }

  pub fn contains(
    &self,
    ptr: *const u8,
  ) -> bool {
    self.offset_of(ptr).is_some()
  }
}

/// Paged bump allocator.
///
/// ```text
///   pages[0]                pages[1]            pages[2]
///   ┌──────┬──────────────┐ ┌──────┬─────────┐  ┌──────┬────────────┐
///   │ hdr  │ ██████████░░ │ │ hdr  │ ████░░░ │  │ hdr  │ ░░░░░░░░░░ │
///   └──────┴──────────────┘ └──────┴─────────┘  └──────┴────────────┘
///                                   ▲
///                                  curr
/// ```
///
/// Blocks are carved from the page at `curr` by bumping its fill cursor. When
/// that page cannot take a request the cursor moves forward through pages
/// that already exist, and only once it reaches the tail is a new page
/// acquired from the [`MemorySource`]. Nothing is freed per block: [`reset`]
/// rewinds every page for reuse and [`destroy`] hands all of them back.
///
/// Every block is word aligned and stays put until the next reset or destroy.
///
/// [`reset`]: Arena::reset
/// [`destroy`]: Arena::destroy
pub struct Arena<S: MemorySource = LibcHeap> {
  pages: Vec<Page>,
  curr: Option<usize>,
  config: ArenaConfig,
  source: S,
}

// SAFETY: the arena exclusively owns every page it points into, and the pages
// are only ever given back to `source`, which moves along with it.
unsafe impl<S: MemorySource + Send> Send for Arena<S> {}

impl Default for Arena<LibcHeap> {
  fn default() -> Self {
    Self::new(LibcHeap)
  }
}

impl<S: MemorySource> Arena<S> {
  /// Creates an arena that acquires its first page on first allocation.
  pub fn new(source: S) -> Self {
    Self::with_config(ArenaConfig::default(), source)
  }

  pub fn with_config(
    config: ArenaConfig,
    source: S,
  ) -> Self {
    Self {
      pages: Vec::new(),
      curr: None,
      config,
      source,
    }
  }

  /// Creates an arena with a first page of at least `capacity` words.
  pub fn with_capacity(
    capacity: usize,
    source: S,
  ) -> Result<Self, ArenaError> {
    Self::create(ArenaConfig::default(), capacity, source)
  }

  /// Creates an arena and eagerly acquires its first page, sized to the
  /// larger of `config.page_capacity` and `capacity` words.
  pub fn create(
    config: ArenaConfig,
    capacity: usize,
    source: S,
  ) -> Result<Self, ArenaError> {
    let mut arena = Self::with_config(config, source);
    let first = arena.push_page(config.page_capacity.max(capacity))?;
    arena.curr = Some(first);
    Ok(arena)
  }

  /// Allocates `size` bytes, rounded up to whole words.
  ///
  /// The block is uninitialized and word aligned. It stays valid until the
  /// arena is reset, destroyed or dropped. On error the arena is unchanged.
  pub fn alloc(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>, ArenaError> {
    let words = words_for(size);

    let mut curr = match self.curr {
      Some(curr) => curr,
      None => {
        debug_assert!(self.pages.is_empty());
        self.push_page(self.config.page_capacity.max(words))?
      }
    };

    while !self.pages[curr].fits(words) && curr + 1 < self.pages.len() {
      curr += 1;
    }

    if !self.pages[curr].fits(words) {
      debug_assert_eq!(curr + 1, self.pages.len());
      tracing::trace!(words, pages = self.pages.len(), "growing arena");
      curr = self.push_page(words)?;
    }

    self.curr = Some(curr);
    Ok(self.pages[curr].bump(words))
  }

  /// Like [`alloc`](Arena::alloc), with the first `size` bytes zeroed.
  pub fn alloc_zeroed(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>, ArenaError> {
    let block = self.alloc(size)?;
    unsafe { block.as_ptr().write_bytes(0, size) };
    Ok(block)
  }

  /// Allocates room for `layout`. Alignments above the word size are refused.
  pub fn alloc_layout(
    &mut self,
    layout: Layout,
  ) -> Result<NonNull<u8>, ArenaError> {
    if layout.align() > WORD_SIZE {
      return Err(ArenaError::UnsupportedAlignment {
        align: layout.align(),
        max: WORD_SIZE,
      });
    }

    self.alloc(layout.size())
  }

  /// Empties every page while keeping them all for reuse.
  ///
  /// Every block handed out so far becomes invalid.
  pub fn reset(&mut self) {
    for page in &mut self.pages {
      page.clear();
    }
    self.curr = if self.pages.is_empty() { None } else { Some(0) };

    tracing::debug!(pages = self.pages.len(), "reset arena");
  }

  /// Releases every page back to the memory source.
  ///
  /// All pages are released even if the source rejects some of them; the
  /// arena ends up empty either way and can be allocated from again. Calling
  /// this on an empty arena does nothing.
  pub fn destroy(&mut self) -> Result<(), ArenaError> {
    let pages = self.pages.len();
    self.curr = None;

    if pages == 0 {
      return Ok(());
    }

    let mut failed = 0;
    for page in self.pages.drain(..) {
      // SAFETY: every page came from `self.source` and its blocks die with the arena epoch.
      if !unsafe { page.release(&mut self.source) } {
        failed += 1;
      }
    }

    tracing::debug!(pages, failed, "destroyed arena");

    if failed > 0 {
      return Err(ArenaError::ReleaseFailed { failed, pages });
    }
    Ok(())
  }

  pub fn page_count(&self) -> usize {
    self.pages.len()
  }

  /// Index of the page the next allocation starts looking at.
  pub fn current_page(&self) -> Option<usize> {
    self.curr
  }

  /// Pages in chain order.
  pub fn pages(&self) -> impl ExactSizeIterator<Item = PageInfo> + '_ {
    self.pages.iter().map(|page| PageInfo {
      base: page.base(),
      capacity: page.capacity(),
      fill: page.fill(),
    })
  }

  /// Bytes handed out since the last reset, counted in whole words.
  pub fn allocated_bytes(&self) -> usize {
    self.pages.iter().map(Page::fill).sum::<usize>() * WORD_SIZE
  }

  /// Total data capacity of all pages in bytes.
  pub fn capacity_bytes(&self) -> usize {
    self.pages.iter().map(Page::capacity).sum::<usize>() * WORD_SIZE
  }

  pub fn config(&self) -> &ArenaConfig {
    &self.config
  }

  pub fn source(&self) -> &S {
    &self.source
  }

  /// Mutable access to the memory source.
  ///
  /// # Safety
  ///
  /// Nothing done through the returned reference may invalidate a block the
  /// source has handed to this arena. In particular, when the source is a
  /// parent [`Arena`] it must not be reset or destroyed while this arena still
  /// holds pages.
  ///
  /// ```compile_fail
  /// use rarena::{Arena, LibcHeap};
  ///
  /// let mut child = Arena::new(Arena::new(LibcHeap));
  /// child.alloc(16).unwrap();
  /// child.source_mut().reset();
  /// ```
  pub unsafe fn source_mut(&mut self) -> &mut S {
    &mut self.source
  }

  fn push_page(
    &mut self,
    capacity: usize,
  ) -> Result<usize, ArenaError> {
    let page = Page::create(&mut self.source, capacity)?;
    self.pages.push(page);
    Ok(self.pages.len() - 1)
  }
}

impl<S: MemorySource> Drop for Arena<S> {
  fn drop(&mut self) {
    // Failures were already logged by destroy.
    let _ = self.destroy();
  }
}

impl<S: MemorySource> fmt::Debug for Arena<S> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("Arena")
      .field("pages", &self.pages.len())
      .field("curr", &self.curr)
      .field("config", &self.config)
      .field("allocated_bytes", &self.allocated_bytes())
      .finish()
  }
}

/// An arena can feed another one. Child pages are carved from the parent and
/// only come back when the parent is reset or destroyed.
// SAFETY: `alloc_layout` hands out disjoint blocks of at least the requested
// size at word alignment, refuses larger alignments, and keeps them valid until
// this arena is reset or destroyed. Both need `&mut self`, which the child holds
// for as long as it has pages; `source_mut` is unsafe for that reason.
unsafe impl<S: MemorySource> MemorySource for Arena<S> {
  fn acquire(
    &mut self,
    layout: Layout,
  ) -> Option<NonNull<u8>> {
    self.alloc_layout(layout).ok()
  }

  unsafe fn release(
    &mut self,
    _block: NonNull<u8>,
    _layout: Layout,
  ) -> bool {
    true
  }
}
