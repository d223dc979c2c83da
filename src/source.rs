use std::{alloc::Layout, mem, ptr::NonNull};

use libc::{c_void, free, posix_memalign};

/// Where an arena gets its pages from.
///
/// An arena never touches global allocator state directly. Every page is
/// obtained through [`acquire`](MemorySource::acquire) and handed back through
/// [`release`](MemorySource::release), so the backing memory can be the
/// system heap, another arena, or a test double that injects failures.
///
/// # Safety
///
/// A block returned by `acquire` must be at least `layout.size()` bytes,
/// aligned to `layout.align()`, not handed out again while live, and must stay
/// valid for reads and writes until it is passed to `release`. The arena
/// writes page headers and hands out blocks inside it without further checks.
///
/// ```compile_fail
/// use std::{alloc::Layout, ptr::NonNull};
/// use rarena::MemorySource;
///
/// struct Dangling;
///
/// impl MemorySource for Dangling {
///     fn acquire(&mut self, _layout: Layout) -> Option<NonNull<u8>> {
///         Some(NonNull::dangling())
///     }
///
///     unsafe fn release(&mut self, _block: NonNull<u8>, _layout: Layout) -> bool {
///         true
///     }
/// }
/// ```
pub unsafe trait MemorySource {
  /// Returns a block of at least `layout.size()` bytes aligned to
  /// `layout.align()`, or `None` if the source is exhausted. The contents may
  /// be uninitialized.
  fn acquire(
    &mut self,
    layout: Layout,
  ) -> Option<NonNull<u8>>;

  /// Gives back a block previously returned by [`acquire`](MemorySource::acquire)
  /// with the same `layout`. Returns `false` if the source rejected it.
  ///
  /// # Safety
  ///
  /// `block` must come from this source's `acquire` called with `layout`, and
  /// must not be used or released again afterwards.
  unsafe fn release(
    &mut self,
    block: NonNull<u8>,
    layout: Layout,
  ) -> bool;
}

// SAFETY: forwards to `S`, which upholds the contract.
unsafe impl<S: MemorySource + ?Sized> MemorySource for &mut S {
  fn acquire(
    &mut self,
    layout: Layout,
  ) -> Option<NonNull<u8>> {
    (**self).acquire(layout)
  }

  unsafe fn release(
    &mut self,
    block: NonNull<u8>,
    layout: Layout,
  ) -> bool {
    unsafe { (**self).release(block, layout) }
  }
}

/// The C heap, through `posix_memalign(3)` and `free(3)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibcHeap;

// SAFETY: posix_memalign returns at least `size` bytes at `align`, live until free.
unsafe impl MemorySource for LibcHeap {
  fn acquire(
    &mut self,
    layout: Layout,
  ) -> Option<NonNull<u8>> {
    // posix_memalign wants a power of two that is also a multiple of the pointer size.
    let align = layout.align().max(mem::size_of::<*mut c_void>());
    let mut out: *mut c_void = std::ptr::null_mut();

    let status = unsafe { posix_memalign(&mut out, align, layout.size().max(1)) };
    if status != 0 {
      return None;
    }

    NonNull::new(out.cast::<u8>())
  }

  unsafe fn release(
    &mut self,
    block: NonNull<u8>,
    _layout: Layout,
  ) -> bool {
    unsafe { free(block.as_ptr().cast::<c_void>()) };
    true
  }
}

#[cfg(test)]
pub(crate) mod testing {
  use std::alloc::{self, Layout};
  use std::ptr::NonNull;

  use super::MemorySource;

  /// Heap-backed source that counts calls and can be told to fail.
  #[derive(Debug, Default)]
  pub(crate) struct Recording {
    pub acquired: Vec<usize>,
    pub released: usize,
    pub live: usize,
    /// Refuse every acquire once this many have succeeded.
    pub acquire_limit: Option<usize>,
    /// Report failure from release (the memory is still freed).
    pub fail_release: bool,
  }

  impl Recording {
    pub(crate) fn failing_after(successes: usize) -> Self {
      Self {
        acquire_limit: Some(successes),
        ..Self::default()
      }
    }

    pub(crate) fn failing_release() -> Self {
      Self {
        fail_release: true,
        ..Self::default()
      }
    }
  }

  // SAFETY: blocks come straight from `std::alloc::alloc` with the requested layout.
  unsafe impl MemorySource for Recording {
    fn acquire(
      &mut self,
      layout: Layout,
    ) -> Option<NonNull<u8>> {
      if self.acquire_limit.is_some_and(|limit| self.acquired.len() >= limit) {
        return None;
      }

      let block = NonNull::new(unsafe { alloc::alloc(layout) })?;
      self.acquired.push(layout.size());
      self.live += 1;
      Some(block)
    }

    unsafe fn release(
      &mut self,
      block: NonNull<u8>,
      layout: Layout,
    ) -> bool {
      unsafe { alloc::dealloc(block.as_ptr(), layout) };
      self.released += 1;
      self.live -= 1;
      !self.fail_release
    }
  }
}
