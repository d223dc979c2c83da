use std::mem;

/// Size in bytes of one page slot. Pages are measured in these units.
pub const WORD_SIZE: usize = mem::size_of::<usize>();

/// Rounds a byte count up to the next multiple of the machine word.
///
/// # Examples
///
/// ```rust
/// use rarena::align;
///
/// match std::mem::size_of::<usize>() {
///     8 => assert_eq!(align!(13), 16), // 64 bit machine.
///     4 => assert_eq!(align!(11), 12), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + $crate::align::WORD_SIZE - 1) & !($crate::align::WORD_SIZE - 1)
  };
}

/// Number of word slots needed to hold `bytes`, rounding up.
///
/// Unlike [`align!`] this never overflows, even for `usize::MAX`.
#[inline]
pub fn words_for(bytes: usize) -> usize {
  bytes.div_ceil(WORD_SIZE)
}
