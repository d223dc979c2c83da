use std::{mem, ptr};

use rarena::{Arena, ArenaConfig, LibcHeap, PageInfo};

/// Prints every page in the chain with its fill level.
fn print_pages(
  label: &str,
  pages: impl Iterator<Item = PageInfo>,
) {
  println!("[{}]", label);
  for (i, page) in pages.enumerate() {
    println!(
      "  page {}: base = {:?}, fill = {}/{} words",
      i, page.base, page.fill, page.capacity
    );
  }
}

fn main() {
  // Small pages so growth shows up after a handful of allocations.
  let config = ArenaConfig::new().with_page_capacity(16);
  let mut arena = Arena::with_config(config, LibcHeap);

  print_pages("start", arena.pages());

  // --------------------------------------------------------------------
  // 1) A u32 takes a whole word slot. The first page is acquired lazily.
  // --------------------------------------------------------------------
  let first = arena.alloc(mem::size_of::<u32>()).unwrap().cast::<u32>();
  unsafe { first.write(0xDEADBEEF) };
  println!("\n[1] Allocated u32 at {:?}, value = 0x{:X}", first, unsafe { first.read() });
  print_pages("after u32", arena.pages());

  // --------------------------------------------------------------------
  // 2) 12 bytes round up to whole words.
  // --------------------------------------------------------------------
  let second = arena.alloc(12).unwrap();
  unsafe { ptr::write_bytes(second.as_ptr(), 0xAB, 12) };
  println!("\n[2] Allocated [u8; 12] at {:?}", second);
  print_pages("after [u8; 12]", arena.pages());

  // --------------------------------------------------------------------
  // 3) A request larger than what is left gets a page of its own size.
  // --------------------------------------------------------------------
  let big = arena.alloc(64 * mem::size_of::<usize>()).unwrap();
  println!("\n[3] Allocated 64 words at {:?}", big);
  print_pages("after growth", arena.pages());

  // --------------------------------------------------------------------
  // 4) Reset keeps the pages and hands out the same addresses again.
  // --------------------------------------------------------------------
  arena.reset();
  let again = arena.alloc(mem::size_of::<u32>()).unwrap().cast::<u32>();
  println!("\n[4] After reset, first block reused? {}", again == first);
  print_pages("after reset", arena.pages());

  // --------------------------------------------------------------------
  // 5) Destroy hands every page back to the C heap.
  // --------------------------------------------------------------------
  let pages = arena.page_count();
  arena.destroy().unwrap();
  println!("\n[5] Released {} pages, {} left", pages, arena.page_count());
}
