//! # rarena - A Paged Arena Allocator
//!
//! This crate provides a region based **arena allocator**: blocks of any size are
//! bumped out of large preallocated pages, and are reclaimed all at once instead
//! of one by one.
//!
//! ## Overview
//!
//! ```text
//!   Arena Concept:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                              ARENA                                   │
//!   │                                                                      │
//!   │   page 0                          page 1                             │
//!   │   ┌─────┬─────┬─────┬─────┬────┐  ┌──────────┬─────┬──────────────┐  │
//!   │   │ A1  │ A2  │ A3  │ A4  │    │  │   A5     │ A6  │  Free Space  │  │
//!   │   └─────┴─────┴─────┴─────┴────┘  └──────────┴─────┴──────────────┘  │
//!   │                                                    ▲                 │
//!   │                                                    │                 │
//!   │                                               Fill cursor            │
//!   │                                              (next alloc)            │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   Each allocation bumps the fill cursor of the current page.
//!   A request that does not fit moves on to the next page, or grows the chain.
//!   reset():   every cursor back to zero, pages kept.
//!   destroy(): every page handed back to the memory source.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   rarena
//!   ├── align      - Word size, align! macro, byte to word rounding
//!   ├── arena      - Arena, ArenaConfig, PageInfo
//!   ├── error      - ArenaError
//!   ├── page       - Page header and handle (internal)
//!   └── source     - MemorySource trait, LibcHeap
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rarena::{Arena, LibcHeap};
//!
//! let mut arena = Arena::new(LibcHeap);
//!
//! let value = arena.alloc(std::mem::size_of::<u64>()).unwrap().cast::<u64>();
//! unsafe {
//!     value.write(42);
//!     assert_eq!(value.read(), 42);
//! }
//!
//! // Everything allocated so far is gone, the pages stay.
//! arena.reset();
//! ```
//!
//! ## Page Layout
//!
//! Each page is a single block obtained from the memory source:
//!
//! ```text
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │     Page Header       │          Data Region           │
//!   │  ┌─────────────────┐  │  ┌──────┬──────┬────────────┐  │
//!   │  │ capacity: N     │  │  │ word │ word │    ...     │  │
//!   │  │ fill: F         │  │  └──────┴──────┴────────────┘  │
//!   │  └─────────────────┘  │        N words, F in use       │
//!   └───────────────────────┴────────────────────────────────┘
//!                           ▲
//!                           └── First block of the page
//! ```
//!
//! ## Memory Sources
//!
//! An arena never calls a global allocator itself. Pages come from a
//! [`MemorySource`] passed in at construction: [`LibcHeap`] for the C heap,
//! another [`Arena`] to nest arenas, or anything else implementing the trait.
//!
//! ## Limitations
//!
//! - **No per-block free**: memory comes back only through reset or destroy
//! - **Word alignment only**: blocks are aligned to `usize`, never more
//! - **Single-threaded**: an arena can move between threads but sharing one needs a lock
//!
//! ## Safety
//!
//! Allocation returns raw pointers. Dereferencing them is up to the caller and
//! is only valid until the next reset, destroy or drop of the arena.

pub mod align;
mod arena;
mod error;
mod page;
mod source;

pub use arena::{Arena, ArenaConfig, DEFAULT_PAGE_CAPACITY, PageInfo};
pub use error::ArenaError;
pub use source::{LibcHeap, MemorySource};
