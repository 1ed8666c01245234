//! Global allocator selection.
//!
//! jemalloc is used on unix systems when the `jemalloc` feature is enabled (the default),
//! the system allocator otherwise.

#[cfg(all(feature = "jemalloc", unix))]
#[global_allocator]
static ALLOC: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;
