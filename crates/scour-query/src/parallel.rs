//! Scoped-thread fan-out for plan execution
//!
//! Splits work into contiguous chunks, runs each chunk on its own scoped
//! thread and joins them in order, so output order always equals input order.

use std::thread;

/// Get the number of available CPU cores
pub fn num_cpus() -> usize {
    thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(4)
}

/// Map `f` over `items` on up to `max_threads` threads, preserving order.
/// A panic in a worker is resumed on the calling thread.
pub fn map_chunked<T, R, F>(items: &[T], max_threads: usize, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    let num_threads = max_threads.min(items.len());
    if num_threads <= 1 {
        return items.iter().map(f).collect();
    }

    let chunk_size = items.len().div_ceil(num_threads);
    thread::scope(|s| {
        let f = &f;
        let handles: Vec<_> = items
            .chunks(chunk_size)
            .map(|chunk| s.spawn(move || chunk.iter().map(f).collect::<Vec<R>>()))
            .collect();

        let mut out = Vec::with_capacity(items.len());
        for handle in handles {
            match handle.join() {
                Ok(part) => out.extend(part),
                Err(payload) => std::panic::resume_unwind(payload),
            }
        }
        out
    })
}
