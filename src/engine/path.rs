//! Append-only trajectory with structural sharing.
//!
//! Points live in sealed fixed-size chunks linked newest-first, plus a short
//! mutable tail. Cloning a `Path` copies two pointers; appending touches only
//! the tail, so a path shared with an older snapshot costs at most one
//! tail copy (`CHUNK` points) per append instead of the whole history.

use std::fmt;
use std::sync::Arc;

use super::events::Coord;

/// Points per sealed chunk.
const CHUNK: usize = 64;

struct Sealed {
    prev: Option<Arc<Sealed>>,
    points: Box<[Coord]>,
}

// Unlink iteratively; a long chain would otherwise drop recursively.
impl Drop for Sealed {
    fn drop(&mut self) {
        let mut next = self.prev.take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut node) => next = node.prev.take(),
                Err(_) => break,
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct Path {
    sealed: Option<Arc<Sealed>>,
    tail: Arc<Vec<Coord>>,
    len: usize,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn last(&self) -> Option<&Coord> {
        self.tail
            .last()
            .or_else(|| self.sealed.as_ref().and_then(|s| s.points.last()))
    }

    pub fn push(&mut self, coord: Coord) {
        if self.tail.len() >= CHUNK {
            let full = match Arc::try_unwrap(std::mem::take(&mut self.tail)) {
                Ok(points) => points,
                Err(shared) => shared.as_ref().clone(),
            };
            self.sealed = Some(Arc::new(Sealed {
                prev: self.sealed.take(),
                points: full.into_boxed_slice(),
            }));
        }
        Arc::make_mut(&mut self.tail).push(coord);
        self.len += 1;
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Coord> + '_ {
        let mut chunks = Vec::new();
        let mut cur = self.sealed.as_deref();
        while let Some(node) = cur {
            chunks.push(&node.points[..]);
            cur = node.prev.as_deref();
        }
        chunks
            .into_iter()
            .rev()
            .flat_map(|c| c.iter())
            .chain(self.tail.iter())
    }

    pub fn to_vec(&self) -> Vec<Coord> {
        self.iter().copied().collect()
    }

    #[cfg(test)]
    pub(crate) fn tail_ptr(&self) -> *const Vec<Coord> {
        Arc::as_ptr(&self.tail)
    }

    #[cfg(test)]
    pub(crate) fn sealed_ptr(&self) -> Option<*const ()> {
        self.sealed.as_ref().map(|s| Arc::as_ptr(s) as *const ())
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> Path {
        let mut p = Path::new();
        for i in 0..n {
            p.push([i as f64, 0.0]);
        }
        p
    }

    #[test]
    fn test_order_across_chunks() {
        let p = line(CHUNK * 3 + 5);
        assert_eq!(p.len(), CHUNK * 3 + 5);
        let xs: Vec<f64> = p.iter().map(|c| c[0]).collect();
        let expected: Vec<f64> = (0..CHUNK * 3 + 5).map(|i| i as f64).collect();
        assert_eq!(xs, expected);
        assert_eq!(p.last(), Some(&[(CHUNK * 3 + 4) as f64, 0.0]));
    }

    #[test]
    fn test_last_on_chunk_boundary() {
        let p = line(CHUNK);
        assert_eq!(p.last(), Some(&[(CHUNK - 1) as f64, 0.0]));
        let mut p = p;
        p.push([-1.0, -1.0]);
        assert_eq!(p.last(), Some(&[-1.0, -1.0]));
        assert!(Path::new().last().is_none());
    }

    #[test]
    fn test_clone_is_isolated_and_shares_history() {
        let mut a = line(CHUNK * 2 + 3);
        let b = a.clone();
        a.push([99.0, 99.0]);

        assert_eq!(b.len(), CHUNK * 2 + 3);
        assert_eq!(a.len(), CHUNK * 2 + 4);
        assert_eq!(a.sealed_ptr(), b.sealed_ptr());
        assert_ne!(a.tail_ptr(), b.tail_ptr());
    }

    #[test]
    fn test_unshared_push_keeps_tail_allocation() {
        let mut p = line(CHUNK + 10);
        let before = p.tail_ptr();
        p.push([0.5, 0.5]);
        assert_eq!(p.tail_ptr(), before);
    }

    #[test]
    fn test_long_chain_drops() {
        drop(line(CHUNK * 20_000));
    }
}
