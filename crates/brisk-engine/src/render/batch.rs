use super::Vertex;

/// Pre-allocated vertex accumulator for one draw call.
///
/// Capacity is fixed at construction; the storage is reused across flushes
/// and frames without reallocating.
#[derive(Debug)]
pub struct VertexBatch {
    vertices: Vec<Vertex>,
    capacity: usize,
}

impl VertexBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True when `extra` more vertices do not fit.
    #[inline]
    pub fn would_overflow(&self, extra: usize) -> bool {
        self.vertices.len() + extra > self.capacity
    }

    /// # Panics
    /// If the batch is full; callers flush first.
    #[inline]
    pub fn push(&mut self, v: Vertex) {
        assert!(self.vertices.len() < self.capacity, "vertex batch overflow");
        self.vertices.push(v);
    }

    #[inline]
    pub fn as_slice(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn clear(&mut self) {
        self.vertices.clear();
    }
}
