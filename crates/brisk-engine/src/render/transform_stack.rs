use crate::coords::Transform;

/// Current affine transform plus a bounded save/restore stack.
///
/// New transforms compose inside the current one (see [`Transform::then_local`]),
/// so `translate` followed by `scale` scales in the translated frame.
#[derive(Debug, Clone)]
pub struct TransformStack {
    current: Transform,
    saved: Vec<Transform>,
    max_depth: usize,
}

impl TransformStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            current: Transform::IDENTITY,
            saved: Vec::with_capacity(max_depth),
            max_depth,
        }
    }

    #[inline]
    pub fn current(&self) -> Transform {
        self.current
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Saves the current transform.
    ///
    /// # Panics
    /// When the stack already holds `max_depth` entries (unbalanced push/pop).
    pub fn push(&mut self) {
        assert!(
            self.saved.len() < self.max_depth,
            "transform stack overflow: depth {} exceeds limit {}; push/pop are unbalanced",
            self.saved.len() + 1,
            self.max_depth
        );
        self.saved.push(self.current);
    }

    /// Restores the most recently pushed transform; no-op on an empty stack.
    pub fn pop(&mut self) {
        if let Some(t) = self.saved.pop() {
            self.current = t;
        }
    }

    pub fn origin(&mut self) {
        self.current = Transform::IDENTITY;
    }

    pub fn apply(&mut self, t: Transform) {
        self.current = self.current.then_local(t);
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.apply(Transform::translation(x, y));
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.apply(Transform::scaling(sx, sy));
    }

    pub fn rotate(&mut self, angle: f32) {
        self.apply(Transform::rotation(angle));
    }

    /// Identity transform and an empty stack; run at every frame start.
    pub fn reset(&mut self) {
        self.current = Transform::IDENTITY;
        self.saved.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;
    use approx::assert_relative_eq;

    #[test]
    fn pop_restores_pushed_transform() {
        let mut s = TransformStack::new(4);
        s.translate(10.0, 5.0);
        let before = s.current();

        s.push();
        s.rotate(1.3);
        s.scale(3.0, 0.5);
        s.translate(-7.0, 2.0);
        s.pop();

        assert_eq!(s.current(), before);
        assert_eq!(s.depth(), 0);
    }

    #[test]
    fn pop_on_empty_stack_is_noop() {
        let mut s = TransformStack::new(4);
        s.scale(2.0, 2.0);
        s.pop();
        assert_eq!(s.current(), Transform::scaling(2.0, 2.0));
    }

    #[test]
    fn later_transforms_apply_first() {
        let mut s = TransformStack::new(4);
        s.translate(100.0, 0.0);
        s.scale(2.0, 2.0);
        let p = s.current().transform_point(Vec2::new(1.0, 1.0));
        assert_relative_eq!(p.x, 102.0);
        assert_relative_eq!(p.y, 2.0);
    }

    #[test]
    #[should_panic(expected = "transform stack overflow")]
    fn overflow_panics() {
        let mut s = TransformStack::new(2);
        s.push();
        s.push();
        s.push();
    }

    #[test]
    fn reset_clears_stack() {
        let mut s = TransformStack::new(4);
        s.push();
        s.translate(1.0, 1.0);
        s.reset();
        assert_eq!(s.depth(), 0);
        assert_eq!(s.current(), Transform::IDENTITY);
    }
}
