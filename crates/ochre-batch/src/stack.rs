/// Saved-value stack backing one push/pop render-state attribute.
///
/// The currently-active value lives on the batch tracker, not here; a push
/// saves the active value before the tracker activates the new one, and a
/// pop hands the saved value back for reactivation.
#[derive(Debug, Default)]
pub struct AttributeStack<T> {
    saved: Vec<T>,
}

impl<T> AttributeStack<T> {
    pub fn new() -> Self {
        Self { saved: Vec::new() }
    }

    #[inline]
    pub fn push(&mut self, active: T) {
        self.saved.push(active);
    }

    /// Pops the most recently saved value.
    ///
    /// Unbalanced pops are a caller bug.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        debug_assert!(!self.saved.is_empty(), "attribute stack underflow");
        self.saved.pop()
    }

    /// Most recently saved value, without popping.
    #[inline]
    pub fn peek(&self) -> Option<&T> {
        self.saved.last()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.saved.clear();
    }
}
