/// Single slot for data that arrived before its consumer exists
///
/// A newer value replaces an older one, taking the value empties the slot,
/// so whatever is stored gets applied at most once.
#[derive(Debug)]
pub struct Pending<T> {
    slot: Option<T>,
}

impl<T> Pending<T> {
    pub fn new() -> Pending<T> {
        Pending { slot: None }
    }

    /// Store `value`, returns the value it replaced
    pub fn put(&mut self, value: T) -> Option<T> {
        self.slot.replace(value)
    }

    pub fn take(&mut self) -> Option<T> {
        self.slot.take()
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }

    pub fn peek(&self) -> Option<&T> {
        self.slot.as_ref()
    }
}

impl<T> Default for Pending<T> {
    fn default() -> Self {
        Pending::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn newest_wins_and_applies_once() {
        let mut pending = Pending::new();
        assert!(!pending.is_pending());

        assert_eq!(pending.put(1), None);
        assert_eq!(pending.put(2), Some(1));
        assert_eq!(pending.peek(), Some(&2));

        assert_eq!(pending.take(), Some(2));
        assert_eq!(pending.take(), None);
        assert!(!pending.is_pending());
    }
}
