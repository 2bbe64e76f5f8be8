/// A queue of game intents.
///
/// The UI layer translates raw pointer/keyboard input into the game's intent
/// type and pushes it here; the game reads the pending intents each tick and
/// the runner drains them afterwards.
pub struct InputQueue<I> {
    events: Vec<I>,
}

impl<I> InputQueue<I> {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    /// Push a new intent.
    pub fn push(&mut self, event: I) {
        self.events.push(event);
    }

    /// Drain all pending intents. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<I> {
        std::mem::take(&mut self.events)
    }

    /// Iterate over pending intents without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &I> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl<I> Default for InputQueue<I> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Intent {
        Press(u32),
        Aim { angle: f32 },
    }

    #[test]
    fn push_and_drain_keeps_order() {
        let mut q = InputQueue::new();
        q.push(Intent::Press(1));
        q.push(Intent::Aim { angle: 0.5 });
        assert_eq!(q.len(), 2);
        let events = q.drain();
        assert_eq!(events, vec![Intent::Press(1), Intent::Aim { angle: 0.5 }]);
        assert!(q.is_empty());
    }

    #[test]
    fn iter_does_not_consume() {
        let mut q = InputQueue::new();
        q.push(Intent::Press(7));
        assert_eq!(q.iter().count(), 1);
        assert_eq!(q.len(), 1);
    }
}
