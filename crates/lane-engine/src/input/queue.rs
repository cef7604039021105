use std::collections::VecDeque;

/// Raw input forwarded by the page, in world coordinates and DOM key codes.
/// Games give these meaning; the engine does not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
    KeyDown { key_code: u32 },
    KeyUp { key_code: u32 },
    /// From the UI layer (on-screen buttons). `kind` is game-defined.
    Custom { kind: u32, a: f32, b: f32, c: f32 },
}

/// DOM key codes forwarded by the page.
pub mod keys {
    pub const SPACE: u32 = 32;
    pub const ARROW_LEFT: u32 = 37;
    pub const ARROW_RIGHT: u32 = 39;
    pub const P: u32 = 80;
}

/// Events received since the last frame.
///
/// While the page is hidden no frames run but key repeat and touches keep
/// arriving, so the queue is bounded: past `limit` the oldest event is
/// dropped.
pub struct InputQueue {
    events: VecDeque<InputEvent>,
    limit: usize,
    dropped: usize,
}

impl InputQueue {
    pub const DEFAULT_LIMIT: usize = 64;

    pub fn new() -> Self {
        Self::with_limit(Self::DEFAULT_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            events: VecDeque::with_capacity(limit),
            limit,
            dropped: 0,
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        if self.events.len() == self.limit {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(event);
    }

    /// Pending events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    /// Forget everything seen this frame. Returns how many events overflowed
    /// since the previous clear.
    pub fn clear(&mut self) -> usize {
        self.events.clear();
        std::mem::take(&mut self.dropped)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_arrival_order_until_cleared() {
        let mut q = InputQueue::new();
        q.push(InputEvent::KeyDown { key_code: keys::ARROW_LEFT });
        q.push(InputEvent::KeyUp { key_code: keys::ARROW_LEFT });
        q.push(InputEvent::Custom { kind: 3, a: 1.0, b: 0.0, c: 0.0 });

        let seen: Vec<_> = q.iter().copied().collect();
        assert_eq!(
            seen,
            vec![
                InputEvent::KeyDown { key_code: 37 },
                InputEvent::KeyUp { key_code: 37 },
                InputEvent::Custom { kind: 3, a: 1.0, b: 0.0, c: 0.0 },
            ]
        );
        // iter does not consume
        assert_eq!(q.len(), 3);

        assert_eq!(q.clear(), 0);
        assert!(q.is_empty());
    }

    #[test]
    fn overflow_drops_oldest() {
        let mut q = InputQueue::with_limit(2);
        for key_code in [1, 2, 3] {
            q.push(InputEvent::KeyDown { key_code });
        }
        let codes: Vec<_> = q
            .iter()
            .map(|e| match e {
                InputEvent::KeyDown { key_code } => *key_code,
                _ => 0,
            })
            .collect();
        assert_eq!(codes, vec![2, 3]);
        assert_eq!(q.clear(), 1);
        // The counter restarts after a clear
        assert_eq!(q.clear(), 0);
    }
}
