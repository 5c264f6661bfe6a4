use smallvec::SmallVec;

/// A list of listeners notified every time the signal is emitted.
pub struct Signal<P1: Copy = ()> {
    listeners: SmallVec<[Box<dyn FnMut(P1)>; 2]>,
}

impl<P1: Copy> Signal<P1> {
    pub fn new() -> Self {
        Self {
            listeners: SmallVec::new(),
        }
    }

    pub fn connect(&mut self, listener: impl FnMut(P1) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn emit(&mut self, value: P1) {
        for listener in &mut self.listeners {
            listener(value);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Moves every listener of `other` to the end of this signal.
    pub fn append(&mut self, other: &mut Signal<P1>) {
        self.listeners.extend(other.listeners.drain(..));
    }
}

impl<P1: Copy> Default for Signal<P1> {
    fn default() -> Self {
        Self::new()
    }
}
