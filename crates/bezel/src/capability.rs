/// A behavior class a node can opt into.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Capability {
    /// The node emits a draw command when visible.
    Drawable,
    /// The node can take keyboard focus.
    Focusable,
    /// The node's children are offset by its scroll position.
    Scrollable,
}

/// The set of capabilities a node has. Queried at runtime in place of a type
/// hierarchy.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Hash)]
pub struct Capabilities {
    /// See [`Capability::Drawable`].
    pub drawable: bool,
    /// See [`Capability::Focusable`].
    pub focusable: bool,
    /// See [`Capability::Scrollable`].
    pub scrollable: bool,
}

impl Capabilities {
    /// A set with a single capability turned on.
    pub fn new(cap: Capability) -> Self {
        Self::default().with(cap)
    }

    /// A helper for progressive construction.
    pub fn with(mut self, cap: Capability) -> Self {
        match cap {
            Capability::Drawable => self.drawable = true,
            Capability::Focusable => self.focusable = true,
            Capability::Scrollable => self.scrollable = true,
        }
        self
    }

    /// Does the set include this capability?
    pub fn has(&self, cap: Capability) -> bool {
        match cap {
            Capability::Drawable => self.drawable,
            Capability::Focusable => self.focusable,
            Capability::Scrollable => self.scrollable,
        }
    }

    /// True if no capability is set.
    pub fn is_empty(&self) -> bool {
        !(self.drawable || self.focusable || self.scrollable)
    }
}

impl From<Capability> for Capabilities {
    fn from(cap: Capability) -> Self {
        Self::new(cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progressive() {
        let caps = Capabilities::new(Capability::Drawable).with(Capability::Focusable);
        assert!(caps.has(Capability::Drawable));
        assert!(caps.has(Capability::Focusable));
        assert!(!caps.has(Capability::Scrollable));
        assert!(Capabilities::default().is_empty());
    }
}
