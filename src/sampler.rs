//! Stack capture types.
//!
//! The core pipeline never captures stacks itself; the host supplies a
//! [`StackSampler`] for the UI-owning thread and the pipeline consumes its
//! [`StackSnapshot`] output.

/// An ordered sequence of call-stack frame descriptors captured at one
/// sampling instant. Each frame is a human-readable location string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackSnapshot {
    frames: Vec<String>,
}

impl StackSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a snapshot from frame location strings, outermost last.
    pub fn from_frames(frames: Vec<String>) -> Self {
        Self { frames }
    }

    /// Frame location strings in capture order.
    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    /// Whether the capture produced no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of captured frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl FromIterator<String> for StackSnapshot {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

/// On-demand capture of the designated thread's call stack.
///
/// Supplied by the host environment. Implemented for any
/// `Fn() -> StackSnapshot` closure so hosts and tests can pass one directly.
pub trait StackSampler: Send + Sync + 'static {
    /// Capture the current stack of the designated thread.
    ///
    /// An empty snapshot is a valid result and is silently dropped
    /// downstream; capture must never panic.
    fn capture(&self) -> StackSnapshot;
}

impl<F> StackSampler for F
where
    F: Fn() -> StackSnapshot + Send + Sync + 'static,
{
    fn capture(&self) -> StackSnapshot {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_frames() {
        let snapshot = StackSnapshot::from_frames(vec![
            "com.app.Main.render:42".to_string(),
            "com.app.Main.main:10".to_string(),
        ]);
        assert_eq!(snapshot.len(), 2);
        assert!(!snapshot.is_empty());
        assert_eq!(snapshot.frames()[0], "com.app.Main.render:42");
    }

    #[test]
    fn test_snapshot_empty() {
        assert!(StackSnapshot::new().is_empty());
        assert_eq!(StackSnapshot::new().len(), 0);
    }

    #[test]
    fn test_closure_sampler() {
        let sampler = || StackSnapshot::from_frames(vec!["frame".to_string()]);
        let snapshot = StackSampler::capture(&sampler);
        assert_eq!(snapshot.frames(), ["frame".to_string()]);
    }
}
