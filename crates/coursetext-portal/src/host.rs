use std::sync::{Arc, PoisonError, RwLock};

/// A container that rendered HTML is injected into and read back from.
pub trait MarkerHost: Send + Sync + 'static {
    fn inject(&self, html: &str);

    /// The container's current HTML, or `None` once it has been detached.
    fn snapshot(&self) -> Option<String>;
}

#[derive(Debug, Default)]
struct HostState {
    html: String,
    detached: bool,
    injections: usize,
}

/// A [`MarkerHost`] backed by a string. Clones share the same container.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHost {
    state: Arc<RwLock<HostState>>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap the container's content without counting it as an injection,
    /// the way a host framework re-renders a subtree.
    pub fn replace(&self, html: impl Into<String>) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .html = html.into();
    }

    pub fn detach(&self) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .detached = true;
    }

    /// Number of [`MarkerHost::inject`] calls so far.
    pub fn injections(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .injections
    }
}

impl MarkerHost for InMemoryHost {
    fn inject(&self, html: &str) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.html = html.to_owned();
        state.injections += 1;
    }

    fn snapshot(&self) -> Option<String> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        (!state.detached).then(|| state.html.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_content() {
        let host = InMemoryHost::new();
        let other = host.clone();
        host.inject("<p>a</p>");
        other.replace("<p>b</p>");
        assert_eq!(host.snapshot().as_deref(), Some("<p>b</p>"));
        assert_eq!(host.injections(), 1);
    }

    #[test]
    fn detached_host_has_no_snapshot() {
        let host = InMemoryHost::new();
        host.inject("x");
        host.detach();
        assert_eq!(host.snapshot(), None);
    }
}
