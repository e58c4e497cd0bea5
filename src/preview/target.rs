use super::element::ElementNode;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TARGET_ID: AtomicU64 = AtomicU64::new(1);

/// Mounted component output. Created once and re-rendered in place.
#[derive(Debug)]
pub struct RenderTarget {
    id: u64,
    tree: ElementNode,
    renders: usize,
}

impl RenderTarget {
    fn create(tree: ElementNode) -> Self {
        let id = NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed);
        log::debug!("render target {id} created");
        Self {
            id,
            tree,
            renders: 1,
        }
    }

    fn render(&mut self, tree: ElementNode) {
        self.tree = tree;
        self.renders += 1;
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn tree(&self) -> &ElementNode {
        &self.tree
    }

    /// Number of renders into this target, counting the first mount.
    pub fn renders(&self) -> usize {
        self.renders
    }
}

impl Drop for RenderTarget {
    fn drop(&mut self) {
        log::debug!("render target {} released after {} renders", self.id, self.renders);
    }
}

/// The preview area: either a mounted component tree or raw markup.
#[derive(Debug, Default)]
pub struct PreviewRegion {
    target: Option<RenderTarget>,
    markup: Option<String>,
}

impl PreviewRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `tree`, creating the target on first use.
    pub fn mount(&mut self, tree: ElementNode) {
        match self.target.as_mut() {
            Some(target) => target.render(tree),
            None => self.target = Some(RenderTarget::create(tree)),
        }
    }

    /// Replaces the inner markup verbatim.
    pub fn set_markup(&mut self, markup: impl Into<String>) {
        self.markup = Some(markup.into());
    }

    pub fn clear_markup(&mut self) {
        self.markup = None;
    }

    pub fn markup(&self) -> Option<&str> {
        self.markup.as_deref()
    }

    pub fn target(&self) -> Option<&RenderTarget> {
        self.target.as_ref()
    }

    pub fn mounted_tree(&self) -> Option<&ElementNode> {
        self.target.as_ref().map(RenderTarget::tree)
    }

    /// Drops the render target and any markup.
    pub fn release(&mut self) {
        self.target = None;
        self.markup = None;
    }
}
