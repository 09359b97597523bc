#![forbid(unsafe_code)]

//! In-memory host for tests, benchmarks and headless use.
//!
//! [`SimHost`] renders every item at a fixed extent unless a per-index
//! override says otherwise, and records each `update_element` call so tests
//! can assert on exactly which slots were refreshed.

use std::collections::BTreeMap;

use crate::host::ElementHost;

/// Element created by [`SimHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimElement {
    id: usize,
    index: Option<usize>,
    updates: usize,
}

impl SimElement {
    /// Creation number, unique per host.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Logical index last shown, `None` before the first update.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Number of times the element was refreshed.
    #[must_use]
    pub fn updates(&self) -> usize {
        self.updates
    }
}

/// Host with deterministic item extents.
#[derive(Debug, Clone)]
pub struct SimHost {
    item_extent: f64,
    overrides: BTreeMap<usize, f64>,
    lazy: bool,
    created: usize,
    observed: usize,
    log: Vec<(usize, usize)>,
    logging: bool,
}

impl SimHost {
    /// Host rendering every item `item_extent` pixels tall.
    #[must_use]
    pub fn new(item_extent: f64) -> Self {
        Self {
            item_extent,
            overrides: BTreeMap::new(),
            lazy: false,
            created: 0,
            observed: 0,
            log: Vec::new(),
            logging: true,
        }
    }

    /// Render item `index` at `extent` instead of the default.
    #[must_use]
    pub fn with_extent(mut self, index: usize, extent: f64) -> Self {
        self.overrides.insert(index, extent);
        self
    }

    /// Do not record update calls.
    #[must_use]
    pub fn without_update_log(mut self) -> Self {
        self.logging = false;
        self
    }

    /// Change the extent of item `index`. Report it with
    /// [`Resize::Element`](crate::Resize::Element) afterwards.
    pub fn set_extent(&mut self, index: usize, extent: f64) {
        self.overrides.insert(index, extent);
    }

    /// Change the default extent of every item without an override.
    pub fn set_item_extent(&mut self, extent: f64) {
        self.item_extent = extent;
    }

    /// While lazy, elements report `0.0` (not rendered yet).
    pub fn set_lazy(&mut self, lazy: bool) {
        self.lazy = lazy;
    }

    /// Extent item `index` renders at.
    #[must_use]
    pub fn extent_of(&self, index: usize) -> f64 {
        self.overrides
            .get(&index)
            .copied()
            .unwrap_or(self.item_extent)
    }

    /// Elements created so far.
    #[must_use]
    pub fn created(&self) -> usize {
        self.created
    }

    /// Elements registered with the resize watcher.
    #[must_use]
    pub fn observed(&self) -> usize {
        self.observed
    }

    /// `(element id, logical index)` for every update call, oldest first.
    #[must_use]
    pub fn update_log(&self) -> &[(usize, usize)] {
        &self.log
    }

    /// Forget recorded update calls.
    pub fn clear_update_log(&mut self) {
        self.log.clear();
    }
}

impl ElementHost for SimHost {
    type Element = SimElement;

    fn create_elements(&mut self, count: usize) -> Vec<SimElement> {
        let start = self.created;
        self.created += count;
        (start..self.created)
            .map(|id| SimElement {
                id,
                index: None,
                updates: 0,
            })
            .collect()
    }

    fn update_element(&mut self, element: &mut SimElement, index: usize) {
        element.index = Some(index);
        element.updates += 1;
        if self.logging {
            self.log.push((element.id, index));
        }
    }

    fn measure(&self, element: &SimElement) -> f64 {
        if self.lazy {
            return 0.0;
        }
        element.index.map_or(0.0, |index| self.extent_of(index))
    }

    fn observe(&mut self, _element: &SimElement) {
        self.observed += 1;
    }
}
