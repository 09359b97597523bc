#![forbid(unsafe_code)]

//! The contract between the engine and the component that owns real elements.

/// Creates, refreshes and measures the reusable elements backing each slot.
///
/// The engine never looks inside an element. It asks the host to create
/// elements when the pool grows, to show a logical index in an element when
/// the slot is recycled, and to report how large the element rendered along
/// the scroll axis.
pub trait ElementHost {
    /// Handle to one reusable element.
    type Element;

    /// Create `count` new elements. Should return exactly `count` handles;
    /// surplus handles are dropped and a shortfall just yields a smaller pool.
    fn create_elements(&mut self, count: usize) -> Vec<Self::Element>;

    /// Show the item at logical `index` in `element`.
    fn update_element(&mut self, element: &mut Self::Element, index: usize);

    /// Rendered extent of `element` along the scroll axis.
    ///
    /// `0.0` means the element has not rendered yet. The engine substitutes a
    /// placeholder extent until a later resize notification reports the real one.
    fn measure(&self, element: &Self::Element) -> f64;

    /// Register a freshly created element with the host's resize watcher.
    fn observe(&mut self, element: &Self::Element) {
        let _ = element;
    }
}
