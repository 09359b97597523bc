#![forbid(unsafe_code)]

//! Bounded pool of reusable slots.
//!
//! A slot is created once, when the pool grows to cover the viewport, and is
//! never destroyed while the pool lives. Slots are addressed by their
//! *physical position* (creation order). The pool separately tracks the
//! *document order* of the backing elements, which starts equal to creation
//! order and is rearranged by the engine's reorder pass.

/// One reusable renderable unit.
#[derive(Debug)]
pub struct Slot<E> {
    element: E,
    physical: usize,
    pub(crate) virtual_index: Option<usize>,
    pub(crate) logical_index: Option<usize>,
    pub(crate) last_updated: Option<usize>,
    pub(crate) hidden: bool,
    pub(crate) extent: f64,
    pub(crate) offset: f64,
    pub(crate) placeholder: bool,
}

impl<E> Slot<E> {
    fn new(element: E, physical: usize) -> Self {
        Self {
            element,
            physical,
            virtual_index: None,
            logical_index: None,
            last_updated: None,
            hidden: true,
            extent: 0.0,
            offset: 0.0,
            placeholder: false,
        }
    }

    /// Backing element.
    #[must_use]
    pub fn element(&self) -> &E {
        &self.element
    }

    pub(crate) fn element_mut(&mut self) -> &mut E {
        &mut self.element
    }

    /// Position within the pool (creation order).
    #[must_use]
    pub fn physical_position(&self) -> usize {
        self.physical
    }

    /// Logical index the slot currently shows, if visible.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        if self.hidden { None } else { self.logical_index }
    }

    /// Whether the slot currently represents an item.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !self.hidden
    }

    /// Extent used for layout (measured, or placeholder).
    #[must_use]
    pub fn measured_extent(&self) -> f64 {
        self.extent
    }

    /// Start position along the scroll axis, in content coordinates.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Whether the slot is padded with a placeholder extent because its
    /// content reported zero size.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

/// Growable, never-shrinking set of slots.
#[derive(Debug)]
pub struct SlotPool<E> {
    slots: Vec<Slot<E>>,
    order: Vec<usize>,
}

impl<E> Default for SlotPool<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> SlotPool<E> {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slot exists yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Grow the pool to at least `n` slots.
    ///
    /// `create` is called once with the number of missing slots. Returns the
    /// range of physical positions that were added (empty when the pool was
    /// already large enough).
    pub fn ensure_capacity<F>(&mut self, n: usize, create: F) -> std::ops::Range<usize>
    where
        F: FnOnce(usize) -> Vec<E>,
    {
        let start = self.slots.len();
        if n <= start {
            return start..start;
        }
        let missing = n - start;
        let created = create(missing);
        if created.len() != missing {
            tracing::warn!(
                requested = missing,
                returned = created.len(),
                "host returned a different number of elements than requested"
            );
        }
        for element in created.into_iter().take(missing) {
            let physical = self.slots.len();
            self.slots.push(Slot::new(element, physical));
            self.order.push(physical);
        }
        start..self.slots.len()
    }

    /// Slot at a physical position.
    #[must_use]
    pub fn get(&self, physical: usize) -> Option<&Slot<E>> {
        self.slots.get(physical)
    }

    pub(crate) fn get_mut(&mut self, physical: usize) -> Option<&mut Slot<E>> {
        self.slots.get_mut(physical)
    }

    /// Measured extent of a slot, `0.0` for an unknown position.
    #[must_use]
    pub fn extent(&self, physical: usize) -> f64 {
        self.slots.get(physical).map_or(0.0, |slot| slot.extent)
    }

    /// All slots in physical order.
    pub fn iter(&self) -> impl Iterator<Item = &Slot<E>> {
        self.slots.iter()
    }

    /// Visible slots in document order. Re-evaluated on every call.
    pub fn visible_slots(&self) -> impl Iterator<Item = &Slot<E>> + '_ {
        self.order
            .iter()
            .filter_map(|&physical| self.slots.get(physical))
            .filter(|slot| !slot.hidden)
    }

    /// Mark slots representing virtual indices at or past `virtual_count`
    /// as hidden. Hidden slots stay in the pool for later reuse.
    pub fn hide_slots_beyond(&mut self, virtual_count: usize) {
        for slot in &mut self.slots {
            if slot.virtual_index.is_some_and(|v| v >= virtual_count) {
                slot.hidden = true;
                slot.virtual_index = None;
                slot.logical_index = None;
                slot.last_updated = None;
                slot.placeholder = false;
            }
        }
    }

    /// Whether any visible slot is padded with a placeholder extent.
    #[must_use]
    pub fn has_placeholders(&self) -> bool {
        self.slots.iter().any(|slot| !slot.hidden && slot.placeholder)
    }

    /// Physical positions in document order.
    #[must_use]
    pub fn document_order(&self) -> &[usize] {
        &self.order
    }

    /// Move an element to the end of the document.
    pub(crate) fn move_to_end(&mut self, physical: usize) {
        if let Some(pos) = self.order.iter().position(|&p| p == physical) {
            self.order.remove(pos);
            self.order.push(physical);
        }
    }

    /// Move an element directly before another one in the document.
    pub(crate) fn move_before(&mut self, physical: usize, before: usize) {
        if physical == before {
            return;
        }
        let Some(from) = self.order.iter().position(|&p| p == physical) else {
            return;
        };
        self.order.remove(from);
        let to = self
            .order
            .iter()
            .position(|&p| p == before)
            .unwrap_or(self.order.len());
        self.order.insert(to, physical);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_of(n: usize) -> SlotPool<u32> {
        let mut pool = SlotPool::new();
        pool.ensure_capacity(n, |count| (0..count as u32).collect());
        pool
    }

    #[test]
    fn ensure_capacity_grows_and_reports_range() {
        let mut pool = SlotPool::new();
        let added = pool.ensure_capacity(3, |count| vec![7u8; count]);
        assert_eq!(added, 0..3);
        let added = pool.ensure_capacity(5, |count| vec![8u8; count]);
        assert_eq!(added, 3..5);
        assert_eq!(pool.len(), 5);
        assert_eq!(*pool.get(4).unwrap().element(), 8);
    }

    #[test]
    fn ensure_capacity_is_idempotent_and_never_shrinks() {
        let mut pool = pool_of(4);
        let mut calls = 0;
        let added = pool.ensure_capacity(4, |count| {
            calls += 1;
            vec![0; count]
        });
        assert!(added.is_empty());
        let added = pool.ensure_capacity(2, |count| {
            calls += 1;
            vec![0; count]
        });
        assert!(added.is_empty());
        assert_eq!(calls, 0);
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn short_host_yields_smaller_pool() {
        let mut pool: SlotPool<u8> = SlotPool::new();
        let added = pool.ensure_capacity(4, |_| vec![1, 2]);
        assert_eq!(added, 0..2);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn new_slots_start_hidden() {
        let pool = pool_of(3);
        assert_eq!(pool.visible_slots().count(), 0);
        assert!(pool.iter().all(|slot| slot.index().is_none()));
    }

    #[test]
    fn hide_slots_beyond_keeps_slots() {
        let mut pool = pool_of(4);
        for (i, slot) in pool.slots.iter_mut().enumerate() {
            slot.hidden = false;
            slot.virtual_index = Some(i);
            slot.logical_index = Some(i);
        }
        pool.hide_slots_beyond(2);
        assert_eq!(pool.len(), 4);
        let visible: Vec<_> = pool.visible_slots().filter_map(Slot::index).collect();
        assert_eq!(visible, vec![0, 1]);
    }

    #[test]
    fn document_order_moves() {
        let mut pool = pool_of(4);
        pool.move_to_end(0);
        assert_eq!(pool.document_order(), &[1, 2, 3, 0]);
        pool.move_before(0, 1);
        assert_eq!(pool.document_order(), &[0, 1, 2, 3]);
        pool.move_before(3, 1);
        assert_eq!(pool.document_order(), &[0, 3, 1, 2]);
    }
}
