use std::collections::BTreeMap;

use tracing::debug;

use crate::camera::Viewer;

/// Deterministic key used by a [`Handler`] to track an entity.
pub trait Keyed {
    type Key: Ord + Clone;

    fn key(&self) -> Self::Key;
}

/// Per-frame update driven by [`Handler::update`].
///
/// `pending` lets an entity queue additions or removals while the handler is
/// iterating; they apply at the next flush.
pub trait Updatable<C: ?Sized>: Keyed + Sized {
    fn update(&mut self, extrp: f64, context: &mut C, pending: &mut Pending<Self>);
}

/// Draws an entity into `target`, using `viewer` for world to screen
/// transforms and culling.
pub trait Renderable<R: ?Sized> {
    fn render(&self, viewer: &dyn Viewer, target: &mut R);
}

/// Additions and removals waiting for the next flush.
pub struct Pending<E: Keyed> {
    to_add: Vec<E>,
    to_delete: Vec<E::Key>,
}

impl<E: Keyed> Default for Pending<E> {
    fn default() -> Self {
        Self {
            to_add: Vec::new(),
            to_delete: Vec::new(),
        }
    }
}

impl<E: Keyed> Pending<E> {
    pub fn add(&mut self, entity: E) {
        self.to_add.push(entity);
    }

    pub fn remove(&mut self, entity: &E) {
        self.to_delete.push(entity.key());
    }

    pub fn remove_key(&mut self, key: E::Key) {
        self.to_delete.push(key);
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_delete.is_empty()
    }
}

/// Keyed entity collection with two-phase mutation.
///
/// Nothing added or removed is visible through [`Handler::list`] or
/// [`Handler::get`] until the matching flush. [`Handler::update`] flushes
/// additions, updates every visible entity, then flushes removals, so an entity
/// removed during a cycle still gets that cycle's update. Adding an entity whose
/// key is already present replaces it on flush.
pub struct Handler<E: Keyed> {
    objects: BTreeMap<E::Key, E>,
    pending: Pending<E>,
}

impl<E: Keyed> Default for Handler<E> {
    fn default() -> Self {
        Self {
            objects: BTreeMap::new(),
            pending: Pending::default(),
        }
    }
}

impl<E: Keyed> Handler<E> {
    pub fn add(&mut self, entity: E) {
        self.pending.add(entity);
    }

    pub fn remove(&mut self, entity: &E) {
        self.pending.remove(entity);
    }

    pub fn remove_key(&mut self, key: E::Key) {
        self.pending.remove_key(key);
    }

    pub fn remove_all(&mut self) {
        let keys = self.objects.keys().cloned().collect::<Vec<_>>();
        self.pending.to_delete.extend(keys);
    }

    pub fn get(&self, key: &E::Key) -> Option<&E> {
        self.objects.get(key)
    }

    pub fn get_mut(&mut self, key: &E::Key) -> Option<&mut E> {
        self.objects.get_mut(key)
    }

    pub fn list(&self) -> impl Iterator<Item = &E> {
        self.objects.values()
    }

    pub fn list_mut(&mut self) -> impl Iterator<Item = &mut E> {
        self.objects.values_mut()
    }

    pub fn size(&self) -> usize {
        self.objects.len()
    }

    pub fn update<C: ?Sized>(&mut self, extrp: f64, context: &mut C)
    where
        E: Updatable<C>,
    {
        self.flush_add();
        for entity in self.objects.values_mut() {
            entity.update(extrp, context, &mut self.pending);
        }
        self.flush_delete();
    }

    /// Same ordering as [`Handler::update`] with a caller supplied callback.
    pub fn update_with<F>(&mut self, mut callback: F)
    where
        F: FnMut(&mut E, &mut Pending<E>),
    {
        self.flush_add();
        for entity in self.objects.values_mut() {
            callback(entity, &mut self.pending);
        }
        self.flush_delete();
    }

    pub fn render<R: ?Sized>(&self, viewer: &dyn Viewer, target: &mut R)
    where
        E: Renderable<R>,
    {
        for entity in self.objects.values() {
            entity.render(viewer, target);
        }
    }

    pub fn flush_add(&mut self) {
        if self.pending.to_add.is_empty() {
            return;
        }
        let count = self.pending.to_add.len();
        for entity in self.pending.to_add.drain(..) {
            self.objects.insert(entity.key(), entity);
        }
        debug!(count, size = self.objects.len(), "handler_flush_add");
    }

    pub fn flush_delete(&mut self) {
        if self.pending.to_delete.is_empty() {
            return;
        }
        let count = self.pending.to_delete.len();
        for key in self.pending.to_delete.drain(..) {
            self.objects.remove(&key);
        }
        debug!(count, size = self.objects.len(), "handler_flush_delete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::geom::Vec2;

    #[derive(Debug, Clone, PartialEq)]
    struct Dummy {
        id: u32,
        label: &'static str,
        updates: u32,
    }

    impl Dummy {
        fn new(id: u32) -> Self {
            Self {
                id,
                label: "dummy",
                updates: 0,
            }
        }
    }

    impl Keyed for Dummy {
        type Key = u32;

        fn key(&self) -> u32 {
            self.id
        }
    }

    #[derive(Default)]
    struct Log {
        updated: Vec<u32>,
    }

    impl Updatable<Log> for Dummy {
        fn update(&mut self, _extrp: f64, context: &mut Log, pending: &mut Pending<Self>) {
            self.updates += 1;
            context.updated.push(self.id);
            if self.id == 99 {
                pending.remove(self);
                pending.add(Dummy::new(100));
            }
        }
    }

    impl Renderable<Vec<u32>> for Dummy {
        fn render(&self, viewer: &dyn Viewer, target: &mut Vec<u32>) {
            if viewer.is_viewable(&Vec2::new(f64::from(self.id), 0.0), 0, 0) {
                target.push(self.id);
            }
        }
    }

    #[test]
    fn add_is_visible_after_update() {
        let mut handler = Handler::default();
        handler.add(Dummy::new(1));
        assert_eq!(handler.size(), 0);
        assert!(handler.get(&1).is_none());

        handler.update(1.0, &mut Log::default());
        assert_eq!(handler.size(), 1);
        assert_eq!(handler.get(&1).map(|dummy| dummy.updates), Some(1));
        assert_eq!(handler.list().count(), 1);
    }

    #[test]
    fn remove_takes_effect_after_update() {
        let mut handler = Handler::default();
        handler.add(Dummy::new(1));
        handler.update(1.0, &mut Log::default());

        let entity = handler.get(&1).cloned().expect("entity");
        handler.remove(&entity);
        assert_eq!(handler.size(), 1);

        let mut log = Log::default();
        handler.update(1.0, &mut log);
        assert_eq!(log.updated, vec![1]);
        assert_eq!(handler.size(), 0);
        assert!(handler.get(&1).is_none());
    }

    #[test]
    fn add_then_remove_before_update_is_updated_once() {
        let mut handler = Handler::default();
        let entity = Dummy::new(7);
        handler.add(entity.clone());
        handler.remove(&entity);

        let mut log = Log::default();
        handler.update(1.0, &mut log);
        assert_eq!(log.updated, vec![7]);
        assert_eq!(handler.size(), 0);

        let mut log = Log::default();
        handler.update(1.0, &mut log);
        assert!(log.updated.is_empty());
    }

    #[test]
    fn duplicate_key_last_write_wins() {
        let mut handler = Handler::default();
        handler.add(Dummy::new(3));
        handler.add(Dummy {
            id: 3,
            label: "second",
            updates: 0,
        });
        handler.flush_add();
        assert_eq!(handler.size(), 1);
        assert_eq!(handler.get(&3).map(|dummy| dummy.label), Some("second"));
    }

    #[test]
    fn entity_can_queue_changes_during_update() {
        let mut handler = Handler::default();
        handler.add(Dummy::new(99));
        handler.add(Dummy::new(1));

        let mut log = Log::default();
        handler.update(1.0, &mut log);
        assert_eq!(log.updated, vec![1, 99]);
        assert!(handler.get(&99).is_none());
        assert!(handler.get(&100).is_none());

        let mut log = Log::default();
        handler.update(1.0, &mut log);
        assert_eq!(log.updated, vec![1, 100]);
    }

    #[test]
    fn remove_all_schedules_visible_only() {
        let mut handler = Handler::default();
        handler.add(Dummy::new(1));
        handler.add(Dummy::new(2));
        handler.flush_add();
        handler.add(Dummy::new(3));
        handler.remove_all();

        handler.update(1.0, &mut Log::default());
        let keys = handler.list().map(|dummy| dummy.id).collect::<Vec<_>>();
        assert_eq!(keys, vec![3]);
    }

    #[test]
    fn render_does_not_flush() {
        let mut handler = Handler::default();
        handler.add(Dummy::new(1));
        handler.flush_add();
        handler.add(Dummy::new(2));
        handler.remove_key(1);

        let mut drawn = Vec::new();
        handler.render(&Camera::default(), &mut drawn);
        assert_eq!(drawn, vec![1]);
        assert_eq!(handler.size(), 1);
    }

    #[test]
    fn update_with_callback_matches_update_order() {
        let mut handler = Handler::default();
        handler.add(Dummy::new(5));
        let mut seen = Vec::new();
        handler.update_with(|dummy, pending| {
            seen.push(dummy.id);
            pending.remove(dummy);
        });
        assert_eq!(seen, vec![5]);
        assert_eq!(handler.size(), 0);
    }
}
