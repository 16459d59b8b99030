use crate::handler::{Handler, Keyed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

struct Registered<L: ?Sized> {
    id: ListenerId,
    listener: Box<L>,
}

impl<L: ?Sized> Keyed for Registered<L> {
    type Key = ListenerId;

    fn key(&self) -> ListenerId {
        self.id
    }
}

/// Subscriber list with the handler's deferred add/remove: subscriptions made
/// or dropped between two notifications apply right before the next one.
pub struct Listenable<L: ?Sized> {
    listeners: Handler<Registered<L>>,
    next_id: u64,
}

impl<L: ?Sized> Default for Listenable<L> {
    fn default() -> Self {
        Self {
            listeners: Handler::default(),
            next_id: 0,
        }
    }
}

impl<L: ?Sized> Listenable<L> {
    pub fn add(&mut self, listener: Box<L>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.listeners.add(Registered { id, listener });
        id
    }

    pub fn remove(&mut self, id: ListenerId) {
        self.listeners.remove_key(id);
    }

    pub fn notify<F>(&mut self, mut notify: F)
    where
        F: FnMut(&mut L),
    {
        self.listeners.flush_add();
        self.listeners.flush_delete();
        for registered in self.listeners.list_mut() {
            notify(registered.listener.as_mut());
        }
    }

    pub fn size(&self) -> usize {
        self.listeners.size()
    }
}
