use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// State that can be driven by typed actions.
pub trait Reducer {
    type Action;

    fn reduce(&mut self, action: Self::Action);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Rc<dyn Fn()>;

/// Single-threaded state container.
///
/// Cloning a `Store` yields another handle to the same state. Listeners are
/// called after every dispatch without any borrow held, so a listener may read
/// the store or dispatch further actions.
pub struct Store<S: Reducer> {
    state: Rc<RefCell<S>>,
    listeners: Rc<RefCell<Vec<(ListenerId, Listener)>>>,
    next_id: Rc<Cell<u64>>,
}

impl<S: Reducer> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            listeners: Rc::clone(&self.listeners),
            next_id: Rc::clone(&self.next_id),
        }
    }
}

impl<S: Reducer + Default> Default for Store<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: Reducer> Store<S> {
    pub fn new(state: S) -> Self {
        Self {
            state: Rc::new(RefCell::new(state)),
            listeners: Rc::new(RefCell::new(Vec::new())),
            next_id: Rc::new(Cell::new(0)),
        }
    }

    pub fn dispatch(&self, action: S::Action) {
        self.state.borrow_mut().reduce(action);
        self.notify();
    }

    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.state.borrow())
    }

    pub fn subscribe(&self, listener: impl Fn() + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(listener_id, _)| *listener_id != id);
    }

    fn notify(&self) {
        // snapshot so listeners can subscribe/unsubscribe while being called
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in listeners {
            listener();
        }
    }
}

impl<S: Reducer + Clone> Store<S> {
    pub fn snapshot(&self) -> S {
        self.state.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, Clone)]
    struct Counter {
        value: i32,
    }

    enum CounterAction {
        Add(i32),
        Reset,
    }

    impl Reducer for Counter {
        type Action = CounterAction;

        fn reduce(&mut self, action: CounterAction) {
            match action {
                CounterAction::Add(n) => self.value += n,
                CounterAction::Reset => self.value = 0,
            }
        }
    }

    #[test]
    fn listeners_see_every_dispatch() {
        let store = Store::<Counter>::default();
        let calls = Rc::new(Cell::new(0));

        let seen = Rc::clone(&calls);
        store.subscribe(move || seen.set(seen.get() + 1));

        store.dispatch(CounterAction::Add(2));
        store.dispatch(CounterAction::Add(3));

        assert_eq!(calls.get(), 2);
        assert_eq!(store.with(|s| s.value), 5);
    }

    #[test]
    fn unsubscribed_listener_is_not_called() {
        let store = Store::<Counter>::default();
        let calls = Rc::new(Cell::new(0));

        let seen = Rc::clone(&calls);
        let id = store.subscribe(move || seen.set(seen.get() + 1));
        store.unsubscribe(id);
        store.dispatch(CounterAction::Add(1));

        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn listener_may_dispatch_reentrantly() {
        let store = Store::<Counter>::default();

        let inner = store.clone();
        store.subscribe(move || {
            if inner.with(|s| s.value) > 10 {
                inner.dispatch(CounterAction::Reset);
            }
        });

        store.dispatch(CounterAction::Add(11));

        assert_eq!(store.snapshot().value, 0);
    }
}
