use std::cell::RefCell;
use std::rc::Rc;

/// Shared, interior-mutable participant pointer.
pub type Shared<T> = Rc<RefCell<T>>;

fn same_object<T: ?Sized, U: ?Sized>(a: &Shared<T>, b: &Shared<U>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

enum Change<T: ?Sized> {
    Register(Shared<T>),
    Unregister(Shared<T>),
}

/// A set of participants keyed by object identity.
///
/// Registering an object that is already present does nothing; unregistering
/// an absent one does nothing. Iteration follows registration order, but
/// callers must not rely on it.
///
/// Changes requested through a [`RegistryHandle`] are queued and only take
/// effect at the next [`Registry::apply_pending`], so a participant can ask to
/// be removed while the registry is being iterated.
pub struct Registry<T: ?Sized> {
    members: Vec<Shared<T>>,
    pending: Rc<RefCell<Vec<Change<T>>>>,
}

impl<T: ?Sized> Registry<T> {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            pending: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Add `item`. Returns false if it was already a member.
    pub fn insert(&mut self, item: Shared<T>) -> bool {
        if self.contains(&item) {
            return false;
        }
        self.members.push(item);
        true
    }

    /// Remove `item`. Returns false if it was not a member.
    pub fn remove<U: ?Sized>(&mut self, item: &Shared<U>) -> bool {
        match self.members.iter().position(|m| same_object(m, item)) {
            Some(index) => {
                self.members.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains<U: ?Sized>(&self, item: &Shared<U>) -> bool {
        self.members.iter().any(|m| same_object(m, item))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shared<T>> {
        self.members.iter()
    }

    /// A cloneable handle for queueing changes from inside a pass.
    pub fn handle(&self) -> RegistryHandle<T> {
        RegistryHandle {
            pending: Rc::clone(&self.pending),
        }
    }

    /// Number of queued changes not yet applied.
    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Apply queued changes in the order they were requested. Returns how many
    /// changed membership.
    pub fn apply_pending(&mut self) -> usize {
        let changes = std::mem::take(&mut *self.pending.borrow_mut());
        let mut applied = 0;
        for change in changes {
            let changed = match change {
                Change::Register(item) => self.insert(item),
                Change::Unregister(item) => self.remove(&item),
            };
            if changed {
                applied += 1;
            }
        }
        applied
    }
}

impl<T: ?Sized> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Deferred access to a [`Registry`].
pub struct RegistryHandle<T: ?Sized> {
    pending: Rc<RefCell<Vec<Change<T>>>>,
}

impl<T: ?Sized> Clone for RegistryHandle<T> {
    fn clone(&self) -> Self {
        Self {
            pending: Rc::clone(&self.pending),
        }
    }
}

impl<T: ?Sized> RegistryHandle<T> {
    /// Queue a registration for the next pass boundary.
    pub fn register(&self, item: Shared<T>) {
        self.pending.borrow_mut().push(Change::Register(item));
    }

    /// Queue a removal for the next pass boundary.
    pub fn unregister(&self, item: Shared<T>) {
        self.pending.borrow_mut().push(Change::Unregister(item));
    }
}
