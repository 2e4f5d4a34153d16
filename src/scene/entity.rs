use std::cell::Cell;
use std::rc::Rc;

/// Shared count of live entities of one kind.
///
/// Cloning shares the same count. Each `register` call bumps it by one
/// until the returned guard is dropped.
#[derive(Debug, Clone, Default)]
pub struct EntityCounter {
    count: Rc<Cell<u64>>,
}

impl EntityCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u64 {
        self.count.get()
    }

    pub fn register(&self) -> EntityGuard {
        self.count.set(self.count.get() + 1);
        EntityGuard {
            count: Rc::clone(&self.count),
        }
    }
}

/// Keeps one entity counted while alive
#[derive(Debug)]
pub struct EntityGuard {
    count: Rc<Cell<u64>>,
}

impl Drop for EntityGuard {
    fn drop(&mut self) {
        self.count.set(self.count.get() - 1);
    }
}
