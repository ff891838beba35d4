use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// Typed handle into a [`Blackboard`].
///
/// Keys are plain `u64`s tagged with the value type; a key must always be used with the same
/// `T`. Mixing types for one id is a programming error and panics on access.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BbKey<T: 'static> {
    id: u64,
    name: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: 'static> Copy for BbKey<T> {}

impl<T: 'static> Clone for BbKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> fmt::Debug for BbKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BbKey({}:{})", self.id, self.name)
    }
}

impl<T: 'static> BbKey<T> {
    pub const fn new(id: u64) -> Self {
        Self::named(id, "")
    }

    pub const fn named(id: u64, name: &'static str) -> Self {
        Self {
            id,
            name,
            _phantom: PhantomData,
        }
    }

    pub fn id(self) -> u64 {
        self.id
    }

    pub fn name(self) -> &'static str {
        self.name
    }
}

/// Per-brain shared state written and read by tree nodes.
#[derive(Default)]
pub struct Blackboard {
    values: BTreeMap<u64, Box<dyn Any>>,
}

impl fmt::Debug for Blackboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blackboard")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn mismatch(id: u64) -> ! {
    panic!("blackboard type mismatch for key id={id} (stored type differs from requested)")
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn contains<T: 'static>(&self, key: BbKey<T>) -> bool {
        self.values.contains_key(&key.id)
    }

    pub fn set<T: 'static>(&mut self, key: BbKey<T>, value: T) {
        self.values.insert(key.id, Box::new(value));
    }

    /// `Some` stores the value, `None` clears the key.
    pub fn set_opt<T: 'static>(&mut self, key: BbKey<T>, value: Option<T>) {
        match value {
            Some(value) => self.set(key, value),
            None => {
                self.remove(key);
            }
        }
    }

    pub fn get<T: 'static>(&self, key: BbKey<T>) -> Option<&T> {
        let value = self.values.get(&key.id)?;
        match value.downcast_ref::<T>() {
            Some(v) => Some(v),
            None => mismatch(key.id),
        }
    }

    pub fn get_copied<T: Copy + 'static>(&self, key: BbKey<T>) -> Option<T> {
        self.get(key).copied()
    }

    pub fn get_mut<T: 'static>(&mut self, key: BbKey<T>) -> Option<&mut T> {
        let value = self.values.get_mut(&key.id)?;
        match value.downcast_mut::<T>() {
            Some(v) => Some(v),
            None => mismatch(key.id),
        }
    }

    pub fn get_or_insert_with<T: 'static>(
        &mut self,
        key: BbKey<T>,
        make: impl FnOnce() -> T,
    ) -> &mut T {
        let value = self
            .values
            .entry(key.id)
            .or_insert_with(|| Box::new(make()));
        match value.downcast_mut::<T>() {
            Some(v) => v,
            None => mismatch(key.id),
        }
    }

    pub fn remove<T: 'static>(&mut self, key: BbKey<T>) -> Option<T> {
        let value = self.values.remove(&key.id)?;
        match value.downcast::<T>() {
            Ok(v) => Some(*v),
            Err(_) => mismatch(key.id),
        }
    }
}
