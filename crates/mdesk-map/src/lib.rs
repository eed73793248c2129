//! Insertion-ordered map from byte-string or identity keys to arbitrary payloads.
//!
//! Slots live in a vector and never move once inserted, the hash index over them is an
//! open-addressed [`HashTable`] that rehashes into a larger power-of-two table as it fills up.

use std::hash::{BuildHasher as _, BuildHasherDefault};

use hashbrown::HashTable;
use rustc_hash::FxHasher;

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum MapKey {
    /// Compared by content.
    Bytes(Box<[u8]>),
    /// Compared by value, used for pointer-like identities.
    Id(usize),
}

impl MapKey {
    pub fn from_bytes(bytes: impl Into<Box<[u8]>>) -> Self {
        MapKey::Bytes(bytes.into())
    }

    pub fn from_text(text: &str) -> Self {
        MapKey::Bytes(text.as_bytes().into())
    }

    pub fn from_id(id: usize) -> Self {
        MapKey::Id(id)
    }

    pub fn from_ptr<T>(ptr: *const T) -> Self {
        MapKey::Id(ptr.addr())
    }
}

impl From<&str> for MapKey {
    fn from(text: &str) -> Self {
        MapKey::from_text(text)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slot<V> {
    key: MapKey,
    hash: u64,
    pub value: V,
}

impl<V> Slot<V> {
    pub fn key(&self) -> &MapKey {
        &self.key
    }
}

#[derive(Clone, Debug)]
pub struct Map<V> {
    slots: Vec<Slot<V>>,
    index: HashTable<usize>,
}

impl<V> Default for Map<V> {
    fn default() -> Self {
        Self { slots: Vec::new(), index: HashTable::new() }
    }
}

impl<V> Map<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { slots: Vec::with_capacity(capacity), index: HashTable::with_capacity(capacity) }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of entries the index holds before it has to grow.
    pub fn capacity(&self) -> usize {
        self.index.capacity()
    }

    /// Inserts `value` unless `key` is already present. Either way the slot now holding `key` is
    /// returned, an existing payload is left untouched.
    pub fn insert(&mut self, key: MapKey, value: V) -> &mut Slot<V> {
        let hash = hash_one(&key);
        let slot = match self.position(hash, &key) {
            Some(slot) => slot,
            None => self.push(key, hash, value),
        };
        &mut self.slots[slot]
    }

    /// Like [`Map::insert`], but an existing payload is replaced.
    pub fn overwrite(&mut self, key: MapKey, value: V) -> &mut Slot<V> {
        let hash = hash_one(&key);
        match self.position(hash, &key) {
            Some(slot) => {
                let slot = &mut self.slots[slot];
                slot.value = value;
                slot
            }
            None => {
                let slot = self.push(key, hash, value);
                &mut self.slots[slot]
            }
        }
    }

    pub fn lookup(&self, key: &MapKey) -> Option<&Slot<V>> {
        self.position(hash_one(key), key).map(|slot| &self.slots[slot])
    }

    pub fn lookup_mut(&mut self, key: &MapKey) -> Option<&mut Slot<V>> {
        self.position(hash_one(key), key).map(|slot| &mut self.slots[slot])
    }

    pub fn get(&self, key: &MapKey) -> Option<&V> {
        self.lookup(key).map(|slot| &slot.value)
    }

    pub fn contains_key(&self, key: &MapKey) -> bool {
        self.lookup(key).is_some()
    }

    /// Slots in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Slot<V>> {
        self.slots.iter()
    }

    fn position(&self, hash: u64, key: &MapKey) -> Option<usize> {
        self.index
            .find(hash, |&slot| self.slots[slot].hash == hash && self.slots[slot].key == *key)
            .copied()
    }

    fn push(&mut self, key: MapKey, hash: u64, value: V) -> usize {
        let slot = self.slots.len();
        let capacity = self.index.capacity();

        let slots = &self.slots;
        self.index.insert_unique(hash, slot, |&slot| slots[slot].hash);
        self.slots.push(Slot { key, hash, value });

        if self.index.capacity() != capacity {
            tracing::trace!(from = capacity, to = self.index.capacity(), "map index grew");
        }
        slot
    }
}

impl<'a, V> IntoIterator for &'a Map<V> {
    type Item = &'a Slot<V>;
    type IntoIter = std::slice::Iter<'a, Slot<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn hash_one<T: std::hash::Hash>(t: &T) -> u64 {
    BuildHasherDefault::<FxHasher>::default().hash_one(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> Vec<MapKey> {
        let byte_keys: [&[u8]; 3] = [
            b"\xed\x80\x73\x71\x78\xba\xff\xd6\x87\x83\xcd\x20\x28\xf7\x1c\xc1\x5f\xca\x98\x9c\x5a\xab\x0c\xae\x9a\x60\x57\x03\xeb\x1f\xde\x99",
            b"\x4c\x80\xb7\x8b\xbf\x65\x5a\x4b\xc1\x2a\xc3\x5f\xe1\x66\xfb\x0d\x72\x83\x1c\x63\xba\xb5\x97\x02\x3f\x6a\xe0\x2a\x1b\x82\x07\x76",
            b"\xd8\xfd\x11\x4b\x04\xdf\xe5\x20\x5b\xd6\x4f\x87\x00\x70\x6a\xc8\xde\xed\xc7\x79\xdb\x87\x24\x36\xa8\x7a\x31\x41\x00\x57\xbd\x8d",
        ];

        let mut keys: Vec<_> = byte_keys.iter().map(|&bytes| MapKey::from_bytes(bytes)).collect();
        keys.extend((byte_keys.len()..byte_keys.len() * 2).map(MapKey::from_id));
        keys
    }

    #[test]
    fn insert_then_overwrite() {
        let keys = keys();
        let mut map = Map::new();

        for (i, key) in keys.iter().enumerate() {
            map.insert(key.clone(), i);
        }
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(map.get(key), Some(&i));
        }

        for (i, key) in keys.iter().enumerate() {
            map.overwrite(key.clone(), i + 10);
        }
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(map.get(key), Some(&(i + 10)));
        }
        assert_eq!(map.len(), keys.len());
    }

    #[test]
    fn insert_keeps_the_existing_payload() {
        let mut map = Map::new();
        map.insert(MapKey::from_text("size"), 4);
        let slot = map.insert(MapKey::from_text("size"), 8);

        assert_eq!(slot.value, 4);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn lookup_of_missing_key_is_none() {
        let mut map = Map::new();
        map.insert(MapKey::from_id(1), ());

        assert!(map.lookup(&MapKey::from_id(2)).is_none());
        assert!(map.lookup(&MapKey::from_text("1")).is_none());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn identity_keys_compare_by_address() {
        let a = 1u8;
        let b = 1u8;
        let mut map = Map::new();
        map.insert(MapKey::from_ptr(&a), "a");
        map.insert(MapKey::from_ptr(&b), "b");

        assert_eq!(map.get(&MapKey::from_ptr(&a)), Some(&"a"));
        assert_eq!(map.get(&MapKey::from_ptr(&b)), Some(&"b"));
    }

    #[test]
    fn grows_past_initial_capacity() {
        let mut map = Map::with_capacity(4);
        for i in 0..1000 {
            map.insert(MapKey::from_bytes(format!("key{i}").into_bytes()), i);
        }

        assert!(map.capacity() >= 1000);
        for i in 0..1000 {
            assert_eq!(map.get(&MapKey::from_bytes(format!("key{i}").into_bytes())), Some(&i));
        }
        assert_eq!(map.iter().map(|slot| slot.value).take(3).collect::<Vec<_>>(), [0, 1, 2]);
    }
}
