use std::marker::PhantomData;
use std::ops::Index;
use std::ops::IndexMut;

/// Types which map one-to-one onto a dense range of `usize` positions.
pub trait DenseKey: Copy {
    fn to_position(self) -> usize;

    fn from_position(position: usize) -> Self;
}

impl DenseKey for usize {
    fn to_position(self) -> usize {
        self
    }

    fn from_position(position: usize) -> Self {
        position
    }
}

/// A `Vec` addressed by a typed key, so that e.g. a [`Literal`](crate::Literal) cannot be used to
/// index a table of constraints.
#[derive(Debug, Clone)]
pub(crate) struct KeyedVec<Key, Value> {
    values: Vec<Value>,
    marker: PhantomData<fn(Key)>,
}

impl<Key, Value> Default for KeyedVec<Key, Value> {
    fn default() -> Self {
        KeyedVec {
            values: Vec::new(),
            marker: PhantomData,
        }
    }
}

impl<Key: DenseKey, Value> KeyedVec<Key, Value> {
    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    /// Appends `value` and hands out the key it is stored under.
    pub(crate) fn push(&mut self, value: Value) -> Key {
        let key = Key::from_position(self.values.len());
        self.values.push(value);
        key
    }

    pub(crate) fn get(&self, key: Key) -> Option<&Value> {
        self.values.get(key.to_position())
    }

    pub(crate) fn get_mut(&mut self, key: Key) -> Option<&mut Value> {
        self.values.get_mut(key.to_position())
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Value> {
        self.values.iter_mut()
    }

    pub(crate) fn iter_with_keys(&self) -> impl Iterator<Item = (Key, &Value)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(position, value)| (Key::from_position(position), value))
    }

    /// Pads with `Value::default()` until `key` is in bounds.
    pub(crate) fn extend_to(&mut self, key: Key)
    where
        Value: Default,
    {
        let required = key.to_position() + 1;
        if self.values.len() < required {
            self.values.resize_with(required, Value::default);
        }
    }
}

impl<Key: DenseKey, Value> Index<Key> for KeyedVec<Key, Value> {
    type Output = Value;

    fn index(&self, key: Key) -> &Value {
        &self.values[key.to_position()]
    }
}

impl<Key: DenseKey, Value> IndexMut<Key> for KeyedVec<Key, Value> {
    fn index_mut(&mut self, key: Key) -> &mut Value {
        &mut self.values[key.to_position()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_to_pads_with_defaults() {
        let mut table = KeyedVec::<usize, u8>::default();
        let first = table.push(7);
        table.extend_to(3);

        assert_eq!(first, 0);
        assert_eq!(table.len(), 4);
        assert_eq!(table[0], 7);
        assert_eq!(table.get(3), Some(&0));
        assert_eq!(table.get(4), None);
    }

    #[test]
    fn keys_follow_insertion_order() {
        let mut table = KeyedVec::<usize, char>::default();
        let _ = table.push('a');
        let _ = table.push('b');

        let pairs = table.iter_with_keys().collect::<Vec<_>>();
        assert_eq!(pairs, vec![(0, &'a'), (1, &'b')]);
    }
}
