use crate::Transaction;
use lmdb::{Cursor, Database, RoCursor};
use lmdb_sys::{MDB_cursor_op, MDB_FIRST, MDB_LAST, MDB_NEXT, MDB_SET_RANGE};
use rsbtcnew_core::utils::{Deserialize, StreamAdapter};

/// A cursor over a table. Iteration is strictly in key byte order; values
/// never participate in the ordering.
pub trait DbIterator<K, V> {
    fn is_end(&self) -> bool;
    fn current(&self) -> Option<(&K, &V)>;
    fn next(&mut self);
}

pub struct LmdbIteratorImpl {
    current: Option<(&'static [u8], &'static [u8])>,
    cursor: Option<RoCursor<'static>>,
}

impl LmdbIteratorImpl {
    pub fn new(
        txn: &dyn Transaction,
        dbi: Database,
        key_val: Option<&[u8]>,
        direction_asc: bool,
    ) -> Self {
        let operation = if key_val.is_some() {
            MDB_SET_RANGE
        } else if direction_asc {
            MDB_FIRST
        } else {
            MDB_LAST
        };

        let cursor = crate::open_ro_cursor(txn, dbi).unwrap();
        let cursor = unsafe { std::mem::transmute::<RoCursor<'_>, RoCursor<'static>>(cursor) };
        let mut result = Self {
            current: None,
            cursor: Some(cursor),
        };
        result.load_current(key_val, operation);
        result
    }

    pub fn null() -> Self {
        Self {
            current: None,
            cursor: None,
        }
    }

    fn load_current(&mut self, key: Option<&[u8]>, operation: MDB_cursor_op) {
        let result = self.cursor.as_ref().unwrap().get(key, None, operation);
        self.current = match result {
            Err(lmdb::Error::NotFound) => None,
            Ok((Some(key), value)) => Some((
                unsafe { std::mem::transmute::<&[u8], &'static [u8]>(key) },
                unsafe { std::mem::transmute::<&[u8], &'static [u8]>(value) },
            )),
            Ok((None, _)) => None,
            Err(e) => panic!("Could not read from cursor: {:?}", e),
        };
    }

    pub fn current(&self) -> Option<(&[u8], &[u8])> {
        self.current
    }

    pub fn next(&mut self) {
        if self.cursor.is_some() {
            self.load_current(None, MDB_NEXT);
        }
    }
}

pub struct BinaryDbIterator<K, V>
where
    K: Deserialize<Target = K>,
    V: Deserialize<Target = V>,
{
    iterator_impl: LmdbIteratorImpl,
    current: Option<(K, V)>,
}

impl<K, V> BinaryDbIterator<K, V>
where
    K: Deserialize<Target = K>,
    V: Deserialize<Target = V>,
{
    pub fn new(iterator_impl: LmdbIteratorImpl) -> Self {
        let mut result = Self {
            iterator_impl,
            current: None,
        };
        result.update_current();
        result
    }

    fn update_current(&mut self) {
        self.current = match self.iterator_impl.current() {
            Some((key_bytes, value_bytes)) => {
                let mut key_stream = StreamAdapter::new(key_bytes);
                let mut value_stream = StreamAdapter::new(value_bytes);
                let key = K::deserialize(&mut key_stream).ok();
                let value = V::deserialize(&mut value_stream).ok();
                key.zip(value)
            }
            None => None,
        };
    }
}

impl<K, V> DbIterator<K, V> for BinaryDbIterator<K, V>
where
    K: Deserialize<Target = K>,
    V: Deserialize<Target = V>,
{
    fn is_end(&self) -> bool {
        self.current.is_none()
    }

    fn current(&self) -> Option<(&K, &V)> {
        self.current.as_ref().map(|(k, v)| (k, v))
    }

    fn next(&mut self) {
        self.iterator_impl.next();
        self.update_current();
    }
}

impl LmdbIteratorImpl {
    pub fn new_iterator<K, V>(
        txn: &dyn Transaction,
        dbi: Database,
        key_val: Option<&[u8]>,
        direction_asc: bool,
    ) -> Box<dyn DbIterator<K, V>>
    where
        K: Deserialize<Target = K> + 'static,
        V: Deserialize<Target = V> + 'static,
    {
        let iterator_impl = Self::new(txn, dbi, key_val, direction_asc);
        Box::new(BinaryDbIterator::new(iterator_impl))
    }

    pub fn null_iterator<K, V>() -> Box<dyn DbIterator<K, V>>
    where
        K: Deserialize<Target = K> + 'static,
        V: Deserialize<Target = V> + 'static,
    {
        Box::new(BinaryDbIterator::new(Self::null()))
    }
}
