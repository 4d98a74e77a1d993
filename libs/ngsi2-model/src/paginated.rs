use serde::{Deserialize, Serialize};

/// One page of a broker collection.
///
/// `offset` and `limit` echo the request; `total` comes from the
/// `X-Total-Count` response header and is 0 when the broker did not send
/// it (count not requested, or an unparseable value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub offset: u32,
    pub limit: u32,
    pub total: u64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, offset: u32, limit: u32, total: u64) -> Self {
        Self {
            items,
            offset,
            limit,
            total,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Whether more items exist past this page, judged by `total`.
    ///
    /// Always false when the total count was not requested.
    #[must_use]
    pub fn has_more(&self) -> bool {
        let seen = u64::from(self.offset) + self.items.len() as u64;
        seen < self.total
    }
}

impl<T> IntoIterator for Paginated<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Paginated<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
