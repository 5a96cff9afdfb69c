use std::future::Future;

/// Memoized value of a lazily fetched collection.
///
/// A slot starts as [`CacheSlot::NotFetched`], becomes
/// [`CacheSlot::Fetched`] after the first successful load and stays there,
/// even if the remote data changes, until [`CacheSlot::invalidate`] is
/// called.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CacheSlot<T> {
    #[default]
    NotFetched,
    Fetched(T),
    Invalidated,
}

impl<T> CacheSlot<T> {
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Fetched(value) => Some(value),
            Self::NotFetched | Self::Invalidated => None,
        }
    }

    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched(_))
    }

    /// Drops the cached value so the next access fetches again.
    ///
    /// A slot that was never fetched stays `NotFetched`.
    pub fn invalidate(&mut self) {
        if self.is_fetched() {
            *self = Self::Invalidated;
        }
    }

    pub fn set(&mut self, value: T) -> &mut T {
        *self = Self::Fetched(value);
        match self {
            Self::Fetched(value) => value,
            Self::NotFetched | Self::Invalidated => unreachable!("slot was just filled"),
        }
    }

    /// Returns the cached value, running `fetch` first if there is none.
    ///
    /// A failed fetch leaves the slot as it was.
    pub async fn get_or_try_fetch<F, Fut, E>(&mut self, fetch: F) -> Result<&mut T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.is_fetched() {
            let value = fetch().await?;
            *self = Self::Fetched(value);
        }
        match self {
            Self::Fetched(value) => Ok(value),
            Self::NotFetched | Self::Invalidated => unreachable!("slot was just filled"),
        }
    }
}
