//! Keyed collection reconciliation.
//!
//! A [`ReconcilerState`] caches one presentation handle per entity key for a
//! single parent scope (the budgets of a user, the categories of a budget,
//! the expenses of a category). Each pass compares the cached keys against a
//! freshly fetched collection and drives a [`Binder`]:
//!
//! - keys only in the fresh collection get exactly one [`Binder::on_create`];
//! - keys only in the cache get exactly one [`Binder::on_remove`];
//! - keys in both are left alone, unless the state runs with
//!   [`UpdatePolicy::Always`], in which case [`Binder::on_update`] fires.
//!
//! The reconciler never sees errors: callers fetch first and only reconcile
//! on success, so a failed fetch leaves the cache untouched.
//!
//! [`ScopedState`] nests a child state under every parent entry. Removing a
//! parent tears its children down one by one before the parent handle goes.

use std::{
    collections::{HashMap, HashSet},
    fmt,
};

/// Stable key of an entity inside its parent scope.
pub type Key = String;

/// Anything with a key that is unique within its parent scope.
pub trait Keyed {
    fn key(&self) -> Key;
}

/// Presentation collaborator driven by a reconciliation pass.
///
/// A handle is opaque to the reconciler; it is only required to be
/// removable exactly once.
pub trait Binder {
    type Entity: Keyed;
    type Handle;

    fn on_create(&mut self, entity: &Self::Entity) -> Self::Handle;

    fn on_remove(&mut self, handle: Self::Handle);

    /// Only called under [`UpdatePolicy::Always`].
    fn on_update(&mut self, _handle: &mut Self::Handle, _entity: &Self::Entity) {}
}

/// What to do with entries present both in the cache and in the fresh data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Leave them untouched. Field edits made by someone else are not
    /// reflected until the entity disappears and comes back.
    #[default]
    Skip,
    /// Call [`Binder::on_update`] with the fresh entity on every pass.
    Always,
}

/// Outcome of one pass, mainly for logging.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: Vec<Key>,
    pub kept: Vec<Key>,
    pub removed: Vec<Key>,
}

impl ReconcileReport {
    /// `true` when nothing was created or removed.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.created.is_empty() && self.removed.is_empty()
    }

    /// Folds the report of another scope into this one.
    pub fn merge(&mut self, other: ReconcileReport) {
        self.created.extend(other.created);
        self.kept.extend(other.kept);
        self.removed.extend(other.removed);
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created={} kept={} removed={}",
            self.created.len(),
            self.kept.len(),
            self.removed.len()
        )
    }
}

/// Keyed view-state of one parent scope.
///
/// Entries are only ever added or removed by [`ReconcilerState::reconcile`]
/// and the teardown methods.
#[derive(Debug)]
pub struct ReconcilerState<H> {
    entries: HashMap<Key, H>,
    policy: UpdatePolicy,
}

impl<H> Default for ReconcilerState<H> {
    fn default() -> Self {
        Self::with_policy(UpdatePolicy::default())
    }
}

impl<H> ReconcilerState<H> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_policy(policy: UpdatePolicy) -> Self {
        Self {
            entries: HashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> UpdatePolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&H> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut H> {
        self.entries.get_mut(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &H)> {
        self.entries.iter()
    }

    /// Runs one reconciliation pass against `fresh`.
    ///
    /// Afterwards the cached key set equals the key set of `fresh`. If
    /// `fresh` repeats a key, only its first occurrence is considered.
    pub fn reconcile<B>(&mut self, fresh: &[B::Entity], binder: &mut B) -> ReconcileReport
    where
        B: Binder<Handle = H> + ?Sized,
    {
        let mut to_remove: HashSet<Key> = self.entries.keys().cloned().collect();
        let mut seen: HashSet<Key> = HashSet::with_capacity(fresh.len());
        let mut report = ReconcileReport::default();

        for entity in fresh {
            let key = entity.key();
            if !seen.insert(key.clone()) {
                continue;
            }

            match self.entries.get_mut(&key) {
                Some(handle) => {
                    to_remove.remove(&key);
                    if self.policy == UpdatePolicy::Always {
                        binder.on_update(handle, entity);
                    }
                    report.kept.push(key);
                }
                None => {
                    let handle = binder.on_create(entity);
                    self.entries.insert(key.clone(), handle);
                    report.created.push(key);
                }
            }
        }

        for key in to_remove {
            if let Some(handle) = self.entries.remove(&key) {
                binder.on_remove(handle);
                report.removed.push(key);
            }
        }

        report
    }

    /// Removes every entry, calling `on_remove` once per handle.
    pub fn clear<B>(&mut self, binder: &mut B) -> Vec<Key>
    where
        B: Binder<Handle = H> + ?Sized,
    {
        let mut removed = Vec::with_capacity(self.entries.len());
        for (key, handle) in self.entries.drain() {
            binder.on_remove(handle);
            removed.push(key);
        }
        removed
    }
}

/// A parent handle together with the view-state of its children.
#[derive(Debug)]
pub struct Scoped<H, C> {
    pub handle: H,
    pub children: ReconcilerState<C>,
}

/// Two-level view-state: parents keyed by id, each owning its child scope.
#[derive(Debug)]
pub struct ScopedState<H, C> {
    scopes: ReconcilerState<Scoped<H, C>>,
    child_policy: UpdatePolicy,
}

impl<H, C> Default for ScopedState<H, C> {
    fn default() -> Self {
        Self::with_policies(UpdatePolicy::default(), UpdatePolicy::default())
    }
}

impl<H, C> ScopedState<H, C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_policies(parent: UpdatePolicy, child: UpdatePolicy) -> Self {
        Self {
            scopes: ReconcilerState::with_policy(parent),
            child_policy: child,
        }
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.scopes.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.scopes.keys()
    }

    pub fn handle(&self, key: &str) -> Option<&H> {
        self.scopes.get(key).map(|scope| &scope.handle)
    }

    pub fn children(&self, key: &str) -> Option<&ReconcilerState<C>> {
        self.scopes.get(key).map(|scope| &scope.children)
    }

    /// Reconciles the parent collection.
    ///
    /// New parents start with an empty child scope; dropped parents have
    /// every cached child removed through `child` before `parent` sees the
    /// parent handle.
    pub fn reconcile_parents<P, B>(
        &mut self,
        fresh: &[P::Entity],
        parent: &mut P,
        child: &mut B,
    ) -> ReconcileReport
    where
        P: Binder<Handle = H>,
        B: Binder<Handle = C>,
    {
        let mut binder = ScopeBinder {
            parent,
            child,
            child_policy: self.child_policy,
        };
        self.scopes.reconcile(fresh, &mut binder)
    }

    /// Reconciles the children of one parent against their fresh list.
    ///
    /// Returns `None` when the parent is not cached, in which case nothing
    /// happens.
    pub fn reconcile_children<B>(
        &mut self,
        parent_key: &str,
        fresh: &[B::Entity],
        child: &mut B,
    ) -> Option<ReconcileReport>
    where
        B: Binder<Handle = C>,
    {
        self.scopes
            .get_mut(parent_key)
            .map(|scope| scope.children.reconcile(fresh, child))
    }

    /// Tears down every parent, children first.
    pub fn clear<P, B>(&mut self, parent: &mut P, child: &mut B) -> Vec<Key>
    where
        P: Binder<Handle = H>,
        B: Binder<Handle = C>,
    {
        let mut binder = ScopeBinder {
            parent,
            child,
            child_policy: self.child_policy,
        };
        self.scopes.clear(&mut binder)
    }
}

struct ScopeBinder<'a, P, B> {
    parent: &'a mut P,
    child: &'a mut B,
    child_policy: UpdatePolicy,
}

impl<P, B> Binder for ScopeBinder<'_, P, B>
where
    P: Binder,
    B: Binder,
{
    type Entity = P::Entity;
    type Handle = Scoped<P::Handle, B::Handle>;

    fn on_create(&mut self, entity: &P::Entity) -> Self::Handle {
        Scoped {
            handle: self.parent.on_create(entity),
            children: ReconcilerState::with_policy(self.child_policy),
        }
    }

    fn on_remove(&mut self, scope: Self::Handle) {
        let Scoped {
            handle,
            mut children,
        } = scope;
        children.clear(self.child);
        self.parent.on_remove(handle);
    }

    fn on_update(&mut self, scope: &mut Self::Handle, entity: &P::Entity) {
        self.parent.on_update(&mut scope.handle, entity);
    }
}
