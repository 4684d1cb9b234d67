use alloc::{collections::BTreeMap, rc::Rc};
use core::{cell::RefCell, mem};
use tracing::debug;

use crate::{any::RcAny, key::RegistryKey};

pub(crate) type SharedContext = Rc<RefCell<ResolutionContext>>;

/// Instances under construction or already built during one outermost resolve.
///
/// Instances are recorded before their auto-injections run,
/// so a nested resolve that reaches back to them observes the same (possibly partial) instance.
#[derive(Default)]
pub(crate) struct ResolutionContext {
    instances: BTreeMap<RegistryKey, RcAny>,
}

impl ResolutionContext {
    #[inline]
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self {
            instances: BTreeMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn get(&self, key: &RegistryKey) -> Option<RcAny> {
        self.instances.get(key).cloned()
    }

    #[inline]
    pub(crate) fn insert(&mut self, key: RegistryKey, instance: RcAny) -> Option<RcAny> {
        self.instances.insert(key, instance)
    }

    #[inline]
    pub(crate) fn remove(&mut self, key: &RegistryKey) -> Option<RcAny> {
        self.instances.remove(key)
    }

    #[inline]
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.instances.len()
    }

    #[inline]
    #[must_use]
    fn take(&mut self) -> BTreeMap<RegistryKey, RcAny> {
        mem::take(&mut self.instances)
    }
}

/// Owns the context of an outermost resolve and empties it when the resolve returns,
/// whether it succeeded or not.
///
/// Emptying (instead of only dropping the `Rc`) releases the instances even if a
/// [`crate::Resolver`] was retained by a factory.
pub(crate) struct ContextGuard {
    context: SharedContext,
}

impl ContextGuard {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            context: Rc::new(RefCell::new(ResolutionContext::new())),
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn context(&self) -> &SharedContext {
        &self.context
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let Ok(mut context) = self.context.try_borrow_mut() else {
            return;
        };
        let released = context.take();
        drop(context);

        debug!(count = released.len(), "Resolution context released");
        drop(released);
    }
}
