//! Registro de contextos de foreach y tipos del split.

mod foreach_context;
mod registry;
mod split;

pub use foreach_context::ForeachContext;
pub use registry::ContextRegistry;
pub use split::{CompletionCallback, EventBuilderConfigurer, SplitElement, SplitIter};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RegistryError;
    use crate::model::{ContextKey, Message};
    use serde_json::json;

    fn ctx(values: Vec<i64>) -> ForeachContext {
        let iter: SplitIter = Box::new(values.into_iter().map(|v| Ok(SplitElement::value(v))));
        ForeachContext::new(iter, Message::of(json!("orig")), None)
    }

    #[test]
    fn insert_rejects_duplicate_owner() {
        let reg = ContextRegistry::new();
        let key = ContextKey::new();
        reg.insert(key, ctx(vec![1])).unwrap();
        assert_eq!(reg.insert(key, ctx(vec![2])), Err(RegistryError::DuplicateContext(key)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn advance_counts_elements_and_remove_is_single_shot() {
        let reg = ContextRegistry::new();
        let key = ContextKey::new();
        reg.insert(key, ctx(vec![10, 20])).unwrap();

        let n = reg.with_context(key, |c| {
                       assert!(c.advance().is_some());
                       assert!(c.has_next());
                       assert!(c.advance().is_some());
                       assert!(!c.has_next());
                       c.element_number()
                   })
                   .unwrap();
        assert_eq!(n, 2);

        assert!(reg.remove(key).is_some());
        assert!(reg.remove(key).is_none());
        assert_eq!(reg.with_context(key, |_| ()), Err(RegistryError::MissingContext(key)));
    }

    #[test]
    fn completion_callback_runs_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicUsize::new(0));
        let mut c = ctx(vec![]);
        let counter = calls.clone();
        c.set_on_complete(Box::new(move || {
             counter.fetch_add(1, Ordering::SeqCst);
         }));
        if let Some(cb) = c.take_on_complete() {
            cb();
        }
        assert!(c.take_on_complete().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn event_split_key_resolves_context() {
        use crate::event::Event;

        let reg = ContextRegistry::new();
        let key = ContextKey::new();
        reg.insert(key, ctx(vec![1, 2, 3])).unwrap();
        let tagged = Event::builder(&Event::of(json!(1))).split_key(Some(key)).build();

        assert!(reg.contains(key));
        assert_eq!(reg.with_event_context(&tagged, |c| c.has_next()), Some(true));
        assert_eq!(reg.with_event_context(&Event::of(json!(1)), |c| c.has_next()), None);
    }
}
