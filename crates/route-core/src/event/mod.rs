//! Definición de `Event` y su builder de revisiones.

mod builder;
mod types;

pub use builder::EventBuilder;
pub use types::Event;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ErrorCause, ErrorType, EventError, ItemSequenceInfo, TypedValue};
    use serde_json::json;

    #[test]
    fn builder_produces_new_revision_without_touching_base() {
        let base = Event::of(json!("hola"));
        let rev = Event::builder(&base).add_variable("x", TypedValue::of(1))
                                       .item_sequence(Some(ItemSequenceInfo::of(2)))
                                       .build();

        assert!(base.variable("x").is_none());
        assert_eq!(rev.variable("x").and_then(TypedValue::as_i64), Some(1));
        assert_eq!(rev.item_sequence().map(|i| i.position), Some(2));
        // la identidad lógica se conserva entre revisiones
        assert_eq!(base.id(), rev.id());
    }

    #[test]
    fn remove_variable_and_clear_error() {
        let err = EventError::new(ErrorType::new("APP", "X"), "x", ErrorCause::new("E", "x"));
        let ev = Event::builder(&Event::of(json!(null))).add_variable("a", TypedValue::of("v"))
                                                        .error(err)
                                                        .build();
        let cleaned = ev.into_builder().remove_variable("a").clear_error().build();
        assert!(cleaned.variables().is_empty());
        assert!(cleaned.error().is_none());
    }
}
