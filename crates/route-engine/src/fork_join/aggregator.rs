//! Estrategias de ensamblado del payload resultante de un fork-join.
//!
//! El router ya aplicó las variables fusionadas sobre `builder`; el
//! agregador sólo decide el mensaje final a partir de los eventos de rama
//! (en orden de secuencia).
use route_core::{DataType, Event, EventBuilder, Message, TypedValue};
use serde_json::{Map, Value};

pub trait ResultAggregator: Send + Sync {
    fn aggregate(&self, original: &Event, builder: EventBuilder, results: Vec<Event>) -> Event;
}

impl<F> ResultAggregator for F where F: Fn(&Event, EventBuilder, Vec<Event>) -> Event + Send + Sync
{
    fn aggregate(&self, original: &Event, builder: EventBuilder, results: Vec<Event>) -> Event {
        self(original, builder, results)
    }
}

/// Scatter-gather: payload = mapa `"<secuencia>" -> mensaje de la rama`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CollectMapAggregator;

impl ResultAggregator for CollectMapAggregator {
    fn aggregate(&self, _original: &Event, builder: EventBuilder, results: Vec<Event>) -> Event {
        let mut map = Map::new();
        for (index, event) in results.iter().enumerate() {
            map.insert(route_key(event, index), message_value(event.message()));
        }
        builder.message(Message::with_typed_payload(TypedValue::new(Value::Object(map), DataType::Map)))
               .build()
    }
}

/// Foreach paralelo: payload = lista de mensajes en orden de rama.
#[derive(Debug, Default, Clone, Copy)]
pub struct CollectListAggregator;

impl ResultAggregator for CollectListAggregator {
    fn aggregate(&self, _original: &Event, builder: EventBuilder, results: Vec<Event>) -> Event {
        let items = results.iter().map(|e| message_value(e.message())).collect();
        let payload = TypedValue::new(Value::Array(items), DataType::list_of(DataType::Message));
        builder.message(Message::with_typed_payload(payload)).build()
    }
}

/// Conserva el mensaje original; sólo se aplican las variables fusionadas.
#[derive(Debug, Default, Clone, Copy)]
pub struct JoinOnlyAggregator;

impl ResultAggregator for JoinOnlyAggregator {
    fn aggregate(&self, _original: &Event, builder: EventBuilder, _results: Vec<Event>) -> Event {
        builder.build()
    }
}

/// Clave de ruta: la secuencia de la rama, o la posición 1-based si la rama
/// no lleva correlación.
pub(crate) fn route_key(event: &Event, index: usize) -> String {
    event.group_correlation()
         .map(|g| g.sequence)
         .unwrap_or(index as u64 + 1)
         .to_string()
}

fn message_value(message: &Message) -> Value {
    TypedValue::message(message).value
}

#[cfg(test)]
mod tests {
    use super::*;
    use route_core::GroupCorrelation;
    use serde_json::json;

    fn branch(seq: u64, payload: Value) -> Event {
        Event::builder(&Event::of(payload)).group_correlation(Some(GroupCorrelation::of(seq)))
                                           .build()
    }

    #[test]
    fn collect_map_keys_by_sequence() {
        let original = Event::of(json!("in"));
        let out = CollectMapAggregator.aggregate(&original,
                                                 Event::builder(&original),
                                                 vec![branch(1, json!("a")), branch(2, json!("b"))]);
        let payload = out.payload();
        assert_eq!(payload.data_type, DataType::Map);
        let second: Message = serde_json::from_value(payload.value["2"].clone()).unwrap();
        assert_eq!(second.payload.value, json!("b"));
    }

    #[test]
    fn collect_list_keeps_order() {
        let original = Event::of(json!("in"));
        let out = CollectListAggregator.aggregate(&original,
                                                  Event::builder(&original),
                                                  vec![branch(1, json!(10)), branch(2, json!(20))]);
        let items: Vec<Message> = serde_json::from_value(out.payload().value.clone()).unwrap();
        assert_eq!(items.iter().map(|m| m.payload.value.clone()).collect::<Vec<_>>(), vec![json!(10), json!(20)]);
    }

    #[test]
    fn closures_are_aggregators() {
        let count = |_: &Event, b: EventBuilder, r: Vec<Event>| b.payload(TypedValue::of(r.len())).build();
        let original = Event::of(json!(null));
        let out = count.aggregate(&original, Event::builder(&original), vec![branch(1, json!(1))]);
        assert_eq!(out.payload().value, json!(1));
    }
}
