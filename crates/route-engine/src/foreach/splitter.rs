//! Expresiones de split: producen el iterador de elementos de un evento.
use route_core::{DataType, Event, Message, SplitElement, SplitError, SplitIter, TypedValue};
use serde_json::{Map, Value};

pub trait SplitExpression: Send + Sync {
    fn split(&self, event: &Event) -> Result<SplitIter, SplitError>;
}

impl<F> SplitExpression for F where F: Fn(&Event) -> Result<SplitIter, SplitError> + Send + Sync
{
    fn split(&self, event: &Event) -> Result<SplitIter, SplitError> {
        self(event)
    }
}

/// Divide el payload del evento (ver `split_value`).
#[derive(Debug, Default, Clone, Copy)]
pub struct PayloadSplitter;

impl SplitExpression for PayloadSplitter {
    fn split(&self, event: &Event) -> Result<SplitIter, SplitError> {
        Ok(split_value(event.payload()))
    }
}

/// Divide el valor apuntado por un JSON pointer dentro del payload.
#[derive(Debug, Clone)]
pub struct PointerSplitter {
    pointer: String,
}

impl PointerSplitter {
    pub fn new(pointer: impl Into<String>) -> Self {
        Self { pointer: pointer.into() }
    }
}

impl SplitExpression for PointerSplitter {
    fn split(&self, event: &Event) -> Result<SplitIter, SplitError> {
        let target = event.payload()
                          .value
                          .pointer(&self.pointer)
                          .ok_or_else(|| SplitError::Expression(format!("pointer '{}' not found in payload", self.pointer)))?;
        Ok(split_value(&TypedValue::of(target.clone())))
    }
}

/// Reglas de iteración de un valor:
/// - lista: un elemento por ítem (listas de `Message` producen elementos
///   mensaje),
/// - mapa: un elemento `{clave: valor}` por entrada, en orden,
/// - null: ningún elemento,
/// - escalar: un único elemento.
pub fn split_value(value: &TypedValue) -> SplitIter {
    match &value.value {
        Value::Null => Box::new(std::iter::empty()),
        Value::Array(items) => {
            let messages = value.data_type.item_type() == Some(&DataType::Message);
            Box::new(items.clone().into_iter().map(move |item| {
                                                  if messages {
                                                      serde_json::from_value::<Message>(item)
                                                          .map(SplitElement::Message)
                                                          .map_err(|e| SplitError::Iteration(e.to_string()))
                                                  } else {
                                                      Ok(SplitElement::Value(TypedValue::of(item)))
                                                  }
                                              }))
        }
        Value::Object(entries) => {
            let entries: Vec<Value> = entries.iter()
                                             .map(|(k, v)| {
                                                 let mut entry = Map::new();
                                                 entry.insert(k.clone(), v.clone());
                                                 Value::Object(entry)
                                             })
                                             .collect();
            Box::new(entries.into_iter().map(|entry| Ok(SplitElement::Value(TypedValue::of(entry)))))
        }
        _ => Box::new(std::iter::once(Ok(SplitElement::Value(value.clone())))),
    }
}

/// Agrupa elementos consecutivos en listas de hasta `size`. Los mensajes
/// aportan su payload; los configuradores no se pueden agrupar.
pub fn batched(inner: SplitIter, size: usize) -> SplitIter {
    if size <= 1 {
        return inner;
    }
    Box::new(Batched { inner, size })
}

struct Batched {
    inner: SplitIter,
    size: usize,
}

impl Iterator for Batched {
    type Item = Result<SplitElement, SplitError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut batch = Vec::with_capacity(self.size);
        while batch.len() < self.size {
            match self.inner.next() {
                None => break,
                Some(Ok(SplitElement::Value(v))) => batch.push(v.value),
                Some(Ok(SplitElement::Message(m))) => batch.push(m.payload.value),
                Some(Ok(SplitElement::Configurer(_))) => return Some(Err(SplitError::UnbatchableElement)),
                Some(Err(e)) => return Some(Err(e)),
            }
        }
        if batch.is_empty() {
            None
        } else {
            Some(Ok(SplitElement::Value(TypedValue::of(Value::Array(batch)))))
        }
    }
}
