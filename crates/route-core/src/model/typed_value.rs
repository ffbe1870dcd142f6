//! Valores tipados: un `serde_json::Value` acompañado de su `DataType`.
//!
//! Las variables de un evento y el payload de un mensaje son `TypedValue`.
//! El tipo se conserva explícitamente porque el merge de variables del
//! fork-join decide el tipo de ítem de las listas resultantes a partir de él.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Message;

/// Tipo lógico de un valor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// Tipo "objeto": compatible con cualquier otro.
    Any,
    Null,
    Boolean,
    Number,
    String,
    Map,
    /// Un `Message` completo serializado como variable.
    Message,
    /// Lista ordenada cuyo tipo de ítem es `item`.
    List { item: Box<DataType> },
}

impl DataType {
    /// Infiere el tipo de un valor JSON. Las listas heterogéneas quedan con
    /// ítem `Any`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Object(_) => Self::Map,
            Value::Array(items) => {
                let mut types = items.iter().map(DataType::of);
                let item = match types.next() {
                    Some(first) if types.all(|t| t == first) => first,
                    _ => Self::Any,
                };
                Self::list_of(item)
            }
        }
    }

    pub fn list_of(item: DataType) -> Self {
        Self::List { item: Box::new(item) }
    }

    /// `true` cuando un valor de tipo `other` puede almacenarse donde se
    /// espera `self`.
    pub fn is_compatible_with(&self, other: &DataType) -> bool {
        match (self, other) {
            (Self::Any, _) => true,
            (Self::List { item: a }, Self::List { item: b }) => a.is_compatible_with(b),
            (a, b) => a == b,
        }
    }

    /// Tipo de ítem si es una lista.
    pub fn item_type(&self) -> Option<&DataType> {
        match self {
            Self::List { item } => Some(item),
            _ => None,
        }
    }
}

/// Valor con tipo explícito.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedValue {
    pub value: Value,
    pub data_type: DataType,
}

impl TypedValue {
    pub fn new(value: Value, data_type: DataType) -> Self {
        Self { value, data_type }
    }

    /// Construye un `TypedValue` infiriendo el tipo.
    pub fn of(value: impl Into<Value>) -> Self {
        let value = value.into();
        let data_type = DataType::of(&value);
        Self { value, data_type }
    }

    pub fn null() -> Self {
        Self { value: Value::Null,
               data_type: DataType::Null }
    }

    /// Guarda un mensaje completo como valor (tipo `Message`).
    pub fn message(message: &Message) -> Self {
        // Message solo contiene valores JSON y tipos derivados, serializar no falla.
        let value = serde_json::to_value(message).unwrap_or(Value::Null);
        Self { value,
               data_type: DataType::Message }
    }

    /// Recupera el mensaje guardado con [`TypedValue::message`].
    pub fn as_message(&self) -> Option<Message> {
        if self.data_type != DataType::Message {
            return None;
        }
        serde_json::from_value(self.value.clone()).ok()
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    pub fn is_map(&self) -> bool {
        self.value.is_object()
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.value.as_i64()
    }
}

impl From<Value> for TypedValue {
    fn from(value: Value) -> Self {
        Self::of(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn infers_homogeneous_and_mixed_lists() {
        assert_eq!(DataType::of(&json!([1, 2])), DataType::list_of(DataType::Number));
        assert_eq!(DataType::of(&json!([1, "a"])), DataType::list_of(DataType::Any));
        assert_eq!(DataType::of(&json!([])), DataType::list_of(DataType::Any));
    }

    #[test]
    fn any_accepts_everything() {
        assert!(DataType::Any.is_compatible_with(&DataType::String));
        assert!(!DataType::Number.is_compatible_with(&DataType::String));
        assert!(DataType::list_of(DataType::Any).is_compatible_with(&DataType::list_of(DataType::Number)));
    }

    #[test]
    fn message_roundtrip_keeps_type() {
        let msg = Message::of(json!({"a": 1}));
        let tv = TypedValue::message(&msg);
        assert_eq!(tv.data_type, DataType::Message);
        assert_eq!(tv.as_message(), Some(msg));
        // un valor que no es Message no se interpreta como tal
        assert_eq!(TypedValue::of(json!({"payload": 1})).as_message(), None);
    }
}
