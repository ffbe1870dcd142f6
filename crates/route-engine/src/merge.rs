//! Fusión determinista de las variables de las ramas de un fork-join.
//!
//! Reglas:
//! - Sólo se consideran las variables cuyo valor difiere del evento
//!   original (las heredadas sin cambios no se fusionan).
//! - Primera aparición de una clave: se guarda tal cual.
//! - Apariciones siguientes: el valor guardado se convierte en lista (el
//!   primer valor pasa a ser el ítem 0) y se agrega el nuevo valor.
//! - El tipo de ítem de la lista se conserva mientras cada valor agregado
//!   sea compatible con él; si no, pasa a `Any`.
use std::collections::HashSet;

use indexmap::IndexMap;
use route_core::{DataType, Event, TypedValue};
use serde_json::Value;

/// Fusiona las variables de `events` (en orden de rama) respecto de
/// `original`. El resultado conserva el orden de primera aparición.
pub fn merge_variables(original: &Event, events: &[Event]) -> IndexMap<String, TypedValue> {
    let mut merged: IndexMap<String, TypedValue> = IndexMap::new();
    // claves ya convertidas en lista por este merge; un valor que ya era una
    // lista en la rama se trata como un valor más
    let mut coerced: HashSet<String> = HashSet::new();

    for event in events {
        for (key, value) in event.variables() {
            if original.variable(key) == Some(value) {
                continue;
            }
            match merged.get_mut(key) {
                None => {
                    merged.insert(key.clone(), value.clone());
                }
                Some(existing) => {
                    if coerced.insert(key.clone()) {
                        *existing = into_list(existing);
                    }
                    append(existing, value);
                }
            }
        }
    }
    merged
}

fn into_list(first: &TypedValue) -> TypedValue {
    TypedValue::new(Value::Array(vec![first.value.clone()]), DataType::list_of(first.data_type.clone()))
}

fn append(list: &mut TypedValue, value: &TypedValue) {
    if let Value::Array(items) = &mut list.value {
        items.push(value.value.clone());
    }
    let keep = list.data_type
                   .item_type()
                   .map(|item| item.is_compatible_with(&value.data_type))
                   .unwrap_or(false);
    if !keep {
        list.data_type = DataType::list_of(DataType::Any);
    }
}
