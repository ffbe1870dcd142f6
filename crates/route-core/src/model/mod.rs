//! Modelo de datos del evento: valores tipados, mensajes, errores y
//! etiquetas de correlación.
mod correlation;
mod error;
mod message;
mod typed_value;

pub use correlation::{ContextKey, GroupCorrelation, ItemSequenceInfo};
pub use error::{ErrorCause, ErrorType, EventError};
pub use message::Message;
pub use typed_value::{DataType, TypedValue};
