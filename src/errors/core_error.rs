use route_core::RoutingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Error interno: {0}")]
    Internal(String),
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Error de ruteo: {0}")]
    Routing(#[from] RoutingError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use route_core::ValidationError;

    #[test]
    fn test_internal_variant_format() {
        let err = CoreError::Internal("algo malo".into());
        assert_eq!(err.to_string(), "Error interno: algo malo");
    }

    #[test]
    fn test_config_variant_format() {
        let err = CoreError::Config("mala configuración".into());
        assert_eq!(err.to_string(), "Error de configuración: mala configuración");
    }

    #[test]
    fn test_routing_variant_from() {
        let routing: RoutingError = ValidationError::new("payload").into();
        let err: CoreError = routing.into();
        assert_eq!(err.to_string(), "Error de ruteo: validation failed: payload");
    }
}
