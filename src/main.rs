//! Binario de demostración de los routers.
//!
//! - Scatter-gather: una cotización consultada en tres rutas en paralelo.
//! - Scatter-gather con fallos agregados (delay-errors).
//! - Foreach sobre las líneas de un pedido, en modo directo y en modo stream.
//!
//! El nivel de log se controla con `RUST_LOG` (p.ej. `RUST_LOG=debug`).
use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use route_core::runtime::LoggingTracer;
use route_core::{processor_fn, ErrorType, Event, Processor, RouteExecutionError, RoutingError, RoutingPair, Scheduler,
                 TokioScheduler, TypedValue};
use route_engine::{ForeachConfig, ForeachRouter, ForkJoinConfig, ForkJoinRouter, PointerSplitter};
use routeflow_rust::{CoreError, CONFIG};
use serde_json::json;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Ruta de ejemplo: espera `delay_ms` y deja `payload` como resultado.
fn lookup_route(name: &'static str, payload: serde_json::Value, delay_ms: u64) -> Arc<dyn Processor> {
    processor_fn(name, move |event: Event| {
        let payload = payload.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            Ok::<_, RouteExecutionError>(event.into_builder()
                                              .payload(TypedValue::of(payload))
                                              .add_variable("source", TypedValue::of(name))
                                              .build())
        }
    })
}

async fn run_scatter_gather(scheduler: Arc<dyn Scheduler>) -> Result<(), CoreError> {
    let router = ForkJoinRouter::builder(scheduler.clone()).config(ForkJoinConfig::from(&CONFIG.fork_join))
                                                           .tracer(Arc::new(LoggingTracer))
                                                           .build();
    let request = Event::of(json!({"sku": "ACME-42"}));
    let routes = vec![lookup_route("precio", json!({"price": 12.5}), 30),
                      lookup_route("stock", json!({"available": 7}), 10),
                      lookup_route("envio", json!({"days": 2}), 20)];
    let pairs = routes.into_iter().map(|r| RoutingPair::of(request.clone(), r)).collect();

    let result = router.route(request.clone(), pairs).await?;
    println!("Scatter-gather: {}", result.payload().value);
    if let Some(sources) = result.variable("source") {
        println!("Rutas consultadas: {}", sources.value);
    }

    // Segunda ronda: una ruta falla y los errores se agregan.
    let failing = processor_fn("proveedor-caido", |event: Event| async move {
        Err::<Event, _>(RouteExecutionError::failure(event,
                                                     ErrorType::new("APP", "PROVIDER"),
                                                     "ConnectionException",
                                                     "proveedor sin respuesta"))
    });
    let router = ForkJoinRouter::builder(scheduler).delay_errors(true).build();
    let pairs = vec![RoutingPair::of(request.clone(), lookup_route("precio", json!({"price": 12.5}), 5)),
                     RoutingPair::of(request.clone(), failing)];
    match router.route(request, pairs).await {
        Err(RoutingError::Composite(composite)) => {
            error!("scatter_gather:failed routes={:?} error={}",
                   composite.failed_routes(),
                   composite.to_event_error(ErrorType::composite_routing()));
            println!("{}", composite.detailed_message());
        }
        other => {
            other?;
        }
    }
    Ok(())
}

fn order_router() -> ForeachRouter {
    let chain = processor_fn("sumar-linea", |event: Event| async move {
        let line = &event.payload().value;
        let amount = line["price"].as_f64().unwrap_or(0.0) * line["qty"].as_f64().unwrap_or(0.0);
        let total = event.variable("total").and_then(|v| v.value.as_f64()).unwrap_or(0.0);
        Ok::<_, RouteExecutionError>(event.into_builder().add_variable("total", TypedValue::of(total + amount)).build())
    });
    ForeachRouter::builder(chain).config(ForeachConfig::from(&CONFIG.foreach))
                                 .expression(Arc::new(PointerSplitter::new("/lines")))
                                 .build()
}

fn order(id: u64) -> Event {
    Event::of(json!({
        "id": id,
        "lines": [
            {"sku": "A", "price": 2.0, "qty": id},
            {"sku": "B", "price": 5.5, "qty": 1}
        ]
    }))
}

async fn run_foreach() -> Result<(), CoreError> {
    let router = Arc::new(order_router());
    let result = router.split(order(1)).await?;
    println!("Pedido 1 total: {}", result.variable("total").map(|v| v.value.clone()).unwrap_or_default());

    let (tx, rx) = mpsc::channel(8);
    let mut results = router.route_stream(rx)?;
    for id in 2..=4 {
        tx.send(order(id)).await
          .map_err(|e| CoreError::Internal(format!("canal cerrado: {e}")))?;
    }
    drop(tx);
    while let Some(processed) = results.recv().await {
        let processed = processed?;
        println!("Pedido {} total: {}",
                 processed.payload().value["id"],
                 processed.variable("total").map(|v| v.value.clone()).unwrap_or_default());
    }
    info!("foreach:stream finished inflight={}", router.inflight_events());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), CoreError> {
    // Cargar variables de entorno desde .env si existe (antes de leer CONFIG)
    let _ = dotenvy::dotenv();
    // el bridge de tracing-subscriber reenvía los registros de `log`
    let _ = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).try_init();
    info!("config: {}", serde_json::to_string(&*CONFIG).unwrap_or_default());

    let scheduler: Arc<dyn Scheduler> = Arc::new(TokioScheduler::current().map_err(RoutingError::from)?);
    run_scatter_gather(scheduler).await?;
    run_foreach().await?;
    Ok(())
}
