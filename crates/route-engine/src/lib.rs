//! route-engine: routers de fork-join y foreach sobre el modelo de
//! `route-core`.
//!
//! - `fork_join`: reparte un evento en N ramas concurrentes (acotadas),
//!   reordena los resultados por secuencia y los une en un único evento.
//! - `foreach`: divide un evento en elementos y ejecuta la cadena anidada
//!   secuencialmente por cada uno, con soporte de anidamiento y modo stream.
//! - `merge`: fusión de variables de las ramas sobre el evento original.
pub mod config;
pub mod foreach;
pub mod fork_join;
pub mod merge;

pub use config::{ForeachConfig, ForkJoinConfig};
pub use foreach::{ForeachRouter, ForeachRouterBuilder, PayloadSplitter, PointerSplitter, SplitExpression};
pub use fork_join::{CollectListAggregator, CollectMapAggregator, ForkJoinRouter, ForkJoinRouterBuilder, JoinOnlyAggregator,
                    ResultAggregator};
pub use merge::merge_variables;
