pub mod career;
pub mod comparison;
pub mod service;
pub mod trend;

mod errors;
pub mod models;

pub use career::{aggregate_career, select_best_figures, CareerAccumulator};
pub use comparison::{head_to_head, validate_comparison_ids};
pub use errors::StatsError;
pub use models::*;
pub use service::{load_completed, StatsService, StatsServiceBuilder};
pub use trend::build_performance_trend;
