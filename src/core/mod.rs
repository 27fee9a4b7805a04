// Core algorithm exports
pub mod distance;
pub mod ranking;

pub use distance::{haversine_distance, compute_distance, format_distance, CoordinateError};
pub use ranking::{rank_by_distance, rank_with_options, Locatable, RankOptions, RankedRecord, Ranker, Ranking};
