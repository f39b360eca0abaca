pub mod generation;
pub mod score;
pub mod stats;
pub mod token_count;
pub mod usage;
pub mod validation;
