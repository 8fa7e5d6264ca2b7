pub mod count;
pub mod error;
pub mod fields;
pub mod filter_options;
pub mod pagination;
pub mod predicate;
pub mod projector;
pub mod service;
