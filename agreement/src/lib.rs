pub mod compare;
pub mod export;
pub mod metrics;
pub mod prelude;
pub mod scan;
pub mod volume;
