pub mod errors;
pub mod guard;
pub mod order;
pub mod outcome;
pub mod pagination;
pub mod ports;
pub mod product;
pub mod stats;
pub mod user;
