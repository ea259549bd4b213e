pub mod builder;
pub mod floating;
pub mod integral;
