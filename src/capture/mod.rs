pub mod lenient;
pub mod model;
