pub mod entity;
pub mod errors;
pub mod ids;
pub mod report;
pub mod request;

pub use entity::*;
pub use errors::*;
pub use ids::*;
pub use report::*;
pub use request::*;
