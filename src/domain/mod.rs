pub mod constants;
pub mod enums;
pub mod errors;
pub mod events;
pub mod model;
pub mod traits;
