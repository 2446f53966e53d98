pub mod components;
pub mod deser;
pub mod error;
pub mod key;
pub mod traits;
pub mod value;
mod utils;

pub use components::collection::config::{CollectionConfig, ScalarPolicy};
pub use components::collection::Collection;
pub use components::types::{TypeDef, TypeRegistry};
pub use error::Error;
pub use key::Key;
pub use value::{Object, Structure, Value};

pub type Result<T> = std::result::Result<T, Error>;
