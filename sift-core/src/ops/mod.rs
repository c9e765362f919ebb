mod copy;
mod executor;
mod trash;

pub use executor::{OperationConfig, OperationExecutor};
pub use trash::{SystemTrash, Trash};
