pub mod collection;
pub mod join;
pub mod record;
pub mod schema;

pub use collection::Collection;
pub use record::{FieldValue, Record, RecordError};
pub use schema::{FieldKind, FieldSpec, Schema};
