pub mod bundle;
pub mod column;
pub mod error;
pub mod partition;
pub mod record;
pub mod table;
pub mod value;

pub use bundle::{OutputBundle, Sheet};
pub use column::{Column, ColumnKind};
pub use error::{ModelError, Result};
pub use partition::Partition;
pub use record::PageRecord;
pub use table::Table;
pub use value::{TIMESTAMP_FORMAT, Value};
