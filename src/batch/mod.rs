pub mod driver;
pub mod ledger;
pub mod manifest;

pub use driver::{run_batch, BatchDriver, BatchSettings, BatchSummary};
pub use ledger::{Ledger, MetadataRecord};
pub use manifest::{Manifest, ManifestRow};
