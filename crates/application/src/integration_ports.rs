mod crm;
mod hr;
mod notifier;

pub use crm::{CrmGateway, CrmRecordFields};
pub use hr::HrSystem;
pub use notifier::Notifier;
