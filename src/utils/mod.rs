pub mod errors;
pub mod page;

pub use errors::ChartError;
pub use page::Page;
