pub mod color;
pub mod data_url;
pub mod engine;
pub mod history;
pub mod id;
pub mod pricing;
pub mod storage;
pub mod surface;
pub mod sync;
pub mod util;

pub use id::StudioID;
