pub mod http;

pub use http::HttpArchiveSource;
