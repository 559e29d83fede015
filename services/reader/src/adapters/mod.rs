pub mod http;

pub use http::HttpLibraryAdapter;
