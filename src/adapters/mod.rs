// Adapters layer: concrete implementations of the domain ports.

pub mod csv_parser;
pub mod http_uploader;
pub mod offline_uploader;

pub use csv_parser::CsvParser;
pub use http_uploader::HttpUploader;
pub use offline_uploader::OfflineUploader;
