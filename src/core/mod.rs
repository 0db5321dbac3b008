pub mod intake;
pub mod pagination;
pub mod render;
pub mod session;
pub mod state;
pub mod view;

pub use crate::domain::model::{Dataset, Generation, Row, Schema, SelectedFile, UploadStatus};
pub use crate::domain::ports::{FileSource, TabularParser, Uploader};
pub use crate::utils::error::Result;
