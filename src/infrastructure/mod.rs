pub mod page_capture;

pub use page_capture::PageCapture;
