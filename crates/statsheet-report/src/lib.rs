pub mod docx;
pub mod labels;
pub mod layout;
pub mod text;

pub use docx::render_docx;
pub use labels::Labels;
pub use text::{render_text, AnalysisResponse};
