pub mod constants;
pub mod prompt;
pub mod render;

pub use prompt::Terminal;
