mod render;
mod utils;

pub use render::*;
pub use utils::*;
