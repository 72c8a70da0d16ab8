pub mod conversion;
pub mod definition;
pub mod view;

pub use conversion::*;
pub use definition::*;
pub use view::*;
