pub mod error;
pub mod fundamentals;
pub mod gates;
pub mod technical;
pub mod traits;
pub mod types;
pub mod verdict;

pub use error::*;
pub use fundamentals::*;
pub use gates::*;
pub use technical::*;
pub use traits::*;
pub use types::*;
pub use verdict::*;
