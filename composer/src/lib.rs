pub mod report;
pub mod shared;

pub mod prelude {
    pub use crate::report::prelude::*;
    pub use crate::shared::prelude::*;
}
