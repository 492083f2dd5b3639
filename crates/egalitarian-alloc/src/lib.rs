pub mod allocation;
pub mod allocator;
pub mod error;
pub mod model;
pub mod valuation;

pub use allocation::{format_percentage, round_percentage, Allocation};
pub use allocator::{egalitarian_allocation, EgalitarianAllocator};
pub use error::{AllocationError, MalformedInputError, Result};
pub use model::AllocationModel;
pub use valuation::ValuationMatrix;
