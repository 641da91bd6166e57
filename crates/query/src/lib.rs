//! Filter model and query compiler shared by the docket search controller and
//! its front ends.
//!
//! Filters are edited through a [`FilterSet`], typed by a [`FieldRegistry`],
//! and compiled by a [`Compiler`] into the [`SearchRequest`] payload the
//! document backend expects.

pub mod compile;
pub mod error;
pub mod field;
pub mod filter;
pub mod pagination;
pub mod response;

pub use compile::{
	Compiler, DEFAULT_PAGE_SIZE, DEFAULT_SOURCE_SYSTEM, DefaultFacetPolicy, QueryParams,
	RequiredDefault, SearchRequest,
};
pub use error::{CompileError, ValidationError};
pub use field::{FieldRegistry, QueryType};
pub use filter::{DateRange, Filter, FilterSet, FilterValue, RangeBound};
pub use pagination::Pagination;
pub use response::{PaginationPayload, SearchPage, SearchResponse, SearchResult};
