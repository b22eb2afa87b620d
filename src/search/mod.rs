// Hotel search: criteria extraction, filtering, sorting and search sessions
//
// The pure stages (extractor, evaluator, location partition, sort) compose
// into the listing pipeline. The session store holds the state of the
// conversational search for each client.

pub mod criteria;
pub mod evaluator;
pub mod extractor;
pub mod handlers;
pub mod location;
pub mod pipeline;
pub mod session;
pub mod sort;
pub mod vocabulary;

pub use criteria::{PriceRange, SearchCriteria};
pub use evaluator::{apply_ai_filters, FilterEvaluator};
pub use extractor::CriteriaExtractor;
pub use location::LocationSelection;
pub use pipeline::{home_listing, is_search_mode, paginate, search_results, ListingInput, Page};
pub use session::{SearchAction, SearchState, SessionError, SessionRegistry};
pub use sort::{sort_hotels, SortKey};
