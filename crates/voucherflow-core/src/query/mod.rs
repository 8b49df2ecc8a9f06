// ── Query resolution ──
//
// Filter input → endpoint selection (`resolver`), and cursor ↔ page
// bookkeeping (`pagination`). Both halves are pure; the service layer
// does the I/O in between.

pub mod filter;
pub mod pagination;
pub mod resolver;
pub mod view;

pub use filter::{FilterCriteria, FilterInput, STATUS_ALL};
pub use pagination::{Navigation, PageRequest, PaginationState};
pub use resolver::{QueryMode, QueryTarget, ResolvedQuery, resolve, resolve_in};
pub use view::ViewQuery;
