pub mod cookie;
pub mod link;
pub mod loaders;
pub mod page_selectors;
pub mod result;
pub mod selector;

pub use cookie::CookieRecord;
pub use link::{CandidateLink, ScrapedEntry, ScrapedMessage};
pub use loaders::load_scraped_entries;
pub use result::{BatchSummary, Outcome, ResultLog, WorkflowResult};
pub use selector::{Selector, SelectorKind, SelectorSet};
