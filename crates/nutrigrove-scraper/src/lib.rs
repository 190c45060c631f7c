pub mod detail;
pub mod discovery;
pub mod dom;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod profile;
pub mod sections;
pub mod session;
pub mod walker;

pub use detail::retrieve_detail;
pub use discovery::probe_sequence;
pub use dom::{MenuDom, MenuPage};
pub use emitter::{to_record, RecordEmitter};
pub use engine::{MealScrape, MenuScraper};
pub use error::ScraperError;
pub use normalize::normalize;
pub use profile::{Pacing, SectionLayout, Selectors, SiteProfile};
pub use sections::{discover_sections, Section};
pub use session::{await_stable, BrowserSession, PageProbe, SessionOptions};
