//! 业务能力层
//!
//! 每个服务只描述"我能做什么"，不关心流程顺序

pub mod cookie_store;
pub mod element_resolver;
pub mod evidence_recorder;
pub mod link_validator;
pub mod session_manager;

pub use cookie_store::CookieStore;
pub use element_resolver::ElementResolver;
pub use evidence_recorder::EvidenceRecorder;
pub use link_validator::{extract_links, LinkValidator};
pub use session_manager::{Session, SessionManager};
