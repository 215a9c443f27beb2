//! 基础设施层
//!
//! 持有稀缺资源（Browser / Page），只向上暴露页面操作能力。

pub mod cdp_driver;
pub mod driver;
pub mod js_executor;

pub use cdp_driver::CdpDriver;
pub use driver::{ElementHandle, ElementState, PageDriver};
pub use js_executor::JsExecutor;
