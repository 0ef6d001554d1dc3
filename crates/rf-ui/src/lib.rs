//! # rf-ui
//!
//! Askama page templates and the view types they render.
//! Handlers build a `PageContext` per request and hand it to one of the
//! page templates; nothing here touches storage.

pub mod breadcrumbs;
pub mod format;
pub mod pages;

pub use askama::Template;
pub use breadcrumbs::{BreadCrumb, BreadCrumbs};
pub use format::format_post_body;
pub use pages::*;
