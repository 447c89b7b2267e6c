//! HTTP endpoint handlers: system endpoints, namespace dispatch, and
//! static views.

pub mod dispatch;
pub mod system;
pub mod views;
