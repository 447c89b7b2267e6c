//! Contract between the request pipeline and domain handler groups.
//!
//! The gateway owns no business logic. Each URL namespace is backed by an
//! external collaborator implementing [`DomainHandler`]; the pipeline
//! guarantees it a fully parsed [`RequestContext`] and converts every
//! returned failure through the error normalizer.

pub mod context;
pub mod handler;

pub use context::{ParsedBody, RequestContext, bearer_token, client_identity};
pub use handler::{DetachedHandler, DomainHandler, DomainResponse, HandlerGroups, Namespace};
