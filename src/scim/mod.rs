//! Generic SCIM 2.0 resource client authenticated through an [`AuthContext`].
//!
//! [`AuthContext`]: crate::sources::AuthContext

pub mod client;
pub mod types;

pub use client::{ResourceClient, SCIM_GROUPS, SCIM_USERS};
pub use types::{
    ListQuery, ListResponse, PatchOpKind, PatchOperation, PatchRequest, SearchRequest,
    LIST_RESPONSE_SCHEMA, SCIM_CONTENT_TYPE,
};
