//! Stack composition: pure translation of an [`EnvironmentConfig`] into a
//! CloudFormation template.
//!
//! Nothing here performs I/O. The shell writes the rendered template to disk
//! and hands it to the apply tool.
//!
//! [`EnvironmentConfig`]: crate::config::EnvironmentConfig

mod api;
mod bucket;
mod compose;
mod distribution;
mod dns;
mod error;
mod model;
pub mod naming;
mod toolkit;
mod waf;

pub use compose::{compose, compose_stack, outputs, ComposedStack, CLOUDFRONT_REGION, MANAGED_BY};
pub use distribution::{ENTRY_DOCUMENT, SPA_ROUTING_CODE};
pub use error::{ComposeError, Result};
pub use model::{get_att, ref_to, sub, DeletionPolicy, Output, Resource, StackTemplate};
pub use toolkit::{compose_toolkit, STAGING_BUCKET_OUTPUT};

/// Logical ids of every resource the stacks declare.
pub mod ids {
    pub const WEBSITE_BUCKET: &str = "WebsiteBucket";
    pub const WEBSITE_BUCKET_POLICY: &str = "WebsiteBucketPolicy";
    pub const ORIGIN_ACCESS_IDENTITY: &str = "OriginAccessIdentity";
    pub const SPA_ROUTING_FUNCTION: &str = "SpaRoutingFunction";
    pub const DISTRIBUTION: &str = "Distribution";
    pub const LOGS_BUCKET: &str = "LogsBucket";
    pub const WEB_ACL: &str = "WebAcl";
    pub const ALIAS_RECORD_A: &str = "AliasRecordA";
    pub const ALIAS_RECORD_AAAA: &str = "AliasRecordAAAA";
    pub const API_FUNCTION_ROLE: &str = "ApiFunctionRole";
    pub const API_FUNCTION_LOG_GROUP: &str = "ApiFunctionLogGroup";
    pub const API_FUNCTION: &str = "ApiFunction";
    pub const HTTP_API: &str = "HttpApi";
    pub const API_INVOKE_PERMISSION: &str = "ApiInvokePermission";
    pub const STAGING_BUCKET: &str = "StagingBucket";
}
