//! Remote resource provider
//!
//! The cloud API is consumed only through the two traits in this module.
//! `RemoteProvider` issues list, describe, create and update calls and
//! answers the caller's identity; `ObjectStore` moves raw bytes in and out of
//! the object store. Transport concerns (credentials, signing, retry and
//! backoff) belong to the implementation, not to the orchestrators.

pub mod aws_sdk;
#[cfg(test)]
pub mod mock;
pub mod operation;
mod shapes;

pub use aws_sdk::{AwsSdk, ProviderOptions};
pub use operation::Operation;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ProviderError;

/// Field carrying the opaque pagination cursor in list requests and responses
pub const NEXT_TOKEN: &str = "NextToken";

/// Identity of the credentials the provider is using
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallerIdentity {
    pub account: String,
    pub arn: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Control-plane API of the contact-center service
pub trait RemoteProvider {
    /// Issue one operation with a native request document and return the
    /// native response document (`Value::Null` for operations without a body)
    fn call(&self, op: Operation, input: &Value) -> Result<Value, ProviderError>;

    /// Look up the account behind the current credentials
    fn caller_identity(&self) -> Result<CallerIdentity, ProviderError>;
}

/// Object storage used by object-store destinations and sources
pub trait ObjectStore {
    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), ProviderError>;

    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ProviderError>;
}

impl<T: RemoteProvider + ?Sized> RemoteProvider for &T {
    fn call(&self, op: Operation, input: &Value) -> Result<Value, ProviderError> {
        (**self).call(op, input)
    }

    fn caller_identity(&self) -> Result<CallerIdentity, ProviderError> {
        (**self).caller_identity()
    }
}

impl<T: ObjectStore + ?Sized> ObjectStore for &T {
    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), ProviderError> {
        (**self).put_object(bucket, key, body)
    }

    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ProviderError> {
        (**self).get_object(bucket, key)
    }
}

/// Extract the continuation cursor from a list response, treating an empty
/// string the same as an absent one
pub fn next_token(response: &Value) -> Option<String> {
    response
        .get(NEXT_TOKEN)
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
