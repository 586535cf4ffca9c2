//! Instance handles and origin identities
//!
//! A backed-up record remembers where it came from through its ARN. Restore
//! compares that origin against the destination before it lets a record
//! overwrite anything in place.

use std::fmt;
use std::str::FromStr;

/// Identifies the tenant instance a run is bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceHandle {
    id: String,
}

impl InstanceHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Which instances a backup run covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceSelector {
    Single(InstanceHandle),
    /// Every instance visible to the caller, processed one after another
    All,
}

/// A parsed `arn:<partition>:<service>:<region>:<account>:<resource>` string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account_id: String,
    pub resource: String,
}

impl FromStr for Arn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(6, ':');
        let prefix = parts.next().unwrap_or_default();
        if prefix != "arn" {
            return Err(format!("not an ARN: {}", s));
        }
        let mut next = |field: &str| {
            parts
                .next()
                .map(str::to_string)
                .ok_or_else(|| format!("ARN is missing the {} segment: {}", field, s))
        };
        Ok(Self {
            partition: next("partition")?,
            service: next("service")?,
            region: next("region")?,
            account_id: next("account")?,
            resource: next("resource")?,
        })
    }
}

/// Account, instance and region a record was backed up from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginIdentity {
    pub account_id: String,
    pub instance_id: String,
    pub region: String,
}

impl OriginIdentity {
    /// Extract the origin from a connect resource ARN such as
    /// `arn:aws:connect:us-east-1:111122223333:instance/abc123/contact-flow/f-1`
    pub fn from_arn(arn: &str) -> Result<Self, String> {
        let parsed: Arn = arn.parse()?;
        let instance_id = parsed
            .resource
            .strip_prefix("instance/")
            .and_then(|rest| rest.split('/').next())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| format!("ARN does not reference an instance: {}", arn))?;
        Ok(Self {
            account_id: parsed.account_id,
            instance_id: instance_id.to_string(),
            region: parsed.region,
        })
    }
}

impl fmt::Display for OriginIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "account {} instance {} ({})",
            self.account_id, self.instance_id, self.region
        )
    }
}
