//! Typed resource graph produced by synthesis.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::assets::AssetManifest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Bucket,
    Table,
    Stream,
    Role,
    Database,
    Job,
}

impl ResourceKind {
    pub const ALL: [Self; 6] = [
        Self::Bucket,
        Self::Table,
        Self::Stream,
        Self::Role,
        Self::Database,
        Self::Job,
    ];

    pub fn cfn_type(self) -> &'static str {
        match self {
            Self::Bucket => "AWS::S3::Bucket",
            Self::Table => "AWS::DynamoDB::Table",
            Self::Stream => "AWS::Kinesis::Stream",
            Self::Role => "AWS::IAM::Role",
            Self::Database => "AWS::Glue::Database",
            Self::Job => "AWS::Glue::Job",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalPolicy {
    Destroy,
    Retain,
}

impl RemovalPolicy {
    pub fn as_cfn(self) -> &'static str {
        match self {
            Self::Destroy => "Delete",
            Self::Retain => "Retain",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BucketEncryption {
    S3Managed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSpec {
    pub name: String,
    pub encryption: BucketEncryption,
    pub auto_delete_objects: bool,
}

impl BucketSpec {
    pub fn s3_uri(&self, key: &str) -> String {
        format!("s3://{}/{}", self.name, key.trim_start_matches('/'))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeType {
    String,
    Number,
    Binary,
}

impl AttributeType {
    pub fn as_cfn(self) -> &'static str {
        match self {
            Self::String => "S",
            Self::Number => "N",
            Self::Binary => "B",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAttribute {
    pub name: String,
    pub attribute_type: AttributeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingMode {
    PayPerRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    pub name: String,
    pub partition_key: KeyAttribute,
    pub billing_mode: BillingMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSpec {
    pub name: String,
    pub shard_count: u32,
    pub retention_hours: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSpec {
    pub trusted_service: String,
    /// Names relative to `arn:<partition>:iam::aws:policy/`.
    pub managed_policies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSpec {
    pub catalog_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCommand {
    pub name: String,
    pub script_location: String,
    pub python_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    pub name: String,
    /// Logical id of the execution role.
    pub role: String,
    pub command: JobCommand,
    pub default_arguments: BTreeMap<String, String>,
    pub max_retries: u32,
    pub glue_version: String,
    pub max_capacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResourceSpec {
    Bucket(BucketSpec),
    Table(TableSpec),
    Stream(StreamSpec),
    Role(RoleSpec),
    Database(DatabaseSpec),
    Job(JobSpec),
}

impl ResourceSpec {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Bucket(_) => ResourceKind::Bucket,
            Self::Table(_) => ResourceKind::Table,
            Self::Stream(_) => ResourceKind::Stream,
            Self::Role(_) => ResourceKind::Role,
            Self::Database(_) => ResourceKind::Database,
            Self::Job(_) => ResourceKind::Job,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub construct_id: String,
    pub logical_id: String,
    /// `None` leaves teardown to CloudFormation's default, which deletes.
    pub removal_policy: Option<RemovalPolicy>,
    pub spec: ResourceSpec,
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        self.spec.kind()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Access {
    Read,
    ReadWrite,
}

/// Static permission edge from a role to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub grantee: String,
    pub target: String,
    pub access: Access,
}

/// Upload of the local asset directory into a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDeployment {
    pub construct_id: String,
    pub logical_id: String,
    /// Logical id of the destination bucket.
    pub destination: String,
    pub asset: AssetManifest,
    pub memory_limit_mb: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackGraph {
    pub stack_id: String,
    pub account: String,
    pub region: Option<String>,
    pub description: Option<String>,
    pub tags: BTreeMap<String, String>,
    pub resources: Vec<Resource>,
    pub grants: Vec<PermissionGrant>,
    pub deployments: Vec<AssetDeployment>,
    pub outputs: Vec<Output>,
}

impl StackGraph {
    pub fn resources_of(&self, kind: ResourceKind) -> impl Iterator<Item = &Resource> {
        self.resources
            .iter()
            .filter(move |resource| resource.kind() == kind)
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources
            .iter()
            .find(|resource| resource.logical_id == logical_id)
    }

    pub fn bucket(&self) -> Option<&BucketSpec> {
        self.resources.iter().find_map(|r| match &r.spec {
            ResourceSpec::Bucket(spec) => Some(spec),
            _ => None,
        })
    }

    pub fn table(&self) -> Option<&TableSpec> {
        self.resources.iter().find_map(|r| match &r.spec {
            ResourceSpec::Table(spec) => Some(spec),
            _ => None,
        })
    }

    pub fn stream(&self) -> Option<&StreamSpec> {
        self.resources.iter().find_map(|r| match &r.spec {
            ResourceSpec::Stream(spec) => Some(spec),
            _ => None,
        })
    }

    pub fn role(&self) -> Option<&RoleSpec> {
        self.resources.iter().find_map(|r| match &r.spec {
            ResourceSpec::Role(spec) => Some(spec),
            _ => None,
        })
    }

    pub fn database(&self) -> Option<&DatabaseSpec> {
        self.resources.iter().find_map(|r| match &r.spec {
            ResourceSpec::Database(spec) => Some(spec),
            _ => None,
        })
    }

    pub fn job(&self) -> Option<&JobSpec> {
        self.resources.iter().find_map(|r| match &r.spec {
            ResourceSpec::Job(spec) => Some(spec),
            _ => None,
        })
    }

    pub fn grants_for<'a>(
        &'a self,
        grantee: &'a str,
    ) -> impl Iterator<Item = &'a PermissionGrant> + 'a {
        self.grants
            .iter()
            .filter(move |grant| grant.grantee == grantee)
    }

    pub fn output(&self, name: &str) -> Option<&str> {
        self.outputs
            .iter()
            .find(|output| output.name == name)
            .map(|output| output.value.as_str())
    }
}
