//! Expansion of permission edges into IAM policy statements.

use serde_json::{json, Value};

use crate::resources::{Access, PermissionGrant, ResourceSpec, StackGraph};

pub const S3_READ_ACTIONS: &[&str] = &["s3:GetObject*", "s3:GetBucket*", "s3:List*"];
pub const S3_WRITE_ACTIONS: &[&str] = &[
    "s3:DeleteObject*",
    "s3:PutObject",
    "s3:PutObjectLegalHold",
    "s3:PutObjectRetention",
    "s3:PutObjectTagging",
    "s3:PutObjectVersionTagging",
    "s3:Abort*",
];
pub const DYNAMODB_READ_ACTIONS: &[&str] = &[
    "dynamodb:BatchGetItem",
    "dynamodb:GetRecords",
    "dynamodb:GetShardIterator",
    "dynamodb:Query",
    "dynamodb:GetItem",
    "dynamodb:Scan",
    "dynamodb:ConditionCheckItem",
    "dynamodb:DescribeTable",
];
pub const DYNAMODB_WRITE_ACTIONS: &[&str] = &[
    "dynamodb:BatchWriteItem",
    "dynamodb:PutItem",
    "dynamodb:UpdateItem",
    "dynamodb:DeleteItem",
];
pub const KINESIS_READ_ACTIONS: &[&str] = &[
    "kinesis:DescribeStreamSummary",
    "kinesis:GetRecords",
    "kinesis:GetShardIterator",
    "kinesis:ListShards",
    "kinesis:SubscribeToShard",
    "kinesis:DescribeStream",
    "kinesis:ListStreams",
    "kinesis:DescribeStreamConsumer",
];
pub const KINESIS_WRITE_ACTIONS: &[&str] = &["kinesis:PutRecord", "kinesis:PutRecords"];

/// One `Allow` statement. Resource ARNs carry `${AWS::...}` placeholders and
/// are rendered through `Fn::Sub`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyStatement {
    pub actions: Vec<&'static str>,
    pub resources: Vec<String>,
}

impl PolicyStatement {
    pub fn to_cfn(&self) -> Value {
        let resources: Vec<Value> = self
            .resources
            .iter()
            .map(|arn| json!({ "Fn::Sub": arn }))
            .collect();
        json!({
            "Action": self.actions,
            "Effect": "Allow",
            "Resource": resources,
        })
    }
}

fn actions(read: &[&'static str], write: &[&'static str], access: Access) -> Vec<&'static str> {
    let mut actions = read.to_vec();
    if access == Access::ReadWrite {
        actions.extend_from_slice(write);
    }
    actions
}

/// Statement for a single grant, or `None` when the target is not a
/// grantable data resource.
pub fn expand_grant(graph: &StackGraph, grant: &PermissionGrant) -> Option<PolicyStatement> {
    let target = graph.resource(&grant.target)?;
    let account = &graph.account;
    let statement = match &target.spec {
        ResourceSpec::Bucket(bucket) => {
            let arn = format!("arn:${{AWS::Partition}}:s3:::{}", bucket.name);
            PolicyStatement {
                actions: actions(S3_READ_ACTIONS, S3_WRITE_ACTIONS, grant.access),
                resources: vec![arn.clone(), format!("{arn}/*")],
            }
        }
        ResourceSpec::Table(table) => PolicyStatement {
            actions: actions(DYNAMODB_READ_ACTIONS, DYNAMODB_WRITE_ACTIONS, grant.access),
            resources: vec![format!(
                "arn:${{AWS::Partition}}:dynamodb:${{AWS::Region}}:{account}:table/{}",
                table.name
            )],
        },
        ResourceSpec::Stream(stream) => PolicyStatement {
            actions: actions(KINESIS_READ_ACTIONS, KINESIS_WRITE_ACTIONS, grant.access),
            resources: vec![format!(
                "arn:${{AWS::Partition}}:kinesis:${{AWS::Region}}:{account}:stream/{}",
                stream.name
            )],
        },
        ResourceSpec::Role(_) | ResourceSpec::Database(_) | ResourceSpec::Job(_) => return None,
    };
    Some(statement)
}

pub fn statements_for(graph: &StackGraph, grantee: &str) -> Vec<PolicyStatement> {
    graph
        .grants_for(grantee)
        .filter_map(|grant| expand_grant(graph, grant))
        .collect()
}
