//! In-stack Lambda handlers backing the template's custom resources: bucket
//! emptying on teardown and asset upload into the data bucket.

use serde_json::{json, Value};

use crate::grants::{S3_READ_ACTIONS, S3_WRITE_ACTIONS};
use crate::naming::logical_id;
use crate::resources::{AssetDeployment, Resource};
use crate::template::POLICY_DOCUMENT_VERSION;

pub const HANDLER_RUNTIME: &str = "python3.12";
pub const HANDLER_ENTRYPOINT: &str = "index.handler";
pub const HANDLER_TIMEOUT_SECS: u32 = 900;
pub const AUTO_DELETE_MEMORY_MB: u32 = 128;
/// CloudFormation refuses inline `ZipFile` code above this size.
pub const INLINE_CODE_LIMIT: usize = 4096;
pub const BASIC_EXECUTION_POLICY: &str = "service-role/AWSLambdaBasicExecutionRole";
pub const BOOTSTRAP_ASSETS_BUCKET: &str = "cdk-hnb659fds-assets-${AWS::AccountId}-${AWS::Region}";

pub const AUTO_DELETE_PROVIDER_ID: &str = "CustomS3AutoDeleteObjectsCustomResourceProvider";
pub const AUTO_DELETE_RESOURCE_TYPE: &str = "Custom::S3AutoDeleteObjects";
pub const BUCKET_DEPLOYMENT_RESOURCE_TYPE: &str = "Custom::CDKBucketDeployment";
pub const AUTO_DELETE_ACTIONS: &[&str] = &[
    "s3:PutBucketPolicy",
    "s3:GetBucket*",
    "s3:List*",
    "s3:DeleteObject*",
];

pub const AUTO_DELETE_SOURCE: &str = include_str!("../handlers/auto_delete_objects.py");
pub const BUCKET_DEPLOYMENT_SOURCE: &str = include_str!("../handlers/bucket_deployment.py");

/// Rendered resources keyed by logical id, in insertion order.
pub type RenderedResources = Vec<(String, Value)>;

/// `bucket_name_sub` is `Fn::Sub` text, so `${LogicalId}` resolves to the
/// bucket's name.
fn bucket_arns(bucket_name_sub: &str) -> Value {
    json!([
        { "Fn::Sub": format!("arn:${{AWS::Partition}}:s3:::{bucket_name_sub}") },
        { "Fn::Sub": format!("arn:${{AWS::Partition}}:s3:::{bucket_name_sub}/*") },
    ])
}

fn lambda_role(inline_statements: Vec<Value>) -> Value {
    let mut properties = json!({
        "AssumeRolePolicyDocument": {
            "Version": POLICY_DOCUMENT_VERSION,
            "Statement": [
                {
                    "Action": "sts:AssumeRole",
                    "Effect": "Allow",
                    "Principal": { "Service": "lambda.amazonaws.com" },
                }
            ],
        },
        "ManagedPolicyArns": [
            { "Fn::Sub": format!("arn:${{AWS::Partition}}:iam::aws:policy/{BASIC_EXECUTION_POLICY}") }
        ],
    });
    if !inline_statements.is_empty() {
        if let Some(object) = properties.as_object_mut() {
            object.insert(
                "Policies".to_string(),
                json!([
                    {
                        "PolicyName": "HandlerAccess",
                        "PolicyDocument": {
                            "Version": POLICY_DOCUMENT_VERSION,
                            "Statement": inline_statements,
                        },
                    }
                ]),
            );
        }
    }
    json!({ "Type": "AWS::IAM::Role", "Properties": properties })
}

fn inline_function(role_id: &str, source: &str, memory_mb: u32, description: &str) -> Value {
    json!({
        "Type": "AWS::Lambda::Function",
        "Properties": {
            "Code": { "ZipFile": source },
            "Handler": HANDLER_ENTRYPOINT,
            "Runtime": HANDLER_RUNTIME,
            "MemorySize": memory_mb,
            "Timeout": HANDLER_TIMEOUT_SECS,
            "Role": { "Fn::GetAtt": [role_id, "Arn"] },
            "Description": description,
        },
        "DependsOn": [role_id],
    })
}

/// Provider, bucket policy and custom resource that empty `bucket` before
/// CloudFormation deletes it. The provider ids are stack-wide, so every
/// auto-deleting bucket shares one provider role and function.
pub fn auto_delete_resources(bucket: &Resource) -> RenderedResources {
    let role_id = logical_id(&[AUTO_DELETE_PROVIDER_ID, "Role"]);
    let function_id = logical_id(&[AUTO_DELETE_PROVIDER_ID, "Handler"]);
    let policy_id = logical_id(&[bucket.construct_id.as_str(), "Policy"]);
    let custom_id = logical_id(&[bucket.construct_id.as_str(), "AutoDeleteObjectsCustomResource"]);

    let bucket_policy = json!({
        "Type": "AWS::S3::BucketPolicy",
        "Properties": {
            "Bucket": { "Ref": bucket.logical_id },
            "PolicyDocument": {
                "Version": POLICY_DOCUMENT_VERSION,
                "Statement": [
                    {
                        "Action": AUTO_DELETE_ACTIONS,
                        "Effect": "Allow",
                        "Principal": { "AWS": { "Fn::GetAtt": [role_id, "Arn"] } },
                        "Resource": bucket_arns(&format!("${{{}}}", bucket.logical_id)),
                    }
                ],
            },
        },
    });

    let custom = json!({
        "Type": AUTO_DELETE_RESOURCE_TYPE,
        "Properties": {
            "ServiceToken": { "Fn::GetAtt": [function_id, "Arn"] },
            "BucketName": { "Ref": bucket.logical_id },
        },
        "DependsOn": [policy_id, bucket.logical_id],
        "DeletionPolicy": "Delete",
        "UpdateReplacePolicy": "Delete",
    });

    vec![
        (role_id.clone(), lambda_role(Vec::new())),
        (
            function_id.clone(),
            inline_function(
                &role_id,
                AUTO_DELETE_SOURCE,
                AUTO_DELETE_MEMORY_MB,
                &format!("Empties {} before stack teardown", bucket.construct_id),
            ),
        ),
        (policy_id, bucket_policy),
        (custom_id, custom),
    ]
}

/// Handler role, handler function and custom resource that copy the staged
/// asset archive into the destination bucket.
pub fn bucket_deployment_resources(deployment: &AssetDeployment) -> RenderedResources {
    let role_id = logical_id(&[deployment.construct_id.as_str(), "HandlerRole"]);
    let function_id = logical_id(&[deployment.construct_id.as_str(), "Handler"]);

    let read_assets = json!({
        "Action": S3_READ_ACTIONS,
        "Effect": "Allow",
        "Resource": bucket_arns(BOOTSTRAP_ASSETS_BUCKET),
    });
    let mut write_actions = S3_READ_ACTIONS.to_vec();
    write_actions.extend_from_slice(S3_WRITE_ACTIONS);
    let write_destination = json!({
        "Action": write_actions,
        "Effect": "Allow",
        "Resource": bucket_arns(&format!("${{{}}}", deployment.destination)),
    });

    let custom = json!({
        "Type": BUCKET_DEPLOYMENT_RESOURCE_TYPE,
        "Properties": {
            "ServiceToken": { "Fn::GetAtt": [function_id, "Arn"] },
            "SourceBucketNames": [ { "Fn::Sub": BOOTSTRAP_ASSETS_BUCKET } ],
            "SourceObjectKeys": [ deployment.asset.zip_file_name() ],
            "DestinationBucketName": { "Ref": deployment.destination },
            "Prune": true,
            "MemoryLimit": deployment.memory_limit_mb,
        },
        "DeletionPolicy": "Delete",
        "UpdateReplacePolicy": "Delete",
    });

    vec![
        (role_id.clone(), lambda_role(vec![read_assets, write_destination])),
        (
            function_id,
            inline_function(
                &role_id,
                BUCKET_DEPLOYMENT_SOURCE,
                deployment.memory_limit_mb,
                &format!("Uploads asset {} into {}", deployment.asset.hash, deployment.destination),
            ),
        ),
        (deployment.logical_id.clone(), custom),
    ]
}
