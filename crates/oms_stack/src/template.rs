//! CloudFormation rendering of a synthesized [`StackGraph`].

use serde_json::{json, Map, Value};

use crate::grants::statements_for;
use crate::handlers::{auto_delete_resources, bucket_deployment_resources};
use crate::naming::logical_id;
use crate::resources::{
    BillingMode, BucketEncryption, Resource, ResourceKind, ResourceSpec, StackGraph,
};

pub const POLICY_DOCUMENT_VERSION: &str = "2012-10-17";
pub const AUTO_DELETE_TAG: &str = "aws-cdk:auto-delete-objects";

/// Logical id of the inline policy that carries a role's grants.
pub fn default_policy_id(role: &Resource) -> String {
    logical_id(&[role.construct_id.as_str(), "DefaultPolicy"])
}

fn tag_list(graph: &StackGraph, extra: &[(&str, &str)]) -> Option<Value> {
    let mut tags: Vec<Value> = extra
        .iter()
        .map(|(key, value)| json!({ "Key": key, "Value": value }))
        .collect();
    tags.extend(
        graph
            .tags
            .iter()
            .map(|(key, value)| json!({ "Key": key, "Value": value })),
    );
    (!tags.is_empty()).then_some(Value::Array(tags))
}

fn with_tags(mut properties: Value, tags: Option<Value>) -> Value {
    if let (Some(tags), Some(object)) = (tags, properties.as_object_mut()) {
        object.insert("Tags".to_string(), tags);
    }
    properties
}

fn resource_properties(graph: &StackGraph, resource: &Resource) -> Value {
    match &resource.spec {
        ResourceSpec::Bucket(bucket) => {
            let algorithm = match bucket.encryption {
                BucketEncryption::S3Managed => "AES256",
            };
            let extra: &[(&str, &str)] = if bucket.auto_delete_objects {
                &[(AUTO_DELETE_TAG, "true")]
            } else {
                &[]
            };
            with_tags(
                json!({
                    "BucketName": bucket.name,
                    "BucketEncryption": {
                        "ServerSideEncryptionConfiguration": [
                            { "ServerSideEncryptionByDefault": { "SSEAlgorithm": algorithm } }
                        ]
                    },
                }),
                tag_list(graph, extra),
            )
        }
        ResourceSpec::Table(table) => {
            let billing_mode = match table.billing_mode {
                BillingMode::PayPerRequest => "PAY_PER_REQUEST",
            };
            with_tags(
                json!({
                    "TableName": table.name,
                    "KeySchema": [
                        { "AttributeName": table.partition_key.name, "KeyType": "HASH" }
                    ],
                    "AttributeDefinitions": [
                        {
                            "AttributeName": table.partition_key.name,
                            "AttributeType": table.partition_key.attribute_type.as_cfn(),
                        }
                    ],
                    "BillingMode": billing_mode,
                }),
                tag_list(graph, &[]),
            )
        }
        ResourceSpec::Stream(stream) => with_tags(
            json!({
                "Name": stream.name,
                "ShardCount": stream.shard_count,
                "RetentionPeriodHours": stream.retention_hours,
            }),
            tag_list(graph, &[]),
        ),
        ResourceSpec::Role(role) => {
            let managed: Vec<Value> = role
                .managed_policies
                .iter()
                .map(|name| json!({ "Fn::Sub": format!("arn:${{AWS::Partition}}:iam::aws:policy/{name}") }))
                .collect();
            with_tags(
                json!({
                    "AssumeRolePolicyDocument": {
                        "Version": POLICY_DOCUMENT_VERSION,
                        "Statement": [
                            {
                                "Action": "sts:AssumeRole",
                                "Effect": "Allow",
                                "Principal": { "Service": role.trusted_service },
                            }
                        ],
                    },
                    "ManagedPolicyArns": managed,
                }),
                tag_list(graph, &[]),
            )
        }
        ResourceSpec::Database(database) => json!({
            "CatalogId": database.catalog_id,
            "DatabaseInput": { "Name": database.name },
        }),
        ResourceSpec::Job(job) => json!({
            "Name": job.name,
            "Role": { "Fn::GetAtt": [job.role, "Arn"] },
            "Command": {
                "Name": job.command.name,
                "ScriptLocation": job.command.script_location,
                "PythonVersion": job.command.python_version,
            },
            "DefaultArguments": job.default_arguments,
            "MaxRetries": job.max_retries,
            "GlueVersion": job.glue_version,
            "MaxCapacity": job.max_capacity,
        }),
    }
}

/// Renders the graph as a CloudFormation template document.
pub fn render_template(graph: &StackGraph) -> Value {
    let mut resources = Map::new();
    let mut policy_ids = Vec::new();

    for resource in &graph.resources {
        let mut body = json!({
            "Type": resource.kind().cfn_type(),
            "Properties": resource_properties(graph, resource),
        });
        if let (Some(policy), Some(object)) = (resource.removal_policy, body.as_object_mut()) {
            object.insert("DeletionPolicy".to_string(), json!(policy.as_cfn()));
            object.insert("UpdateReplacePolicy".to_string(), json!(policy.as_cfn()));
        }

        if resource.kind() == ResourceKind::Job {
            let mut depends_on: Vec<String> = policy_ids.clone();
            depends_on.extend(graph.deployments.iter().map(|d| d.logical_id.clone()));
            depends_on.sort();
            if let Some(object) = body.as_object_mut() {
                object.insert("DependsOn".to_string(), json!(depends_on));
            }
        }
        resources.insert(resource.logical_id.clone(), body);

        if let ResourceSpec::Bucket(bucket) = &resource.spec {
            if bucket.auto_delete_objects {
                resources.extend(auto_delete_resources(resource));
            }
        }

        if resource.kind() == ResourceKind::Role {
            let statements: Vec<Value> = statements_for(graph, &resource.logical_id)
                .iter()
                .map(|statement| statement.to_cfn())
                .collect();
            if !statements.is_empty() {
                let policy_id = default_policy_id(resource);
                resources.insert(
                    policy_id.clone(),
                    json!({
                        "Type": "AWS::IAM::Policy",
                        "Properties": {
                            "PolicyName": policy_id,
                            "PolicyDocument": {
                                "Version": POLICY_DOCUMENT_VERSION,
                                "Statement": statements,
                            },
                            "Roles": [ { "Ref": resource.logical_id } ],
                        },
                    }),
                );
                policy_ids.push(policy_id);
            }
        }
    }

    for deployment in &graph.deployments {
        resources.extend(bucket_deployment_resources(deployment));
    }

    let outputs: Map<String, Value> = graph
        .outputs
        .iter()
        .map(|output| (output.name.clone(), json!({ "Value": output.value })))
        .collect();

    let mut template = Map::new();
    if let Some(description) = &graph.description {
        template.insert("Description".to_string(), json!(description));
    }
    template.insert("Resources".to_string(), Value::Object(resources));
    template.insert("Outputs".to_string(), Value::Object(outputs));
    Value::Object(template)
}
