//! The deployment template builder: one linear pass that declares the data
//! platform resources, wires the Glue role's permissions, and binds outputs.

use std::collections::BTreeMap;
use std::path::Path;

use crate::assets::AssetManifest;
use crate::context::DeploymentContext;
use crate::error::{Result, SynthError};
use crate::naming::{logical_id, physical_name, MAX_BUCKET_NAME_LEN, MAX_TABLE_NAME_LEN};
use crate::resources::{
    Access, AssetDeployment, AttributeType, BillingMode, BucketEncryption, BucketSpec,
    DatabaseSpec, JobCommand, JobSpec, KeyAttribute, Output, PermissionGrant, RemovalPolicy,
    Resource, ResourceSpec, RoleSpec, StackGraph, StreamSpec, TableSpec,
};

pub const BUCKET_CONSTRUCT_ID: &str = "AgenticOmsDataBucket";
pub const TABLE_CONSTRUCT_ID: &str = "OmsOrdersTable";
pub const STREAM_CONSTRUCT_ID: &str = "OmsEventsStream";
pub const ROLE_CONSTRUCT_ID: &str = "GlueJobRole";
pub const DATABASE_CONSTRUCT_ID: &str = "OmsGlueDatabase";
pub const DEPLOYMENT_CONSTRUCT_ID: &str = "DeployScripts";
pub const JOB_CONSTRUCT_ID: &str = "OmsGlueJob";

pub const ORDERS_PARTITION_KEY: &str = "orderId";
pub const STREAM_NAME: &str = "oms-events-stream";
pub const STREAM_SHARD_COUNT: u32 = 1;
pub const STREAM_RETENTION_HOURS: u32 = 24;
pub const GLUE_SERVICE_PRINCIPAL: &str = "glue.amazonaws.com";
pub const GLUE_MANAGED_POLICY: &str = "service-role/AWSGlueServiceRole";
pub const DATABASE_NAME: &str = "agentic_oms_db";
pub const ASSET_MEMORY_LIMIT_MB: u32 = 512;

pub const JOB_NAME: &str = "agentic-oms-glue-etl";
pub const JOB_COMMAND: &str = "glueetl";
pub const JOB_PYTHON_VERSION: &str = "3";
pub const JOB_LANGUAGE: &str = "python";
pub const JOB_GLUE_VERSION: &str = "3.0";
pub const JOB_MAX_RETRIES: u32 = 0;
pub const JOB_MAX_CAPACITY: f64 = 2.0;
pub const GLUE_SCRIPT_KEY: &str = "glue/glue_job.py";
pub const GLUE_TEMP_PREFIX: &str = "glue/tmp/";

pub const OUTPUT_DATA_BUCKET: &str = "DataBucket";
pub const OUTPUT_ORDERS_TABLE: &str = "OrdersTable";
pub const OUTPUT_KINESIS_STREAM: &str = "KinesisStream";
pub const OUTPUT_GLUE_JOB_NAME: &str = "GlueJobName";

struct GraphBuilder<'a> {
    ctx: &'a DeploymentContext,
    graph: StackGraph,
}

impl<'a> GraphBuilder<'a> {
    fn new(ctx: &'a DeploymentContext) -> Self {
        Self {
            ctx,
            graph: StackGraph {
                stack_id: ctx.stack_id.clone(),
                account: ctx.account.clone(),
                region: ctx.region.clone(),
                description: ctx.props.description.clone(),
                tags: ctx.props.tags.clone(),
                resources: Vec::new(),
                grants: Vec::new(),
                deployments: Vec::new(),
                outputs: Vec::new(),
            },
        }
    }

    fn generated_name(&self, construct_id: &str, max_len: usize, lowercase: bool) -> String {
        physical_name(
            &self.ctx.stack_id,
            construct_id,
            &self.ctx.account,
            self.ctx.region.as_deref(),
            max_len,
            lowercase,
        )
    }

    fn declare(
        &mut self,
        construct_id: &str,
        removal_policy: Option<RemovalPolicy>,
        spec: ResourceSpec,
    ) -> String {
        let id = logical_id(&[construct_id]);
        tracing::debug!(
            logical_id = %id,
            kind = ?spec.kind(),
            removal_policy = ?removal_policy,
            "declared resource"
        );
        self.graph.resources.push(Resource {
            construct_id: construct_id.to_string(),
            logical_id: id.clone(),
            removal_policy,
            spec,
        });
        id
    }

    fn grant(&mut self, grantee: &str, target: &str, access: Access) {
        tracing::debug!(grantee, target, access = ?access, "granted access");
        self.graph.grants.push(PermissionGrant {
            grantee: grantee.to_string(),
            target: target.to_string(),
            access,
        });
    }

    fn output(&mut self, name: &str, value: String) {
        self.graph.outputs.push(Output {
            name: name.to_string(),
            value,
        });
    }
}

/// Builds the OMS data platform graph for `ctx`, uploading `asset_dir` into
/// the data bucket.
///
/// # Errors
///
/// Fails when the context is invalid, the asset directory is missing, or the
/// asset directory does not provide the Glue job script.
pub fn synthesize(ctx: &DeploymentContext, asset_dir: &Path) -> Result<StackGraph> {
    ctx.validate()?;
    let mut builder = GraphBuilder::new(ctx);

    let bucket = BucketSpec {
        name: builder.generated_name(BUCKET_CONSTRUCT_ID, MAX_BUCKET_NAME_LEN, true),
        encryption: BucketEncryption::S3Managed,
        auto_delete_objects: true,
    };
    let bucket_name = bucket.name.clone();
    let script_location = bucket.s3_uri(GLUE_SCRIPT_KEY);
    let temp_dir = bucket.s3_uri(GLUE_TEMP_PREFIX);
    let bucket_id = builder.declare(
        BUCKET_CONSTRUCT_ID,
        Some(RemovalPolicy::Destroy),
        ResourceSpec::Bucket(bucket),
    );

    let table_name = builder.generated_name(TABLE_CONSTRUCT_ID, MAX_TABLE_NAME_LEN, false);
    let table_id = builder.declare(
        TABLE_CONSTRUCT_ID,
        Some(RemovalPolicy::Destroy),
        ResourceSpec::Table(TableSpec {
            name: table_name.clone(),
            partition_key: KeyAttribute {
                name: ORDERS_PARTITION_KEY.to_string(),
                attribute_type: AttributeType::String,
            },
            billing_mode: BillingMode::PayPerRequest,
        }),
    );

    let stream_id = builder.declare(
        STREAM_CONSTRUCT_ID,
        Some(RemovalPolicy::Destroy),
        ResourceSpec::Stream(StreamSpec {
            name: STREAM_NAME.to_string(),
            shard_count: STREAM_SHARD_COUNT,
            retention_hours: STREAM_RETENTION_HOURS,
        }),
    );

    let role_id = builder.declare(
        ROLE_CONSTRUCT_ID,
        None,
        ResourceSpec::Role(RoleSpec {
            trusted_service: GLUE_SERVICE_PRINCIPAL.to_string(),
            managed_policies: vec![GLUE_MANAGED_POLICY.to_string()],
        }),
    );

    builder.grant(&role_id, &bucket_id, Access::ReadWrite);
    builder.grant(&role_id, &table_id, Access::ReadWrite);
    builder.grant(&role_id, &stream_id, Access::Read);

    builder.declare(
        DATABASE_CONSTRUCT_ID,
        None,
        ResourceSpec::Database(DatabaseSpec {
            catalog_id: ctx.account.clone(),
            name: DATABASE_NAME.to_string(),
        }),
    );

    let asset = AssetManifest::from_dir(asset_dir)?;
    if !asset.contains(GLUE_SCRIPT_KEY) {
        return Err(SynthError::MissingJobScript {
            dir: asset_dir.to_path_buf(),
            key: GLUE_SCRIPT_KEY.to_string(),
        });
    }
    tracing::debug!(
        hash = %asset.hash,
        files = asset.files.len(),
        bytes = asset.total_size(),
        "hashed asset directory"
    );
    builder.graph.deployments.push(AssetDeployment {
        construct_id: DEPLOYMENT_CONSTRUCT_ID.to_string(),
        logical_id: logical_id(&[DEPLOYMENT_CONSTRUCT_ID]),
        destination: bucket_id,
        asset,
        memory_limit_mb: ASSET_MEMORY_LIMIT_MB,
    });

    let default_arguments = BTreeMap::from([
        ("--TempDir".to_string(), temp_dir),
        ("--job-language".to_string(), JOB_LANGUAGE.to_string()),
        (
            "--enable-continuous-cloudwatch-log".to_string(),
            "true".to_string(),
        ),
    ]);
    builder.declare(
        JOB_CONSTRUCT_ID,
        None,
        ResourceSpec::Job(JobSpec {
            name: JOB_NAME.to_string(),
            role: role_id,
            command: JobCommand {
                name: JOB_COMMAND.to_string(),
                script_location,
                python_version: JOB_PYTHON_VERSION.to_string(),
            },
            default_arguments,
            max_retries: JOB_MAX_RETRIES,
            glue_version: JOB_GLUE_VERSION.to_string(),
            max_capacity: JOB_MAX_CAPACITY,
        }),
    );

    builder.output(OUTPUT_DATA_BUCKET, bucket_name);
    builder.output(OUTPUT_ORDERS_TABLE, table_name);
    builder.output(OUTPUT_KINESIS_STREAM, STREAM_NAME.to_string());
    builder.output(OUTPUT_GLUE_JOB_NAME, JOB_NAME.to_string());

    let graph = builder.graph;
    tracing::info!(
        stack_id = %graph.stack_id,
        resources = graph.resources.len(),
        grants = graph.grants.len(),
        outputs = graph.outputs.len(),
        "synthesized stack graph"
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::resources::ResourceKind;

    fn asset_dir_with_script() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("glue")).expect("create glue dir");
        fs::write(dir.path().join(GLUE_SCRIPT_KEY), "print('etl')\n").expect("write script");
        dir
    }

    fn sample_context() -> DeploymentContext {
        DeploymentContext::new("123456789012", "AgenticOmsCdkStack")
    }

    #[test]
    fn declares_resources_in_dependency_order() {
        let assets = asset_dir_with_script();
        let graph = synthesize(&sample_context(), assets.path()).expect("synth");

        let kinds: Vec<_> = graph.resources.iter().map(|r| r.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ResourceKind::Bucket,
                ResourceKind::Table,
                ResourceKind::Stream,
                ResourceKind::Role,
                ResourceKind::Database,
                ResourceKind::Job,
            ]
        );
    }

    #[test]
    fn job_temp_dir_lives_in_data_bucket() {
        let assets = asset_dir_with_script();
        let graph = synthesize(&sample_context(), assets.path()).expect("synth");
        let bucket = graph.bucket().expect("bucket");
        let job = graph.job().expect("job");

        assert_eq!(
            job.default_arguments.get("--TempDir"),
            Some(&format!("s3://{}/glue/tmp/", bucket.name))
        );
        assert_eq!(
            job.default_arguments.get("--job-language").map(String::as_str),
            Some("python")
        );
        assert_eq!(
            job.default_arguments
                .get("--enable-continuous-cloudwatch-log")
                .map(String::as_str),
            Some("true")
        );
    }

    #[test]
    fn rejects_asset_dir_without_job_script() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("other.py"), "").expect("write");

        let error = synthesize(&sample_context(), dir.path()).expect_err("should fail");
        match error {
            SynthError::MissingJobScript { key, .. } => assert_eq!(key, GLUE_SCRIPT_KEY),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_invalid_context_before_touching_assets() {
        let ctx = DeploymentContext::new("not-an-account", "AgenticOmsCdkStack");
        let dir = tempfile::tempdir().expect("tempdir");
        let error = synthesize(&ctx, &dir.path().join("missing")).expect_err("should fail");
        assert!(matches!(error, SynthError::InvalidContext(_)));
    }

    #[test]
    fn deployment_targets_bucket_with_memory_limit() {
        let assets = asset_dir_with_script();
        let graph = synthesize(&sample_context(), assets.path()).expect("synth");
        let bucket_id = &graph.resources[0].logical_id;

        assert_eq!(graph.deployments.len(), 1);
        assert_eq!(&graph.deployments[0].destination, bucket_id);
        assert_eq!(graph.deployments[0].memory_limit_mb, 512);
    }
}
