use std::fs;
use std::path::Path;

use oms_stack::resources::{Access, AttributeType, ResourceKind};
use oms_stack::template::render_template;
use oms_stack::{synthesize, DeploymentContext, StackGraph};
use serde_json::{json, Value};

fn write_assets(root: &Path) {
    fs::create_dir_all(root.join("glue")).expect("create glue dir");
    fs::write(root.join("glue/glue_job.py"), "print('etl')\n").expect("write job script");
}

fn synth(account: &str, stack_id: &str) -> StackGraph {
    let assets = tempfile::tempdir().expect("tempdir");
    write_assets(assets.path());
    synthesize(&DeploymentContext::new(account, stack_id), assets.path()).expect("synth")
}

fn rendered_resource<'a>(
    template: &'a Value,
    graph: &StackGraph,
    kind: ResourceKind,
) -> &'a Value {
    let logical_id = &graph.resources_of(kind).next().expect("resource").logical_id;
    &template["Resources"][logical_id.as_str()]
}

#[test]
fn reference_context_yields_one_resource_per_kind_and_four_outputs() {
    let graph = synth("123456789012", "AgenticOmsCdkStack");

    for kind in ResourceKind::ALL {
        assert_eq!(graph.resources_of(kind).count(), 1, "{kind:?}");
    }
    assert_eq!(graph.resources.len(), 6);

    let names: Vec<_> = graph.outputs.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["DataBucket", "OrdersTable", "KinesisStream", "GlueJobName"]
    );

    let job = graph.job().expect("job");
    assert_eq!(job.max_retries, 0);
    assert_eq!(job.glue_version, "3.0");
    assert_eq!(job.name, "agentic-oms-glue-etl");
    assert_eq!(job.max_capacity, 2.0);
    assert_eq!(job.command.name, "glueetl");
}

#[test]
fn synthesis_is_deterministic() {
    let assets = tempfile::tempdir().expect("tempdir");
    write_assets(assets.path());
    let ctx = DeploymentContext::new("123456789012", "AgenticOmsCdkStack");

    let first = synthesize(&ctx, assets.path()).expect("synth");
    let second = synthesize(&ctx, assets.path()).expect("synth");
    assert_eq!(first, second);
    assert_eq!(render_template(&first), render_template(&second));
}

#[test]
fn orders_table_has_single_string_order_key() {
    let graph = synth("123456789012", "AgenticOmsCdkStack");
    let table = graph.table().expect("table");

    assert_eq!(table.partition_key.name, "orderId");
    assert_eq!(table.partition_key.attribute_type, AttributeType::String);
    assert_eq!(graph.output("OrdersTable"), Some(table.name.as_str()));
}

#[test]
fn stream_has_one_shard_and_day_retention() {
    let graph = synth("123456789012", "AgenticOmsCdkStack");
    let stream = graph.stream().expect("stream");

    assert_eq!(stream.name, "oms-events-stream");
    assert_eq!(stream.shard_count, 1);
    assert_eq!(stream.retention_hours, 24);
}

#[test]
fn role_grants_are_exactly_bucket_table_rw_and_stream_read() {
    let graph = synth("123456789012", "AgenticOmsCdkStack");
    let role_id = &graph
        .resources_of(ResourceKind::Role)
        .next()
        .expect("role")
        .logical_id;

    let mut grants: Vec<(ResourceKind, Access)> = graph
        .grants_for(role_id)
        .map(|grant| {
            let target = graph.resource(&grant.target).expect("grant target");
            (target.kind(), grant.access)
        })
        .collect();
    grants.sort_by_key(|(kind, _)| *kind);

    assert_eq!(
        grants,
        vec![
            (ResourceKind::Bucket, Access::ReadWrite),
            (ResourceKind::Table, Access::ReadWrite),
            (ResourceKind::Stream, Access::Read),
        ]
    );
    assert_eq!(graph.grants.len(), 3);

    let role = graph.role().expect("role");
    assert_eq!(role.trusted_service, "glue.amazonaws.com");
    assert_eq!(role.managed_policies, vec!["service-role/AWSGlueServiceRole"]);
}

#[test]
fn job_script_points_into_data_bucket() {
    let graph = synth("123456789012", "AgenticOmsCdkStack");
    let bucket = graph.bucket().expect("bucket");
    let job = graph.job().expect("job");

    assert_eq!(
        job.command.script_location,
        format!("s3://{}/glue/glue_job.py", bucket.name)
    );
    assert_eq!(graph.output("DataBucket"), Some(bucket.name.as_str()));
    assert!(graph.deployments[0].asset.contains("glue/glue_job.py"));
}

#[test]
fn database_is_scoped_to_account() {
    let graph = synth("210987654321", "AgenticOmsCdkStack");
    let database = graph.database().expect("database");

    assert_eq!(database.catalog_id, "210987654321");
    assert_eq!(database.name, "agentic_oms_db");
}

#[test]
fn different_stacks_get_different_bucket_names() {
    let a = synth("123456789012", "AgenticOmsCdkStack");
    let b = synth("123456789012", "AgenticOmsCdkStackStaging");
    assert_ne!(
        a.bucket().expect("bucket").name,
        b.bucket().expect("bucket").name
    );
}

#[test]
fn template_stream_and_table_carry_their_shapes() {
    let graph = synth("123456789012", "AgenticOmsCdkStack");
    let template = render_template(&graph);

    let stream = rendered_resource(&template, &graph, ResourceKind::Stream);
    assert_eq!(stream["Type"], "AWS::Kinesis::Stream");
    assert_eq!(stream["Properties"]["Name"], "oms-events-stream");
    assert_eq!(stream["Properties"]["ShardCount"], 1);
    assert_eq!(stream["Properties"]["RetentionPeriodHours"], 24);

    let table = rendered_resource(&template, &graph, ResourceKind::Table);
    assert_eq!(
        table["Properties"]["KeySchema"],
        json!([{ "AttributeName": "orderId", "KeyType": "HASH" }])
    );
    assert_eq!(
        table["Properties"]["AttributeDefinitions"],
        json!([{ "AttributeName": "orderId", "AttributeType": "S" }])
    );
    assert_eq!(table["Properties"]["BillingMode"], "PAY_PER_REQUEST");
}

#[test]
fn template_job_script_lives_in_rendered_bucket() {
    let graph = synth("123456789012", "AgenticOmsCdkStack");
    let template = render_template(&graph);

    let bucket = rendered_resource(&template, &graph, ResourceKind::Bucket);
    let bucket_name = bucket["Properties"]["BucketName"]
        .as_str()
        .expect("bucket name");
    let job = rendered_resource(&template, &graph, ResourceKind::Job);
    assert_eq!(
        job["Properties"]["Command"]["ScriptLocation"],
        format!("s3://{bucket_name}/glue/glue_job.py")
    );
    assert_eq!(
        job["Properties"]["DefaultArguments"]["--TempDir"],
        format!("s3://{bucket_name}/glue/tmp/")
    );
    assert_eq!(template["Outputs"]["DataBucket"]["Value"], bucket_name);
}

#[test]
fn template_deletion_policies_follow_removal_policy() {
    let graph = synth("123456789012", "AgenticOmsCdkStack");
    let template = render_template(&graph);

    for kind in [ResourceKind::Bucket, ResourceKind::Table, ResourceKind::Stream] {
        let resource = rendered_resource(&template, &graph, kind);
        assert_eq!(resource["DeletionPolicy"], "Delete", "{kind:?}");
        assert_eq!(resource["UpdateReplacePolicy"], "Delete", "{kind:?}");
    }
    for kind in [ResourceKind::Role, ResourceKind::Database, ResourceKind::Job] {
        let resource = rendered_resource(&template, &graph, kind);
        assert!(resource.get("DeletionPolicy").is_none(), "{kind:?}");
        assert!(resource.get("UpdateReplacePolicy").is_none(), "{kind:?}");
    }
}

#[test]
fn template_custom_resources_are_served_in_stack() {
    let graph = synth("123456789012", "AgenticOmsCdkStack");
    let template = render_template(&graph);
    let resources = template["Resources"].as_object().expect("resources");

    let customs: Vec<&Value> = resources
        .values()
        .filter(|resource| {
            resource["Type"]
                .as_str()
                .is_some_and(|cfn_type| cfn_type.starts_with("Custom::"))
        })
        .collect();
    assert_eq!(customs.len(), 2);

    for custom in customs {
        let function_id = custom["Properties"]["ServiceToken"]["Fn::GetAtt"][0]
            .as_str()
            .expect("service token is an in-stack function");
        assert_eq!(resources[function_id]["Type"], "AWS::Lambda::Function");
    }

    let bucket_id = &graph
        .resources_of(ResourceKind::Bucket)
        .next()
        .expect("bucket")
        .logical_id;
    let auto_delete = resources
        .values()
        .find(|resource| resource["Type"] == "Custom::S3AutoDeleteObjects")
        .expect("auto delete resource");
    assert!(auto_delete["DependsOn"]
        .as_array()
        .expect("depends on")
        .contains(&json!(bucket_id)));
}
