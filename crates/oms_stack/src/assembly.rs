//! Cloud assembly output: template, asset manifest, and top-level manifest.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::context::aws_environment;
use crate::error::Result;
use crate::handlers::BOOTSTRAP_ASSETS_BUCKET;
use crate::resources::StackGraph;
use crate::template::render_template;

pub const ASSEMBLY_SCHEMA_VERSION: &str = "36.0.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudAssembly {
    pub template: PathBuf,
    pub asset_manifest: PathBuf,
    pub manifest: PathBuf,
    pub asset_archives: Vec<PathBuf>,
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    let mut body = serde_json::to_string_pretty(value)?;
    body.push('\n');
    fs::write(path, body)?;
    Ok(())
}

fn asset_manifest(graph: &StackGraph) -> Value {
    let files: serde_json::Map<String, Value> = graph
        .deployments
        .iter()
        .map(|deployment| {
            let zip_name = deployment.asset.zip_file_name();
            (
                deployment.asset.hash.clone(),
                json!({
                    "source": { "path": zip_name, "packaging": "file" },
                    "destinations": {
                        format!("{}-current_region", graph.account): {
                            "bucketName": BOOTSTRAP_ASSETS_BUCKET,
                            "objectKey": zip_name,
                        }
                    },
                }),
            )
        })
        .collect();

    json!({ "version": ASSEMBLY_SCHEMA_VERSION, "files": files })
}

/// Writes `<stack>.template.json`, `<stack>.assets.json`, `manifest.json`
/// and the staged asset archives into `out_dir`.
pub fn write_cloud_assembly(
    graph: &StackGraph,
    asset_dir: &Path,
    out_dir: &Path,
) -> Result<CloudAssembly> {
    fs::create_dir_all(out_dir)?;

    let template_name = format!("{}.template.json", graph.stack_id);
    let assets_name = format!("{}.assets.json", graph.stack_id);
    let assets_artifact = format!("{}.assets", graph.stack_id);

    let template = out_dir.join(&template_name);
    write_json(&template, &render_template(graph))?;

    let asset_archives = graph
        .deployments
        .iter()
        .map(|deployment| deployment.asset.stage_zip(asset_dir, out_dir))
        .collect::<Result<Vec<_>>>()?;

    let asset_manifest_path = out_dir.join(&assets_name);
    write_json(&asset_manifest_path, &asset_manifest(graph))?;

    let manifest = out_dir.join("manifest.json");
    write_json(
        &manifest,
        &json!({
            "version": ASSEMBLY_SCHEMA_VERSION,
            "artifacts": {
                assets_artifact.clone(): {
                    "type": "cdk:asset-manifest",
                    "properties": { "file": assets_name },
                },
                graph.stack_id.clone(): {
                    "type": "aws:cloudformation:stack",
                    "environment": aws_environment(&graph.account, graph.region.as_deref()),
                    "properties": {
                        "templateFile": template_name,
                        "tags": graph.tags,
                    },
                    "dependencies": [assets_artifact],
                },
            },
        }),
    )?;

    tracing::info!(
        out_dir = %out_dir.display(),
        template = %template.display(),
        archives = asset_archives.len(),
        "wrote cloud assembly"
    );

    Ok(CloudAssembly {
        template,
        asset_manifest: asset_manifest_path,
        manifest,
        asset_archives,
    })
}
