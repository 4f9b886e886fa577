use crate::report::RunArtifacts;
use std::path::Path;

pub fn write_json(artifacts: &RunArtifacts, out: &Path) -> anyhow::Result<()> {
    let v = serde_json::json!({
        "suite": artifacts.suite,
        "mode": artifacts.mode,
        "order_seed": artifacts.order_seed,
        "verdicts": artifacts.verdicts,
    });
    std::fs::write(out, serde_json::to_string_pretty(&v)?)?;
    Ok(())
}
