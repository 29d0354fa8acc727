//! Raw text rendering of a cluster, as OstrichDB prints it.

use crate::models::ClusterIdentity;
use crate::services::draft_service::DraftService;

/// Render the cluster header and one line per complete live draft.
///
/// Returns an empty string when the cluster has no live drafts. Drafts with an
/// empty name or value are left out.
pub fn generate(cluster: &ClusterIdentity, drafts: &DraftService) -> String {
    if drafts.live().next().is_none() {
        return String::new();
    }

    let lines: Vec<String> = drafts
        .live()
        .filter(|d| !d.name.is_empty() && !d.value.is_empty())
        .map(|d| format!("\t{} :{}: {}", d.name, d.data_type, d.value))
        .collect();

    format!(
        "{{\n\tcluster_name :identifier: {}\n\tcluster_id :identifier: {}\n\n{}\n}},",
        cluster.name,
        cluster.id,
        lines.join("\n")
    )
}
