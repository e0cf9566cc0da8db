use anyhow::{Context, Result};

use crate::imds::MetadataTree;

/// Render a metadata tree as JSON indented by two spaces.
pub fn render(tree: &MetadataTree) -> Result<String> {
    serde_json::to_string_pretty(tree).context("serializing metadata to JSON")
}

/// The single stderr line reported for a failed run.
pub fn error_line(err: &anyhow::Error) -> String {
    format!("[ERROR] {:#}", err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use serde_json::{json, Value};

    #[test]
    fn test_render_uses_two_space_indent() {
        let mut tree = MetadataTree::new();
        tree.insert("hostname".into(), json!("i-0abc"));
        tree.insert("public-keys".into(), json!({}));

        let rendered = render(&tree).unwrap();
        assert_eq!(
            rendered,
            "{\n  \"hostname\": \"i-0abc\",\n  \"public-keys\": {}\n}"
        );
    }

    #[test]
    fn test_render_parses_back_to_same_tree() {
        let original = json!({
            "placement": {"availability-zone": "us-east-1a", "region": "us-east-1"},
            "user-data": "#!/bin/bash\necho \"hi\"\n",
            "ami-id": "ami-0123"
        });
        let tree = original.as_object().cloned().unwrap();

        let parsed: Value = serde_json::from_str(&render(&tree).unwrap()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_error_line_keeps_cause_chain_on_one_line() {
        let err = anyhow!("token endpoint returned status 403 Forbidden")
            .context("Failed to retrieve IMDSv2 token");
        let line = error_line(&err);
        assert_eq!(
            line,
            "[ERROR] Failed to retrieve IMDSv2 token: token endpoint returned status 403 Forbidden"
        );
        assert!(!line.contains('\n'));
    }
}
