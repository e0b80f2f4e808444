//! Group aggregation over an already-normalized user collection.
use std::collections::BTreeSet;

use super::DirectoryUser;

/// Every group any user belongs to, each exactly once.
///
/// Returned sorted so that identical collections produce identical output.
pub fn distinct_groups(users: &[DirectoryUser]) -> Vec<String> {
    users
        .iter()
        .flat_map(|u| u.groups().iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Users whose membership contains `group_id` (exact match).
pub fn users_in_group(users: Vec<DirectoryUser>, group_id: &str) -> Vec<DirectoryUser> {
    users
        .into_iter()
        .filter(|u| u.is_member_of(group_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users(value: serde_json::Value) -> Vec<DirectoryUser> {
        serde_json::from_value(value).unwrap()
    }

    fn mixed_shapes() -> Vec<DirectoryUser> {
        users(json!([
            {"id": 1, "groups": ["a", "b"]},
            {"id": 2, "app_metadata": {"groups": ["b", "c"]}}
        ]))
    }

    #[test]
    fn distinct_groups_across_both_shapes() {
        assert_eq!(distinct_groups(&mixed_shapes()), ["a", "b", "c"]);
    }

    #[test]
    fn distinct_groups_has_no_duplicates() {
        let many = users(json!([
            {"id": 1, "groups": ["ops", "dev"]},
            {"id": 2, "groups": ["dev"]},
            {"id": 3, "app_metadata": {"groups": ["dev", "ops"]}},
            {"id": 4, "groups": ["dev"], "app_metadata": {"groups": ["dev"]}}
        ]));
        let groups = distinct_groups(&many);
        assert_eq!(groups, ["dev", "ops"]);
    }

    #[test]
    fn distinct_groups_is_idempotent() {
        let collection = mixed_shapes();
        assert_eq!(distinct_groups(&collection), distinct_groups(&collection));
    }

    #[test]
    fn distinct_groups_of_nothing() {
        assert!(distinct_groups(&[]).is_empty());
        assert!(distinct_groups(&users(json!([{"id": 1}]))).is_empty());
    }

    #[test]
    fn users_in_group_matches_both_shapes() {
        let members = users_in_group(mixed_shapes(), "b");
        let ids: Vec<_> = members.iter().map(|u| u.record()["id"].clone()).collect();
        assert_eq!(ids, [json!(1), json!(2)]);

        let only_c = users_in_group(mixed_shapes(), "c");
        assert_eq!(only_c.len(), 1);
        assert_eq!(only_c[0].record()["id"], json!(2));
    }

    #[test]
    fn users_in_unknown_group_is_empty() {
        assert!(users_in_group(mixed_shapes(), "zzz").is_empty());
        // Exact match only.
        assert!(users_in_group(mixed_shapes(), "B").is_empty());
    }
}
