// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for criteria-to-record matching.

#[cfg(test)]
mod tests {
    use crate::criteria::matcher::Matcher;
    use crate::criteria::Criteria;
    use crate::record::Record;

    fn record() -> Record {
        Record {
            id: "instance0".to_string(),
            num_id: "0".to_string(),
            group: "my-group".to_string(),
            group_ids: vec!["1".to_string(), "7".to_string()],
            network: "my-network".to_string(),
            network_id: "2".to_string(),
            deployment: "my-deployment".to_string(),
            ip: "123.123.123.123".to_string(),
            domain: "my-domain.".to_string(),
            az: "az1".to_string(),
            az_id: "3".to_string(),
            instance_index: "1".to_string(),
        }
    }

    fn criteria(pairs: &[(&str, &[&str])]) -> Criteria {
        pairs
            .iter()
            .map(|(tag, values)| {
                (
                    (*tag).to_string(),
                    values.iter().map(|v| (*v).to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_id_constraint() {
        assert!(criteria(&[("id", &["instance0"])]).matches(&record()));
        assert!(!criteria(&[("id", &["instance1"])]).matches(&record()));
    }

    #[test]
    fn test_group_network_deployment_constraints() {
        let c = criteria(&[
            ("group", &["my-group"]),
            ("network", &["my-network"]),
            ("deployment", &["my-deployment"]),
        ]);
        assert!(c.matches(&record()));

        assert!(!criteria(&[("group", &["other-group"])]).matches(&record()));
        assert!(!criteria(&[("network", &["other-network"])]).matches(&record()));
        assert!(!criteria(&[("deployment", &["other-deployment"])]).matches(&record()));
    }

    #[test]
    fn test_group_id_constraint_is_membership() {
        assert!(criteria(&[("g", &["1"])]).matches(&record()));
        assert!(criteria(&[("g", &["7"])]).matches(&record()));
        assert!(!criteria(&[("g", &["2"])]).matches(&record()));
    }

    #[test]
    fn test_short_tag_constraints() {
        assert!(criteria(&[("m", &["1"])]).matches(&record()));
        assert!(!criteria(&[("m", &["0"])]).matches(&record()));

        assert!(criteria(&[("a", &["3"])]).matches(&record()));
        assert!(!criteria(&[("a", &["1"])]).matches(&record()));

        assert!(criteria(&[("n", &["2"])]).matches(&record()));
        assert!(!criteria(&[("n", &["1"])]).matches(&record()));

        assert!(criteria(&[("i", &["123.123.123.123"])]).matches(&record()));
        assert!(!criteria(&[("i", &["1.1.1.1"])]).matches(&record()));
    }

    #[test]
    fn test_a_tag_with_several_values_matches_any() {
        assert!(criteria(&[("g", &["2", "7"])]).matches(&record()));
        assert!(!criteria(&[("g", &["2", "9"])]).matches(&record()));
    }

    #[test]
    fn test_all_constraints_must_hold() {
        let c = criteria(&[("id", &["instance0"]), ("m", &["0"])]);
        assert!(!c.matches(&record()), "a failing tag must veto the match");
    }

    #[test]
    fn test_domain_constraint_requires_exact_fqdn() {
        assert!(criteria(&[("domain", &["my-domain."])]).matches(&record()));
        assert!(!criteria(&[("domain", &["other-domain."])]).matches(&record()));
    }

    #[test]
    fn test_domain_value_is_normalized_before_comparison() {
        assert!(criteria(&[("domain", &["my-domain"])]).matches(&record()));
    }

    #[test]
    fn test_empty_domain_matches_nothing_without_an_id() {
        let c = criteria(&[("domain", &[""]), ("s", &["0"])]);
        assert!(!c.matches(&record()));
    }

    #[test]
    fn test_empty_domain_is_waived_for_id_queries() {
        let c = criteria(&[("domain", &[""]), ("id", &["instance0"])]);
        assert!(c.matches(&record()), "an id query searches across domains");
    }

    #[test]
    fn test_health_and_fqdn_entries_are_not_record_constraints() {
        let c = criteria(&[
            ("s", &["1"]),
            ("y", &["1"]),
            ("fqdn", &["whatever.my-domain."]),
            ("domain", &["my-domain."]),
        ]);
        assert!(c.matches(&record()));
    }

    #[test]
    fn test_empty_criteria_matches_everything() {
        assert!(criteria(&[]).matches(&record()));
    }
}
