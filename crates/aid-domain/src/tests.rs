#[cfg(test)]
mod tests {
    use crate::convert::convert;
    use crate::dn::{build_dn, decompose_with_type, fault_dn, resource_dn};
    use crate::foreign::ForeignObject;
    use crate::key::ResourceKey;
    use crate::model::FAULT_TYPE;
    use crate::resource::{IntentObject, Resource};
    use crate::status::FaultSeverity;

    fn bd(tenant: &str, name: &str) -> Resource {
        Resource::new("BridgeDomain", vec![tenant.to_string(), name.to_string()])
    }

    #[test]
    fn dissect_gathers_ids_across_segments() {
        let key = ResourceKey::from_segments(["Tenant|t1", "BridgeDomain|bd1"]);
        let dissected = key.dissect().unwrap();
        assert_eq!(dissected.kind, "BridgeDomain");
        assert_eq!(dissected.ids, vec!["t1", "bd1"]);
    }

    #[test]
    fn dissect_splits_multi_id_leaves() {
        let key = ResourceKey::from_segments(["Tenant|t1", "BridgeDomain|bd1|extra"]);
        let dissected = key.dissect().unwrap();
        assert_eq!(dissected.ids, vec!["t1", "bd1", "extra"]);
    }

    #[test]
    fn dissect_rejects_segments_without_separator() {
        let key = ResourceKey::from_segments(["Tenant"]);
        assert!(key.dissect().is_err());
        assert!(ResourceKey::from_segments(Vec::<String>::new())
            .dissect()
            .is_err());
    }

    #[test]
    fn fault_key_parent_is_key_minus_leaf() {
        let key = ResourceKey::from_segments(["Tenant|t1", "BridgeDomain|bd1", "faultInst|F0123"]);
        assert_eq!(key.leaf_type(), Some(FAULT_TYPE));
        let dissected = key.dissect().unwrap();
        assert_eq!(dissected.ids.last().map(String::as_str), Some("F0123"));

        let parent = key.without_leaf();
        let parent_dissected = parent.dissect().unwrap();
        assert_eq!(parent_dissected.kind, "BridgeDomain");
        assert_eq!(parent_dissected.ids, vec!["t1", "bd1"]);
    }

    #[test]
    fn dn_round_trip() {
        let dn = "uni/tn-t1/BD-bd1/fault-F0123";
        let decomposed = decompose_with_type(dn, FAULT_TYPE).unwrap();
        assert_eq!(
            decomposed,
            vec![
                ("fvTenant".to_string(), "t1".to_string()),
                ("fvBD".to_string(), "bd1".to_string()),
                ("faultInst".to_string(), "F0123".to_string()),
            ]
        );
        assert_eq!(build_dn(&decomposed).unwrap(), dn);
    }

    #[test]
    fn dn_brackets_names_containing_slashes() {
        let subnet = Resource::new(
            "Subnet",
            vec!["t1".into(), "bd1".into(), "10.0.0.0/24".into()],
        );
        let dn = resource_dn(&subnet).unwrap();
        assert_eq!(dn, "uni/tn-t1/BD-bd1/subnet-[10.0.0.0/24]");

        let decomposed = decompose_with_type(&dn, "fvSubnet").unwrap();
        assert_eq!(decomposed.last().unwrap().1, "10.0.0.0/24");
        assert_eq!(build_dn(&decomposed).unwrap(), dn);
    }

    #[test]
    fn decompose_rejects_wrong_leaf_type() {
        assert!(decompose_with_type("uni/tn-t1/BD-bd1", "fvTenant").is_err());
        assert!(decompose_with_type("tn-t1", "fvTenant").is_err());
    }

    #[test]
    fn fault_dn_extends_the_parent_dn() {
        let parent = bd("t1", "bd1");
        assert_eq!(
            fault_dn(&parent, "F0123").unwrap(),
            "uni/tn-t1/BD-bd1/fault-F0123"
        );
    }

    #[test]
    fn convert_maps_known_foreign_objects() {
        let item = ForeignObject::new("fvBD", "uni/tn-t1/BD-bd1").with_attribute("arp_flood", "yes");
        let converted = convert(&[item]);
        assert_eq!(converted.len(), 1);
        match &converted[0] {
            IntentObject::Resource(res) => {
                assert_eq!(res.kind, "BridgeDomain");
                assert_eq!(res.identity, vec!["t1", "bd1"]);
                assert_eq!(res.attribute("arp_flood"), Some("yes"));
            }
            other => panic!("expected a resource, got {:?}", other),
        }
    }

    #[test]
    fn convert_maps_faults_with_code_and_severity() {
        let item = ForeignObject::new(FAULT_TYPE, "uni/tn-t1/BD-bd1/fault-F0123")
            .with_attribute("severity", "major")
            .with_attribute("descr", "endpoint learning disabled");
        let converted = convert(&[item]);
        assert_eq!(converted.len(), 1);
        match &converted[0] {
            IntentObject::Fault(fault) => {
                assert_eq!(fault.fault_code, "F0123");
                assert_eq!(fault.external_identifier, "uni/tn-t1/BD-bd1/fault-F0123");
                assert_eq!(fault.severity, FaultSeverity::Major);
            }
            other => panic!("expected a fault, got {:?}", other),
        }
    }

    #[test]
    fn convert_drops_unknown_types_without_failing() {
        let known = ForeignObject::new("fvTenant", "uni/tn-t1");
        let unknown = ForeignObject::new("vzBrCP", "uni/tn-t1/brc-contract");
        let converted = convert(&[unknown, known]);
        assert_eq!(converted.len(), 1);
    }

    #[test]
    fn object_identity_distinguishes_faults_on_one_parent() {
        let parent = bd("t1", "bd1");
        let a = parent.object_identity().with_fault("F0123");
        let b = parent.object_identity().with_fault("F0456");
        assert_ne!(a, b);
        assert_ne!(a, parent.object_identity());
    }
}
