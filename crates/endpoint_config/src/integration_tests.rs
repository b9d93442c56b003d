//! End-to-end resolution scenarios.
//!
//! These tests drive the public API from descriptors to resolved records and
//! complement the unit tests of each module.

use crate::*;
use std::collections::BTreeMap;

fn opt(key: &str, value: &str) -> ConfigOption {
    ConfigOption::new(key, value)
}

fn resolve_items(
    descriptors: Vec<EndpointDescriptor>,
    items: Vec<ConfigItem>,
) -> Vec<ResolvedEndpointConfig> {
    let catalog = EndpointCatalog::new(descriptors).expect("valid catalog");
    TemplateGraphResolver::new()
        .resolve(&catalog, &items, &TenantDirectory::new())
        .expect("resolution succeeds")
        .records
}

fn record<'a>(records: &'a [ResolvedEndpointConfig], id: &str) -> &'a ResolvedEndpointConfig {
    records
        .iter()
        .find(|r| r.id.as_str() == id)
        .unwrap_or_else(|| panic!("no record for {id}"))
}

/// Template with an aor option, concrete line with a local endpoint option.
#[test]
fn minimal_inheritance() {
    let descriptors = vec![
        EndpointDescriptor::new("T", "template", "tenant-a")
            .as_template()
            .with_option(SectionKind::Aor, "qualify_frequency", "30"),
        EndpointDescriptor::new("E", "line-e", "tenant-a")
            .with_parent("T")
            .with_option(SectionKind::Endpoint, "context", "default"),
    ];
    let items = vec![ConfigItem::new("E", Owner::Line(LineOwner::new(1)))];

    let records = resolve_items(descriptors, items);
    let resolved = record(&records, "E");

    assert_eq!(
        resolved.aor().clone().into_vec(),
        vec![opt("qualify_frequency", "30"), opt("type", "aor")]
    );
    assert_eq!(
        resolved.endpoint().clone().into_vec(),
        vec![
            opt("context", "default"),
            opt("aors", "line-e"),
            opt("set_var", "__WAZO_TENANT_UUID=tenant-a"),
            opt("set_var", "WAZO_CHANNEL_DIRECTION=from-wazo"),
            opt("set_var", "WAZO_LINE_ID=1"),
            opt("set_var", "WAZO_MIXMONITOR_OPTIONS="),
            opt("type", "endpoint"),
        ]
    );
    assert!(resolved.auth().is_empty());
    assert!(resolved.identify().is_empty());
    assert!(resolved.outbound_auth().is_empty());
    assert!(resolved.registration().is_empty());
    assert!(resolved.registration_outbound_auth().is_empty());
}

/// A local singleton overrides the inherited one.
#[test]
fn local_value_overrides_template() {
    let descriptors = vec![
        EndpointDescriptor::new("T", "t", "tenant-a")
            .as_template()
            .with_option(SectionKind::Endpoint, "dtmf_mode", "rfc4733"),
        EndpointDescriptor::new("E", "e", "tenant-a")
            .with_parent("T")
            .with_option(SectionKind::Endpoint, "dtmf_mode", "info"),
    ];

    let records = resolve_items(
        descriptors,
        vec![ConfigItem::new("E", Owner::Trunk(TrunkOwner::default()))],
    );

    let values: Vec<&str> = record(&records, "E").endpoint().values("dtmf_mode").collect();
    assert_eq!(values, vec!["info"]);
}

/// No aor anywhere means no aor section and no `aors` reference.
#[test]
fn absent_section_suppresses_reference() {
    let descriptors = vec![
        EndpointDescriptor::new("T", "t", "tenant-a")
            .as_template()
            .with_option(SectionKind::Endpoint, "allow", "ulaw"),
        EndpointDescriptor::new("E", "e", "tenant-a").with_parent("T"),
    ];

    let records = resolve_items(
        descriptors,
        vec![ConfigItem::new("E", Owner::Trunk(TrunkOwner::default()))],
    );
    let resolved = record(&records, "E");

    assert!(resolved.aor().is_empty());
    assert!(!resolved.endpoint().contains_key("aors"));
    assert!(!resolved.endpoint().contains_key("auth"));
}

/// Function key private template over a public one.
#[test]
fn func_key_merge() {
    let key = |exten: &str| {
        FuncKeyMapping::new(FuncKeyDestination::Custom {
            exten: exten.to_string(),
        })
    };
    let base = FuncKeyTemplate::from_keys([(1, key("A")), (2, key("B"))]);
    let other = FuncKeyTemplate::from_keys([(2, key("C")), (3, key("D"))]);

    assert_eq!(
        base.merge(&other).keys,
        BTreeMap::from([(1, key("A")), (2, key("C")), (3, key("D"))])
    );
}

/// The closest definition of a singleton wins whatever the depth.
#[test]
fn singleton_defined_by_many_ancestors_resolves_to_local_value() {
    let descriptors = vec![
        EndpointDescriptor::new("root", "root", "t")
            .as_template()
            .with_option(SectionKind::Auth, "auth_type", "md5"),
        EndpointDescriptor::new("mid", "mid", "t")
            .as_template()
            .with_parent("root")
            .with_option(SectionKind::Auth, "auth_type", "digest"),
        EndpointDescriptor::new("side", "side", "t")
            .as_template()
            .with_option(SectionKind::Auth, "auth_type", "google_oauth"),
        EndpointDescriptor::new("E", "e", "t")
            .with_parent("mid")
            .with_parent("side")
            .with_option(SectionKind::Auth, "auth_type", "userpass"),
    ];

    let records = resolve_items(
        descriptors,
        vec![ConfigItem::new("E", Owner::Trunk(TrunkOwner::default()))],
    );
    let auth = record(&records, "E").auth();

    assert_eq!(auth.values("auth_type").collect::<Vec<_>>(), vec!["userpass"]);
    assert_eq!(auth.get("type"), Some("auth"));
}

/// Later parents override earlier parents for singletons.
#[test]
fn later_parent_wins_over_earlier_parent() {
    let descriptors = vec![
        EndpointDescriptor::new("first", "first", "t")
            .as_template()
            .with_option(SectionKind::Aor, "max_contacts", "1"),
        EndpointDescriptor::new("second", "second", "t")
            .as_template()
            .with_option(SectionKind::Aor, "max_contacts", "10"),
        EndpointDescriptor::new("E", "e", "t")
            .with_parent("first")
            .with_parent("second"),
    ];

    let records = resolve_items(
        descriptors,
        vec![ConfigItem::new("E", Owner::Trunk(TrunkOwner::default()))],
    );

    assert_eq!(record(&records, "E").aor().get("max_contacts"), Some("10"));
}

/// Repeatable keys accumulate in ancestor then local order.
#[test]
fn repeatable_values_accumulate_across_the_chain() {
    let descriptors = vec![
        EndpointDescriptor::new("root", "root", "t")
            .as_template()
            .with_option(SectionKind::Identify, "match", "10.0.0.1")
            .with_option(SectionKind::Identify, "match", "10.0.0.2"),
        EndpointDescriptor::new("mid", "mid", "t")
            .as_template()
            .with_parent("root")
            .with_option(SectionKind::Identify, "match", "10.0.0.3"),
        EndpointDescriptor::new("E", "trunk-e", "t")
            .with_parent("mid")
            .with_option(SectionKind::Identify, "match", "10.0.0.2")
            .with_option(SectionKind::Identify, "match", "10.0.0.4"),
    ];

    let records = resolve_items(
        descriptors,
        vec![ConfigItem::new("E", Owner::Trunk(TrunkOwner::default()))],
    );

    assert_eq!(
        record(&records, "E").identify().clone().into_vec(),
        vec![
            opt("match", "10.0.0.1"),
            opt("match", "10.0.0.2"),
            opt("match", "10.0.0.3"),
            opt("match", "10.0.0.4"),
            opt("type", "identify"),
            opt("endpoint", "trunk-e"),
        ]
    );
}

/// Resolving the same input twice yields equal records.
#[test]
fn resolution_is_idempotent() {
    let dump = ConfigurationDump {
        endpoints: vec![
            EndpointDescriptor::new("a", "a", "t")
                .as_template()
                .with_option(SectionKind::Endpoint, "set_var", "A=1"),
            EndpointDescriptor::new("b", "b", "t").as_template().with_parent("a"),
            EndpointDescriptor::new("c", "c", "t").as_template().with_parent("a"),
            EndpointDescriptor::new("line-ep", "line", "t")
                .with_parent("b")
                .with_parent("c")
                .with_option(SectionKind::Auth, "username", "line"),
            EndpointDescriptor::new("trunk-ep", "trunk", "t")
                .with_parent("c")
                .with_option(SectionKind::OutboundAuth, "username", "out"),
        ],
        items: vec![
            ConfigItem::new("line-ep", Owner::Line(LineOwner::new(3))),
            ConfigItem::new("trunk-ep", Owner::Trunk(TrunkOwner::default())),
        ],
        ..ConfigurationDump::default()
    };
    let resolver = TemplateGraphResolver::new();

    let first = dump.resolve(&resolver).unwrap();
    let second = dump.resolve(&resolver).unwrap();

    assert_eq!(first.records, second.records);
    assert_eq!(first.stats, second.stats);
    assert_eq!(first.stats.descriptors_built, 5);
}

/// Resolved records serialize without their empty sections.
#[test]
fn resolved_record_omits_empty_sections_in_json() {
    let records = resolve_items(
        vec![EndpointDescriptor::new("E", "e", "t")
            .with_option(SectionKind::Aor, "max_contacts", "1")],
        vec![ConfigItem::new("E", Owner::Trunk(TrunkOwner::default()))],
    );

    let value = serde_json::to_value(&records[0]).unwrap();
    let object = value.as_object().unwrap();

    assert!(object.contains_key("aor"));
    assert!(object.contains_key("endpoint"));
    assert!(!object.contains_key("auth"));
    assert!(!object.contains_key("registration"));
    assert_eq!(value["aor"][0], serde_json::json!(["max_contacts", "1"]));
}

/// A fully configured trunk wires every cross reference.
#[test]
fn trunk_with_registration_wires_all_references() {
    let records = resolve_items(
        vec![
            EndpointDescriptor::new("global", "global", "t")
                .as_template()
                .with_option(SectionKind::Endpoint, "callerid", "\"Provider\" <5555>"),
            EndpointDescriptor::new("E", "provider", "t")
                .with_parent("global")
                .with_transport("transport-udp")
                .with_option(SectionKind::Aor, "contact", "sip:provider.example.com")
                .with_option(SectionKind::Auth, "username", "in")
                .with_option(SectionKind::OutboundAuth, "username", "out")
                .with_option(SectionKind::Registration, "server_uri", "sip:provider.example.com")
                .with_option(SectionKind::RegistrationOutboundAuth, "username", "reg"),
        ],
        vec![ConfigItem::new(
            "E",
            Owner::Trunk(TrunkOwner {
                context: Some("from-extern".to_string()),
            }),
        )],
    );
    let resolved = record(&records, "E");
    let endpoint = resolved.endpoint();

    assert_eq!(endpoint.get("aors"), Some("provider"));
    assert_eq!(endpoint.get("auth"), Some("provider"));
    assert_eq!(endpoint.get("transport"), Some("transport-udp"));
    assert_eq!(endpoint.get("outbound_auth"), Some("outbound_auth_provider"));
    assert!(endpoint
        .values("set_var")
        .any(|v| v == "XIVO_ORIGINAL_CALLER_ID=\"Provider\" <5555>"));
    assert_eq!(
        resolved.registration().get("outbound_auth"),
        Some("auth_reg_provider")
    );
    assert_eq!(resolved.registration_outbound_auth().get("type"), Some("auth"));
}
