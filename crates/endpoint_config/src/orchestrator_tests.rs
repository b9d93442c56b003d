//! Tests for template graph orchestration.

use super::*;
use crate::options::SectionKind;
use crate::owner::{LineOwner, MeetingGuestOwner, TrunkOwner};
use tracing_test::traced_test;

fn trunk() -> Owner {
    Owner::Trunk(TrunkOwner::default())
}

fn resolve(
    descriptors: Vec<EndpointDescriptor>,
    items: Vec<ConfigItem>,
) -> ResolutionResult<Resolution> {
    let catalog = EndpointCatalog::new(descriptors)?;
    TemplateGraphResolver::new().resolve(&catalog, &items, &TenantDirectory::new())
}

// ============================================================================
// Memoization
// ============================================================================

#[test]
fn diamond_ancestor_is_built_once() {
    let descriptors = vec![
        EndpointDescriptor::new("a", "a", "t")
            .as_template()
            .with_option(SectionKind::Endpoint, "set_var", "FROM_A=1")
            .with_option(SectionKind::Endpoint, "dtmf_mode", "rfc4733"),
        EndpointDescriptor::new("b", "b", "t").as_template().with_parent("a"),
        EndpointDescriptor::new("c", "c", "t").as_template().with_parent("a"),
        EndpointDescriptor::new("d", "d", "t")
            .with_parent("b")
            .with_parent("c"),
    ];

    let resolution = resolve(descriptors, vec![ConfigItem::new("d", trunk())]).unwrap();

    assert_eq!(resolution.stats.descriptors_built, 4);
    assert_eq!(resolution.stats.templates_skipped, 3);
    assert_eq!(resolution.stats.records_emitted, 1);

    let endpoint = resolution.records[0].endpoint();
    assert_eq!(
        endpoint.values("set_var").filter(|v| *v == "FROM_A=1").count(),
        1
    );
    assert_eq!(endpoint.values("dtmf_mode").count(), 1);
}

#[test]
fn shared_template_is_built_once_for_many_items() {
    let mut descriptors = vec![EndpointDescriptor::new("global", "global", "t").as_template()];
    let mut items = Vec::new();
    for n in 0..5 {
        let id = format!("ep-{n}");
        descriptors
            .push(EndpointDescriptor::new(id.as_str(), id.as_str(), "t").with_parent("global"));
        items.push(ConfigItem::new(id.as_str(), trunk()));
    }

    let resolution = resolve(descriptors, items).unwrap();

    assert_eq!(resolution.stats.descriptors_built, 6);
    assert_eq!(resolution.records.len(), 5);
}

#[test]
fn templates_are_never_emitted() {
    let descriptors = vec![
        EndpointDescriptor::new("global", "global", "t")
            .as_template()
            .with_option(SectionKind::Aor, "qualify_frequency", "60"),
        EndpointDescriptor::new("ep", "ep", "t").with_parent("global"),
    ];

    let resolution = resolve(descriptors, vec![ConfigItem::new("ep", trunk())]).unwrap();

    let ids: Vec<&str> = resolution.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["ep"]);
    assert_eq!(
        resolution.records[0].aor().get("qualify_frequency"),
        Some("60")
    );
}

#[test]
fn records_follow_item_order() {
    let descriptors = vec![
        EndpointDescriptor::new("line-ep", "line", "t"),
        EndpointDescriptor::new("trunk-ep", "trunk", "t"),
        EndpointDescriptor::new("guest-ep", "guest", "t"),
    ];
    let items = vec![
        ConfigItem::new("trunk-ep", trunk()),
        ConfigItem::new("line-ep", Owner::Line(LineOwner::new(1))),
        ConfigItem::new(
            "guest-ep",
            Owner::MeetingGuest(MeetingGuestOwner {
                meeting_uuid: "m".to_string(),
                meeting_name: "m".to_string(),
            }),
        ),
    ];

    let resolution = resolve(descriptors, items).unwrap();
    let names: Vec<&str> = resolution.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["trunk", "line", "guest"]);
}

#[test]
fn empty_input_resolves_to_nothing() {
    let resolution = resolve(Vec::new(), Vec::new()).unwrap();
    assert!(resolution.records.is_empty());
    assert_eq!(resolution.stats, ResolutionStats::default());
}

#[test]
fn unreferenced_descriptors_are_ignored() {
    let descriptors = vec![
        EndpointDescriptor::new("ep", "ep", "t"),
        EndpointDescriptor::new("orphan", "orphan", "t"),
    ];

    let resolution = resolve(descriptors, vec![ConfigItem::new("ep", trunk())]).unwrap();
    assert_eq!(resolution.stats.descriptors_built, 1);
}

// ============================================================================
// Integrity errors
// ============================================================================

#[test]
fn missing_parent_fails_the_whole_resolution() {
    let descriptors = vec![
        EndpointDescriptor::new("ok", "ok", "t"),
        EndpointDescriptor::new("ep", "ep", "t").with_parent("ghost"),
    ];
    let items = vec![
        ConfigItem::new("ok", trunk()),
        ConfigItem::new("ep", trunk()),
    ];

    let result = resolve(descriptors, items);

    assert_eq!(
        result.unwrap_err(),
        ResolutionError::MissingParent {
            endpoint: EndpointId::from("ep"),
            parent: EndpointId::from("ghost"),
        }
    );
}

#[test]
fn item_with_unknown_endpoint_fails() {
    let result = resolve(Vec::new(), vec![ConfigItem::new("ghost", trunk())]);
    assert_eq!(
        result.unwrap_err(),
        ResolutionError::UnknownEndpoint {
            endpoint: EndpointId::from("ghost")
        }
    );
}

#[test]
fn inheritance_cycle_is_reported_with_its_chain() {
    let descriptors = vec![
        EndpointDescriptor::new("a", "a", "t").as_template().with_parent("b"),
        EndpointDescriptor::new("b", "b", "t").as_template().with_parent("a"),
        EndpointDescriptor::new("ep", "ep", "t").with_parent("a"),
    ];

    let result = resolve(descriptors, vec![ConfigItem::new("ep", trunk())]);

    assert_eq!(
        result.unwrap_err(),
        ResolutionError::InheritanceCycle {
            chain: vec![
                EndpointId::from("a"),
                EndpointId::from("b"),
                EndpointId::from("a"),
            ]
        }
    );
}

#[test]
fn self_inheritance_is_a_cycle() {
    let descriptors = vec![EndpointDescriptor::new("ep", "ep", "t").with_parent("ep")];

    let result = resolve(descriptors, vec![ConfigItem::new("ep", trunk())]);

    assert!(matches!(
        result,
        Err(ResolutionError::InheritanceCycle { chain }) if chain.len() == 2
    ));
}

#[test]
fn concrete_parent_without_owner_fails() {
    let descriptors = vec![
        EndpointDescriptor::new("not-a-template", "p", "t"),
        EndpointDescriptor::new("ep", "ep", "t").with_parent("not-a-template"),
    ];

    let result = resolve(descriptors, vec![ConfigItem::new("ep", trunk())]);

    assert_eq!(
        result.unwrap_err(),
        ResolutionError::MissingOwner {
            endpoint: EndpointId::from("not-a-template")
        }
    );
}

#[test]
fn endpoint_with_two_owners_fails() {
    let descriptors = vec![EndpointDescriptor::new("ep", "ep", "t")];
    let items = vec![
        ConfigItem::new("ep", Owner::Line(LineOwner::new(1))),
        ConfigItem::new("ep", trunk()),
    ];

    assert_eq!(
        resolve(descriptors, items).unwrap_err(),
        ResolutionError::ConflictingOwner {
            endpoint: EndpointId::from("ep"),
            first: "line",
            second: "trunk",
        }
    );
}

#[test]
fn item_owning_a_template_fails() {
    let descriptors = vec![EndpointDescriptor::new("t", "t", "t").as_template()];

    assert_eq!(
        resolve(descriptors, vec![ConfigItem::new("t", trunk())]).unwrap_err(),
        ResolutionError::TemplateOwned {
            endpoint: EndpointId::from("t"),
            owner: "trunk",
        }
    );
}

// ============================================================================
// Tenant settings and logging
// ============================================================================

#[test]
fn recording_announcement_uses_the_endpoint_tenant() {
    let catalog = EndpointCatalog::new(vec![
        EndpointDescriptor::new("ep-a", "a", "tenant-a"),
        EndpointDescriptor::new("ep-b", "b", "tenant-b"),
    ])
    .unwrap();
    let tenants = TenantDirectory::new().with_tenant(
        "tenant-a",
        crate::tenant::TenantSettings {
            start_announcement: Some("beep".to_string()),
            stop_announcement: None,
        },
    );
    let items = vec![
        ConfigItem::new("ep-a", trunk()),
        ConfigItem::new("ep-b", trunk()),
    ];

    let resolution = TemplateGraphResolver::new()
        .resolve(&catalog, &items, &tenants)
        .unwrap();

    let mixmonitor = |record: &ResolvedEndpointConfig| {
        record
            .endpoint()
            .values("set_var")
            .find(|v| v.starts_with("WAZO_MIXMONITOR_OPTIONS="))
            .map(str::to_string)
    };
    assert_eq!(
        mixmonitor(&resolution.records[0]).as_deref(),
        Some("WAZO_MIXMONITOR_OPTIONS=p(beep)")
    );
    assert_eq!(
        mixmonitor(&resolution.records[1]).as_deref(),
        Some("WAZO_MIXMONITOR_OPTIONS=")
    );
}

#[test]
fn extra_repeatable_keys_flow_through_the_resolver() {
    let catalog = EndpointCatalog::new(vec![
        EndpointDescriptor::new("g", "g", "t")
            .as_template()
            .with_option(SectionKind::Endpoint, "allow", "ulaw"),
        EndpointDescriptor::new("ep", "ep", "t")
            .with_parent("g")
            .with_option(SectionKind::Endpoint, "allow", "alaw"),
    ])
    .unwrap();
    let resolver = TemplateGraphResolver::with_canonicalizer(
        Canonicalizer::new().with_extra_repeatable_keys(["allow"]),
    );

    let resolution = resolver
        .resolve(&catalog, &[ConfigItem::new("ep", trunk())], &TenantDirectory::new())
        .unwrap();

    let allowed: Vec<&str> = resolution.records[0].endpoint().values("allow").collect();
    assert_eq!(allowed, vec!["ulaw", "alaw"]);
}

#[test]
#[traced_test]
fn resolution_logs_a_summary() {
    let descriptors = vec![
        EndpointDescriptor::new("g", "g", "t").as_template(),
        EndpointDescriptor::new("ep", "ep", "t").with_parent("g"),
    ];

    resolve(descriptors, vec![ConfigItem::new("ep", trunk())]).unwrap();

    assert!(logs_contain("Built endpoint resolver"));
    assert!(logs_contain("Resolved endpoint configuration"));
}
