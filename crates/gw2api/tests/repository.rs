use std::sync::Mutex;

use gw2_core::config::ClientConfig;
use gw2_core::trace::RecentEventsLayer;
use gw2api::client::Request;
use gw2api::end_point::events::EventLocation;
use gw2api::end_point::items::{ItemDetails, ItemKind, WeaponKind};
use gw2api::envelope::{RESULT_COUNT_HEADER, RESULT_TOTAL_HEADER};
use gw2api::{ApiError, Gw2Client, Locale, Response, Transport};
use rstest::*;
use serde_json::{json, Value};
use similar_asserts::assert_eq;
use time::macros::datetime;
use tracing_subscriber::prelude::*;

type Responder = Box<dyn Fn(&Request) -> Result<Response, ApiError> + Send + Sync>;

/// answers from a closure and remembers what was asked
struct CannedTransport {
    requests: Mutex<Vec<Request>>,
    responder: Responder,
}

impl CannedTransport {
    fn new(responder: impl Fn(&Request) -> Result<Response, ApiError> + Send + Sync + 'static) -> Self {
        Self {
            requests: Mutex::new(vec![]),
            responder: Box::new(responder),
        }
    }
}

impl Transport for &CannedTransport {
    fn send(&self, request: &Request) -> Result<Response, ApiError> {
        self.requests
            .lock()
            .expect("poisoned request log")
            .push(request.clone());
        (self.responder)(request)
    }
}

fn client<'a>(transport: &'a CannedTransport, locale: Option<&str>) -> Gw2Client<&'a CannedTransport> {
    let config = ClientConfig {
        locale: locale.map(Into::into),
        ..Default::default()
    };
    Gw2Client::with_transport(transport, config)
}

fn sword(id: u64) -> Value {
    json!({
        "id": id,
        "name": format!("sword {id}"),
        "type": "Weapon",
        "details": {"type": "Sword", "min_power": 10, "max_power": 20}
    })
}

/// echoes a sword for every requested id
fn swords(request: &Request) -> Result<Response, ApiError> {
    let ids: Vec<u64> = request
        .query_value("ids")
        .unwrap_or_default()
        .split(',')
        .filter_map(|id| id.parse().ok())
        .collect();
    Ok(Response::new(Some(Value::Array(ids.iter().copied().map(sword).collect())))
        .with_header(RESULT_COUNT_HEADER, ids.len().to_string())
        .with_header(RESULT_TOTAL_HEADER, "1000"))
}

#[rstest]
fn find_all_by_ids_is_batched() {
    let transport = CannedTransport::new(swords);
    let client = client(&transport, None);
    let ids: Vec<u32> = (1..=450).collect();
    let range = client
        .items()
        .find_all_by_ids(&ids)
        .expect("failed to find items");

    let requests = transport.requests.lock().expect("poisoned request log");
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| r.path == "v2/items"));
    assert_eq!(requests[2].query_value("ids").map(|ids| ids.split(',').count()), Some(50));

    assert_eq!(range.len(), 450);
    assert_eq!(range.subtotal_count, 450);
    assert_eq!(range.total_count, 1000);
    assert_eq!(range.items.keys().copied().collect::<Vec<_>>(), ids);
    let item = range.get(&201).expect("missing item 201");
    assert_eq!(item.kind, ItemKind::Weapon);
    assert!(matches!(&item.details, ItemDetails::Weapon(w) if w.kind == WeaponKind::Sword));
}

#[rstest]
fn find_all_by_no_ids_sends_nothing() {
    let transport = CannedTransport::new(swords);
    let range = client(&transport, None)
        .items()
        .find_all_by_ids(&[])
        .expect("failed to find items");
    assert!(range.is_empty());
    assert!(transport.requests.lock().expect("poisoned request log").is_empty());
}

#[rstest]
fn pages_are_stamped() {
    let transport = CannedTransport::new(|_| {
        Ok(Response::new(Some(json!([sword(1), sword(2)])))
            .with_header("X-Page-Size", "200")
            .with_header("X-Page-Total", "5")
            .with_header(RESULT_COUNT_HEADER, "2")
            .with_header(RESULT_TOTAL_HEADER, "802")
            .with_culture("fr")
            .with_last_modified(datetime!(2023-06-01 10:00 UTC)))
    });
    let client = client(&transport, Some("fr"));
    let page = client
        .items()
        .find_page_sized(4, 500)
        .expect("failed to get page");

    let requests = transport.requests.lock().expect("poisoned request log");
    assert_eq!(requests[0].query_value("page"), Some("4"));
    assert_eq!(requests[0].query_value("page_size"), Some("200"));
    assert_eq!(requests[0].query_value("lang"), Some("fr"));

    assert_eq!(page.page, 4);
    assert_eq!(page.page_size, 200);
    assert_eq!(page.page_count, 5);
    assert_eq!(page.total_count, 802);
    assert_eq!(page.len(), 2);
    for item in page.iter() {
        assert_eq!(item.locale, Some(Locale::new("fr")));
        assert_eq!(item.last_modified, Some(datetime!(2023-06-01 10:00 UTC)));
    }
}

#[rstest]
#[case(None, None)]
#[case(Some("de"), Some("de"))]
fn lang_only_goes_to_localized_endpoints(#[case] locale: Option<&str>, #[case] expected: Option<&str>) {
    let transport = CannedTransport::new(|_| Ok(Response::new(Some(json!({"id": 1, "type": "Coat"})))));
    let client = client(&transport, locale);
    client.recipes().find(&1).expect("failed to find recipe");
    client.items().find(&1).expect("failed to find item");

    let requests = transport.requests.lock().expect("poisoned request log");
    assert_eq!(requests[0].query_value("lang"), None);
    assert_eq!(requests[0].query_value("id"), Some("1"));
    assert_eq!(requests[1].query_value("lang"), expected);
}

#[rstest]
fn find_without_content_is_default() {
    let transport = CannedTransport::new(|_| Ok(Response::new(None)));
    let item = client(&transport, None)
        .items()
        .find(&1)
        .expect("failed to find item");
    assert_eq!(item.kind, ItemKind::Unknown);
    assert_eq!(item.id, 0);
}

#[rstest]
fn discover_ids() {
    let transport = CannedTransport::new(|_| Ok(Response::new(Some(json!(["404", "cheer"])))));
    let ids = client(&transport, None)
        .quaggans()
        .discover()
        .expect("failed to discover quaggans");
    assert_eq!(ids, vec!["404".to_string(), "cheer".to_string()]);
}

#[rstest]
fn status_errors_pass_through() {
    let transport = CannedTransport::new(|_| {
        Err(ApiError::Status {
            url: "v2/items".to_string(),
            status: 404,
            text: "all ids provided are invalid".to_string(),
        })
    });
    let result = client(&transport, None).items().find_all_by_ids(&[0]);
    assert!(matches!(result, Err(ApiError::Status { status: 404, .. })));
}

#[rstest]
fn collections_must_be_arrays() {
    let transport = CannedTransport::new(|_| Ok(Response::new(Some(json!({"id": 1})))));
    let result = client(&transport, None).items().find_all();
    assert!(matches!(result, Err(ApiError::Convert(_))));
}

#[rstest]
fn v1_event_details() {
    let transport = CannedTransport::new(|_| {
        Ok(Response::new(Some(json!({"events": {
            "EED8A79F-B374-4AE6-BA6F-B7B98D9D7142": {
                "name": "Defeat the renegade charr.",
                "level": 2,
                "map_id": 15,
                "flags": [],
                "location": {"type": "cylinder", "center": [1.0, 2.0, 3.0], "height": 4.0, "radius": 5.0, "rotation": 0.0}
            },
            "CEA84FBF-2368-467C-92EA-7FA60D527C7B": {
                "name": "Find a way to open the door.",
                "level": 3,
                "map_id": 15,
                "flags": ["group_event"],
                "location": {"type": "blob"}
            }
        }}))))
    });
    let client = client(&transport, Some("en"));
    let events = client.v1().event_details(None).expect("failed to get events");

    let requests = transport.requests.lock().expect("poisoned request log");
    assert_eq!(requests[0].path, "v1/event_details.json");
    assert_eq!(requests[0].query_value("lang"), Some("en"));

    assert_eq!(events.len(), 2);
    let first = events
        .get(&"EED8A79F-B374-4AE6-BA6F-B7B98D9D7142".to_string())
        .expect("missing first event");
    assert!(matches!(first.location, EventLocation::Cylinder(_)));
    let second = events
        .get(&"CEA84FBF-2368-467C-92EA-7FA60D527C7B".to_string())
        .expect("missing second event");
    assert_eq!(second.flags, vec!["group_event"]);
    assert_eq!(second.location, EventLocation::Unknown);
}

#[rstest]
fn v1_item_ids_and_build() {
    let transport = CannedTransport::new(|request| {
        Ok(Response::new(Some(match request.path.as_str() {
            "v1/items.json" => json!({"items": [12546, 38875]}),
            "v1/build.json" => json!({"build_id": 115267}),
            _ => json!({"id": 115268}),
        })))
    });
    let client = client(&transport, None);
    assert_eq!(client.v1().item_ids().expect("failed to get ids"), vec![12546, 38875]);
    assert_eq!(client.build_v1().expect("failed to get build").id, 115267);
    assert_eq!(client.build().expect("failed to get build").id, 115268);
}

#[rstest]
fn unknown_discriminators_are_logged() {
    let transport = CannedTransport::new(|_| {
        Ok(Response::new(Some(json!({"id": 5, "type": "Hoverboard"}))))
    });
    let client = client(&transport, None);
    let (layer, recent) = RecentEventsLayer::new(32);
    let subscriber = tracing_subscriber::registry().with(layer);
    let item = tracing::subscriber::with_default(subscriber, || client.items().find(&5))
        .expect("failed to find item");

    assert_eq!(item.id, 5);
    assert_eq!(item.kind, ItemKind::Unknown);
    let logged = recent.with_field("family", "item");
    assert!(
        logged.iter().any(|e| e.message == "unknown discriminator"
            && e.fields.get("discriminator").map_or(false, |d| d.contains("Hoverboard"))),
        "{logged:?}"
    );
}

#[rstest]
fn unknown_discriminators_in_pages_are_logged() {
    let transport = CannedTransport::new(|_| {
        Ok(Response::new(Some(json!([
            sword(1),
            {"id": 2, "type": "Hoverboard"},
            {"id": 3, "type": "Weapon", "details": {"type": "Chainsaw"}}
        ]))))
    });
    let client = client(&transport, None);
    let (layer, recent) = RecentEventsLayer::new(32);
    let subscriber = tracing_subscriber::registry().with(layer);
    let page = tracing::subscriber::with_default(subscriber, || client.items().find_page(0))
        .expect("failed to get page");

    assert_eq!(page.len(), 3);
    assert_eq!(page.items[1].kind, ItemKind::Unknown);
    assert!(matches!(&page.items[2].details, ItemDetails::Weapon(w) if w.kind == WeaponKind::Unknown));
    let item = recent.with_field("family", "item");
    assert!(
        item.iter().any(|e| e.message == "unknown discriminator"
            && e.fields.get("discriminator").map_or(false, |d| d.contains("Hoverboard"))
            && e.spans.iter().any(|s| s == "convert_items")),
        "{item:?}"
    );
    let weapon = recent.with_field("family", "weapon");
    assert!(
        weapon.iter().any(|e| e.fields.get("discriminator").map_or(false, |d| d.contains("Chainsaw"))),
        "{weapon:?}"
    );
}

#[rstest]
fn nulls_do_not_sink_the_page() {
    let transport = CannedTransport::new(|_| {
        Ok(Response::new(Some(json!([
            sword(1),
            {
                "id": 2,
                "name": null,
                "rarity": null,
                "upgrades_into": null,
                "type": "Weapon",
                "details": {"type": "Sword", "infusion_slots": null, "min_power": 5}
            },
            {"id": 3, "type": "Armor", "details": {"type": "Coat", "weight_class": null, "infusion_slots": null}}
        ]))))
    });
    let page = client(&transport, None)
        .items()
        .find_page(0)
        .expect("nulls must not fail the page");

    assert_eq!(page.len(), 3);
    assert_eq!(page.items[0].name, "sword 1");
    let second = &page.items[1];
    assert_eq!(second.name, "");
    assert!(second.upgrades_into.is_empty());
    assert!(matches!(&second.details, ItemDetails::Weapon(w) if w.min_power == 5 && w.infusion_slots.is_empty()));
    assert!(matches!(&page.items[2].details, ItemDetails::Armor(a) if a.weight_class.is_empty()));
}
