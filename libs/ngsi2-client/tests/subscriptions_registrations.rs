mod common;

use httpmock::prelude::*;
use ngsi2_client::model::{
    Condition, Metadata, Notification, Registration, Subject, SubjectEntity, Subscription,
    SubscriptionStatus, SubscriptionSubject,
};
use ngsi2_client::{Ngsi2Api, Ngsi2Error, Pagination};
use serde_json::json;
use url::Url;

fn new_subscription() -> Subscription {
    Subscription::new(
        SubscriptionSubject {
            entities: vec![SubjectEntity::with_id_pattern(".*").of_type("Room")],
            condition: Some(Condition {
                attributes: vec!["temperature".to_owned()],
                ..Condition::default()
            }),
        },
        Notification::new(Url::parse("http://localhost:1028/accumulate").unwrap())
            .with_attributes(["temperature"]),
    )
    .with_expires("2026-04-05T14:00:00.00Z")
}

#[tokio::test]
async fn add_subscription_returns_location_id() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v2/subscriptions")
            .header("content-type", "application/json")
            .json_body(json!({
                "subject": {
                    "entities": [{"idPattern": ".*", "type": "Room"}],
                    "condition": {"attributes": ["temperature"]}
                },
                "notification": {
                    "attributes": ["temperature"],
                    "callback": "http://localhost:1028/accumulate"
                },
                "expires": "2026-04-05T14:00:00.00Z"
            }));
        then.status(201)
            .header("Location", "/v2/subscriptions/57458eb60962ef754e7c0998");
    });

    let id = common::client(&server)
        .add_subscription(&new_subscription())
        .await
        .unwrap();

    mock.assert();
    assert_eq!(id, "57458eb60962ef754e7c0998");
}

#[tokio::test]
async fn created_without_location_is_an_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v2/subscriptions");
        then.status(201);
    });

    let err = common::client(&server)
        .add_subscription(&new_subscription())
        .await
        .unwrap_err();

    assert!(matches!(err, Ngsi2Error::MissingLocation));
}

#[tokio::test]
async fn location_without_path_is_an_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v2/registrations");
        then.status(201).header("Location", "http://orion:1026");
    });

    let err = common::client(&server)
        .add_registration(&weather_registration())
        .await
        .unwrap_err();

    assert!(matches!(err, Ngsi2Error::MissingLocation));
}

#[tokio::test]
async fn list_and_get_subscriptions() {
    let server = MockServer::start();
    let list = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/subscriptions")
            .query_param("offset", "10")
            .query_param("limit", "5")
            .query_param_missing("options");
        then.status(200).json_body(json!([common::subscription_json()]));
    });
    let single = server.mock(|when, then| {
        when.method(GET).path("/v2/subscriptions/57458eb60962ef754e7c0998");
        then.status(200).json_body(common::subscription_json());
    });

    let client = common::client(&server);
    let page = client
        .get_subscriptions(Pagination::new(10, 5, false))
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page.total, 0);
    assert_eq!(page.offset, 10);

    let subscription = client
        .get_subscription("57458eb60962ef754e7c0998")
        .await
        .unwrap();
    assert_eq!(subscription.status, Some(SubscriptionStatus::Active));
    assert_eq!(subscription.throttling, Some(5));
    assert_eq!(subscription.notification.times_sent, Some(3));
    assert_eq!(page.items[0], subscription);

    list.assert();
    single.assert();
}

#[tokio::test]
async fn update_and_delete_subscription() {
    let server = MockServer::start();
    let patch = server.mock(|when, then| {
        when.method(PATCH)
            .path("/v2/subscriptions/abc")
            .json_body(serde_json::to_value(new_subscription()).unwrap());
        then.status(204);
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE).path("/v2/subscriptions/abc");
        then.status(204);
    });

    let client = common::client(&server);
    client
        .update_subscription("abc", &new_subscription())
        .await
        .unwrap();
    client.delete_subscription("abc").await.unwrap();

    patch.assert();
    delete.assert();
}

fn weather_registration() -> Registration {
    Registration::new(Url::parse("http://weather.example.com/ngsi").unwrap())
        .with_duration("PT1M")
        .with_subject(Subject::new(
            vec![SubjectEntity::with_id("Bcn_Welt").of_type("Room")],
            vec!["temperature".to_owned()],
        ))
        .with_metadata(
            "providingService",
            Metadata::new("weather.example.com").with_type("none"),
        )
        .with_metadata(
            "providingAuthority",
            Metadata::new("AEMET - Spain").with_type("none"),
        )
}

#[tokio::test]
async fn registrations_lifecycle() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/v2/registrations")
            .json_body(json!({
                "subject": {
                    "entities": [{"id": "Bcn_Welt", "type": "Room"}],
                    "attributes": ["temperature"]
                },
                "metadata": {
                    "providingAuthority": {"value": "AEMET - Spain", "type": "none"},
                    "providingService": {"value": "weather.example.com", "type": "none"}
                },
                "callback": "http://weather.example.com/ngsi",
                "duration": "PT1M"
            }));
        then.status(201)
            .header("Location", "/v2/registrations/abcdefg");
    });
    let list = server.mock(|when, then| {
        when.method(GET).path("/v2/registrations");
        then.status(200).json_body(json!([common::registration_json()]));
    });
    let single = server.mock(|when, then| {
        when.method(GET).path("/v2/registrations/abcdefg");
        then.status(200).json_body(common::registration_json());
    });
    let patch = server.mock(|when, then| {
        when.method(PATCH).path("/v2/registrations/abcdefg");
        then.status(204);
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE).path("/v2/registrations/abcdefg");
        then.status(204);
    });

    let client = common::client(&server);
    let id = client
        .add_registration(&weather_registration())
        .await
        .unwrap();
    assert_eq!(id, "abcdefg");

    let all = client.get_registrations().await.unwrap();
    assert_eq!(all.len(), 1);

    let registration = client.get_registration(&id).await.unwrap();
    assert_eq!(registration.id.as_deref(), Some("abcdefg"));
    assert_eq!(registration.subject.attributes, ["temperature"]);
    assert_eq!(
        registration.metadata["providingAuthority"].value,
        json!("AEMET - Spain")
    );
    let mut expected = weather_registration();
    expected.id = Some("abcdefg".to_owned());
    assert_eq!(registration, expected);

    client
        .update_registration(&id, &weather_registration().with_duration("PT2M"))
        .await
        .unwrap();
    client.delete_registration(&id).await.unwrap();

    create.assert();
    list.assert();
    single.assert();
    patch.assert();
    delete.assert();
}
