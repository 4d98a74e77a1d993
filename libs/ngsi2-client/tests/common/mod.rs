#![allow(dead_code)]

use httpmock::MockServer;
use ngsi2_client::Ngsi2Client;
use ngsi2_http::{HttpClientBuilder, HttpClientConfig};
use serde_json::{Value, json};

/// Client pointed at the mock broker, plain HTTP allowed.
pub fn client(server: &MockServer) -> Ngsi2Client {
    let http = HttpClientBuilder::with_config(HttpClientConfig::for_testing())
        .build()
        .unwrap();
    Ngsi2Client::new(http, &server.base_url()).unwrap()
}

pub fn rooms_json() -> Value {
    json!([
        {
            "id": "DC_S1-D41",
            "type": "Room",
            "temperature": {"value": 35.6, "type": "Number", "metadata": {}}
        },
        {
            "id": "Boe-Idearium",
            "type": "Room",
            "temperature": {"value": 22.5, "type": "Number", "metadata": {}}
        }
    ])
}

pub fn car_json() -> Value {
    json!({
        "id": "P-9873-K",
        "type": "Car",
        "speed": {
            "value": 100,
            "type": "number",
            "metadata": {
                "accuracy": {"value": 2, "type": "Number"},
                "timestamp": {"value": "2015-06-04T07:20:27.378Z", "type": "date"}
            }
        }
    })
}

pub fn registration_json() -> Value {
    json!({
        "id": "abcdefg",
        "subject": {
            "entities": [{"id": "Bcn_Welt", "type": "Room"}],
            "attributes": ["temperature"]
        },
        "callback": "http://weather.example.com/ngsi",
        "metadata": {
            "providingService": {"value": "weather.example.com", "type": "none"},
            "providingAuthority": {"value": "AEMET - Spain", "type": "none"}
        },
        "duration": "PT1M"
    })
}

pub fn subscription_json() -> Value {
    json!({
        "id": "57458eb60962ef754e7c0998",
        "subject": {
            "entities": [{"idPattern": ".*", "type": "Room"}],
            "condition": {"attributes": ["temperature"], "expression": {"q": "temperature>40"}}
        },
        "notification": {
            "attributes": ["temperature", "humidity"],
            "callback": "http://localhost:1234/",
            "attrsFormat": "normalized",
            "timesSent": 3
        },
        "expires": "2026-04-05T14:00:00.00Z",
        "status": "active",
        "throttling": 5
    })
}
