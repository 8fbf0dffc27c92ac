//! Deletion, status and listing.

mod common;

use std::sync::Arc;

use common::*;
use ionos_mcm_cloud::ApiError;
use ionos_mcm_provider::{Code, GenerateMachineClassForMigrationRequest, GetVolumeIdsRequest};
use ionos_mcm_reconcile::RequestContext;
use ionos_mcm_testing::{FakeCloud, Op};
use rstest::rstest;

const SERVER: &str = "6789abcd-ef01-4345-6789-abcdef012325";
const OTHER: &str = "7789abcd-ef01-4345-6789-abcdef012326";
const STRAY: &str = "8789abcd-ef01-4345-6789-abcdef012327";
const REMOVED: &str = "9789abcd-ef01-4345-6789-abcdef012328";

fn provider_id(server_id: &str) -> String {
    format!("ionos:///{DC}/{server_id}")
}

fn owned_labels() -> Vec<(&'static str, String)> {
    vec![
        ("cluster", hex::encode(CLUSTER)),
        ("role", "node".to_string()),
        ("region", hex::encode("de")),
        ("zone", hex::encode(ZONE)),
    ]
}

fn as_pairs<'a>(labels: &'a [(&'static str, String)]) -> Vec<(&'static str, &'a str)> {
    labels.iter().map(|(k, v)| (*k, v.as_str())).collect()
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn delete_removes_volumes_then_server() {
    let cloud = Arc::new(
        FakeCloud::new()
            .with_server(DC, SERVER, "machine-1", &[])
            .with_attached_volume(SERVER, "vol-boot")
            .with_attached_volume(SERVER, "vol-data"),
    );
    let driver = driver(&cloud).await;

    driver
        .delete_machine(&RequestContext::new(), &delete_request(&provider_id(SERVER)))
        .await
        .unwrap();

    assert_eq!(cloud.targets(Op::StopServer), vec![SERVER]);
    assert_eq!(cloud.targets(Op::DeleteVolume), vec!["vol-boot", "vol-data"]);
    assert_eq!(cloud.targets(Op::DeleteServer), vec![SERVER]);
    assert!(cloud.server_ids().is_empty());
    assert!(cloud.volume_ids().is_empty());

    let calls = cloud.calls();
    let last_volume = calls.iter().rposition(|c| c.op == Op::DeleteVolume).unwrap();
    let server = calls.iter().position(|c| c.op == Op::DeleteServer).unwrap();
    assert!(last_volume < server);
}

#[tokio::test(start_paused = true)]
async fn delete_uses_the_settled_server() {
    let cloud = Arc::new(
        FakeCloud::new()
            .with_server(DC, SERVER, "machine-1", &[])
            .with_attached_volume(SERVER, "vol-boot")
            .busy_for(Op::FindServer, 1),
    );
    let driver = driver(&cloud).await;

    driver
        .delete_machine(&RequestContext::new(), &delete_request(&provider_id(SERVER)))
        .await
        .unwrap();

    assert_eq!(cloud.count(Op::FindServer), 2);
    assert_eq!(cloud.targets(Op::DeleteVolume), vec!["vol-boot"]);
    assert_eq!(cloud.targets(Op::DeleteServer), vec![SERVER]);
}

#[tokio::test]
async fn delete_of_missing_machine_succeeds() {
    let cloud = Arc::new(FakeCloud::new());
    let driver = driver(&cloud).await;

    driver
        .delete_machine(&RequestContext::new(), &delete_request(&provider_id(SERVER)))
        .await
        .unwrap();

    assert_eq!(cloud.count(Op::StopServer), 1);
    assert_eq!(cloud.count(Op::DeleteServer), 0);
}

#[tokio::test]
async fn delete_twice_is_idempotent() {
    let cloud = Arc::new(FakeCloud::new().with_server(DC, SERVER, "machine-1", &[]));
    let driver = driver(&cloud).await;
    let request = delete_request(&provider_id(SERVER));

    driver
        .delete_machine(&RequestContext::new(), &request)
        .await
        .unwrap();
    driver
        .delete_machine(&RequestContext::new(), &request)
        .await
        .unwrap();

    assert_eq!(cloud.count(Op::DeleteServer), 1);
}

#[rstest]
#[case("")]
#[case("aws:///12345678-9abc-4def-8123-456789abcdef/6789abcd-ef01-4345-6789-abcdef012325")]
#[case("ionos:///12345678-9abc-4def-8123-456789abcdef")]
#[case("ionos:///not-a-uuid/6789abcd-ef01-4345-6789-abcdef012325")]
#[tokio::test]
async fn delete_rejects_malformed_identity(#[case] provider_id: &str) {
    let cloud = Arc::new(FakeCloud::new());
    let driver = driver(&cloud).await;

    let err = driver
        .delete_machine(&RequestContext::new(), &delete_request(provider_id))
        .await
        .unwrap_err();

    assert_eq!(err.code(), Code::InvalidArgument);
    assert!(cloud.calls().is_empty());
}

#[tokio::test]
async fn delete_surfaces_stop_failure() {
    let cloud = Arc::new(
        FakeCloud::new()
            .with_server(DC, SERVER, "machine-1", &[])
            .failing(Op::StopServer, ApiError::Transport("timeout".to_string())),
    );
    let driver = driver(&cloud).await;

    let err = driver
        .delete_machine(&RequestContext::new(), &delete_request(&provider_id(SERVER)))
        .await
        .unwrap_err();

    assert_eq!(err.code(), Code::Unavailable);
    assert_eq!(cloud.count(Op::DeleteServer), 0);
}

#[tokio::test]
async fn delete_surfaces_volume_failure() {
    let cloud = Arc::new(
        FakeCloud::new()
            .with_server(DC, SERVER, "machine-1", &[])
            .with_attached_volume(SERVER, "vol-boot")
            .failing(
                Op::DeleteVolume,
                ApiError::Status {
                    status: 500,
                    message: "internal".to_string(),
                },
            ),
    );
    let driver = driver(&cloud).await;

    let err = driver
        .delete_machine(&RequestContext::new(), &delete_request(&provider_id(SERVER)))
        .await
        .unwrap_err();

    assert_eq!(err.code(), Code::Unavailable);
    assert_eq!(cloud.count(Op::DeleteServer), 0);
}

// =============================================================================
// Status
// =============================================================================

#[tokio::test]
async fn status_of_running_machine() {
    let cloud = Arc::new(FakeCloud::new().with_server(DC, SERVER, "machine-1", &[]));
    let driver = driver(&cloud).await;

    let response = driver
        .get_machine_status(&RequestContext::new(), &status_request(&provider_id(SERVER)))
        .await
        .unwrap();

    assert_eq!(response.provider_id, provider_id(SERVER));
    assert_eq!(response.node_name, "machine-1");
}

#[tokio::test]
async fn status_without_identity_is_not_found() {
    let cloud = Arc::new(FakeCloud::new());
    let driver = driver(&cloud).await;

    let err = driver
        .get_machine_status(&RequestContext::new(), &status_request(""))
        .await
        .unwrap_err();

    assert_eq!(err.code(), Code::NotFound);
    assert!(cloud.calls().is_empty());
}

#[tokio::test]
async fn status_with_malformed_identity() {
    let cloud = Arc::new(FakeCloud::new());
    let driver = driver(&cloud).await;

    let err = driver
        .get_machine_status(&RequestContext::new(), &status_request("ionos:///x/y"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), Code::InvalidArgument);
}

#[tokio::test]
async fn status_of_missing_machine() {
    let cloud = Arc::new(FakeCloud::new());
    let driver = driver(&cloud).await;

    let err = driver
        .get_machine_status(&RequestContext::new(), &status_request(&provider_id(SERVER)))
        .await
        .unwrap_err();

    assert_eq!(err.code(), Code::NotFound);
}

#[tokio::test]
async fn status_of_inactive_machine() {
    let cloud = Arc::new(
        FakeCloud::new()
            .with_server(DC, SERVER, "machine-1", &[])
            .with_server_state(SERVER, "INACTIVE"),
    );
    let driver = driver(&cloud).await;

    let err = driver
        .get_machine_status(&RequestContext::new(), &status_request(&provider_id(SERVER)))
        .await
        .unwrap_err();

    assert_eq!(err.code(), Code::NotFound);
    assert!(err.message().contains("does not exist"));
}

// =============================================================================
// List
// =============================================================================

#[tokio::test]
async fn list_returns_only_fully_matching_servers() {
    let owned = owned_labels();
    let other_zone = vec![
        ("cluster", hex::encode(CLUSTER)),
        ("role", "node".to_string()),
        ("zone", hex::encode("de-txl")),
    ];

    let cloud = Arc::new(
        FakeCloud::new()
            .with_server(DC, SERVER, "machine-1", &as_pairs(&owned))
            .with_server(DC, OTHER, "machine-2", &as_pairs(&other_zone))
            .with_server(DC, STRAY, "unrelated", &[])
            .with_server(DC, REMOVED, "machine-0", &as_pairs(&owned))
            .with_server_state(REMOVED, "INACTIVE"),
    );
    let driver = driver(&cloud).await;

    let response = driver
        .list_machines(&RequestContext::new(), &list_request())
        .await
        .unwrap();

    assert_eq!(response.machine_list.len(), 1);
    assert_eq!(
        response.machine_list.get(&provider_id(SERVER)).map(String::as_str),
        Some("machine-1")
    );
    assert!(!cloud.targets(Op::ListServerLabels).contains(&REMOVED.to_string()));
}

#[tokio::test]
async fn list_ignores_other_datacenters() {
    let owned = owned_labels();
    let cloud = Arc::new(FakeCloud::new().with_server(
        "22345678-9abc-4def-8123-456789abcdef",
        SERVER,
        "machine-1",
        &as_pairs(&owned),
    ));
    let driver = driver(&cloud).await;

    let response = driver
        .list_machines(&RequestContext::new(), &list_request())
        .await
        .unwrap();

    assert!(response.machine_list.is_empty());
}

#[tokio::test]
async fn list_surfaces_label_failures() {
    let cloud = Arc::new(
        FakeCloud::new()
            .with_server(DC, SERVER, "machine-1", &[])
            .failing(Op::ListServerLabels, ApiError::Transport("reset".to_string())),
    );
    let driver = driver(&cloud).await;

    let err = driver
        .list_machines(&RequestContext::new(), &list_request())
        .await
        .unwrap_err();

    assert_eq!(err.code(), Code::Unavailable);
}

#[tokio::test]
async fn list_requires_valid_spec() {
    let cloud = Arc::new(FakeCloud::new());
    let driver = driver(&cloud).await;

    let mut request = list_request();
    request.machine_class.provider_spec = serde_json::json!({"cluster": CLUSTER});

    let err = driver
        .list_machines(&RequestContext::new(), &request)
        .await
        .unwrap_err();

    assert_eq!(err.code(), Code::InvalidArgument);
    assert!(cloud.calls().is_empty());
}

// =============================================================================
// Unsupported operations
// =============================================================================

#[tokio::test]
async fn unsupported_operations_are_unimplemented() {
    let cloud = Arc::new(FakeCloud::new());
    let driver = driver(&cloud).await;
    let ctx = RequestContext::new();

    let err = driver
        .get_volume_ids(&ctx, &GetVolumeIdsRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::Unimplemented);
    assert!(err.message().contains("GetVolumeIDs"));

    let err = driver
        .generate_machine_class_for_migration(
            &ctx,
            &GenerateMachineClassForMigrationRequest::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::Unimplemented);
    assert!(!err.message().is_empty());
}
