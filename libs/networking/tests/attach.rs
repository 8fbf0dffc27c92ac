//! NIC attachment against the in-memory cloud.

use std::time::Duration;

use ionos_mcm_cloud::ApiError;
use ionos_mcm_networking::{AttachError, NetworkAttacher, NicConfig};
use ionos_mcm_reconcile::{PollConfig, RequestContext, WaitError};
use ionos_mcm_testing::{FakeCloud, Op};

const DC: &str = "12345678-9abc-4def-8123-456789abcdef";
const SERVER: &str = "6789abcd-ef01-4345-6789-abcdef012325";

fn poll() -> PollConfig {
    PollConfig {
        interval: Duration::from_secs(15),
        max_retries: 3,
    }
}

fn cloud() -> FakeCloud {
    FakeCloud::new().with_server(DC, SERVER, "machine-1", &[])
}

#[tokio::test]
async fn attach_creates_nic_and_waits() {
    let cloud = cloud().busy_for(Op::FindNic, 1);
    let (poll, ctx) = (poll(), RequestContext::new());
    let attacher = NetworkAttacher::new(&cloud, &poll, &ctx);

    tokio::time::pause();
    let nic_id = attacher
        .attach(DC, SERVER, "1", &NicConfig::wan())
        .await
        .unwrap();

    assert_eq!(cloud.count(Op::CreateNic), 1);
    assert_eq!(cloud.targets(Op::FindNic), vec![nic_id.clone(), nic_id]);

    let nics = cloud.nics(SERVER);
    assert_eq!(nics.len(), 1);
    assert_eq!(nics[0].lan, 1);
    assert_eq!(nics[0].firewall_active, Some(true));
    assert_eq!(nics[0].dhcp, None);
}

#[tokio::test]
async fn attach_rejects_non_numeric_network() {
    let cloud = cloud();
    let (poll, ctx) = (poll(), RequestContext::new());
    let attacher = NetworkAttacher::new(&cloud, &poll, &ctx);

    let err = attacher
        .attach(DC, SERVER, "public", &NicConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AttachError::InvalidNetworkId(_)));
    assert_eq!(cloud.count(Op::CreateNic), 0);
}

#[tokio::test]
async fn attach_surfaces_create_failure() {
    let cloud = cloud().failing(
        Op::CreateNic,
        ApiError::Status {
            status: 422,
            message: "lan does not exist".into(),
        },
    );
    let (poll, ctx) = (poll(), RequestContext::new());
    let attacher = NetworkAttacher::new(&cloud, &poll, &ctx);

    let err = attacher
        .attach(DC, SERVER, "7", &NicConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AttachError::Api(ApiError::Status { status: 422, .. })));
    assert_eq!(cloud.count(Op::FindNic), 0);
}

#[tokio::test(start_paused = true)]
async fn attach_gives_up_on_busy_nic() {
    let cloud = cloud().busy_for(Op::FindNic, 10);
    let (poll, ctx) = (poll(), RequestContext::new());
    let attacher = NetworkAttacher::new(&cloud, &poll, &ctx);

    let err = attacher
        .attach(DC, SERVER, "1", &NicConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AttachError::Wait(WaitError::Exhausted { resource: "NIC", polls: 3 })
    ));
}

#[tokio::test(start_paused = true)]
async fn attach_stops_waiting_when_cancelled() {
    let cloud = cloud().busy_for(Op::FindNic, 10);
    let poll = poll();
    let ctx = RequestContext::new().with_timeout(Duration::from_secs(20));
    let attacher = NetworkAttacher::new(&cloud, &poll, &ctx);

    let err = attacher
        .attach(DC, SERVER, "1", &NicConfig::default())
        .await
        .unwrap_err();

    assert!(err.is_canceled());
    assert_eq!(cloud.count(Op::FindNic), 2);
}

#[tokio::test]
async fn floating_ip_binds_last_unused_address() {
    let cloud = cloud().with_ip_block(
        "pool",
        &["192.0.2.1", "192.0.2.2", "192.0.2.3", "192.0.2.4"],
        &["192.0.2.4", "192.0.2.1"],
    );
    let (poll, ctx) = (poll(), RequestContext::new());
    let attacher = NetworkAttacher::new(&cloud, &poll, &ctx);

    attacher
        .attach_with_floating_ip(DC, SERVER, "1", "pool", &NicConfig::wan())
        .await
        .unwrap();

    let nics = cloud.nics(SERVER);
    assert_eq!(nics.len(), 1);
    assert_eq!(nics[0].ips, Some(vec!["192.0.2.3".to_string()]));
    assert_eq!(nics[0].firewall_active, Some(true));
}

#[tokio::test]
async fn exhausted_pool_creates_no_nic() {
    let cloud = cloud().with_ip_block(
        "pool",
        &["192.0.2.1", "192.0.2.2"],
        &["192.0.2.2", "192.0.2.1"],
    );
    let (poll, ctx) = (poll(), RequestContext::new());
    let attacher = NetworkAttacher::new(&cloud, &poll, &ctx);

    let err = attacher
        .attach_with_floating_ip(DC, SERVER, "1", "pool", &NicConfig::wan())
        .await
        .unwrap_err();

    assert!(matches!(err, AttachError::PoolExhausted { ref pool_id } if pool_id == "pool"));
    assert_eq!(cloud.count(Op::CreateNic), 0);
}

#[tokio::test]
async fn floating_lan_lifecycle() {
    let cloud = cloud()
        .with_ip_block("pool", &["192.0.2.1", "192.0.2.2"], &["192.0.2.2"])
        .with_lan(DC, "1", "public");
    let (poll, ctx) = (poll(), RequestContext::new());
    let attacher = NetworkAttacher::new(&cloud, &poll, &ctx);

    let lan_id = attacher
        .ensure_floating_lan(DC, "pool", "machine-1")
        .await
        .unwrap();

    let lans = cloud.lans(DC);
    let created = lans.iter().find(|l| l.id == lan_id).unwrap();
    assert_eq!(created.properties.public, Some(true));
    assert_eq!(
        created.properties.ip_failover.as_ref().unwrap()[0].ip,
        "192.0.2.1"
    );

    let removed = attacher.remove_lans_named(DC, "machine-1").await.unwrap();
    assert_eq!(removed, 1);
    assert_eq!(cloud.lans(DC).len(), 1);
    assert_eq!(cloud.targets(Op::DeleteLan), vec![lan_id]);
}
