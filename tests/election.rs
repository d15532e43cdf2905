//! End-to-end scenarios driven entirely through the public Control API,
//! plus one black-box wire-level check (stray sender rejection) that talks
//! to a running node over a raw `UdpSocket`.

use std::net::SocketAddr;
use std::time::Duration;

use electorate::{Config, Election, Role};
use tokio::net::UdpSocket;
use tokio::time::{sleep, timeout};

fn config(listen: &str, cluster: &[&str]) -> Config {
    Config {
        listen_addr: listen.to_string(),
        cluster: cluster.iter().map(|s| s.to_string()).collect(),
        ..Config::default()
    }
}

async fn until<F: Fn() -> bool>(deadline: Duration, poll: Duration, cond: F) -> bool {
    let start = tokio::time::Instant::now();
    loop {
        if cond() {
            return true;
        }
        if start.elapsed() > deadline {
            return false;
        }
        sleep(poll).await;
    }
}

#[tokio::test]
async fn two_node_election_converges_on_one_leader() {
    let a = Election::new(config("127.0.0.1:8551", &["127.0.0.1:8552"])).unwrap();
    let b = Election::new(config("127.0.0.1:8552", &["127.0.0.1:8551"])).unwrap();
    a.run().await.unwrap();
    b.run().await.unwrap();

    let settled = until(Duration::from_secs(6), Duration::from_millis(50), || {
        matches!((a.role(), b.role()), (Role::Leader, Role::Follower) | (Role::Follower, Role::Leader))
    })
    .await;
    assert!(settled, "expected exactly one leader and one follower to emerge");

    assert_eq!(a.term(), b.term());
    assert_eq!(a.leader(), b.leader());
    assert!(a.leader().is_some());

    a.stop();
    b.stop();
}

#[tokio::test]
async fn leader_failover_elects_a_successor_at_a_higher_term() {
    // Quorum counts every configured peer, including one that is down, so
    // only a cluster of at least three can survive a single failure — a
    // two-node cluster's lone survivor could never collect a majority of
    // two on its own.
    let a = Election::new(config("127.0.0.1:8561", &["127.0.0.1:8562", "127.0.0.1:8563"])).unwrap();
    let b = Election::new(config("127.0.0.1:8562", &["127.0.0.1:8561", "127.0.0.1:8563"])).unwrap();
    let c = Election::new(config("127.0.0.1:8563", &["127.0.0.1:8561", "127.0.0.1:8562"])).unwrap();
    let nodes = [&a, &b, &c];
    for node in &nodes {
        node.run().await.unwrap();
    }

    until(Duration::from_secs(5), Duration::from_millis(50), || {
        nodes.iter().filter(|n| n.role() == Role::Leader).count() == 1
    })
    .await;

    let leader = *nodes.iter().find(|n| n.role() == Role::Leader).unwrap();
    let survivors: Vec<_> = nodes.iter().copied().filter(|n| !std::ptr::eq(*n, leader)).collect();
    let old_term = leader.term();
    leader.stop();

    let recovered = until(Duration::from_secs(5), Duration::from_millis(50), || {
        survivors.iter().any(|n| n.role() == Role::Leader && n.term() > old_term)
    })
    .await;
    assert!(recovered, "one of the surviving nodes should become leader at a strictly greater term");

    for survivor in &survivors {
        survivor.stop();
    }
}

#[tokio::test]
async fn late_joiner_learns_the_current_leader() {
    let a = Election::new(config("127.0.0.1:8571", &["127.0.0.1:8572"])).unwrap();
    let b = Election::new(config("127.0.0.1:8572", &["127.0.0.1:8571"])).unwrap();
    a.run().await.unwrap();
    b.run().await.unwrap();

    until(Duration::from_secs(3), Duration::from_millis(50), || a.leader().is_some() && b.leader().is_some()).await;
    let term_before_join = a.term();

    let c = Election::new(config("127.0.0.1:8573", &["127.0.0.1:8571", "127.0.0.1:8572"])).unwrap();
    c.run().await.unwrap();
    let c_addr: SocketAddr = "127.0.0.1:8573".parse().unwrap();
    a.add_member(c_addr).unwrap();
    b.add_member(c_addr).unwrap();

    let joined = until(Duration::from_secs(3), Duration::from_millis(20), || {
        c.role() == Role::Follower && c.leader() == a.leader()
    })
    .await;
    assert!(joined, "late joiner should learn the current leader and adopt its term");
    assert_eq!(c.term(), term_before_join);

    a.stop();
    b.stop();
    c.stop();
}

#[tokio::test]
async fn three_node_cluster_converges_on_a_single_leader() {
    let nodes = [
        Election::new(config("127.0.0.1:8581", &["127.0.0.1:8582", "127.0.0.1:8583"])).unwrap(),
        Election::new(config("127.0.0.1:8582", &["127.0.0.1:8581", "127.0.0.1:8583"])).unwrap(),
        Election::new(config("127.0.0.1:8583", &["127.0.0.1:8581", "127.0.0.1:8582"])).unwrap(),
    ];
    for node in &nodes {
        node.run().await.unwrap();
    }

    let settled = until(Duration::from_secs(5), Duration::from_millis(50), || {
        nodes.iter().filter(|n| n.role() == Role::Leader).count() == 1
            && nodes.iter().all(|n| n.leader().is_some())
    })
    .await;
    assert!(settled, "a three-node cluster should converge on exactly one leader");

    let leader_addr = nodes.iter().find(|n| n.role() == Role::Leader).unwrap().leader();
    assert!(nodes.iter().all(|n| n.leader() == leader_addr));

    for node in &nodes {
        node.stop();
    }
}

#[tokio::test]
async fn stray_sender_is_dropped_without_changing_state() {
    let a = Election::new(config("127.0.0.1:8591", &["127.0.0.1:8592"])).unwrap();
    a.run().await.unwrap();
    // No peer ever shows up, so A stays Candidate/Leader-by-timeout on its
    // own; what matters is that an unregistered sender cannot influence it.
    sleep(Duration::from_millis(200)).await;
    let term_before = a.term();
    let role_before = a.role();

    let intruder = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let mut packet = vec![4u8]; // Kind::VoteMe
    packet.extend_from_slice(br#"{"term":999}"#);
    intruder.send_to(&packet, a.local_addr()).await.unwrap();

    sleep(Duration::from_millis(200)).await;
    assert_eq!(a.term(), term_before, "a stray sender must not move the term");
    assert_eq!(a.role(), role_before, "a stray sender must not move the role");

    a.stop();
}

#[tokio::test]
async fn add_member_then_del_member_returns_to_prior_cluster() {
    let a = Election::new(config("127.0.0.1:8601", &[])).unwrap();
    let peer: SocketAddr = "127.0.0.1:8602".parse().unwrap();

    a.add_member(peer).unwrap();
    assert_eq!(a.cluster(), vec![peer]);
    assert!(a.add_member(peer).is_err());

    a.del_member(peer).unwrap();
    assert!(a.cluster().is_empty());
    assert!(a.del_member(peer).is_err());
}

#[tokio::test]
async fn solo_node_reaches_leader_within_budget() {
    let node = Election::new(config("127.0.0.1:8611", &[])).unwrap();
    node.run().await.unwrap();
    let reached = timeout(Duration::from_millis(2000), async {
        until(Duration::from_millis(2000), Duration::from_millis(20), || node.role() == Role::Leader).await
    })
    .await
    .unwrap_or(false);
    assert!(reached);
    assert_eq!(node.term(), 1);
    assert_eq!(node.leader(), Some(node.local_addr()));
    node.stop();
}
