use std::time::Duration;

use coursetext_common::{ParseOptions, Term};
use coursetext_portal::{InMemoryHost, PortalLayer};
use tokio::time::sleep;

fn algorithm() -> Term {
    Term::new("term-1", "algorithm", "A finite procedure.")
}

fn looping() -> Term {
    Term::new("term-2", "loop", "Repetition.")
}

fn markers(ids: &[&str]) -> String {
    ids.iter()
        .map(|id| format!(r#"<span data-glossary-id="{id}"></span>"#))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn rescans_pick_up_replaced_content() {
    let host = InMemoryHost::new();
    let mut layer = PortalLayer::new(host.clone());
    let overlays = layer.subscribe();

    layer.update(Some("An algorithm."), &[algorithm()], ParseOptions::default());
    assert_eq!(overlays.borrow().glossary.len(), 1);
    assert_eq!(layer.pending_rescans(), 2);

    // Replaced before the 0ms rescan gets to run.
    host.replace(markers(&["term-1", "term-1"]));
    sleep(Duration::from_millis(1)).await;
    assert_eq!(overlays.borrow().glossary.len(), 2);

    host.replace(markers(&["term-1", "term-1", "term-1"]));
    sleep(Duration::from_millis(2000)).await;
    assert_eq!(overlays.borrow().glossary.len(), 3);
    assert_eq!(layer.pending_rescans(), 0);

    // The schedule is exhausted.
    host.replace(String::new());
    sleep(Duration::from_secs(10)).await;
    assert_eq!(overlays.borrow().glossary.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn new_inputs_cancel_stale_rescans() {
    let host = InMemoryHost::new();
    let mut layer = PortalLayer::new(host.clone());
    let overlays = layer.subscribe();

    layer.update(Some("An algorithm."), &[algorithm()], ParseOptions::default());
    sleep(Duration::from_millis(1000)).await;

    // Rescans for these inputs run at 1000ms and 3000ms.
    layer.update(Some("A loop."), &[looping()], ParseOptions::default());
    sleep(Duration::from_millis(1)).await;
    host.replace(markers(&["term-1", "term-2"]));

    // A stale rescan at 2000ms would pair "term-1" with the old entries.
    sleep(Duration::from_millis(1500)).await;
    {
        let current = overlays.borrow();
        assert_eq!(current.glossary.len(), 1);
        assert_eq!(current.glossary[0].term, looping());
        assert_eq!(current.glossary[0].target.position, 0);
    }

    // The 3000ms rescan sees the replaced content.
    sleep(Duration::from_millis(1000)).await;
    let current = overlays.borrow();
    assert_eq!(current.glossary.len(), 1);
    assert_eq!(current.glossary[0].term, looping());
    assert_eq!(current.glossary[0].target.position, 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_layer_cancels_rescans() {
    let host = InMemoryHost::new();
    let mut layer = PortalLayer::new(host.clone());
    let overlays = layer.subscribe();

    layer.update(Some("An algorithm."), &[algorithm()], ParseOptions::default());
    drop(layer);

    host.replace(markers(&["term-1", "term-1"]));
    sleep(Duration::from_secs(5)).await;
    assert_eq!(overlays.borrow().glossary.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn detached_host_is_not_scanned() {
    let host = InMemoryHost::new();
    let mut layer = PortalLayer::new(host.clone());
    let overlays = layer.subscribe();

    layer.update(Some("An algorithm."), &[algorithm()], ParseOptions::default());
    host.replace(markers(&["term-1", "term-1"]));
    host.detach();

    sleep(Duration::from_secs(5)).await;
    assert_eq!(overlays.borrow().glossary.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn custom_schedule() {
    let host = InMemoryHost::new();
    let mut layer =
        PortalLayer::new(host.clone()).with_delays([Duration::from_millis(500)]);
    let overlays = layer.subscribe();

    layer.update(Some(r"See \cite[p.~3]{knuth}."), &[], ParseOptions::default());
    assert_eq!(overlays.borrow().citations.len(), 1);
    assert_eq!(layer.pending_rescans(), 1);

    host.replace(String::new());
    sleep(Duration::from_millis(499)).await;
    assert_eq!(overlays.borrow().citations.len(), 1);
    sleep(Duration::from_millis(2)).await;
    assert!(overlays.borrow().is_empty());
}
